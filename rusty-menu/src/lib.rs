//! Reaction-driven paginated menus for Twilight bots.
//!
//! A [`Menu`] owns one message, renders its current [`Page`] into it and
//! lets a fixed set of users page through it with reactions. Selectors,
//! reaction input and free-form message input hand control back to the
//! caller with a [`MenuResponse`].

/// Transport capability used by menus, plus the Twilight implementation.
pub mod channel;
/// Embed rendering and footer composition.
pub mod embed;
pub mod error;
/// Menu options and page defaults.
pub mod options;
pub mod page;
/// Navigation, controls and the session engine.
pub mod pagination;

pub use channel::{
    ChatChannel, EventKind, IncomingMessage, MenuEvent, MessageHandle, ReactionEvent,
    ReactionSymbol, twilight::TwilightChannel,
};
pub use error::{ChannelError, MenuError, MenuResult, SizeLimit};
pub use options::{DEFAULT_TIMEOUT, MenuOptions, PageDefaults};
pub use page::{DisplayStyle, Page, PageContent, PageForm, RenderedPage, Renderable};
pub use pagination::{Menu, MenuResponse, SessionState};
