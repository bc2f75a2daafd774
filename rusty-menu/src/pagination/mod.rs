//! Stable facade for the menu session engine.

pub mod buttons;
pub mod navigation;
mod session;

pub use buttons::{Button, ButtonAction, ButtonGroup, ButtonRegistry};
pub use navigation::{Dispatch, NavigationState, validate_page_sizes};
pub use session::{Menu, MenuResponse, SessionState};
