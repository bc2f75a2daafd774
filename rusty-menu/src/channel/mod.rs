//! Capability boundary between the menu engine and the chat transport.
//!
//! The engine never talks to Discord directly. Everything it needs (sending,
//! editing, deleting the bound message, managing its reactions and waiting
//! for gateway events) goes through [`ChatChannel`].

#[cfg(test)]
pub(crate) mod scripted;
pub mod twilight;

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, MessageMarker, UserMarker},
};

use crate::error::ChannelError;
use crate::page::RenderedPage;

pub type ChannelResult<T> = Result<T, ChannelError>;

/// Acceptance check applied by the channel before an event may win a race.
pub type EventFilter = Arc<dyn Fn(&MenuEvent) -> bool + Send + Sync>;

/// A reaction emoji as used by menus.
///
/// Unicode emojis are stored as-is; custom emojis as `name:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionSymbol(String);

impl ReactionSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReactionSymbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ReactionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of the message a menu owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel_id: Id<ChannelMarker>,
    pub message_id: Id<MessageMarker>,
}

/// A reaction added to or removed from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub channel_id: Id<ChannelMarker>,
    pub message_id: Id<MessageMarker>,
    pub user_id: Id<UserMarker>,
    /// Set for the bot itself and any other automated account.
    pub user_is_bot: bool,
    pub symbol: ReactionSymbol,
}

/// A message posted in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub channel_id: Id<ChannelMarker>,
    pub message_id: Id<MessageMarker>,
    pub author_id: Id<UserMarker>,
    pub author_is_bot: bool,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ReactionAdded,
    ReactionRemoved,
    MessageCreated,
}

/// Gateway event as seen by a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    ReactionAdded(ReactionEvent),
    ReactionRemoved(ReactionEvent),
    MessageCreated(IncomingMessage),
}

impl MenuEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ReactionAdded(_) => EventKind::ReactionAdded,
            Self::ReactionRemoved(_) => EventKind::ReactionRemoved,
            Self::MessageCreated(_) => EventKind::MessageCreated,
        }
    }

    pub fn as_reaction(&self) -> Option<&ReactionEvent> {
        match self {
            Self::ReactionAdded(reaction) | Self::ReactionRemoved(reaction) => Some(reaction),
            Self::MessageCreated(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&IncomingMessage> {
        match self {
            Self::MessageCreated(message) => Some(message),
            _ => None,
        }
    }

    /// The user that caused the event.
    pub fn user_id(&self) -> Id<UserMarker> {
        match self {
            Self::ReactionAdded(reaction) | Self::ReactionRemoved(reaction) => reaction.user_id,
            Self::MessageCreated(message) => message.author_id,
        }
    }
}

/// Transport operations a menu needs.
///
/// Implementations map transport failures onto [`ChannelError`]; a deleted
/// message must surface as [`ChannelError::NotFound`] and missing
/// permissions as [`ChannelError::Forbidden`].
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Send a new message with the rendered page.
    async fn send(&self, page: &RenderedPage) -> ChannelResult<MessageHandle>;

    /// Replace the content and embed of an existing message.
    async fn edit(&self, message: MessageHandle, page: &RenderedPage) -> ChannelResult<()>;

    async fn delete(&self, message: MessageHandle) -> ChannelResult<()>;

    async fn add_reaction(
        &self,
        message: MessageHandle,
        symbol: &ReactionSymbol,
    ) -> ChannelResult<()>;

    async fn clear_reactions(&self, message: MessageHandle) -> ChannelResult<()>;

    /// Wait for the next event of `kind` accepted by `filter`.
    ///
    /// Returns `Ok(None)` when nothing matched within `timeout`. Dropping the
    /// returned future must stop the wait.
    async fn await_event(
        &self,
        kind: EventKind,
        filter: EventFilter,
        timeout: Duration,
    ) -> ChannelResult<Option<MenuEvent>>;
}
