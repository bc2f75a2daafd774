//! Error types shared by menu construction, navigation and rendering.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the menu engine.
pub type MenuResult<T> = Result<T, MenuError>;

/// Transport limit a page was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLimit {
    /// Plain message content.
    MessageContent,
    /// Sum of every text field of an embed.
    EmbedTotal,
    /// Embed description alone.
    EmbedDescription,
}

impl SizeLimit {
    /// Maximum number of characters allowed for this limit.
    pub const fn max(self) -> usize {
        match self {
            Self::MessageContent => 2000,
            Self::EmbedTotal => 6000,
            Self::EmbedDescription => 2048,
        }
    }
}

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MessageContent => "message content",
            Self::EmbedTotal => "embed total",
            Self::EmbedDescription => "embed description",
        };
        f.write_str(name)
    }
}

/// Failure reported by a [`ChatChannel`](crate::channel::ChatChannel).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The target message no longer exists.
    #[error("message not found")]
    NotFound,

    /// The bot lacks permission for the operation.
    #[error("missing permissions")]
    Forbidden,

    /// The gateway event stream was closed.
    #[error("event stream closed")]
    Closed,

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Http(String),
}

/// Errors surfaced by [`Menu`](crate::Menu) to its caller.
#[derive(Debug, Error)]
pub enum MenuError {
    /// A menu was constructed without pages.
    #[error("a menu requires at least one page")]
    NoPages,

    /// A page has no content, title or description.
    #[error("page {page} is completely empty")]
    EmptyPage { page: usize },

    /// A page asked for embed fields but its content is not a list.
    #[error("page {page} uses fields but its content is not a list")]
    FieldsRequireList { page: usize },

    /// A page carries an image or thumbnail URL that cannot be used.
    #[error("page {page} has an invalid image url: {url}")]
    InvalidImageUrl { page: usize, url: String },

    /// A rendered page does not fit a transport limit.
    #[error("page {page} exceeds the {limit} limit ({size} > {max} characters)", max = .limit.max())]
    PageTooLarge {
        page: usize,
        limit: SizeLimit,
        size: usize,
    },

    /// A page's embed breaks one of Discord's other embed limits.
    #[error("page {page} has an invalid embed: {reason}")]
    InvalidEmbed { page: usize, reason: String },

    /// `display(new = false)` was called before any message existed.
    #[error("cannot continue a menu that was never displayed")]
    NotDisplayed,

    /// A page number outside `1..=total` was requested.
    #[error("page {requested} is out of range (1-{total})")]
    PageOutOfRange { requested: usize, total: usize },

    /// The bound message was deleted underneath the menu.
    #[error("menu message was deleted or never created")]
    MessageNotFound,

    /// Any other transport failure while rendering or waiting.
    #[error(transparent)]
    Channel(ChannelError),
}

impl From<ChannelError> for MenuError {
    fn from(source: ChannelError) -> Self {
        match source {
            ChannelError::NotFound => Self::MessageNotFound,
            other => Self::Channel(other),
        }
    }
}
