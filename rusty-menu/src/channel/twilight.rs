//! [`ChatChannel`] backed by the Twilight HTTP client and gateway events.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;
use twilight_http::{
    Client,
    error::{Error as HttpError, ErrorType},
    request::channel::reaction::RequestReactionType,
};
use twilight_model::{
    channel::message::EmojiReactionType,
    gateway::{GatewayReaction, event::Event},
    id::{
        Id,
        marker::{ChannelMarker, UserMarker},
    },
};

use super::{
    ChannelResult, ChatChannel, EventFilter, EventKind, IncomingMessage, MenuEvent,
    MessageHandle, ReactionEvent, ReactionSymbol,
};
use crate::error::ChannelError;
use crate::page::RenderedPage;

/// Menu transport for one Discord channel.
///
/// Gateway events are read from a broadcast channel the bot's event loop
/// forwards every event into.
#[derive(Clone)]
pub struct TwilightChannel {
    http: Arc<Client>,
    channel_id: Id<ChannelMarker>,
    bot_user_id: Id<UserMarker>,
    events: broadcast::Sender<Arc<Event>>,
}

impl TwilightChannel {
    pub fn new(
        http: Arc<Client>,
        channel_id: Id<ChannelMarker>,
        bot_user_id: Id<UserMarker>,
        events: broadcast::Sender<Arc<Event>>,
    ) -> Self {
        Self {
            http,
            channel_id,
            bot_user_id,
            events,
        }
    }

    pub fn channel_id(&self) -> Id<ChannelMarker> {
        self.channel_id
    }

    async fn next_event(
        &self,
        receiver: &mut broadcast::Receiver<Arc<Event>>,
        kind: EventKind,
        filter: &EventFilter,
    ) -> ChannelResult<MenuEvent> {
        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "menu fell behind the gateway event stream");
                    continue;
                }
                Err(RecvError::Closed) => return Err(ChannelError::Closed),
            };

            if let Some(event) = menu_event(&event, kind, self.bot_user_id)
                && filter(&event)
            {
                return Ok(event);
            }
        }
    }
}

#[async_trait]
impl ChatChannel for TwilightChannel {
    async fn send(&self, page: &RenderedPage) -> ChannelResult<MessageHandle> {
        let embeds: Vec<_> = page.embed.iter().cloned().collect();
        let mut request = self.http.create_message(self.channel_id).embeds(&embeds);
        if let Some(content) = page.content.as_deref() {
            request = request.content(content);
        }

        let message = request
            .await
            .map_err(classify)?
            .model()
            .await
            .map_err(|source| ChannelError::Http(source.to_string()))?;

        Ok(MessageHandle {
            channel_id: message.channel_id,
            message_id: message.id,
        })
    }

    async fn edit(&self, message: MessageHandle, page: &RenderedPage) -> ChannelResult<()> {
        let embeds: Vec<_> = page.embed.iter().cloned().collect();
        self.http
            .update_message(message.channel_id, message.message_id)
            .content(page.content.as_deref())
            .embeds(Some(embeds.as_slice()))
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete(&self, message: MessageHandle) -> ChannelResult<()> {
        self.http
            .delete_message(message.channel_id, message.message_id)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        message: MessageHandle,
        symbol: &ReactionSymbol,
    ) -> ChannelResult<()> {
        let emoji = request_reaction(symbol);
        self.http
            .create_reaction(message.channel_id, message.message_id, &emoji)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn clear_reactions(&self, message: MessageHandle) -> ChannelResult<()> {
        self.http
            .delete_all_reactions(message.channel_id, message.message_id)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn await_event(
        &self,
        kind: EventKind,
        filter: EventFilter,
        timeout: Duration,
    ) -> ChannelResult<Option<MenuEvent>> {
        let mut receiver = self.events.subscribe();
        match tokio::time::timeout(timeout, self.next_event(&mut receiver, kind, &filter)).await {
            Ok(event) => event.map(Some),
            Err(_elapsed) => Ok(None),
        }
    }
}

/// Map an HTTP failure onto the menu's transport errors.
fn classify(source: HttpError) -> ChannelError {
    match source.kind() {
        ErrorType::Response { status, .. } if status.get() == 404 => ChannelError::NotFound,
        ErrorType::Response { status, .. } if status.get() == 403 => ChannelError::Forbidden,
        _ => ChannelError::Http(source.to_string()),
    }
}

/// Parse a stored symbol; `name:id` is a custom emoji.
fn request_reaction(symbol: &ReactionSymbol) -> RequestReactionType<'_> {
    let custom = symbol.as_str().rsplit_once(':').and_then(|(name, id)| {
        let id = Id::new_checked(id.parse().ok()?)?;
        Some(RequestReactionType::Custom {
            id,
            name: (!name.is_empty()).then_some(name),
        })
    });

    custom.unwrap_or(RequestReactionType::Unicode {
        name: symbol.as_str(),
    })
}

fn reaction_symbol(emoji: &EmojiReactionType) -> ReactionSymbol {
    match emoji {
        EmojiReactionType::Custom { id, name, .. } => {
            ReactionSymbol::new(format!("{}:{id}", name.as_deref().unwrap_or_default()))
        }
        EmojiReactionType::Unicode { name } => ReactionSymbol::new(name.as_str()),
    }
}

fn reaction_event(reaction: &GatewayReaction, bot_user_id: Id<UserMarker>) -> ReactionEvent {
    let member_is_bot = reaction
        .member
        .as_ref()
        .is_some_and(|member| member.user.bot);

    ReactionEvent {
        channel_id: reaction.channel_id,
        message_id: reaction.message_id,
        user_id: reaction.user_id,
        user_is_bot: reaction.user_id == bot_user_id || member_is_bot,
        symbol: reaction_symbol(&reaction.emoji),
    }
}

/// Convert a gateway event of the wanted kind.
fn menu_event(event: &Event, kind: EventKind, bot_user_id: Id<UserMarker>) -> Option<MenuEvent> {
    match (kind, event) {
        (EventKind::ReactionAdded, Event::ReactionAdd(reaction)) => Some(MenuEvent::ReactionAdded(
            reaction_event(reaction, bot_user_id),
        )),
        (EventKind::ReactionRemoved, Event::ReactionRemove(reaction)) => Some(
            MenuEvent::ReactionRemoved(reaction_event(reaction, bot_user_id)),
        ),
        (EventKind::MessageCreated, Event::MessageCreate(message)) => {
            Some(MenuEvent::MessageCreated(IncomingMessage {
                channel_id: message.channel_id,
                message_id: message.id,
                author_id: message.author.id,
                author_is_bot: message.author.bot || message.author.id == bot_user_id,
                content: message.content.clone(),
            }))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_symbols_stay_unicode() {
        let symbol = ReactionSymbol::from("▶️");
        assert!(matches!(
            request_reaction(&symbol),
            RequestReactionType::Unicode { name: "▶️" }
        ));
    }

    #[test]
    fn custom_symbols_carry_their_id() {
        let symbol = ReactionSymbol::from("blob:123456");
        assert!(matches!(
            request_reaction(&symbol),
            RequestReactionType::Custom { id, name: Some("blob") } if id == Id::new(123456)
        ));

        let broken = ReactionSymbol::from("blob:abc");
        assert!(matches!(
            request_reaction(&broken),
            RequestReactionType::Unicode { .. }
        ));
    }

    #[test]
    fn gateway_emojis_become_symbols() {
        let custom = EmojiReactionType::Custom {
            animated: false,
            id: Id::new(42),
            name: Some("party".to_owned()),
        };
        let unicode = EmojiReactionType::Unicode {
            name: "❌".to_owned(),
        };

        assert_eq!(reaction_symbol(&custom).as_str(), "party:42");
        assert_eq!(reaction_symbol(&unicode).as_str(), "❌");
        assert!(matches!(
            request_reaction(&reaction_symbol(&custom)),
            RequestReactionType::Custom { name: Some("party"), .. }
        ));
    }

    #[test]
    fn other_events_are_skipped() {
        let event = Event::GatewayHeartbeatAck;
        assert!(menu_event(&event, EventKind::ReactionAdded, Id::new(1)).is_none());
    }
}
