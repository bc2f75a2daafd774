//! In-memory channel that replays timed events and records every call.
//!
//! Meant for `start_paused` tokio tests: events are scheduled relative to
//! the moment the channel was created, and a wait only sees events that
//! happen strictly after it started.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep_until};
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, MessageMarker, UserMarker},
};

use super::{
    ChannelResult, ChatChannel, EventFilter, EventKind, IncomingMessage, MenuEvent,
    MessageHandle, ReactionEvent, ReactionSymbol,
};
use crate::error::ChannelError;
use crate::page::RenderedPage;

pub(crate) const CHANNEL_ID: Id<ChannelMarker> = Id::new(10);
pub(crate) const FIRST_MESSAGE_ID: Id<MessageMarker> = Id::new(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Send(RenderedPage),
    Edit(MessageHandle, RenderedPage),
    Delete(MessageHandle),
    AddReaction(MessageHandle, ReactionSymbol),
    ClearReactions(MessageHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Edit,
    Delete,
    ClearReactions,
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
    failures: Vec<(Op, ChannelError)>,
    next_message: u64,
    cancelled_waits: usize,
}

#[derive(Clone)]
pub(crate) struct ScriptedChannel {
    start: Instant,
    script: Arc<Mutex<Vec<(Instant, MenuEvent)>>>,
    recorder: Arc<Mutex<Recorder>>,
}

impl ScriptedChannel {
    pub(crate) fn new() -> Self {
        Self {
            start: Instant::now(),
            script: Arc::default(),
            recorder: Arc::default(),
        }
    }

    /// Schedule `event` to happen `millis` after the channel was created.
    pub(crate) fn at(self, millis: u64, event: MenuEvent) -> Self {
        let when = self.start + Duration::from_millis(millis);
        self.script.lock().unwrap().push((when, event));
        self
    }

    /// Make every call of `op` fail with `error`.
    pub(crate) fn failing(self, op: Op, error: ChannelError) -> Self {
        self.recorder.lock().unwrap().failures.push((op, error));
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.recorder.lock().unwrap().calls.clone()
    }

    pub(crate) fn count(&self, wanted: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| wanted(*call)).count()
    }

    pub(crate) fn reactions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::AddReaction(_, symbol) => Some(symbol.as_str().to_owned()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn cancelled_waits(&self) -> usize {
        self.recorder.lock().unwrap().cancelled_waits
    }

    fn record(&self, call: Call, op: Option<Op>) -> ChannelResult<()> {
        let mut recorder = self.recorder.lock().unwrap();
        recorder.calls.push(call);
        let failure = op.and_then(|op| {
            recorder
                .failures
                .iter()
                .find(|(failing, _)| *failing == op)
                .map(|(_, error)| error.clone())
        });
        failure.map_or(Ok(()), Err)
    }
}

/// Counts the wait as cancelled when dropped before it finished.
struct WaitGuard {
    recorder: Arc<Mutex<Recorder>>,
    finished: bool,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.recorder.lock().unwrap().cancelled_waits += 1;
        }
    }
}

#[async_trait]
impl ChatChannel for ScriptedChannel {
    async fn send(&self, page: &RenderedPage) -> ChannelResult<MessageHandle> {
        self.record(Call::Send(page.clone()), None)?;
        let mut recorder = self.recorder.lock().unwrap();
        let message_id = Id::new(FIRST_MESSAGE_ID.get() + recorder.next_message);
        recorder.next_message += 1;
        Ok(MessageHandle {
            channel_id: CHANNEL_ID,
            message_id,
        })
    }

    async fn edit(&self, message: MessageHandle, page: &RenderedPage) -> ChannelResult<()> {
        self.record(Call::Edit(message, page.clone()), Some(Op::Edit))
    }

    async fn delete(&self, message: MessageHandle) -> ChannelResult<()> {
        self.record(Call::Delete(message), Some(Op::Delete))
    }

    async fn add_reaction(
        &self,
        message: MessageHandle,
        symbol: &ReactionSymbol,
    ) -> ChannelResult<()> {
        self.record(Call::AddReaction(message, symbol.clone()), None)
    }

    async fn clear_reactions(&self, message: MessageHandle) -> ChannelResult<()> {
        self.record(Call::ClearReactions(message), Some(Op::ClearReactions))
    }

    async fn await_event(
        &self,
        kind: EventKind,
        filter: EventFilter,
        timeout: Duration,
    ) -> ChannelResult<Option<MenuEvent>> {
        let subscribed = Instant::now();
        let deadline = subscribed + timeout;
        let mut guard = WaitGuard {
            recorder: Arc::clone(&self.recorder),
            finished: false,
        };

        let next = self
            .script
            .lock()
            .unwrap()
            .iter()
            .filter(|(when, event)| {
                event.kind() == kind && *when > subscribed && *when <= deadline && filter(event)
            })
            .min_by_key(|(when, _)| *when)
            .cloned();

        let outcome = match next {
            Some((when, event)) => {
                sleep_until(when).await;
                Some(event)
            }
            None => {
                sleep_until(deadline).await;
                None
            }
        };

        guard.finished = true;
        Ok(outcome)
    }
}

pub(crate) fn reaction(user: u64, symbol: &str) -> ReactionEvent {
    ReactionEvent {
        channel_id: CHANNEL_ID,
        message_id: FIRST_MESSAGE_ID,
        user_id: Id::<UserMarker>::new(user),
        user_is_bot: false,
        symbol: ReactionSymbol::from(symbol),
    }
}

pub(crate) fn added(user: u64, symbol: &str) -> MenuEvent {
    MenuEvent::ReactionAdded(reaction(user, symbol))
}

pub(crate) fn removed(user: u64, symbol: &str) -> MenuEvent {
    MenuEvent::ReactionRemoved(reaction(user, symbol))
}

pub(crate) fn message(user: u64, content: &str) -> MenuEvent {
    MenuEvent::MessageCreated(IncomingMessage {
        channel_id: CHANNEL_ID,
        message_id: Id::new(900),
        author_id: Id::new(user),
        author_is_bot: false,
        content: content.to_owned(),
    })
}
