//! Live menu sessions: render, race inputs, dispatch, tear down.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, select_all};
use tracing::{debug, warn};
use twilight_model::id::{Id, marker::UserMarker};

use crate::channel::{
    ChannelResult, ChatChannel, EventFilter, EventKind, MenuEvent, MessageHandle, ReactionSymbol,
};
use crate::embed::{compose_footer, widest_footer};
use crate::error::{ChannelError, MenuError, MenuResult};
use crate::options::MenuOptions;
use crate::page::{Page, RenderedPage, Renderable};

use super::buttons::{ButtonAction, ButtonGroup, ButtonRegistry};
use super::navigation::{Dispatch, NavigationState, insert_position, validate_page_sizes};

/// Lifecycle of a menu session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not displayed yet, or control was handed back to the caller.
    Idle,
    /// Sending or editing the message and attaching controls.
    Rendering,
    /// Racing the configured inputs.
    Waiting,
    /// Applying the input that won the race.
    Dispatching,
    /// Stopped by timeout or the stop control; teardown has run.
    Stopped,
}

/// Answer returned by [`Menu::display`] when a selector, reaction input or
/// message input won a race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuResponse {
    pub input: MenuEvent,
    /// The page shown when the input arrived.
    pub page: Page,
    pub page_number: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputSource {
    ButtonAdded,
    ButtonRemoved,
    Message,
    Reaction,
    Selector,
}

impl InputSource {
    fn kind(self) -> EventKind {
        match self {
            Self::ButtonRemoved => EventKind::ReactionRemoved,
            Self::Message => EventKind::MessageCreated,
            Self::ButtonAdded | Self::Reaction | Self::Selector => EventKind::ReactionAdded,
        }
    }
}

enum RaceOutcome {
    TimedOut,
    Input(InputSource, MenuEvent),
}

type Wait<'a> = BoxFuture<'a, (InputSource, ChannelResult<Option<MenuEvent>>)>;

/// A paginated message that a fixed set of users can drive with reactions.
pub struct Menu<C> {
    channel: C,
    pages: Vec<Page>,
    navigation: NavigationState,
    buttons: ButtonRegistry,
    interactors: Arc<HashSet<Id<UserMarker>>>,
    options: MenuOptions,
    message: Option<MessageHandle>,
    running: bool,
    state: SessionState,
}

impl<C: ChatChannel> Menu<C> {
    /// Build a menu, aligning every page with `options` and checking it
    /// fits the transport limits. Nothing is sent yet.
    pub fn new(
        pages: Vec<Page>,
        interactors: impl IntoIterator<Item = Id<UserMarker>>,
        channel: C,
        options: MenuOptions,
    ) -> MenuResult<Self> {
        if pages.is_empty() {
            return Err(MenuError::NoPages);
        }

        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| options.prepare_page(page, index + 1))
            .collect::<MenuResult<Vec<_>>>()?;
        check_sizes(&pages, &options)?;

        Ok(Self {
            channel,
            navigation: NavigationState::new(pages.len()),
            pages,
            buttons: ButtonRegistry::default(),
            interactors: Arc::new(interactors.into_iter().collect()),
            options,
            message: None,
            running: false,
            state: SessionState::Idle,
        })
    }

    /// Replace the default control table.
    pub fn with_buttons(mut self, buttons: ButtonRegistry) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.navigation.current() - 1]
    }

    pub fn current_page_number(&self) -> usize {
        self.navigation.current()
    }

    pub fn total_pages(&self) -> usize {
        self.navigation.total()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is live: inside `display`, or handed back to
    /// the caller after an answer and not stopped since.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn message(&self) -> Option<MessageHandle> {
        self.message
    }

    pub fn options(&self) -> &MenuOptions {
        &self.options
    }

    /// Render the current page with the menu footer.
    pub fn render_current(&self) -> RenderedPage {
        let page = self.current_page();
        let footer = compose_footer(
            page.footer(),
            self.navigation.current(),
            self.navigation.total(),
            self.options.show_page_number,
        );
        page.render(&footer)
    }

    /// Show the menu and run it until it stops or an answer arrives.
    ///
    /// With `new` a fresh message is sent, otherwise the previous one is
    /// reused. Returns `Ok(None)` after a timeout or the stop control, and
    /// the answer when a selector, reaction input or message input matched.
    pub async fn display(
        &mut self,
        new: bool,
        reset_position: bool,
    ) -> MenuResult<Option<MenuResponse>> {
        if self.message.is_none() && !new {
            return Err(MenuError::NotDisplayed);
        }

        if reset_position {
            self.navigation.first();
        }

        let outcome = self.run(new).await;
        if outcome.is_err() {
            self.running = false;
            self.state = SessionState::Idle;
        }
        outcome
    }

    async fn run(&mut self, new: bool) -> MenuResult<Option<MenuResponse>> {
        self.state = SessionState::Rendering;
        let message = self.open(new).await?;
        self.attach_controls(message).await?;

        self.running = true;
        debug!(
            message_id = message.message_id.get(),
            pages = self.navigation.total(),
            "menu session started"
        );

        while self.running {
            self.state = SessionState::Waiting;
            let outcome = self.race(message).await?;
            self.state = SessionState::Dispatching;

            match outcome {
                RaceOutcome::TimedOut => {
                    debug!(message_id = message.message_id.get(), "menu timed out");
                    self.stop().await;
                }
                RaceOutcome::Input(InputSource::ButtonAdded | InputSource::ButtonRemoved, event) => {
                    let action = event
                        .as_reaction()
                        .and_then(|reaction| self.buttons.resolve(&reaction.symbol, &self.active_groups()));
                    if let Some(action) = action {
                        self.dispatch(action).await?;
                    }
                }
                RaceOutcome::Input(source, input) => {
                    debug!(?source, page = self.navigation.current(), "menu answered");
                    self.state = SessionState::Idle;
                    return Ok(Some(MenuResponse {
                        input,
                        page: self.current_page().clone(),
                        page_number: self.navigation.current(),
                    }));
                }
            }
        }

        Ok(None)
    }

    /// Send or edit the bound message with the current page.
    async fn open(&mut self, mut new: bool) -> MenuResult<MessageHandle> {
        if !new && let Some(message) = self.message {
            match self.channel.clear_reactions(message).await {
                Ok(()) => {}
                Err(ChannelError::Forbidden) => {
                    warn!(
                        message_id = message.message_id.get(),
                        "cannot clear menu reactions, replacing the message"
                    );
                    self.discard(message).await;
                    new = true;
                }
                Err(source) => return Err(source.into()),
            }
        }

        let rendered = self.render_current();
        let message = match self.message {
            Some(message) if !new => match self.channel.edit(message, &rendered).await {
                Ok(()) => message,
                Err(ChannelError::Forbidden) => {
                    warn!(
                        message_id = message.message_id.get(),
                        "cannot edit menu message, replacing it"
                    );
                    self.discard(message).await;
                    self.channel.send(&rendered).await?
                }
                Err(source) => return Err(source.into()),
            },
            _ => self.channel.send(&rendered).await?,
        };

        self.message = Some(message);
        Ok(message)
    }

    async fn discard(&self, message: MessageHandle) {
        if let Err(source) = self.channel.delete(message).await {
            warn!(?source, message_id = message.message_id.get(), "failed to delete old menu message");
        }
    }

    /// Selectors, then navigation (more than one page), then general controls.
    async fn attach_controls(&self, message: MessageHandle) -> MenuResult<()> {
        if !self.options.show_buttons {
            return Ok(());
        }

        let symbols = self
            .options
            .selectors()
            .iter()
            .cloned()
            .chain(self.buttons.symbols(&self.active_groups()));

        for symbol in symbols {
            self.channel.add_reaction(message, &symbol).await?;
        }

        Ok(())
    }

    /// Re-attach every control in its fixed order. If the old reactions
    /// cannot be cleared, the navigation controls are appended instead.
    async fn reattach_controls(&self, message: MessageHandle) -> MenuResult<()> {
        if !self.options.show_buttons {
            return Ok(());
        }

        match self.channel.clear_reactions(message).await {
            Ok(()) => self.attach_controls(message).await,
            Err(ChannelError::Forbidden) => {
                warn!(
                    message_id = message.message_id.get(),
                    "cannot clear menu reactions, appending navigation controls"
                );
                for symbol in self.buttons.symbols(&[ButtonGroup::Navigation]) {
                    self.channel.add_reaction(message, &symbol).await?;
                }
                Ok(())
            }
            Err(source) => Err(source.into()),
        }
    }

    fn active_groups(&self) -> Vec<ButtonGroup> {
        let mut groups = Vec::new();
        if self.options.show_buttons {
            if self.navigation.has_navigation() {
                groups.push(ButtonGroup::Navigation);
            }
            if self.options.show_general_buttons {
                groups.push(ButtonGroup::General);
            }
        }
        groups
    }

    fn input_sources(&self) -> Vec<InputSource> {
        let mut sources = Vec::new();
        if !self.active_groups().is_empty() {
            sources.extend([InputSource::ButtonAdded, InputSource::ButtonRemoved]);
        }
        if self.options.input.is_some() {
            sources.push(InputSource::Message);
        }
        if self.options.reaction_input.is_some() {
            sources.push(InputSource::Reaction);
        }
        if !self.options.selectors().is_empty() {
            sources.push(InputSource::Selector);
        }
        sources
    }

    fn filter_for(&self, source: InputSource, message: MessageHandle) -> EventFilter {
        let interactors = Arc::clone(&self.interactors);
        let permitted = move |user_id: Id<UserMarker>, is_bot: bool| {
            !is_bot && interactors.contains(&user_id)
        };

        let symbols: Vec<ReactionSymbol> = match source {
            InputSource::ButtonAdded | InputSource::ButtonRemoved => {
                self.buttons.symbols(&self.active_groups())
            }
            InputSource::Selector => self.options.selectors().to_vec(),
            InputSource::Message => {
                let predicate = self.options.input.clone();
                return Arc::new(move |event: &MenuEvent| {
                    event.as_message().is_some_and(|incoming| {
                        incoming.channel_id == message.channel_id
                            && permitted(incoming.author_id, incoming.author_is_bot)
                            && predicate.as_ref().is_some_and(|accepts| accepts(incoming))
                    })
                });
            }
            InputSource::Reaction => {
                let predicate = self.options.reaction_input.clone();
                return Arc::new(move |event: &MenuEvent| {
                    event.as_reaction().is_some_and(|reaction| {
                        reaction.message_id == message.message_id
                            && permitted(reaction.user_id, reaction.user_is_bot)
                            && predicate.as_ref().is_some_and(|accepts| accepts(reaction))
                    })
                });
            }
        };

        Arc::new(move |event: &MenuEvent| {
            event.as_reaction().is_some_and(|reaction| {
                reaction.message_id == message.message_id
                    && permitted(reaction.user_id, reaction.user_is_bot)
                    && symbols.contains(&reaction.symbol)
            })
        })
    }

    /// Wait for the first configured input, bounded by the menu timeout.
    async fn race(&self, message: MessageHandle) -> MenuResult<RaceOutcome> {
        let timeout = self.options.timeout;
        let waits: Vec<Wait<'_>> = self
            .input_sources()
            .into_iter()
            .map(|source| {
                let filter = self.filter_for(source, message);
                async move {
                    let event = self.channel.await_event(source.kind(), filter, timeout).await;
                    (source, event)
                }
                .boxed()
            })
            .collect();

        if waits.is_empty() {
            tokio::time::sleep(timeout).await;
            return Ok(RaceOutcome::TimedOut);
        }

        // Whatever did not win is dropped here, which cancels it, on every
        // path out of this function.
        let winner = match tokio::time::timeout(timeout, select_all(waits)).await {
            Ok(((source, event), _index, losers)) => {
                drop(losers);
                event?.map(|event| RaceOutcome::Input(source, event))
            }
            Err(_elapsed) => None,
        };

        Ok(winner.unwrap_or(RaceOutcome::TimedOut))
    }

    /// Apply a control action, then render once or stop.
    async fn dispatch(&mut self, action: ButtonAction) -> MenuResult<()> {
        match self.navigation.apply(action) {
            Dispatch::Rerender => {
                debug!(?action, page = self.navigation.current(), "menu control pressed");
                self.refresh().await
            }
            Dispatch::Stop => {
                self.stop().await;
                Ok(())
            }
        }
    }

    /// Re-render the bound message. A menu that was never shown has
    /// nothing to update.
    async fn refresh(&self) -> MenuResult<()> {
        let Some(message) = self.message else {
            return Ok(());
        };
        let rendered = self.render_current();
        self.channel.edit(message, &rendered).await?;
        Ok(())
    }

    /// Stop the session and clean up the message.
    ///
    /// Deletes the message when `remove_message_after` is set, otherwise (or
    /// when deleting failed for a reason other than the message being gone)
    /// clears its reactions when `remove_reactions_after` is set. Transport
    /// failures are logged and swallowed. Calling it again is a no-op.
    pub async fn stop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        self.running = false;
        self.state = SessionState::Stopped;

        let Some(message) = self.message else {
            return;
        };
        let message_id = message.message_id.get();

        if self.options.remove_message_after {
            match self.channel.delete(message).await {
                Ok(()) | Err(ChannelError::NotFound) => return,
                Err(source) => warn!(?source, message_id, "failed to delete menu message"),
            }
        }

        if self.options.remove_reactions_after {
            match self.channel.clear_reactions(message).await {
                Ok(()) => {}
                Err(ChannelError::NotFound) => {
                    debug!(message_id, "menu message already gone");
                }
                Err(source) => warn!(?source, message_id, "failed to clear menu reactions"),
            }
        }
    }

    /// Insert a page at a 1-based `position` (append when `None`) and
    /// re-render.
    ///
    /// When this gives a live single-page menu its second page, the
    /// navigation controls are attached right away.
    pub async fn add_page(&mut self, page: Page, position: Option<usize>) -> MenuResult<()> {
        let position = insert_position(position, self.navigation.total())?;
        let page = self.options.prepare_page(page, position)?;

        // A longer menu widens every page-number footer.
        let mut pages = self.pages.clone();
        pages.insert(position - 1, page);
        check_sizes(&pages, &self.options)?;

        let gains_navigation = !self.navigation.has_navigation();
        self.pages = pages;
        self.navigation.page_added();
        self.refresh().await?;

        if gains_navigation
            && self.running
            && let Some(message) = self.message
        {
            self.reattach_controls(message).await?;
        }

        Ok(())
    }

    /// Jump to a 1-based page and re-render.
    pub async fn set_page(&mut self, page: usize) -> MenuResult<()> {
        self.navigation.set(page)?;
        self.refresh().await
    }

    pub async fn first_page(&mut self) -> MenuResult<()> {
        self.dispatch(ButtonAction::FirstPage).await
    }

    pub async fn previous_page(&mut self) -> MenuResult<()> {
        self.dispatch(ButtonAction::PreviousPage).await
    }

    pub async fn next_page(&mut self) -> MenuResult<()> {
        self.dispatch(ButtonAction::NextPage).await
    }

    pub async fn last_page(&mut self) -> MenuResult<()> {
        self.dispatch(ButtonAction::LastPage).await
    }
}

/// Check every page against the limits with the longest footer a menu of
/// this length renders.
fn check_sizes(pages: &[Page], options: &MenuOptions) -> MenuResult<()> {
    let total = pages.len();
    validate_page_sizes(pages, |page: &Page| {
        widest_footer(page.footer(), total, options.show_page_number)
    })
}
