//! Menu configuration and page normalization.

use std::{fmt, sync::Arc, time::Duration};

use twilight_util::builder::embed::ImageSource;

use crate::channel::{IncomingMessage, ReactionEvent, ReactionSymbol};
use crate::error::{MenuError, MenuResult};
use crate::page::{Page, PageContent, PageForm};

/// Default time a menu waits for input before stopping itself.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Caller check for free-form message answers.
pub type MessagePredicate = Arc<dyn Fn(&IncomingMessage) -> bool + Send + Sync>;
/// Caller check for arbitrary reaction answers.
pub type ReactionPredicate = Arc<dyn Fn(&ReactionEvent) -> bool + Send + Sync>;

/// Every option a menu recognizes, with its default.
#[derive(Clone)]
pub struct MenuOptions {
    /// Bound on each wait for input (default 60s).
    pub timeout: Duration,
    /// Append `page i/n` to the footer when there is more than one page.
    pub show_page_number: bool,
    /// Attach any reaction controls at all.
    pub show_buttons: bool,
    /// Attach the general controls (stop).
    pub show_general_buttons: bool,
    /// Clear reactions when the menu stops.
    pub remove_reactions_after: bool,
    /// Delete the message when the menu stops.
    pub remove_message_after: bool,
    /// Render pages that did not pick a form as embeds.
    pub all_embedded: bool,
    /// Extra reactions whose selection is returned to the caller.
    pub selectors: Option<Vec<ReactionSymbol>>,
    /// Free-form message answers returned to the caller.
    pub input: Option<MessagePredicate>,
    /// Reaction answers returned to the caller.
    pub reaction_input: Option<ReactionPredicate>,
    /// Title/description/footer inheritance for pages.
    pub page_defaults: PageDefaults,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            show_page_number: true,
            show_buttons: true,
            show_general_buttons: true,
            remove_reactions_after: true,
            remove_message_after: false,
            all_embedded: false,
            selectors: None,
            input: None,
            reaction_input: None,
            page_defaults: PageDefaults::default(),
        }
    }
}

impl fmt::Debug for MenuOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuOptions")
            .field("timeout", &self.timeout)
            .field("show_page_number", &self.show_page_number)
            .field("show_buttons", &self.show_buttons)
            .field("show_general_buttons", &self.show_general_buttons)
            .field("remove_reactions_after", &self.remove_reactions_after)
            .field("remove_message_after", &self.remove_message_after)
            .field("all_embedded", &self.all_embedded)
            .field("selectors", &self.selectors)
            .field("input", &self.input.is_some())
            .field("reaction_input", &self.reaction_input.is_some())
            .field("page_defaults", &self.page_defaults)
            .finish()
    }
}

impl MenuOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_defaults(mut self, defaults: PageDefaults) -> Self {
        self.page_defaults = defaults;
        self
    }

    /// Selector reactions, attached in the given order. Duplicates are dropped.
    pub fn with_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ReactionSymbol>,
    {
        let mut unique: Vec<ReactionSymbol> = Vec::new();
        for symbol in selectors.into_iter().map(Into::into) {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        self.selectors = Some(unique);
        self
    }

    pub fn with_input(
        mut self,
        predicate: impl Fn(&IncomingMessage) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.input = Some(Arc::new(predicate));
        self
    }

    pub fn with_reaction_input(
        mut self,
        predicate: impl Fn(&ReactionEvent) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.reaction_input = Some(Arc::new(predicate));
        self
    }

    pub(crate) fn selectors(&self) -> &[ReactionSymbol] {
        self.selectors.as_deref().unwrap_or_default()
    }

    /// Align a page with the menu options and check it can be rendered.
    ///
    /// `number` is the 1-based position used in error messages.
    pub(crate) fn prepare_page(&self, mut page: Page, number: usize) -> MenuResult<Page> {
        self.page_defaults.apply(&mut page);

        if page.form.is_none() {
            page.form = Some(if self.all_embedded {
                PageForm::Embedded
            } else {
                PageForm::Plain
            });
        }

        if page.is_blank() {
            return Err(MenuError::EmptyPage { page: number });
        }

        if page.using_fields && !matches!(page.content, PageContent::List(_)) {
            return Err(MenuError::FieldsRequireList { page: number });
        }

        for url in [page.image.as_deref(), page.thumbnail.as_deref()]
            .into_iter()
            .flatten()
        {
            if ImageSource::url(url).is_err() {
                return Err(MenuError::InvalidImageUrl {
                    page: number,
                    url: url.to_owned(),
                });
            }
        }

        Ok(page)
    }
}

/// Menu-wide page text that pages may inherit.
///
/// A page field is overwritten when its `overwrite_*` flag (or
/// `overwrite_all`) is set; otherwise an empty page field is filled when its
/// `fill_*` flag and `fill_all` are both set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDefaults {
    pub title: String,
    pub overwrite_title: bool,
    pub fill_title: bool,
    pub description: String,
    pub overwrite_description: bool,
    pub fill_description: bool,
    pub footer: String,
    pub overwrite_footer: bool,
    pub fill_footer: bool,
    pub overwrite_all: bool,
    pub fill_all: bool,
    /// Number list entries on every list page.
    pub enumerate: bool,
    /// Number list entries with digit emojis on every list page.
    pub enumerate_with_emoji: bool,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            title: String::new(),
            overwrite_title: false,
            fill_title: true,
            description: String::new(),
            overwrite_description: false,
            fill_description: true,
            footer: String::new(),
            overwrite_footer: false,
            fill_footer: true,
            overwrite_all: false,
            fill_all: true,
            enumerate: false,
            enumerate_with_emoji: false,
        }
    }
}

impl PageDefaults {
    fn apply(&self, page: &mut Page) {
        inherit(
            &mut page.title,
            &self.title,
            self.overwrite_title || self.overwrite_all,
            self.fill_title && self.fill_all,
        );
        inherit(
            &mut page.description,
            &self.description,
            self.overwrite_description || self.overwrite_all,
            self.fill_description && self.fill_all,
        );
        inherit(
            &mut page.footer,
            &self.footer,
            self.overwrite_footer || self.overwrite_all,
            self.fill_footer && self.fill_all,
        );

        if matches!(page.content, PageContent::List(_)) {
            if self.enumerate_with_emoji {
                page.enumerate_with_emoji = true;
            } else if self.enumerate {
                page.enumerate = true;
            }
        }
    }
}

fn inherit(field: &mut String, default: &str, overwrite: bool, fill: bool) {
    if overwrite || (field.is_empty() && fill) {
        *field = default.to_owned();
    }
}
