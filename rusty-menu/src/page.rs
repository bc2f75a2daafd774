//! Page model and its plain/embedded rendering.

use twilight_model::{channel::message::embed::Embed, util::Timestamp};

use crate::embed::{build_page_embed, embed_text_length, validate_page_embed};

const NUMBER_EMOJIS: [&str; 10] = [
    ":zero:", ":one:", ":two:", ":three:", ":four:", ":five:", ":six:", ":seven:", ":eight:",
    ":nine:",
];

/// Body of a page: free text or a list of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    Text(String),
    List(Vec<String>),
}

impl PageContent {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(entries) => entries.is_empty(),
        }
    }
}

impl From<&str> for PageContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PageContent {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for PageContent {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for PageContent {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(ToOwned::to_owned).collect())
    }
}

/// How the text of a plain page is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayStyle {
    /// Markdown lines.
    #[default]
    Line,
    /// Everything wrapped in a code block. Emoji enumeration falls back to digits.
    Block,
}

/// Which transport form a page is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageForm {
    Plain,
    Embedded,
}

/// Output of rendering one page: exactly one of the two is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub content: Option<String>,
    pub embed: Option<Embed>,
}

/// Character counts checked against the transport limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSize {
    Content(usize),
    Embed { total: usize, description: usize },
}

/// Anything the menu can put on screen.
pub trait Renderable {
    /// Render with `footer` as the footer line (empty for none).
    fn render(&self, footer: &str) -> RenderedPage;

    /// Size of the page rendered with `footer`.
    fn size(&self, footer: &str) -> RenderSize;

    /// Transport limits other than the character counts. `Err` carries the
    /// reason the rendered page would be rejected.
    fn check_limits(&self, _footer: &str) -> Result<(), String> {
        Ok(())
    }
}

/// A single menu page.
///
/// Built with the `with_*` methods. Title, description and footer may be
/// filled or overwritten by the menu's [`PageDefaults`](crate::PageDefaults).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub(crate) content: PageContent,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) footer: String,
    pub(crate) prefix: String,
    pub(crate) enumerate: bool,
    pub(crate) enumerate_with_emoji: bool,
    pub(crate) display: DisplayStyle,
    pub(crate) form: Option<PageForm>,
    pub(crate) using_fields: bool,
    pub(crate) color: Option<u32>,
    pub(crate) author: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) thumbnail: Option<String>,
    pub(crate) timestamp: Option<Timestamp>,
}

impl Page {
    pub fn new(content: impl Into<PageContent>) -> Self {
        Self {
            content: content.into(),
            title: String::new(),
            description: String::new(),
            footer: String::new(),
            prefix: String::new(),
            enumerate: false,
            enumerate_with_emoji: false,
            display: DisplayStyle::Line,
            form: None,
            using_fields: false,
            color: None,
            author: None,
            image: None,
            thumbnail: None,
            timestamp: None,
        }
    }

    /// A page rendered as an embed.
    pub fn embedded(content: impl Into<PageContent>) -> Self {
        Self::new(content).with_form(PageForm::Embedded)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Prefix put before every list entry (a space is added).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn enumerated(mut self) -> Self {
        self.enumerate = true;
        self
    }

    pub fn enumerated_with_emoji(mut self) -> Self {
        self.enumerate_with_emoji = true;
        self
    }

    pub fn with_display(mut self, display: DisplayStyle) -> Self {
        self.display = display;
        self
    }

    pub fn with_form(mut self, form: PageForm) -> Self {
        self.form = Some(form);
        self
    }

    /// Render list entries as embed fields. Implies the embedded form.
    pub fn using_fields(mut self) -> Self {
        self.using_fields = true;
        self.form = Some(PageForm::Embedded);
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.author = Some(name.into());
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }

    pub fn is_embedded(&self) -> bool {
        self.form == Some(PageForm::Embedded)
    }

    /// Whether the page has nothing at all to show.
    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.title.is_empty() && self.description.is_empty()
    }

    /// Per-entry prefixes for list content.
    pub(crate) fn entry_prefixes(&self) -> Vec<String> {
        let PageContent::List(entries) = &self.content else {
            return Vec::new();
        };

        let count = entries.len();
        if self.enumerate_with_emoji && self.display != DisplayStyle::Block {
            (1..=count).map(|n| format!("{} ", emoji_number(n))).collect()
        } else if self.enumerate || self.enumerate_with_emoji {
            (1..=count).map(|n| format!("{n} ")).collect()
        } else if self.prefix.is_empty() {
            vec![String::new(); count]
        } else {
            vec![format!("{} ", self.prefix); count]
        }
    }

    /// Body text without title, description or footer.
    pub fn body(&self) -> String {
        match &self.content {
            PageContent::Text(text) => text.clone(),
            PageContent::List(entries) => {
                let lines: Vec<String> = self
                    .entry_prefixes()
                    .into_iter()
                    .zip(entries)
                    .map(|(prefix, entry)| format!("{prefix}{entry}"))
                    .collect();
                lines.join("\n").trim_end().to_owned()
            }
        }
    }

    /// Full plain-message text with `footer` as the footer line.
    pub fn plain_text(&self, footer: &str) -> String {
        let mut text = String::new();
        if !self.title.is_empty() {
            text.push_str(&format!("**{}**\n", self.title));
        }
        if !self.description.is_empty() {
            text.push_str(&format!("*{}*\n", self.description));
        }
        if !self.title.is_empty() || !self.description.is_empty() {
            text.push('\n');
        }
        text.push_str(&self.body());
        if !footer.is_empty() {
            text.push_str("\n\n");
            text.push_str(footer);
        }

        match self.display {
            DisplayStyle::Line => text,
            DisplayStyle::Block => format!("```{text}```"),
        }
    }
}

impl Renderable for Page {
    fn render(&self, footer: &str) -> RenderedPage {
        if self.is_embedded() {
            RenderedPage {
                content: None,
                embed: Some(build_page_embed(self, footer)),
            }
        } else {
            RenderedPage {
                content: Some(self.plain_text(footer)),
                embed: None,
            }
        }
    }

    fn size(&self, footer: &str) -> RenderSize {
        if self.is_embedded() {
            let embed = build_page_embed(self, footer);
            RenderSize::Embed {
                total: embed_text_length(&embed),
                description: embed
                    .description
                    .as_deref()
                    .map_or(0, |description| description.chars().count()),
            }
        } else {
            RenderSize::Content(self.plain_text(footer).chars().count())
        }
    }

    fn check_limits(&self, footer: &str) -> Result<(), String> {
        if self.is_embedded() {
            validate_page_embed(self, footer)?;
        }
        Ok(())
    }
}

/// Spell a positive integer as digit emoji names, e.g. `12` -> `:one::two:`.
pub fn emoji_number(number: usize) -> String {
    number
        .to_string()
        .chars()
        .filter_map(|digit| digit.to_digit(10))
        .map(|digit| NUMBER_EMOJIS[digit as usize])
        .collect()
}
