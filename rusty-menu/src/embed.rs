use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::{
    EmbedAuthorBuilder, EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource,
};

use crate::page::{Page, PageContent};

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_54_30;

/// Discord rejects empty field names.
const BLANK_FIELD_NAME: &str = "\u{200b}";

/// Compose the footer line shown under a page.
///
/// The page-number part is only added when `show_page_number` is set and
/// there is more than one page.
pub fn compose_footer(
    page_footer: &str,
    page: usize,
    total_pages: usize,
    show_page_number: bool,
) -> String {
    let show_number = show_page_number && total_pages > 1;

    match (page_footer.is_empty(), show_number) {
        (false, true) => format!("{page_footer} | page {page}/{total_pages}"),
        (true, true) => format!("page {page}/{total_pages}"),
        (false, false) => page_footer.to_owned(),
        (true, false) => String::new(),
    }
}

/// Longest footer the page can be shown with in a menu of `total_pages`.
pub fn widest_footer(page_footer: &str, total_pages: usize, show_page_number: bool) -> String {
    compose_footer(page_footer, total_pages, total_pages, show_page_number)
}

/// Build the embed for an embedded page with `footer` as footer text.
pub fn build_page_embed(page: &Page, footer: &str) -> Embed {
    page_embed_builder(page, footer).build()
}

/// Build the embed and check it against Discord's embed limits.
pub fn validate_page_embed(page: &Page, footer: &str) -> Result<Embed, String> {
    let builder = page_embed_builder(page, footer)
        .validate()
        .map_err(|source| source.to_string())?;
    Ok(builder.build())
}

fn page_embed_builder(page: &Page, footer: &str) -> EmbedBuilder {
    let mut builder = EmbedBuilder::new().color(page.color.unwrap_or(DEFAULT_EMBED_COLOR));

    if !page.title.is_empty() {
        builder = builder.title(&page.title);
    }

    let mut description = if page.description.is_empty() {
        String::new()
    } else {
        format!("*{}*", page.description)
    };

    match &page.content {
        PageContent::List(entries) if page.using_fields => {
            for (prefix, entry) in page.entry_prefixes().into_iter().zip(entries) {
                let name = match prefix.trim() {
                    "" => BLANK_FIELD_NAME.to_owned(),
                    name => name.to_owned(),
                };
                builder = builder.field(EmbedFieldBuilder::new(name, entry).build());
            }
        }
        _ => {
            let body = page.body();
            if !body.is_empty() {
                if !description.is_empty() {
                    description.push_str("\n\n");
                }
                description.push_str(&body);
            }
        }
    }

    if !description.is_empty() {
        builder = builder.description(description);
    }

    if !footer.is_empty() {
        builder = builder.footer(EmbedFooterBuilder::new(footer).build());
    }

    if let Some(author) = &page.author {
        builder = builder.author(EmbedAuthorBuilder::new(author.as_str()).build());
    }

    // URLs are checked when the page joins a menu.
    if let Some(image) = page.image.as_deref().and_then(|url| ImageSource::url(url).ok()) {
        builder = builder.image(image);
    }

    if let Some(thumbnail) = page
        .thumbnail
        .as_deref()
        .and_then(|url| ImageSource::url(url).ok())
    {
        builder = builder.thumbnail(thumbnail);
    }

    if let Some(timestamp) = page.timestamp {
        builder = builder.timestamp(timestamp);
    }

    builder
}

/// Total characters counted against the embed size limit.
pub fn embed_text_length(embed: &Embed) -> usize {
    let count = |text: Option<&str>| text.map_or(0, |text| text.chars().count());

    let fields: usize = embed
        .fields
        .iter()
        .map(|field| field.name.chars().count() + field.value.chars().count())
        .sum();

    count(embed.title.as_deref())
        + count(embed.description.as_deref())
        + count(embed.footer.as_ref().map(|footer| footer.text.as_str()))
        + count(embed.author.as_ref().map(|author| author.name.as_str()))
        + fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_joins_note_and_page_number() {
        assert_eq!(compose_footer("note", 2, 3, true), "note | page 2/3");
        assert_eq!(compose_footer("", 2, 3, true), "page 2/3");
        assert_eq!(compose_footer("note", 1, 1, true), "note");
        assert_eq!(compose_footer("", 1, 3, false), "");
    }

    #[test]
    fn widest_footer_uses_the_last_page_number() {
        assert_eq!(widest_footer("note", 12, true), "note | page 12/12");
        assert_eq!(widest_footer("note", 1, true), "note");
    }

    #[test]
    fn validation_rejects_too_many_fields() {
        let entries: Vec<String> = (1..=30).map(|n| format!("entry {n}")).collect();
        let page = Page::new(entries).using_fields();

        assert_eq!(build_page_embed(&page, "").fields.len(), 30);
        assert!(validate_page_embed(&page, "").is_err());
        assert!(validate_page_embed(&Page::embedded("fine"), "page 1/2").is_ok());
    }

    #[test]
    fn fields_use_prefixes_as_names() {
        let page = Page::new(vec!["first", "second"])
            .with_title("Fields")
            .enumerated()
            .using_fields();
        let embed = build_page_embed(&page, "");

        let names: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["1", "2"]);
        assert!(embed.description.is_none());
        assert!(embed.footer.is_none());
    }

    #[test]
    fn description_is_followed_by_body() {
        let page = Page::embedded("body").with_description("about");
        let embed = build_page_embed(&page, "page 1/2");

        assert_eq!(embed.description.as_deref(), Some("*about*\n\nbody"));
        assert_eq!(
            embed.footer.map(|footer| footer.text).as_deref(),
            Some("page 1/2")
        );
        assert_eq!(embed.color, Some(DEFAULT_EMBED_COLOR));
    }
}
