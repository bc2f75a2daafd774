use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use rusty_core::Context;
use rusty_menu::{Menu, Page, PageDefaults};

pub const META: CommandMeta = CommandMeta {
    name: "pagetest",
    desc: "Test reaction pagination behavior.",
    category: "utility",
    usage: "!pagetest [page]",
};

const ITEMS_PER_PAGE: usize = 5;
const ITEM_COUNT: usize = 24;

/// Page through sample items with reactions.
///
/// Inputs:
/// - optional page number: `!pagetest [page]`.
///
/// Error behavior:
/// - returns usage text on invalid page input.
/// - returns bounds text when the requested page is out of range.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;

    let Some(requested_page) = parse_one_based_page(arg1) else {
        let usage = format!("Usage: `{}` (page starts at 1)", META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    let pages = test_pages();
    if requested_page > pages.len() {
        let out = format!(
            "Page {} does not exist. Available pages: 1-{}.",
            requested_page,
            pages.len()
        );
        http.create_message(msg.channel_id).content(&out).await?;
        return Ok(());
    }

    let options = ctx.menu_options().with_page_defaults(PageDefaults {
        title: "Pagination Test".to_owned(),
        ..PageDefaults::default()
    });
    let mut menu = Menu::new(
        pages,
        [msg.author.id],
        ctx.menu_channel(msg.channel_id),
        options,
    )?;

    menu.set_page(requested_page).await?;
    menu.display(true, false).await?;

    Ok(())
}

/// `None` means no argument (first page); invalid input yields `None` too.
fn parse_one_based_page(arg: Option<&str>) -> Option<usize> {
    match arg {
        None => Some(1),
        Some(raw) => raw.parse::<usize>().ok().filter(|page| *page >= 1),
    }
}

fn test_pages() -> Vec<Page> {
    let items: Vec<String> = (1..=ITEM_COUNT)
        .map(|index| format!("Sample pagination item #{index}"))
        .collect();

    items
        .chunks(ITEMS_PER_PAGE)
        .map(|chunk| Page::new(chunk.to_vec()).with_prefix("-"))
        .collect()
}
