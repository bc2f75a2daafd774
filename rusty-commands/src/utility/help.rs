use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::{COMMANDS, CommandMeta};
use rusty_core::Context;
use rusty_menu::{Menu, MenuOptions, Page, PageDefaults};

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Lists out all available commands.",
    category: "utility",
    usage: "!help [category]",
};

const HELP_COMMANDS_PER_PAGE: usize = 5;

/// Show the command catalog as an embedded menu, optionally for one category.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let category = arg1.map(str::to_ascii_lowercase);

    let categories = categories();
    if let Some(wanted) = category.as_deref()
        && !categories.contains(&wanted)
    {
        let out = format!(
            "Unknown category `{wanted}`. Available: {}",
            categories.join(", ")
        );
        http.create_message(msg.channel_id).content(&out).await?;
        return Ok(());
    }

    let pages = help_pages(category.as_deref());
    let options = MenuOptions {
        all_embedded: true,
        ..ctx.menu_options()
    }
    .with_page_defaults(PageDefaults {
        title: "Available Commands".to_owned(),
        footer: format!("{} for one category", META.usage),
        ..PageDefaults::default()
    });

    let mut menu = Menu::new(
        pages,
        [msg.author.id],
        ctx.menu_channel(msg.channel_id),
        options,
    )?;
    menu.display(true, true).await?;

    Ok(())
}

fn categories() -> Vec<&'static str> {
    let mut categories: Vec<&str> = COMMANDS.iter().map(|c| c.category).collect();
    categories.sort_unstable();
    categories.dedup();
    categories
}

/// One list page per chunk of commands, sorted by category then name.
fn help_pages(category: Option<&str>) -> Vec<Page> {
    let commands = sorted_commands(category);

    commands
        .chunks(HELP_COMMANDS_PER_PAGE)
        .map(|chunk| {
            let entries: Vec<String> = chunk
                .iter()
                .map(|command| format!("`{}` ({}): {}", command.usage, command.category, command.desc))
                .collect();
            Page::new(entries).with_prefix("•")
        })
        .collect()
}

fn sorted_commands(category: Option<&str>) -> Vec<&'static CommandMeta> {
    let mut filtered: Vec<&'static CommandMeta> = COMMANDS
        .iter()
        .filter(|cmd| category.is_none_or(|wanted| cmd.category == wanted))
        .collect();

    filtered.sort_unstable_by(|left, right| {
        left.category
            .cmp(right.category)
            .then_with(|| left.name.cmp(right.name))
    });

    filtered
}

#[cfg(test)]
mod tests {
    use rusty_menu::PageContent;

    use super::*;

    #[test]
    fn catalog_lists_every_command() {
        let pages = help_pages(None);
        let entries: usize = pages
            .iter()
            .map(|page| match page.content() {
                PageContent::List(entries) => entries.len(),
                PageContent::Text(_) => 0,
            })
            .sum();

        assert_eq!(entries, COMMANDS.len());
        assert!(pages.len() <= COMMANDS.len().div_ceil(HELP_COMMANDS_PER_PAGE));
    }

    #[test]
    fn commands_are_sorted_by_name_within_category() {
        let names: Vec<&str> = sorted_commands(Some("utility"))
            .iter()
            .map(|command| command.name)
            .collect();
        assert_eq!(names, ["help", "pagetest", "pick"]);
    }

    #[test]
    fn unknown_category_yields_no_pages() {
        assert!(help_pages(Some("nope")).is_empty());
    }
}
