pub mod utility;

use twilight_model::gateway::payload::incoming::MessageCreate;

use rusty_core::Context;

/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';

// Global command meta data
pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::help::META,
    utility::pagetest::META,
    utility::pick::META,
    // Add new commands here
];

/// A prefixed command split into its lowercased name and first argument.
#[derive(Debug, PartialEq, Eq)]
struct Invocation<'a> {
    name: String,
    arg: Option<&'a str>,
}

fn parse_invocation(content: &str) -> Option<Invocation<'_>> {
    let content = content.trim().strip_prefix(COMMAND_PREFIX)?.trim();
    let mut parts = content.split_whitespace();
    let name = parts.next()?.to_ascii_lowercase();

    Some(Invocation {
        name,
        arg: parts.next(),
    })
}

pub async fn handle_message(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    if msg.author.bot {
        return Ok(());
    }

    let content = msg.content.clone();
    let Some(invocation) = parse_invocation(&content) else {
        return Ok(());
    };
    let arg = invocation.arg;

    match invocation.name.as_str() {
        "help" => utility::help::run(ctx, msg, arg).await?,
        "pagetest" => utility::pagetest::run(ctx, msg, arg).await?,
        "pick" => utility::pick::run(ctx, msg).await?,
        // Add new commands here
        _ => {}
    }

    Ok(())
}
