use tracing::debug;
use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use rusty_core::Context;
use rusty_menu::{Menu, MenuEvent, Page};

pub const META: CommandMeta = CommandMeta {
    name: "pick",
    desc: "Pick an option with a reaction or by typing its number.",
    category: "utility",
    usage: "!pick",
};

const CHOICES: [&str; 3] = ["Rust", "Go", "Zig"];
const SELECTORS: [&str; 3] = ["1️⃣", "2️⃣", "3️⃣"];

/// Ask the author to pick one of [`CHOICES`] and echo the answer.
pub async fn run(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    let page = Page::new(CHOICES.to_vec())
        .with_title("Pick a language")
        .with_description("React or type the number of your choice.")
        .enumerated_with_emoji();

    let options = ctx
        .menu_options()
        .with_selectors(SELECTORS)
        .with_input(|incoming| typed_choice(&incoming.content).is_some());

    let mut menu = Menu::new(
        vec![page],
        [msg.author.id],
        ctx.menu_channel(msg.channel_id),
        options,
    )?;

    let Some(response) = menu.display(true, true).await? else {
        debug!(user_id = msg.author.id.get(), "pick menu closed without an answer");
        return Ok(());
    };
    menu.stop().await;

    if let Some(choice) = chosen(&response.input) {
        let out = format!("You picked **{}**.", CHOICES[choice]);
        ctx.http.create_message(msg.channel_id).content(&out).await?;
    }

    Ok(())
}

/// Index into [`CHOICES`] from a typed `1`..=`3`.
fn typed_choice(content: &str) -> Option<usize> {
    let number: usize = content.trim().parse().ok()?;
    (1..=CHOICES.len()).contains(&number).then(|| number - 1)
}

/// Index into [`CHOICES`] for whatever answered the menu.
fn chosen(input: &MenuEvent) -> Option<usize> {
    match input {
        MenuEvent::MessageCreated(message) => typed_choice(&message.content),
        MenuEvent::ReactionAdded(reaction) | MenuEvent::ReactionRemoved(reaction) => SELECTORS
            .iter()
            .position(|selector| *selector == reaction.symbol.as_str()),
    }
}
