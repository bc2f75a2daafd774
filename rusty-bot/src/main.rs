use std::env;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_http::Client;
use twilight_model::gateway::event::Event;

use rustls::crypto::ring::default_provider;

use rusty_commands::handle_message;
use rusty_core::{Context, EVENT_BUFFER, MenuSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    // Load the .env file
    dotenvy::dotenv().ok();

    let token = env::var("DISCORD_TOKEN")?;
    let settings = MenuSettings::from_env()?;

    // Create a single shared HTTP Client
    let http = Arc::new(Client::new(token.clone()));
    let bot_user_id = http.current_user().await?.model().await?.id;

    // Menus subscribe to this to wait for reactions and replies
    let (events, _) = broadcast::channel(EVENT_BUFFER);
    let ctx = Context::new(Arc::clone(&http), events.clone(), bot_user_id, settings);

    let intents = Intents::GUILDS
        | Intents::GUILD_MESSAGES
        | Intents::MESSAGE_CONTENT
        | Intents::GUILD_MESSAGE_REACTIONS
        | Intents::DIRECT_MESSAGES
        | Intents::DIRECT_MESSAGE_REACTIONS;

    // A shard is one Gateway WebSocket connection to Discord
    let mut shard = Shard::new(ShardId::new(0, 1), token, intents);

    info!(?settings, "Rusty is connecting...");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => Arc::new(event),
            Err(source) => {
                error!(?source, "gateway event stream error");
                continue;
            }
        };

        // No running menu means no receivers, which is fine.
        let _ = events.send(Arc::clone(&event));

        match event.as_ref() {
            Event::Ready(_) => {
                info!("Rusty has successfully awoken!");
            }
            Event::MessageCreate(msg) => {
                let ctx = ctx.clone();
                let msg = msg.clone();
                // Menus wait on later events, so commands must not block this loop.
                tokio::spawn(async move {
                    let channel_id = msg.channel_id.get();
                    if let Err(source) = handle_message(ctx, msg).await {
                        error!(?source, channel_id, "command failed");
                    }
                });
            }
            _ => {} // Ignore unused events
        }
    }
    Ok(()) // Return Success, shutdown cleanly
}
