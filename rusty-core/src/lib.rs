use std::{env, sync::Arc, time::Duration};

use anyhow::Context as _;
use rusty_menu::{MenuOptions, TwilightChannel};
use tokio::sync::broadcast;
use twilight_http::Client;
use twilight_model::{
    gateway::event::Event,
    id::{
        Id,
        marker::{ChannelMarker, UserMarker},
    },
};

/// Capacity of the gateway event fan-out used by running menus.
pub const EVENT_BUFFER: usize = 256;

/// Shared application context passed into command handlers.
///
/// Cheap to clone because it only stores reference-counted shared state.
#[derive(Clone)]
pub struct Context {
    pub http: Arc<Client>,
    /// Every gateway event, forwarded by the bot's event loop.
    pub events: broadcast::Sender<Arc<Event>>,
    pub bot_user_id: Id<UserMarker>,
    pub settings: MenuSettings,
}

impl Context {
    /// Create a new application context.
    pub fn new(
        http: Arc<Client>,
        events: broadcast::Sender<Arc<Event>>,
        bot_user_id: Id<UserMarker>,
        settings: MenuSettings,
    ) -> Self {
        Self {
            http,
            events,
            bot_user_id,
            settings,
        }
    }

    /// Menu transport bound to `channel_id`.
    pub fn menu_channel(&self, channel_id: Id<ChannelMarker>) -> TwilightChannel {
        TwilightChannel::new(
            Arc::clone(&self.http),
            channel_id,
            self.bot_user_id,
            self.events.clone(),
        )
    }

    /// Menu options seeded from the configured settings.
    pub fn menu_options(&self) -> MenuOptions {
        self.settings.menu_options()
    }
}

/// Menu behavior configured through the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSettings {
    /// `MENU_TIMEOUT_SECS`, default 60.
    pub timeout: Duration,
    /// `MENU_REMOVE_MESSAGE_AFTER`, default false.
    pub remove_message_after: bool,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            timeout: rusty_menu::DEFAULT_TIMEOUT,
            remove_message_after: false,
        }
    }
}

impl MenuSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`; missing keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut settings = Self::default();

        if let Some(raw) = lookup("MENU_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("MENU_TIMEOUT_SECS must be a whole number, got `{raw}`"))?;
            anyhow::ensure!(secs > 0, "MENU_TIMEOUT_SECS must be greater than zero");
            settings.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("MENU_REMOVE_MESSAGE_AFTER") {
            settings.remove_message_after = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => anyhow::bail!("MENU_REMOVE_MESSAGE_AFTER must be a boolean, got `{raw}`"),
            };
        }

        Ok(settings)
    }

    pub fn menu_options(&self) -> MenuOptions {
        MenuOptions {
            remove_message_after: self.remove_message_after,
            ..MenuOptions::default().with_timeout(self.timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_keys_use_defaults() {
        let settings = MenuSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, MenuSettings::default());
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }

    #[test]
    fn values_are_parsed() {
        let settings = MenuSettings::from_lookup(lookup(&[
            ("MENU_TIMEOUT_SECS", "15"),
            ("MENU_REMOVE_MESSAGE_AFTER", "True"),
        ]))
        .unwrap();

        assert_eq!(settings.timeout, Duration::from_secs(15));
        assert!(settings.remove_message_after);

        let options = settings.menu_options();
        assert_eq!(options.timeout, Duration::from_secs(15));
        assert!(options.remove_message_after);
        assert!(options.remove_reactions_after);
    }

    #[test]
    fn bad_values_name_the_key() {
        let err = MenuSettings::from_lookup(lookup(&[("MENU_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("MENU_TIMEOUT_SECS"));

        let err =
            MenuSettings::from_lookup(lookup(&[("MENU_REMOVE_MESSAGE_AFTER", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("MENU_REMOVE_MESSAGE_AFTER"));

        assert!(MenuSettings::from_lookup(lookup(&[("MENU_TIMEOUT_SECS", "0")])).is_err());
    }
}
