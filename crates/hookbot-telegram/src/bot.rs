//! Bot assembly and the two update delivery modes.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use hookbot_core::{HookbotConfig, SessionBackend, SessionConfig};
use hookbot_persistence::{FileSessionStore, MemorySessionStore, SessionStore};
use hookbot_upstream::{build_client, CoinGeckoClient, HttpOrderApi, OpenWeatherClient};

use crate::crypto::{CryptoCommand, CryptoDispatcher};
use crate::error::Result;
use crate::handler::UpdateHandler;
use crate::onboarding::{OnboardingPolicy, OnboardingStateMachine};
use crate::transport::MessageSender;
use crate::update::Inbound;
use crate::weather::{WeatherCommand, WeatherDispatcher};
use crate::webhook::{self, webhook_url, WebhookState};

/// Which bot the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotKind {
    Crypto,
    Weather,
    Order,
}

impl BotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BotKind::Crypto => "crypto",
            BotKind::Weather => "weather",
            BotKind::Order => "order",
        }
    }

    /// Commands advertised in the Telegram client menu.
    pub fn commands(self) -> Vec<BotCommand> {
        let commands = match self {
            BotKind::Crypto => CryptoCommand::bot_commands(),
            BotKind::Weather => WeatherCommand::bot_commands(),
            BotKind::Order => vec![BotCommand::new("start", "Start a new order")],
        };
        // Telegram's command menu takes names without the leading slash.
        commands
            .into_iter()
            .map(|c| BotCommand::new(c.command.trim_start_matches('/'), c.description))
            .collect()
    }
}

impl std::fmt::Display for BotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens the configured session store.
pub fn open_session_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match config.backend {
        SessionBackend::File => {
            let store = FileSessionStore::new(&config.dir);
            store.ensure_dir()?;
            Arc::new(store)
        }
        SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
    };
    info!(backend = store.backend_name(), dir = %config.dir.display(), "Session store ready");
    Ok(store)
}

/// Builds the handler for `kind` from configuration.
pub fn build_handler(
    kind: BotKind,
    config: &HookbotConfig,
    sender: Arc<dyn MessageSender>,
) -> Result<Arc<dyn UpdateHandler>> {
    let upstream = &config.upstream;
    let client = build_client(upstream.http_timeout)?;

    let handler: Arc<dyn UpdateHandler> = match kind {
        BotKind::Crypto => Arc::new(CryptoDispatcher::new(
            CoinGeckoClient::new(client, upstream.coingecko_url.clone()),
            sender,
        )),
        BotKind::Weather => Arc::new(WeatherDispatcher::new(
            OpenWeatherClient::new(
                client,
                upstream.openweather_url.clone(),
                upstream.openweather_key()?,
                upstream.openweather_lang.clone(),
            ),
            sender,
        )),
        BotKind::Order => Arc::new(OnboardingStateMachine::new(
            open_session_store(&config.sessions)?,
            Arc::new(HttpOrderApi::new(client, upstream.order_api_url()?.clone())),
            sender,
            OnboardingPolicy::from_config(&config.sessions),
        )),
    };
    Ok(handler)
}

/// Hands one event to `handler`, logging instead of propagating failures.
pub async fn deliver(handler: &dyn UpdateHandler, inbound: Option<Inbound>) {
    let Some(inbound) = inbound else {
        debug!("Ignoring update without text or callback data");
        return;
    };
    let chat = inbound.chat();
    if let Err(e) = handler.handle(inbound).await {
        warn!(chat_id = %chat, bot = handler.name(), error = %e, "Update handling failed");
    }
}

/// A configured bot ready to receive updates.
pub struct HookBot {
    kind: BotKind,
    bot: Bot,
    config: HookbotConfig,
    handler: Arc<dyn UpdateHandler>,
}

impl HookBot {
    /// Creates the bot and its handler from configuration.
    pub fn new(kind: BotKind, config: HookbotConfig) -> Result<Self> {
        let bot = Bot::new(config.telegram.token.clone());
        let handler = build_handler(kind, &config, Arc::new(bot.clone()))?;
        Ok(Self {
            kind,
            bot,
            config,
            handler,
        })
    }

    pub fn kind(&self) -> BotKind {
        self.kind
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self.bot.get_me().await?;
        Ok(me.username().to_string())
    }

    async fn publish_commands(&self) {
        if let Err(e) = self.bot.set_my_commands(self.kind.commands()).await {
            warn!(error = %e, "Failed to publish command list");
        }
    }

    /// Start the bot in polling mode.
    pub async fn start_polling(&self) -> Result<()> {
        info!(bot = %self.kind, "Starting in polling mode...");

        // getUpdates is refused while a webhook is set.
        self.bot.delete_webhook().await?;
        self.publish_commands().await;

        let for_messages = Arc::clone(&self.handler);
        let for_callbacks = Arc::clone(&self.handler);

        let tree = dptree::entry()
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let handler = Arc::clone(&for_messages);
                async move {
                    deliver(handler.as_ref(), Inbound::from_message(&msg)).await;
                    respond(())
                }
            }))
            .branch(
                Update::filter_callback_query().endpoint(move |q: CallbackQuery| {
                    let handler = Arc::clone(&for_callbacks);
                    async move {
                        deliver(handler.as_ref(), Inbound::from_callback(&q)).await;
                        respond(())
                    }
                }),
            );

        Dispatcher::builder(self.bot.clone(), tree)
            .default_handler(|upd| async move {
                debug!(update_id = ?upd.id, "Unhandled update kind");
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    /// Start the webhook server. Registers the webhook first when a public
    /// URL is configured; otherwise `GET /setwebhook` does it later.
    pub async fn start_webhook(&self) -> Result<()> {
        let telegram = &self.config.telegram;
        info!(bot = %self.kind, "Starting in webhook mode...");

        if let Some(base) = &telegram.public_url {
            let url = webhook_url(base)?;
            match self
                .bot
                .register_webhook(url.clone(), telegram.webhook_secret.as_deref())
                .await
            {
                Ok(()) => info!(url = %url, "Webhook registered"),
                Err(e) => warn!(url = %url, error = %e, "Failed to register webhook"),
            }
        }
        self.publish_commands().await;

        let state = WebhookState::new(
            Arc::clone(&self.handler),
            Arc::new(self.bot.clone()),
            telegram.webhook_secret.clone(),
            telegram.public_url.clone(),
        );
        webhook::serve(&telegram.bind_address(), state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSender;
    use hookbot_models::ChatKey;
    use tempfile::tempdir;

    fn config(vars: &[(&str, &str)]) -> HookbotConfig {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HookbotConfig::from_lookup(|key| {
            vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn test_commands() {
        let names: Vec<String> = BotKind::Crypto
            .commands()
            .into_iter()
            .map(|c| c.command)
            .collect();
        assert_eq!(names, ["start", "help", "price", "top10", "trending", "global"]);

        let weather: Vec<String> = BotKind::Weather
            .commands()
            .into_iter()
            .map(|c| c.command)
            .collect();
        assert_eq!(weather, ["start", "weather"]);

        let order = BotKind::Order.commands();
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].command, "start");
    }

    #[test]
    fn test_build_handler_requires_bot_specific_settings() {
        let sender: Arc<dyn MessageSender> = Arc::new(RecordingSender::default());
        let config = config(&[("TELEGRAM_BOT_TOKEN", "123:abc")]);

        let crypto = build_handler(BotKind::Crypto, &config, sender.clone()).unwrap();
        assert_eq!(crypto.name(), "crypto");

        assert!(build_handler(BotKind::Weather, &config, sender.clone()).is_err());
        assert!(build_handler(BotKind::Order, &config, sender).is_err());
    }

    #[tokio::test]
    async fn test_order_handler_with_memory_store() {
        let dir = tempdir().unwrap();
        let dir = dir.path().to_string_lossy().to_string();
        let config = config(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("API_BASE_URL", "http://localhost:9"),
            ("HOOKBOT_SESSION_BACKEND", "memory"),
            ("HOOKBOT_SESSION_DIR", &dir),
        ]);
        let sender = Arc::new(RecordingSender::default());

        let handler = build_handler(BotKind::Order, &config, sender.clone()).unwrap();
        assert_eq!(handler.name(), "order");

        deliver(
            handler.as_ref(),
            Some(Inbound::Text {
                chat: ChatKey(5),
                text: "/start".into(),
            }),
        )
        .await;
        deliver(handler.as_ref(), None).await;
        assert_eq!(sender.texts(), vec![crate::onboarding::WELCOME.to_string()]);
    }

    #[test]
    fn test_file_store_creates_dir() {
        let dir = tempdir().unwrap();
        let sessions = SessionConfig {
            backend: SessionBackend::File,
            dir: dir.path().join("sessions"),
            max_code_attempts: None,
            ttl: None,
        };
        let store = open_session_store(&sessions).unwrap();
        assert_eq!(store.backend_name(), "file");
        assert!(sessions.dir.is_dir());
    }
}
