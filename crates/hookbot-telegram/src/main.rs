//! hookbot binary.
//!
//! Start a bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx cargo run -p hookbot-telegram -- crypto
//! ```

use clap::{Parser, Subcommand};
use hookbot_core::{config, HookbotConfig};
use hookbot_telegram::{BotKind, HookBot};
use tracing_subscriber::EnvFilter;

/// hookbot - crypto, weather and order Telegram bots
#[derive(Parser, Debug)]
#[command(name = "hookbot", version)]
#[command(about = "Run one of the hookbot Telegram bots")]
struct Args {
    #[command(subcommand)]
    bot: BotArg,

    /// Serve the webhook instead of long polling
    #[arg(short, long, global = true)]
    webhook: bool,

    /// Webhook port (overrides HOOKBOT_WEBHOOK_PORT)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum BotArg {
    /// CoinGecko price bot
    Crypto,
    /// OpenWeatherMap bot
    Weather,
    /// Order onboarding bot
    Order,
}

impl From<BotArg> for BotKind {
    fn from(arg: BotArg) -> Self {
        match arg {
            BotArg::Crypto => BotKind::Crypto,
            BotArg::Weather => BotKind::Weather,
            BotArg::Order => BotKind::Order,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load environment variables from the state directory first
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    // RUST_LOG wins over -v
    let filter = match args.verbose {
        0 => "hookbot_telegram=info,hookbot_upstream=info,teloxide=warn,tower_http=warn",
        1 => "hookbot_telegram=debug,hookbot_upstream=debug,hookbot_persistence=debug,teloxide=info,tower_http=info",
        2 => "hookbot_telegram=trace,hookbot_upstream=trace,hookbot_persistence=trace,teloxide=debug,tower_http=debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut config = HookbotConfig::from_env()?;
    if let Some(port) = args.port {
        config.telegram.port = port;
    }
    tracing::debug!(?config, "Configuration loaded");

    let kind = BotKind::from(args.bot);
    let bot = HookBot::new(kind, config)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, bot = %kind, "Bot initialized successfully");
            println!("\nhookbot: {} bot", kind);
            println!("   Bot: @{}", username);
            println!("   Mode: {}", if args.webhook { "webhook" } else { "polling" });
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }
    println!("   Press Ctrl+C to stop\n");

    if args.webhook {
        bot.start_webhook().await?;
    } else {
        bot.start_polling().await?;
    }

    Ok(())
}
