//! Crypto price bot backed by CoinGecko.
//!
//! Commands are matched on the lowercased message text; anything that is not
//! one of the commands below is ignored.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::utils::command::BotCommands;
use tracing::{debug, warn};

use hookbot_core::{escape_markdown_v2, format_fixed, format_number};
use hookbot_upstream::{CoinDetail, CoinGeckoClient, GlobalStats, MarketCoin, TrendingCoin};

use crate::error::Result;
use crate::handler::UpdateHandler;
use crate::transport::{MessageSender, Reply};
use crate::update::{normalize_command, Inbound};

/// Number of coins listed by `/top10`.
const TOP_COUNT: u32 = 10;

/// Commands understood by the crypto bot.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum CryptoCommand {
    #[command(description = "Start the bot and get help")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Get price for a specific coin: /price <coin>")]
    Price(String),

    #[command(description = "Top 10 cryptocurrencies by market cap")]
    Top10,

    #[command(description = "Show trending coins")]
    Trending,

    #[command(description = "Show global market stats")]
    Global,
}

impl CryptoCommand {
    /// Parses lowercased message text. `/price` without an argument parses
    /// as `Price("")`.
    pub fn parse_text(text: &str) -> Option<Self> {
        let text = normalize_command(text).to_lowercase();
        match Self::parse(&text, "") {
            Ok(cmd) => Some(cmd),
            Err(_) if text == "/price" => Some(CryptoCommand::Price(String::new())),
            Err(_) => None,
        }
    }
}

const HELP_TEXT: &str = "Welcome to the Crypto Price Bot\\! 🚀\n\n\
    Available commands:\n\
    /price \\<coin\\> \\- Get price for a specific coin \\(e\\.g\\., /price bitcoin\\)\n\
    /top10 \\- Get top 10 cryptocurrencies by market cap\n\
    /trending \\- Show trending coins\n\
    /global \\- Show global market stats\n\
    /help \\- Show this help message";

const PRICE_USAGE: &str = "Usage: /price \\<coin\\> \\(e\\.g\\., /price bitcoin\\)";

/// Renders an optional USD amount with thousands separators.
fn usd(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${}", escape_markdown_v2(&format_number(v))),
        None => "N/A".to_string(),
    }
}

fn rank(value: Option<u32>) -> String {
    match value {
        Some(r) => format!("\\#{}", r),
        None => "N/A".to_string(),
    }
}

/// Green for flat or rising, red for falling.
fn change_icon(change: f64) -> &'static str {
    if change >= 0.0 {
        "🟢"
    } else {
        "🔴"
    }
}

fn percent(value: f64) -> String {
    format!("{}\\%", escape_markdown_v2(&format_fixed(value, 2)))
}

/// Formats the `/price` reply.
pub fn format_price(coin: &CoinDetail) -> String {
    let market = &coin.market_data;
    let change = market.price_change_percentage_24h.unwrap_or(0.0);
    format!(
        "💰 {} \\({}\\)\n\n\
         Current Price: {}\n\
         {} 24h Change: {}\n\
         📈 24h High: {}\n\
         📉 24h Low: {}\n\
         💎 Market Cap: {}\n\
         📊 Market Cap Rank: {}\n\
         💫 Volume: {}",
        escape_markdown_v2(&coin.name),
        escape_markdown_v2(&coin.symbol.to_uppercase()),
        usd(market.current_price.usd),
        change_icon(change),
        percent(change),
        usd(market.high_24h.usd),
        usd(market.low_24h.usd),
        usd(market.market_cap.usd),
        rank(coin.market_cap_rank),
        usd(market.total_volume.usd),
    )
}

/// Formats the `/top10` reply.
pub fn format_top(coins: &[MarketCoin]) -> String {
    let mut message = String::from("📊 *Top 10 Cryptocurrencies*\n\n");
    for (index, coin) in coins.iter().enumerate() {
        let change = coin.price_change_percentage_24h.unwrap_or(0.0);
        message.push_str(&format!(
            "{}\\. {} \\({}\\)\n\
             💵 Price: {}\n\
             {} 24h: {}\n\
             💎 Market Cap: {}\n\
             📊 Volume: {}\n\n",
            index + 1,
            escape_markdown_v2(&coin.name),
            escape_markdown_v2(&coin.symbol.to_uppercase()),
            usd(coin.current_price),
            change_icon(change),
            percent(change),
            usd(coin.market_cap),
            usd(coin.total_volume),
        ));
    }
    message
}

/// Formats the `/trending` reply.
pub fn format_trending(coins: &[TrendingCoin]) -> String {
    let mut message = String::from("🔥 *Trending Cryptocurrencies*\n\n");
    for (index, coin) in coins.iter().enumerate() {
        let price = coin
            .price_btc
            .map(|p| escape_markdown_v2(&format_fixed(p, 8)))
            .unwrap_or_else(|| "N/A".to_string());
        message.push_str(&format!(
            "{}\\. {} \\({}\\)\n\
             Market Cap Rank: {}\n\
             Price BTC: {}\n\n",
            index + 1,
            escape_markdown_v2(&coin.name),
            escape_markdown_v2(&coin.symbol.to_uppercase()),
            rank(coin.market_cap_rank),
            price,
        ));
    }
    message
}

/// Formats the `/global` reply.
pub fn format_global(stats: &GlobalStats) -> String {
    let dominance = stats
        .market_cap_percentage
        .btc
        .map(percent)
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "🌍 *Global Crypto Market Stats*\n\n\
         Total Market Cap: {}\n\
         24h Volume: {}\n\
         BTC Dominance: {}\n\
         Active Cryptocurrencies: {}\n\
         Markets: {}",
        usd(stats.total_market_cap.usd),
        usd(stats.total_volume.usd),
        dominance,
        stats.active_cryptocurrencies,
        stats.markets,
    )
}

/// Stateless command dispatcher for the crypto bot.
pub struct CryptoDispatcher {
    api: CoinGeckoClient,
    sender: Arc<dyn MessageSender>,
}

impl CryptoDispatcher {
    pub fn new(api: CoinGeckoClient, sender: Arc<dyn MessageSender>) -> Self {
        Self { api, sender }
    }

    /// Maps message text to a reply; `None` means the text is ignored.
    pub async fn dispatch(&self, text: &str) -> Option<Reply> {
        let reply = match CryptoCommand::parse_text(text)? {
            CryptoCommand::Start | CryptoCommand::Help => HELP_TEXT.to_string(),
            CryptoCommand::Price(args) => match args.split_whitespace().next() {
                Some(coin) => self.price(coin).await,
                None => PRICE_USAGE.to_string(),
            },
            CryptoCommand::Top10 => match self.api.top_markets(TOP_COUNT).await {
                Ok(coins) => format_top(&coins),
                Err(e) => {
                    warn!(error = %e, "Failed to fetch top coins");
                    "❌ Failed to fetch top 10 cryptocurrencies\\. Please try again later\\.".into()
                }
            },
            CryptoCommand::Trending => match self.api.trending().await {
                Ok(coins) => format_trending(&coins),
                Err(e) => {
                    warn!(error = %e, "Failed to fetch trending coins");
                    "❌ Failed to fetch trending coins\\. Please try again later\\.".into()
                }
            },
            CryptoCommand::Global => match self.api.global().await {
                Ok(stats) => format_global(&stats),
                Err(e) => {
                    warn!(error = %e, "Failed to fetch global stats");
                    "❌ Failed to fetch global market stats\\. Please try again later\\.".into()
                }
            },
        };
        Some(Reply::markdown(reply))
    }

    /// Searches for `coin`, then fetches the best hit's market data.
    async fn price(&self, coin: &str) -> String {
        let result = async {
            let hits = self.api.search(coin).await?;
            match hits.first() {
                Some(hit) => self.api.coin(&hit.id).await.map(Some),
                None => Ok(None),
            }
        }
        .await;

        match result {
            Ok(Some(detail)) => format_price(&detail),
            Ok(None) => format!(
                "❌ Could not find cryptocurrency: {}",
                escape_markdown_v2(coin)
            ),
            Err(e) => {
                warn!(coin, error = %e, "Failed to fetch coin price");
                format!(
                    "❌ Failed to fetch price for {}\\. Please try again later\\.",
                    escape_markdown_v2(coin)
                )
            }
        }
    }
}

#[async_trait]
impl UpdateHandler for CryptoDispatcher {
    fn name(&self) -> &'static str {
        "crypto"
    }

    async fn handle(&self, inbound: Inbound) -> Result<()> {
        let Inbound::Text { chat, text } = inbound else {
            return Ok(());
        };
        match self.dispatch(&text).await {
            Some(reply) => self.sender.send_reply(chat, reply).await,
            None => {
                debug!(chat_id = %chat, "Ignoring non-command text");
                Ok(())
            }
        }
    }
}
