//! CoinGecko API client.
//!
//! Covers the five public endpoints the crypto bot uses: coin search, coin
//! detail, top markets, trending search and global market statistics.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::http::{endpoint, read_json};

const SERVICE: &str = "CoinGecko";

/// A value quoted in US dollars. Other currencies are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct UsdQuote {
    #[serde(default)]
    pub usd: Option<f64>,
}

/// One hit of `/search`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

/// Market figures of `/coins/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub current_price: UsdQuote,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub high_24h: UsdQuote,
    #[serde(default)]
    pub low_24h: UsdQuote,
    #[serde(default)]
    pub market_cap: UsdQuote,
    #[serde(default)]
    pub total_volume: UsdQuote,
}

/// Response of `/coins/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub market_data: MarketData,
}

/// One row of `/coins/markets`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
}

/// One entry of `/search/trending`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendingCoin {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub price_btc: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    item: TrendingCoin,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<TrendingItem>,
}

/// Market-cap share by coin symbol; only bitcoin is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct MarketCapShare {
    #[serde(default)]
    pub btc: Option<f64>,
}

/// Payload of `/global`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GlobalStats {
    #[serde(default)]
    pub total_market_cap: UsdQuote,
    #[serde(default)]
    pub total_volume: UsdQuote,
    #[serde(default)]
    pub market_cap_percentage: MarketCapShare,
    #[serde(default)]
    pub active_cryptocurrencies: u64,
    #[serde(default)]
    pub markets: u64,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalStats,
}

/// CoinGecko API client.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CoinGeckoClient {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Searches coins by name or symbol, best match first.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchCoin>> {
        let url = endpoint(&self.base_url, &["search"])?;
        let response = self.client.get(url).query(&[("query", query)]).send().await?;
        let body: SearchResponse = read_json(SERVICE, response).await?;
        debug!(query, hits = body.coins.len(), "CoinGecko search");
        Ok(body.coins)
    }

    /// Fetches market data for the coin with CoinGecko id `id`.
    pub async fn coin(&self, id: &str) -> Result<CoinDetail> {
        let url = endpoint(&self.base_url, &["coins", id])?;
        let response = self
            .client
            .get(url)
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "true"),
                ("community_data", "false"),
                ("developer_data", "false"),
            ])
            .send()
            .await?;
        read_json(SERVICE, response).await
    }

    /// Fetches the `limit` largest coins by market cap, priced in USD.
    pub async fn top_markets(&self, limit: u32) -> Result<Vec<MarketCoin>> {
        let url = endpoint(&self.base_url, &["coins", "markets"])?;
        let per_page = limit.to_string();
        let response = self
            .client
            .get(url)
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
            ])
            .send()
            .await?;
        read_json(SERVICE, response).await
    }

    /// Fetches the currently trending coins.
    pub async fn trending(&self) -> Result<Vec<TrendingCoin>> {
        let url = endpoint(&self.base_url, &["search", "trending"])?;
        let response = self.client.get(url).send().await?;
        let body: TrendingResponse = read_json(SERVICE, response).await?;
        Ok(body.coins.into_iter().map(|entry| entry.item).collect())
    }

    /// Fetches global market statistics.
    pub async fn global(&self) -> Result<GlobalStats> {
        let url = endpoint(&self.base_url, &["global"])?;
        let response = self.client.get(url).send().await?;
        let body: GlobalResponse = read_json(SERVICE, response).await?;
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_detail_with_nulls() {
        let json = r#"{
            "id": "newcoin",
            "name": "New Coin",
            "symbol": "new",
            "market_cap_rank": null,
            "market_data": {
                "current_price": {"usd": 0.5, "eur": 0.4},
                "price_change_percentage_24h": null,
                "high_24h": {},
                "low_24h": {"usd": null}
            }
        }"#;
        let detail: CoinDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.market_data.current_price.usd, Some(0.5));
        assert_eq!(detail.market_data.price_change_percentage_24h, None);
        assert_eq!(detail.market_data.high_24h.usd, None);
        assert_eq!(detail.market_data.market_cap, UsdQuote::default());
        assert_eq!(detail.market_cap_rank, None);
    }

    #[test]
    fn test_trending_unwraps_items() {
        let json = r#"{"coins":[{"item":{"id":"pepe","name":"Pepe","symbol":"PEPE","market_cap_rank":40,"price_btc":1.5e-10}}]}"#;
        let body: TrendingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.coins[0].item.name, "Pepe");
        assert_eq!(body.coins[0].item.market_cap_rank, Some(40));
    }
}
