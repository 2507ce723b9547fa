//! Upstream API clients for hookbot.
//!
//! Each bot talks to exactly one REST API:
//!
//! - [`CoinGeckoClient`]: coin search, prices, markets, trending and global stats
//! - [`OpenWeatherClient`]: current weather by city name
//! - [`HttpOrderApi`]: the order API behind the [`OrderApi`] trait
//!
//! All clients share a `reqwest::Client` built by [`build_client`], which sets
//! the request timeout, `Accept: application/json` and a user agent.

pub mod coingecko;
pub mod error;
pub mod http;
pub mod order;
pub mod weather;

pub use coingecko::{CoinDetail, CoinGeckoClient, GlobalStats, MarketCoin, SearchCoin, TrendingCoin};
pub use error::{Result, UpstreamError};
pub use http::{build_client, USER_AGENT};
pub use order::{HttpOrderApi, OrderApi};
pub use weather::{CurrentWeather, OpenWeatherClient};
