//! Upstream clients against wiremock-stubbed APIs.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hookbot_models::{CreateOrderRequest, OrderId};
use hookbot_upstream::{
    build_client, CoinGeckoClient, HttpOrderApi, OpenWeatherClient, OrderApi, UpstreamError,
};

fn client() -> reqwest::Client {
    build_client(Duration::from_secs(5)).unwrap()
}

fn base(server: &MockServer, suffix: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), suffix)).unwrap()
}

#[tokio::test]
async fn coingecko_search_then_detail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/search"))
        .and(query_param("query", "bitcoin"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "coins": [{"id": "bitcoin", "name": "Bitcoin", "symbol": "BTC"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/coins/bitcoin"))
        .and(query_param("market_data", "true"))
        .and(query_param("tickers", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "bitcoin",
            "name": "Bitcoin",
            "symbol": "btc",
            "market_cap_rank": 1,
            "market_data": {
                "current_price": {"usd": 64000.5},
                "price_change_percentage_24h": -1.25,
                "high_24h": {"usd": 65000},
                "low_24h": {"usd": 63000},
                "market_cap": {"usd": 1260000000000.0},
                "total_volume": {"usd": 30000000000.0}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gecko = CoinGeckoClient::new(client(), base(&server, "/api/v3"));
    let hits = gecko.search("bitcoin").await.unwrap();
    assert_eq!(hits[0].id, "bitcoin");

    let detail = gecko.coin(&hits[0].id).await.unwrap();
    assert_eq!(detail.market_cap_rank, Some(1));
    assert_eq!(detail.market_data.current_price.usd, Some(64000.5));
    assert_eq!(detail.market_data.price_change_percentage_24h, Some(-1.25));
}

#[tokio::test]
async fn coingecko_top_markets_and_global() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("per_page", "10"))
        .and(query_param("order", "market_cap_desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "bitcoin", "name": "Bitcoin", "symbol": "btc", "current_price": 64000,
             "price_change_percentage_24h": 2.5, "market_cap": 1, "total_volume": 2},
            {"id": "ethereum", "name": "Ethereum", "symbol": "eth", "current_price": 3000,
             "price_change_percentage_24h": null, "market_cap": 3, "total_volume": 4}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/global"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "total_market_cap": {"usd": 2500000000000.0, "eur": 1.0},
                "total_volume": {"usd": 90000000000.0},
                "market_cap_percentage": {"btc": 52.123, "eth": 17.0},
                "active_cryptocurrencies": 12000,
                "markets": 900
            }
        })))
        .mount(&server)
        .await;

    let gecko = CoinGeckoClient::new(client(), base(&server, ""));
    let top = gecko.top_markets(10).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[1].price_change_percentage_24h, None);

    let global = gecko.global().await.unwrap();
    assert_eq!(global.market_cap_percentage.btc, Some(52.123));
    assert_eq!(global.active_cryptocurrencies, 12000);
}

#[tokio::test]
async fn coingecko_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/trending"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let gecko = CoinGeckoClient::new(client(), base(&server, ""));
    let err = gecko.trending().await.unwrap_err();
    assert!(matches!(err, UpstreamError::Status { status: 429, .. }));
}

#[tokio::test]
async fn openweather_current_and_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Tehran"))
        .and(query_param("appid", "k3y"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Tehran",
            "main": {"temp": 298.15, "humidity": 15},
            "wind": {"speed": 4.1},
            "weather": [{"description": "clear sky"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "cod": "404", "message": "city not found"
        })))
        .mount(&server)
        .await;

    let weather = OpenWeatherClient::new(client(), base(&server, ""), "k3y", "en");
    let current = weather.current("Tehran").await.unwrap();
    assert!((current.celsius() - 25.0).abs() < 1e-9);
    assert_eq!(current.description(), Some("clear sky"));

    let err = weather.current("Atlantis").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn order_api_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/order"))
        .and(body_json(json!({
            "coupon": "SAVE10",
            "email": "ab@x.com",
            "password": "hunter22",
            "name": "John Doe"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"orderId": "O1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/order/O1/code"))
        .and(body_json(json!({"code": "123456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/order/O1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"email": "ab@x.com", "name": "John Doe", "orderId": "O1", "status": "active"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpOrderApi::new(client(), base(&server, "/"));
    let request = CreateOrderRequest {
        coupon: "SAVE10".into(),
        email: "ab@x.com".into(),
        password: "hunter22".into(),
        name: "John Doe".into(),
    };

    let order = api.create_order(&request).await.unwrap();
    assert_eq!(order, OrderId::from("O1"));

    api.submit_code(&order, "123456").await.unwrap();

    let status = api.get_order_status(&order).await.unwrap();
    assert_eq!(status.status, "active");
    assert_eq!(status.name, "John Doe");
}

#[tokio::test]
async fn order_api_rejections() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/order/O1/code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/order/O1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let api = HttpOrderApi::new(client(), base(&server, ""));
    let request = CreateOrderRequest {
        coupon: "BAD".into(),
        email: "a@b.c".into(),
        password: "p".into(),
        name: "N".into(),
    };

    assert!(matches!(
        api.create_order(&request).await,
        Err(UpstreamError::Rejected("create-order"))
    ));
    assert!(matches!(
        api.submit_code(&OrderId::from("O1"), "000000").await,
        Err(UpstreamError::Rejected("submit-code"))
    ));
    assert!(matches!(
        api.get_order_status(&OrderId::from("O1")).await,
        Err(UpstreamError::Status { status: 500, .. })
    ));
}
