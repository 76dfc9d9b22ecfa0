//! Shared fixtures for the behaviour suites.
#![allow(dead_code)]

use std::sync::Arc;

use pricewatch_core::{
    ClientConfig, HistoryOrchestrator, HttpClient, LookupOrchestrator, ScriptedHttpClient,
    ScriptedReply,
};
use serde_json::{json, Value};

pub const PRICE: &str = "/crypto/price";
pub const HISTORY: &str = "/crypto/history";

pub fn orchestrators(client: &ScriptedHttpClient) -> (LookupOrchestrator, HistoryOrchestrator) {
    orchestrators_with(client, ClientConfig::default().with_api_key("test-key"))
}

pub fn orchestrators_with(
    client: &ScriptedHttpClient,
    config: ClientConfig,
) -> (LookupOrchestrator, HistoryOrchestrator) {
    let client: Arc<dyn HttpClient> = Arc::new(client.clone());
    let config = Arc::new(config);
    let history = HistoryOrchestrator::new(Arc::clone(&client), Arc::clone(&config));
    let lookup = LookupOrchestrator::new(client, config, history.clone());
    (lookup, history)
}

pub fn price_ok(asset: &str, price: f64, change_24h: f64) -> ScriptedReply {
    ScriptedReply::json(
        200,
        json!({
            "success": true,
            "data": { "cryptocurrency": asset, "price": price, "change24h": change_24h }
        }),
    )
}

pub fn history_ok(entries: Value) -> ScriptedReply {
    ScriptedReply::json(200, json!({ "success": true, "data": entries }))
}

pub fn two_entries() -> Value {
    json!([
        { "id": "h-2", "cryptocurrency": "ethereum", "price": 3000.0, "change24h": -1.2,
          "email": "a@b.com", "timestamp": "2024-05-02T08:00:00Z" },
        { "id": "h-1", "cryptocurrency": "bitcoin", "price": 50000.0, "change24h": 2.5,
          "email": "a@b.com", "timestamp": "2024-05-01T08:00:00Z" }
    ])
}
