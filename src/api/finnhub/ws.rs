use futures_util::{SinkExt, StreamExt};
use log::{error, info};
use rand::Rng;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::engine::store::Tick;
use crate::error::StockWatchError;

const FINNHUB_WS_URL: &str = "wss://ws.finnhub.io";

#[derive(Debug, Deserialize)]
struct StreamMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Vec<TradeData>,
}

#[derive(Debug, Deserialize)]
struct TradeData {
    s: String, // symbol
    p: f64,    // last price
    t: Option<i64>, // trade time, epoch ms
}

/// Streams trade ticks from Finnhub into the engine channel, reconnecting
/// with a 2-5s random backoff whenever the connection drops. Returns only
/// once the receiving side has gone away.
pub async fn run(token: &str, symbols: &[String], sender: mpsc::Sender<Tick>) {
    loop {
        if let Err(e) = connect_and_stream(token, symbols, &sender).await {
            error!("Finnhub stream error: {}", e);
        }
        if sender.is_closed() {
            return;
        }
        let backoff = Duration::from_millis(2_000 + rand::thread_rng().gen_range(0..3_000));
        info!("reconnecting to Finnhub in {:?}", backoff);
        sleep(backoff).await;
    }
}

async fn connect_and_stream(
    token: &str,
    symbols: &[String],
    sender: &mpsc::Sender<Tick>,
) -> Result<(), StockWatchError> {
    let url = format!("{}?token={}", FINNHUB_WS_URL, token);
    let (mut ws_stream, _) = connect_async(&url).await?;
    info!("Finnhub WS connected → {}", symbols.join(", "));

    for symbol in symbols {
        let sub = serde_json::json!({ "type": "subscribe", "symbol": symbol });
        ws_stream.send(Message::Text(sub.to_string())).await?;
    }

    while let Some(message) = ws_stream.next().await {
        match message? {
            Message::Text(text) => {
                for tick in parse_trade_frame(&text) {
                    if sender.send(tick).await.is_err() {
                        return Ok(());
                    }
                }
            }
            Message::Close(_) => {
                info!("Finnhub WS closed by server");
                break;
            }
            // pings are answered by tungstenite itself
            _ => {}
        }
    }
    Ok(())
}

/// Extracts ticks from one text frame. Non-trade frames (subscription
/// acks, pings) and malformed payloads yield nothing; trades without a
/// timestamp get the receive time.
fn parse_trade_frame(text: &str) -> Vec<Tick> {
    let msg: StreamMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(_) => return Vec::new(),
    };
    if msg.kind != "trade" {
        return Vec::new();
    }
    msg.data
        .into_iter()
        .map(|trade| Tick {
            symbol: trade.s,
            ts: trade
                .t
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
            price: trade.p,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trade_frame() {
        let frame = r#"{"type":"trade","data":[
            {"s":"AAPL","p":191.25,"t":1700000000000,"v":12},
            {"s":"TSLA","p":240.10,"t":1700000000500,"v":5}
        ]}"#;
        let ticks = parse_trade_frame(frame);
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].symbol, "AAPL");
        assert_eq!(ticks[0].price, 191.25);
        assert_eq!(ticks[0].ts, 1_700_000_000_000);
    }

    #[test]
    fn missing_timestamp_gets_receive_time() {
        let before = chrono::Utc::now().timestamp_millis();
        let ticks = parse_trade_frame(r#"{"type":"trade","data":[{"s":"SPY","p":450.0}]}"#);
        assert_eq!(ticks.len(), 1);
        assert!(ticks[0].ts >= before);
    }

    #[test]
    fn ignores_non_trade_frames() {
        assert!(parse_trade_frame(r#"{"type":"ping"}"#).is_empty());
        assert!(parse_trade_frame("not json at all").is_empty());
        // trade frame with a malformed entry is dropped whole
        assert!(parse_trade_frame(r#"{"type":"trade","data":[{"s":"AAPL"}]}"#).is_empty());
    }
}
