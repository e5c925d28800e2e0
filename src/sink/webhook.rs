use log::{error, warn};
use serde::Serialize;

use super::AlertSink;
use crate::engine::alert::AlertEvent;

/// Wire shape expected by the n8n notification pipeline.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    symbol: &'a str,
    price: f64,
    ts: i64,
    source: &'a str,
    rule: String,
    #[serde(rename = "changePct")]
    change_pct: f64,
    severity: &'a str,
}

impl<'a> WebhookPayload<'a> {
    fn from_event(event: &'a AlertEvent, source: &'a str) -> Self {
        Self {
            symbol: &event.symbol,
            price: event.price,
            ts: event.ts,
            source,
            rule: event.rule.label(),
            change_pct: event.change_pct,
            severity: event.severity.as_str(),
        }
    }
}

/// Delivers alerts as JSON POSTs to the configured webhook. Each delivery
/// is spawned fire-and-forget; failures are logged and never retried.
pub struct WebhookSink {
    client: reqwest::Client,
    url: Option<String>,
    header: Option<(String, String)>,
    source: &'static str,
}

impl WebhookSink {
    pub fn new(url: Option<String>, header: Option<(String, String)>, sim: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            header,
            source: if sim { "sim" } else { "finnhub" },
        }
    }
}

impl AlertSink for WebhookSink {
    fn deliver(&self, event: AlertEvent) {
        let Some(url) = self.url.clone() else {
            warn!(
                "webhook URL not configured (N8N_WEBHOOK_URL_TEST/PROD), dropping alert for {}",
                event.symbol
            );
            return;
        };

        let client = self.client.clone();
        let header = self.header.clone();
        let source = self.source;

        tokio::spawn(async move {
            let payload = WebhookPayload::from_event(&event, source);
            let mut req = client.post(&url).json(&payload);
            if let Some((key, value)) = header.as_ref() {
                req = req.header(key.as_str(), value.as_str());
            }
            match req.send().await {
                Ok(res) if !res.status().is_success() => {
                    let status = res.status();
                    let body = res.text().await.unwrap_or_default();
                    error!("webhook responded {}: {}", status, body);
                }
                Ok(_) => {}
                Err(e) => error!("webhook send failed: {}", e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::alert::{Rule, Severity};
    use crate::engine::store::Breakout;

    #[test]
    fn payload_matches_pipeline_shape() {
        let event = AlertEvent {
            symbol: "AAPL".to_string(),
            price: 103.0,
            ts: 1_700_000_000_000,
            rule: Rule {
                breakout: Some(Breakout::Hod),
                swing: true,
                momentum: false,
            },
            change_pct: 3.0,
            severity: Severity::Normal,
        };

        let json =
            serde_json::to_value(WebhookPayload::from_event(&event, "finnhub")).unwrap();
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["price"], 103.0);
        assert_eq!(json["ts"], 1_700_000_000_000i64);
        assert_eq!(json["source"], "finnhub");
        assert_eq!(json["rule"], "breakout_HOD+swing");
        assert_eq!(json["changePct"], 3.0);
        assert_eq!(json["severity"], "normal");
    }
}
