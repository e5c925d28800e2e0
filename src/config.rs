use chrono::NaiveTime;
use std::env;
use std::str::FromStr;

use crate::error::StockWatchError;

/// Which configured webhook endpoint receives alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEnv {
    Test,
    Prod,
}

/// Environment-driven configuration, read once at startup and immutable
/// for the process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    pub watchlist: Vec<String>,
    pub window_min: u64,
    pub thresh_low: f64,
    pub thresh_high: f64,
    pub cooldown_min: u64,
    pub dedup_extra: f64,
    pub market_open: NaiveTime,
    pub market_close: NaiveTime,
    pub sim_mode: bool,
    pub ignore_market_hours: bool,
    pub finnhub_token: Option<String>,
    pub webhook_env: WebhookEnv,
    pub webhook_url_test: Option<String>,
    pub webhook_url_prod: Option<String>,
    pub webhook_header: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> Result<Self, StockWatchError> {
        let watchlist = parse_watchlist(&env_or("WATCHLIST", "AAPL,TSLA,PLTR,SPY"));
        let window_min = parse_num("WINDOW_MIN", &env_or("WINDOW_MIN", "10"))?;
        let thresh_low = parse_num("THRESHLOW", &env_or("THRESHLOW", "2"))?;
        let thresh_high = parse_num("THRESHHIGH", &env_or("THRESHHIGH", "4"))?;
        let cooldown_min = parse_num("COOLDOWN_MIN", &env_or("COOLDOWN_MIN", "5"))?;
        let dedup_extra = parse_num("DEDUP_EXTRA", &env_or("DEDUP_EXTRA", "0.5"))?;
        let market_open = parse_hhmm("MARKET_OPEN_CST", &env_or("MARKET_OPEN_CST", "08:30"))?;
        let market_close = parse_hhmm("MARKET_CLOSE_CST", &env_or("MARKET_CLOSE_CST", "15:00"))?;

        let webhook_env = match env_or("N8N_ENV", "TEST").trim().to_uppercase().as_str() {
            "PROD" => WebhookEnv::Prod,
            _ => WebhookEnv::Test,
        };

        let webhook_header = match (env::var("N8N_HEADER_KEY"), env::var("N8N_HEADER_VALUE")) {
            (Ok(key), Ok(value)) if !key.is_empty() && !value.is_empty() => Some((key, value)),
            _ => None,
        };

        Ok(Self {
            watchlist,
            window_min,
            thresh_low,
            thresh_high,
            cooldown_min,
            dedup_extra,
            market_open,
            market_close,
            sim_mode: truthy(env::var("SIM_MODE").ok().as_deref()),
            ignore_market_hours: truthy(env::var("IGNORE_MARKET_HOURS").ok().as_deref()),
            finnhub_token: env::var("FINNHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            webhook_env,
            webhook_url_test: env::var("N8N_WEBHOOK_URL_TEST").ok().filter(|u| !u.is_empty()),
            webhook_url_prod: env::var("N8N_WEBHOOK_URL_PROD").ok().filter(|u| !u.is_empty()),
            webhook_header,
        })
    }

    pub fn window_ms(&self) -> i64 {
        self.window_min as i64 * 60_000
    }

    pub fn cooldown_ms(&self) -> i64 {
        self.cooldown_min as i64 * 60_000
    }

    /// The webhook URL selected by `N8N_ENV`, if configured.
    pub fn webhook_url(&self) -> Option<&str> {
        match self.webhook_env {
            WebhookEnv::Test => self.webhook_url_test.as_deref(),
            WebhookEnv::Prod => self.webhook_url_prod.as_deref(),
        }
    }

    /// Simulated runs ignore market hours too, matching the flag.
    pub fn gate_bypassed(&self) -> bool {
        self.ignore_market_hours || self.sim_mode
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn parse_num<T: FromStr>(key: &str, value: &str) -> Result<T, StockWatchError> {
    value.trim().parse().map_err(|_| {
        StockWatchError::ConfigError(format!("{} is not a valid number: {:?}", key, value))
    })
}

fn parse_hhmm(key: &str, value: &str) -> Result<NaiveTime, StockWatchError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        StockWatchError::ConfigError(format!("{} is not a valid HH:MM time: {:?}", key, value))
    })
}

/// "1" or "true" (any case) means enabled.
fn truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1") | Some("true")
    )
}

fn parse_watchlist(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchlist_trims_uppercases_and_drops_empties() {
        assert_eq!(
            parse_watchlist(" aapl, TSLA ,,pltr"),
            vec!["AAPL", "TSLA", "PLTR"]
        );
    }

    #[test]
    fn hhmm_parses_market_times() {
        assert_eq!(
            parse_hhmm("MARKET_OPEN_CST", "08:30").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert!(parse_hhmm("MARKET_OPEN_CST", "8.30am").is_err());
    }

    #[test]
    fn numbers_parse_or_error_with_key() {
        let n: u64 = parse_num("WINDOW_MIN", "10").unwrap();
        assert_eq!(n, 10);
        let f: f64 = parse_num("DEDUP_EXTRA", "0.5").unwrap();
        assert_eq!(f, 0.5);

        let err = parse_num::<u64>("WINDOW_MIN", "ten").unwrap_err();
        assert!(err.to_string().contains("WINDOW_MIN"));
    }

    #[test]
    fn truthy_accepts_one_and_true() {
        assert!(truthy(Some("1")));
        assert!(truthy(Some("true")));
        assert!(truthy(Some("TRUE")));
        assert!(!truthy(Some("0")));
        assert!(!truthy(Some("yes")));
        assert!(!truthy(None));
    }
}
