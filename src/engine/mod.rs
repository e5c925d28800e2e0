pub mod alert;
pub mod signal;
pub mod store;

use chrono::{DateTime, Local, NaiveTime};
use log::info;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::sink::AlertSink;
use alert::{AlertEvent, Rule, Severity};
use store::{Breakout, LastAlert, SymbolStore, Tick};

/// The per-symbol streaming analytics engine: owns the symbol store and
/// applies the breakout/swing/momentum decision rules with dedup and
/// cooldown on every tick.
pub struct Engine {
    store: SymbolStore,
    thresh_low: f64,
    thresh_high: f64,
    cooldown_ms: i64,
    dedup_extra: f64,
    market_open: NaiveTime,
    market_close: NaiveTime,
    gate_bypassed: bool,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        Self {
            store: SymbolStore::new(config.window_ms()),
            thresh_low: config.thresh_low,
            thresh_high: config.thresh_high,
            cooldown_ms: config.cooldown_ms(),
            dedup_extra: config.dedup_extra,
            market_open: config.market_open,
            market_close: config.market_close,
            gate_bypassed: config.gate_bypassed(),
        }
    }

    /// One full synchronous pass for a tick: window update, signal
    /// computation, alert decision. `now` is captured once by the caller
    /// and used for every time comparison in the pass.
    pub fn on_tick(&mut self, tick: &Tick, now: DateTime<Local>) -> Option<AlertEvent> {
        let breakout = self.store.record_tick(tick);
        self.evaluate(&tick.symbol, breakout, now)
    }

    fn within_market_hours(&self, now: DateTime<Local>) -> bool {
        if self.gate_bypassed {
            return true;
        }
        let t = now.time();
        t >= self.market_open && t <= self.market_close
    }

    fn evaluate(
        &mut self,
        symbol: &str,
        breakout: Option<Breakout>,
        now: DateTime<Local>,
    ) -> Option<AlertEvent> {
        if !self.within_market_hours(now) {
            return None;
        }

        let thresh_low = self.thresh_low;
        let thresh_high = self.thresh_high;
        let cooldown_ms = self.cooldown_ms;
        let dedup_extra = self.dedup_extra;

        let rec = self.store.get_mut(symbol)?;
        if rec.window.len() < 2 {
            return None;
        }

        let now_ms = now.timestamp_millis();
        if now_ms < rec.cooldown_until {
            return None;
        }

        let delta = signal::delta_percent(rec)?;
        let rule = Rule {
            breakout,
            swing: delta.abs() >= thresh_low,
            momentum: signal::momentum_ok(rec),
        };
        if !rule.is_active() {
            return None;
        }

        // Require the new move to beat the last alerted magnitude by the
        // dedup margin, even once the cooldown has elapsed.
        if let Some(last) = rec.last_alert {
            if delta.abs() < last.pct.abs() + dedup_extra {
                return None;
            }
        }

        let severity = if delta.abs() >= thresh_high {
            Severity::Urgent
        } else {
            Severity::Normal
        };

        rec.last_alert = Some(LastAlert {
            pct: delta,
            ts: now_ms,
        });
        rec.cooldown_until = now_ms + cooldown_ms;
        let price = rec.window.back()?.price;

        Some(AlertEvent {
            symbol: symbol.to_string(),
            price,
            ts: now_ms,
            rule,
            change_pct: (delta * 100.0).round() / 100.0,
            severity,
        })
    }
}

/// Drives the engine from a tick channel. Each tick is processed to
/// completion before the next is taken; sink dispatch is one-way and
/// never blocks the loop.
pub async fn run<S: AlertSink>(mut engine: Engine, mut ticks: mpsc::Receiver<Tick>, sink: S) {
    while let Some(tick) = ticks.recv().await {
        let now = Local::now();
        if let Some(event) = engine.on_tick(&tick, now) {
            info!(
                "ALERT {} rule={} severity={} change={:.2}%",
                event.symbol,
                event.rule.label(),
                event.severity.as_str(),
                event.change_pct
            );
            sink.deliver(event);
        }
    }
}
