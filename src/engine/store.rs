use std::collections::{HashMap, VecDeque};

/// One observed trade for a symbol at a point in time.
#[derive(Debug, Clone)]
pub struct Tick {
    pub symbol: String,
    /// Epoch milliseconds.
    pub ts: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PricePoint {
    pub ts: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakout {
    Hod,
    Lod,
}

#[derive(Debug, Clone, Copy)]
pub struct LastAlert {
    pub pct: f64,
    pub ts: i64,
}

/// Per-symbol mutable state: sliding price window, running day extrema,
/// and alert bookkeeping. Created lazily on first tick, lives for the
/// process lifetime.
#[derive(Debug)]
pub struct SymbolRecord {
    pub window: VecDeque<PricePoint>,
    pub high_of_day: f64,
    pub low_of_day: f64,
    pub last_alert: Option<LastAlert>,
    pub cooldown_until: i64,
}

impl SymbolRecord {
    fn new(price: f64) -> Self {
        Self {
            window: VecDeque::new(),
            high_of_day: price,
            low_of_day: price,
            last_alert: None,
            cooldown_until: 0,
        }
    }
}

/// Owns every tracked symbol's record. Constructed empty at startup and
/// passed into the engine; no global state.
#[derive(Debug)]
pub struct SymbolStore {
    window_ms: i64,
    records: HashMap<String, SymbolRecord>,
}

impl SymbolStore {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            records: HashMap::new(),
        }
    }

    /// Appends the tick to the symbol's window, evicts entries older than
    /// the window cutoff, and widens the day extrema.
    ///
    /// Returns whether the price was a new extreme, compared against the
    /// extrema as they stood before this tick. The first tick of a symbol
    /// seeds both extrema and is not a breakout.
    pub fn record_tick(&mut self, tick: &Tick) -> Option<Breakout> {
        let rec = self
            .records
            .entry(tick.symbol.clone())
            .or_insert_with(|| SymbolRecord::new(tick.price));

        let breakout = if tick.price > rec.high_of_day {
            Some(Breakout::Hod)
        } else if tick.price < rec.low_of_day {
            Some(Breakout::Lod)
        } else {
            None
        };

        rec.window.push_back(PricePoint {
            ts: tick.ts,
            price: tick.price,
        });

        // Cutoff derives from the tick just inserted, not from arrival
        // order. If timestamps regress the window may briefly hold entries
        // older than the cutoff of a later tick; accepted.
        let cutoff = tick.ts - self.window_ms;
        while rec.window.front().map_or(false, |p| p.ts < cutoff) {
            rec.window.pop_front();
        }

        if tick.price > rec.high_of_day {
            rec.high_of_day = tick.price;
        }
        if tick.price < rec.low_of_day {
            rec.low_of_day = tick.price;
        }

        breakout
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolRecord> {
        self.records.get(symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut SymbolRecord> {
        self.records.get_mut(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(symbol: &str, ts: i64, price: f64) -> Tick {
        Tick {
            symbol: symbol.to_string(),
            ts,
            price,
        }
    }

    #[test]
    fn first_tick_creates_record_seeded_with_price() {
        let mut store = SymbolStore::new(600_000);
        assert!(store.get("AAPL").is_none());

        let breakout = store.record_tick(&tick("AAPL", 0, 100.0));
        assert_eq!(breakout, None);

        let rec = store.get("AAPL").unwrap();
        assert_eq!(rec.window.len(), 1);
        assert_eq!(rec.high_of_day, 100.0);
        assert_eq!(rec.low_of_day, 100.0);
        assert!(rec.last_alert.is_none());
        assert_eq!(rec.cooldown_until, 0);
    }

    #[test]
    fn window_evicts_entries_older_than_cutoff() {
        let mut store = SymbolStore::new(600_000);
        store.record_tick(&tick("AAPL", 0, 100.0));
        store.record_tick(&tick("AAPL", 300_000, 101.0));
        store.record_tick(&tick("AAPL", 650_000, 102.0));

        let rec = store.get("AAPL").unwrap();
        // t=0 fell outside 650_000 - 600_000
        assert_eq!(rec.window.len(), 2);
        let latest = rec.window.back().unwrap().ts;
        assert!(rec.window.iter().all(|p| p.ts >= latest - 600_000));
    }

    #[test]
    fn extrema_widen_monotonically() {
        let mut store = SymbolStore::new(600_000);
        let prices = [100.0, 104.0, 98.0, 101.0, 97.5, 105.0];
        let mut prev_high = f64::MIN;
        let mut prev_low = f64::MAX;
        for (i, p) in prices.iter().enumerate() {
            store.record_tick(&tick("TSLA", i as i64 * 1_000, *p));
            let rec = store.get("TSLA").unwrap();
            assert!(rec.high_of_day >= prev_high || prev_high == f64::MIN);
            assert!(rec.low_of_day <= prev_low || prev_low == f64::MAX);
            prev_high = rec.high_of_day;
            prev_low = rec.low_of_day;
        }
        let rec = store.get("TSLA").unwrap();
        assert_eq!(rec.high_of_day, 105.0);
        assert_eq!(rec.low_of_day, 97.5);
    }

    #[test]
    fn breakout_fires_on_new_extreme_only() {
        let mut store = SymbolStore::new(600_000);
        assert_eq!(store.record_tick(&tick("SPY", 0, 100.0)), None);
        assert_eq!(
            store.record_tick(&tick("SPY", 1_000, 101.0)),
            Some(Breakout::Hod)
        );
        // inside the established range
        assert_eq!(store.record_tick(&tick("SPY", 2_000, 100.5)), None);
        assert_eq!(
            store.record_tick(&tick("SPY", 3_000, 99.0)),
            Some(Breakout::Lod)
        );
        // equal to the high is not a breakout
        assert_eq!(store.record_tick(&tick("SPY", 4_000, 101.0)), None);
    }

    #[test]
    fn out_of_order_timestamps_are_accepted() {
        let mut store = SymbolStore::new(600_000);
        store.record_tick(&tick("PLTR", 700_000, 100.0));
        // regressed timestamp: appended as-is, no eviction of itself
        store.record_tick(&tick("PLTR", 50_000, 101.0));
        let rec = store.get("PLTR").unwrap();
        assert_eq!(rec.window.len(), 2);
    }

    #[test]
    fn symbols_are_tracked_independently() {
        let mut store = SymbolStore::new(600_000);
        store.record_tick(&tick("AAPL", 0, 100.0));
        store.record_tick(&tick("TSLA", 0, 200.0));
        assert_eq!(store.get("AAPL").unwrap().high_of_day, 100.0);
        assert_eq!(store.get("TSLA").unwrap().high_of_day, 200.0);
    }
}
