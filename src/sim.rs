use log::info;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

use crate::engine::store::Tick;

/// Simulated tick source for testing outside market hours: one tick per
/// symbol per second, random walk of about ±0.1% with occasional 2-5%
/// spikes to exercise the alert rules.
pub async fn run(symbols: &[String], sender: mpsc::Sender<Tick>) {
    info!("SIM MODE ON: generating ticks...");

    let mut prices: Vec<(String, f64)> = {
        let mut rng = rand::thread_rng();
        symbols
            .iter()
            .map(|s| (s.clone(), 100.0 + rng.gen::<f64>() * 50.0))
            .collect()
    };

    let mut ticker = interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        let ts = chrono::Utc::now().timestamp_millis();

        // rng is not Send, so the batch is generated before any await
        let batch: Vec<Tick> = {
            let mut rng = rand::thread_rng();
            prices
                .iter_mut()
                .map(|(symbol, price)| {
                    let drift_pct = (rng.gen::<f64>() - 0.5) * 0.2;
                    *price *= 1.0 + drift_pct / 100.0;

                    if rng.gen::<f64>() < 0.05 {
                        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                        let spike_pct = sign * (2.0 + rng.gen::<f64>() * 3.0);
                        *price *= 1.0 + spike_pct / 100.0;
                    }

                    *price = (*price * 100.0).round() / 100.0;
                    Tick {
                        symbol: symbol.clone(),
                        ts,
                        price: *price,
                    }
                })
                .collect()
        };

        for tick in batch {
            if sender.send(tick).await.is_err() {
                return;
            }
        }
    }
}
