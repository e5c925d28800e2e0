use super::store::SymbolRecord;

/// Horizon of the momentum scan, counted back from the latest tick.
pub const MOMENTUM_HORIZON_MS: i64 = 60_000;
/// Minimum summed absolute per-step percent change within the horizon.
pub const MOMENTUM_MIN_SUM_PCT: f64 = 0.6;
/// Minimum net same-direction consecutive steps within the horizon.
pub const MOMENTUM_MIN_NET_STEPS: i32 = 3;

/// Percent change between the oldest and newest price retained in the
/// window, or `None` with fewer than two points.
pub fn delta_percent(rec: &SymbolRecord) -> Option<f64> {
    if rec.window.len() < 2 {
        return None;
    }
    let first = rec.window.front()?.price;
    let last = rec.window.back()?.price;
    Some((last - first) / first * 100.0)
}

/// Sustained short-horizon directional movement. Over the window entries
/// within [`MOMENTUM_HORIZON_MS`] of the latest tick, sums absolute
/// per-step percent changes and nets the step directions (flat steps
/// count zero). Both the activity sum and the net direction count must
/// clear their thresholds.
pub fn momentum_ok(rec: &SymbolRecord) -> bool {
    let latest = match rec.window.back() {
        Some(p) => p.ts,
        None => return false,
    };
    let cutoff = latest - MOMENTUM_HORIZON_MS;

    let mut sum = 0.0;
    let mut dir: i32 = 0;
    let mut prev: Option<f64> = None;
    for point in rec.window.iter().filter(|p| p.ts >= cutoff) {
        if let Some(prev_price) = prev {
            let d = point.price - prev_price;
            sum += (d / prev_price).abs() * 100.0;
            if d > 0.0 {
                dir += 1;
            } else if d < 0.0 {
                dir -= 1;
            }
        }
        prev = Some(point.price);
    }

    sum >= MOMENTUM_MIN_SUM_PCT && dir.abs() >= MOMENTUM_MIN_NET_STEPS
}
