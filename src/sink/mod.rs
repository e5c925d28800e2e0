pub mod webhook;

use crate::engine::alert::AlertEvent;

/// One-way outlet for fired alerts. Delivery is best-effort: an
/// implementation must not propagate failure back into the engine.
pub trait AlertSink: Send + Sync {
    fn deliver(&self, event: AlertEvent);
}
