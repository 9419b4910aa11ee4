use std::time::{Duration, Instant};

/// Human-readable duration with automatic unit scaling (`1.94ms`, `2.34s`).
pub fn fmt_duration(d: Duration) -> String {
    format!("{d:.2?}")
}

/// Warn when more than `threshold` has passed since `start`.
///
/// `target` names what was slow, e.g. the URL being fetched.
pub fn log_if_slow(start: Instant, threshold: Duration, target: &str) {
    let elapsed = start.elapsed();
    if elapsed > threshold {
        tracing::warn!(
            duration = fmt_duration(elapsed),
            threshold = fmt_duration(threshold),
            target_name = target,
            "Slow operation"
        );
    }
}
