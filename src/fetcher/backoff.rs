use rand::Rng;
use std::time::Duration;

/// Exponential backoff with jitter for retriable fetch failures.
pub fn retry_delay(attempt: u32, base_delay_ms: u64) -> Duration {
    // Cap the exponent so repeated retries cannot overflow
    let capped_attempt = attempt.min(6);

    let base_delay = base_delay_ms.saturating_mul(2_u64.saturating_pow(capped_attempt));

    // ±30% jitter to avoid thundering herds in batch mode
    let jitter_factor = rand::thread_rng().gen_range(0.7..1.3);
    let delay_with_jitter = (base_delay as f64 * jitter_factor).round() as u64;

    Duration::from_millis(delay_with_jitter)
}
