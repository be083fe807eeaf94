use std::time::Duration;

/// Delay before retry number `retry_count` (0-indexed): `base * 2^n`.
///
/// Saturates instead of overflowing, so absurd retry counts cap out rather
/// than panic.
pub fn retry_delay(retry_count: u32, base: Duration) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(retry_count))
}
