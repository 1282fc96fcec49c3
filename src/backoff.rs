//! Exponential backoff with additive jitter.

use std::time::Duration;

use rand::Rng;

/// Jitter is drawn from `[0, delay * JITTER_RATIO)`.
const JITTER_RATIO: f64 = 0.1;

/// Delay before the attempt following failed attempt `attempt` (1-indexed),
/// without jitter: `min(base * 2^(attempt - 1), max)`.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp = (attempt - 1).min(31);
    base.saturating_mul(1u32 << exp).min(max)
}

/// Adds up to 10% of `delay` on top. Never shortens the delay.
pub fn with_jitter(delay: Duration) -> Duration {
    let factor = rand::thread_rng().gen_range(0.0..JITTER_RATIO);
    delay.saturating_add(delay.mul_f64(factor))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{backoff_delay, with_jitter};

    const BASE: Duration = Duration::from_secs(1);
    const MAX: Duration = Duration::from_secs(5);

    #[test]
    fn doubles_per_attempt_until_ceiling() {
        assert_eq!(backoff_delay(1, BASE, MAX), Duration::from_secs(1));
        assert_eq!(backoff_delay(2, BASE, MAX), Duration::from_secs(2));
        assert_eq!(backoff_delay(3, BASE, MAX), Duration::from_secs(4));
        assert_eq!(backoff_delay(4, BASE, MAX), Duration::from_secs(5));
        assert_eq!(backoff_delay(40, BASE, MAX), Duration::from_secs(5));
    }

    #[test]
    fn attempt_zero_has_no_delay() {
        assert_eq!(backoff_delay(0, BASE, MAX), Duration::ZERO);
    }

    #[test]
    fn huge_exponents_saturate_instead_of_overflowing() {
        let delay = backoff_delay(u32::MAX, Duration::from_secs(u64::MAX / 2), Duration::MAX);
        assert_eq!(delay, Duration::MAX);
    }

    #[test]
    fn jitter_stays_within_ten_percent_above() {
        let delay = Duration::from_millis(2_000);
        for _ in 0..1_000 {
            let jittered = with_jitter(delay);
            assert!(jittered >= delay);
            assert!(jittered < delay.mul_f64(1.1));
        }
    }

    #[test]
    fn jitter_of_zero_delay_is_zero() {
        assert_eq!(with_jitter(Duration::ZERO), Duration::ZERO);
    }
}
