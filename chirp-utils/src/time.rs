use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Return the current unix timestamp in seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

/// Unix timestamp `seconds` from `now`. `None` when the result does not
/// fit the signed 64-bit column it is stored in.
pub fn expiry_after(now: u64, seconds: u64) -> Option<u64> {
    now.checked_add(seconds)
        .filter(|at| i64::try_from(*at).is_ok())
}

/// Time left until `deadline`; zero once it has passed.
pub fn delay_until(now: u64, deadline: u64) -> Duration {
    Duration::from_secs(deadline.saturating_sub(now))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{delay_until, expiry_after, now_unix_secs};
    use crate::parse::parse_duration_seconds;

    #[test]
    fn expiries_must_fit_storage() {
        assert_eq!(expiry_after(100, 30), Some(130));
        assert_eq!(expiry_after(u64::MAX - 1, 30), None);
        assert_eq!(expiry_after(0, i64::MAX as u64), Some(i64::MAX as u64));
        assert_eq!(expiry_after(1, i64::MAX as u64), None);

        let huge = parse_duration_seconds("200000000000000d").unwrap();
        assert_eq!(expiry_after(now_unix_secs(), huge), None);
        let week = parse_duration_seconds("7d").unwrap();
        assert!(expiry_after(now_unix_secs(), week).is_some());
    }

    #[test]
    fn deadlines_saturate() {
        assert_eq!(delay_until(100, 160), Duration::from_secs(60));
        assert_eq!(delay_until(200, 160), Duration::ZERO);
    }
}
