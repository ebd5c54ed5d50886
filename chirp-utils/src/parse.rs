/// Parse a compact duration like `30s`, `10m`, `2h`, `7d`, `1d12h`, or plain seconds.
///
/// Segments add up; a bare number is only accepted on its own.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let bytes = compact.as_bytes();
    let mut cursor = 0;
    let mut total_seconds = 0_u64;
    let mut segments = 0_usize;
    let mut saw_bare_number = false;

    while cursor < bytes.len() {
        let number_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }

        if number_start == cursor {
            return None;
        }

        let number = compact[number_start..cursor].parse::<u64>().ok()?;
        segments += 1;

        let multiplier = match bytes.get(cursor) {
            Some(unit) => {
                cursor += 1;
                match unit.to_ascii_lowercase() {
                    b's' => 1_u64,
                    b'm' => 60,
                    b'h' => 60 * 60,
                    b'd' => 60 * 60 * 24,
                    b'w' => 60 * 60 * 24 * 7,
                    _ => return None,
                }
            }
            None => {
                saw_bare_number = true;
                1
            }
        };

        total_seconds = total_seconds.checked_add(number.checked_mul(multiplier)?)?;
    }

    if saw_bare_number && segments > 1 {
        return None;
    }

    (total_seconds > 0).then_some(total_seconds)
}

#[cfg(test)]
mod tests {
    use super::parse_duration_seconds;

    #[test]
    fn parses_single_unit_durations() {
        assert_eq!(parse_duration_seconds("30m"), Some(1_800));
        assert_eq!(parse_duration_seconds("7d"), Some(604_800));
        assert_eq!(parse_duration_seconds("2H"), Some(7_200));
        assert_eq!(parse_duration_seconds("1w"), Some(604_800));
        assert_eq!(parse_duration_seconds("45"), Some(45));
    }

    #[test]
    fn parses_combined_durations() {
        assert_eq!(parse_duration_seconds("1d12h"), Some(129_600));
        assert_eq!(parse_duration_seconds("1h 30m"), Some(5_400));
        assert_eq!(parse_duration_seconds("0d1m"), Some(60));
    }

    #[test]
    fn rejects_bad_durations() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("   "), None);
        assert_eq!(parse_duration_seconds("0m"), None);
        assert_eq!(parse_duration_seconds("abc"), None);
        assert_eq!(parse_duration_seconds("10x"), None);
        assert_eq!(parse_duration_seconds("1h30"), None);
        assert_eq!(parse_duration_seconds("m"), None);
        assert_eq!(parse_duration_seconds("99999999999999999999d"), None);
    }
}
