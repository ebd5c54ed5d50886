/// Text shown in place of a missing reason.
pub const NO_REASON: &str = "No reason provided";

/// Trim a reason, mapping blank input to `None`.
pub fn normalize_reason(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|reason| !reason.is_empty())
        .map(str::to_owned)
}

pub fn reason_or_default(reason: Option<&str>) -> &str {
    reason.filter(|r| !r.trim().is_empty()).unwrap_or(NO_REASON)
}

pub fn role_mention(role_id: u64) -> String {
    format!("<@&{role_id}>")
}

pub fn channel_mention(channel_id: u64) -> String {
    format!("<#{channel_id}>")
}

pub fn user_mention(user_id: u64) -> String {
    format!("<@{user_id}>")
}

/// Discord timestamp markup, e.g. `<t:1700000000:f>`.
pub fn discord_timestamp(unix_secs: u64, style: char) -> String {
    format!("<t:{unix_secs}:{style}>")
}

/// Cut `text` to at most `max_chars` characters, appending an ellipsis if cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}

/// Format seconds into a compact human-readable duration (e.g. 59s, 1m, 1h, 1d, 1h 30m).
pub fn format_compact_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        return if hours > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}d", days)
        };
    }

    if hours > 0 {
        let mut parts = vec![format!("{}h", hours)];
        if minutes > 0 {
            parts.push(format!("{}m", minutes));
        }
        if seconds > 0 {
            parts.push(format!("{}s", seconds));
        }
        return parts.join(" ");
    }

    if minutes > 0 {
        return if seconds > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}m", minutes)
        };
    }

    format!("{}s", seconds)
}

#[cfg(test)]
mod tests {
    use super::{
        discord_timestamp, format_compact_duration, normalize_reason, reason_or_default,
        role_mention, truncate_chars,
    };

    #[test]
    fn reasons_fall_back_when_blank() {
        assert_eq!(reason_or_default(None), "No reason provided");
        assert_eq!(reason_or_default(Some("   ")), "No reason provided");
        assert_eq!(reason_or_default(Some("spam")), "spam");
        assert_eq!(normalize_reason(Some("  spam ")), Some("spam".to_owned()));
        assert_eq!(normalize_reason(Some("")), None);
        assert_eq!(normalize_reason(None), None);
    }

    #[test]
    fn mentions_and_timestamps() {
        assert_eq!(role_mention(5), "<@&5>");
        assert_eq!(discord_timestamp(1_700_000_000, 'R'), "<t:1700000000:R>");
    }

    #[test]
    fn truncation_counts_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 4), "abc\u{2026}");
        assert_eq!(truncate_chars("äöüäöü", 3), "äö\u{2026}");
    }

    #[test]
    fn compact_duration_formatting() {
        assert_eq!(format_compact_duration(59), "59s");
        assert_eq!(format_compact_duration(60), "1m");
        assert_eq!(format_compact_duration(61), "1m 1s");
        assert_eq!(format_compact_duration(3600), "1h");
        assert_eq!(format_compact_duration(3670), "1h 1m 10s");
        assert_eq!(format_compact_duration(86400), "1d");
        assert_eq!(format_compact_duration(129_600), "1d 12h");
    }
}
