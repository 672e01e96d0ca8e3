use chrono::{DateTime, Local, TimeZone, Utc};

/// Format a meeting time in the local timezone, e.g. "Sun Jun 01, 14:30"
pub fn format_meeting_time(time: DateTime<Utc>) -> String {
    format_in(time, &Local)
}

fn format_in<Tz: TimeZone>(time: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.with_timezone(tz).format("%a %b %d, %H:%M").to_string()
}

/// Short relative description of `time` as seen from `now`
pub fn format_relative(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (time - now).num_minutes();
    match minutes {
        m if m < -1440 => format!("{}d ago", -m / 1440),
        m if m < -60 => format!("{}h ago", -m / 60),
        m if m < 0 => format!("{}m ago", -m),
        0 => "now".to_string(),
        m if m < 60 => format!("in {}m", m),
        m if m < 1440 => format!("in {}h", m / 60),
        m => format!("in {}d", m / 1440),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Parse comma-separated interest input into trimmed, non-empty names.
/// Duplicates (ignoring case) are dropped, keeping the first spelling.
pub fn parse_interests(input: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in input.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|existing| existing.eq_ignore_ascii_case(name)) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    #[test]
    fn test_format_in_timezone() {
        let time = Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 0).unwrap();
        assert_eq!(format_in(time, &Utc), "Sun Jun 01, 14:30");
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_in(time, &plus_two), "Sun Jun 01, 16:30");
    }

    #[test]
    fn test_format_relative() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format_relative(now, now), "now");
        assert_eq!(format_relative(now + Duration::minutes(15), now), "in 15m");
        assert_eq!(format_relative(now + Duration::hours(3), now), "in 3h");
        assert_eq!(format_relative(now + Duration::days(2), now), "in 2d");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative(now - Duration::hours(2), now), "2h ago");
        assert_eq!(format_relative(now - Duration::days(3), now), "3d ago");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Café au lait", 7), "Café...");
    }

    #[test]
    fn test_parse_interests() {
        assert_eq!(
            parse_interests(" Rust, tokio ,,rust, Django "),
            vec!["Rust", "tokio", "Django"]
        );
        assert!(parse_interests("").is_empty());
        assert!(parse_interests(" , ,").is_empty());
    }
}
