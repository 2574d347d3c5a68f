//src/duration.rs
use once_cell::sync::Lazy;
use regex::Regex;

// ASCII digits only; `\d` in the regex crate also matches other Unicode digits.
static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)\s*[hH]").unwrap());
static MINUTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)\s*[mM]").unwrap());

/// Converts free-text duration ("1h 30m", "45 min", "90") into whole minutes.
///
/// The hour and minute patterns are searched independently; a bare number is
/// only taken as minutes when neither pattern matched. Anything else
/// degrades to 0.
pub fn parse_duration_to_minutes(input: Option<&str>) -> u64 {
    let Some(input) = input.filter(|s| !s.is_empty()) else {
        return 0;
    };

    let hours = first_number(&HOURS_RE, input);
    let minutes = first_number(&MINUTES_RE, input);

    if hours.is_none() && minutes.is_none() {
        let trimmed = input.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return parse_saturating(trimmed);
        }
    }

    hours
        .unwrap_or(0)
        .saturating_mul(60)
        .saturating_add(minutes.unwrap_or(0))
}

fn first_number(re: &Regex, input: &str) -> Option<u64> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| parse_saturating(m.as_str()))
}

// Digit runs longer than u64 clamp to the max instead of failing.
fn parse_saturating(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}

/// Formats a (possibly fractional) minute count as "1h 30m", "45m", "2h".
/// Zero and NaN render as "N/A".
pub fn format_minutes_to_time(total_minutes: f64) -> String {
    if total_minutes.is_nan() || total_minutes == 0.0 {
        return "N/A".to_string();
    }

    let hours = (total_minutes / 60.0).floor();
    let minutes = (total_minutes % 60.0).round();

    let mut parts = Vec::with_capacity(2);
    if hours > 0.0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0.0 {
        parts.push(format!("{minutes}m"));
    }

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}
