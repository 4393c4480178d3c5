use chrono::{DateTime, Utc};

const MI: f64 = 1024.0 * 1024.0;

/// Parses a CPU quantity (`250m`, `1500000n`, `12u`, `0.5`) into cores.
///
/// Returns `None` for anything that is not a finite, non-negative number so
/// callers can count the sample as zero instead of failing the batch.
pub fn parse_cpu(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let (number, divisor) = if let Some(n) = raw.strip_suffix('n') {
        (n, 1e9)
    } else if let Some(n) = raw.strip_suffix('u') {
        (n, 1e6)
    } else if let Some(n) = raw.strip_suffix('m') {
        (n, 1e3)
    } else {
        (raw, 1.0)
    };
    parse_non_negative(number).map(|v| v / divisor)
}

/// Parses a memory quantity (`1024Ki`, `256Mi`, `2Gi`, `1G`, bytes) into
/// mebibytes. A trailing `m` is millibytes.
pub fn parse_memory(raw: &str) -> Option<f64> {
    const BINARY: [(&str, f64); 6] = [
        ("Ki", 1.0 / 1024.0),
        ("Mi", 1.0),
        ("Gi", 1024.0),
        ("Ti", 1024.0 * 1024.0),
        ("Pi", 1024.0 * 1024.0 * 1024.0),
        ("Ei", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ];
    const DECIMAL: [(&str, f64); 7] = [
        ("m", 1e-3),
        ("k", 1e3),
        ("M", 1e6),
        ("G", 1e9),
        ("T", 1e12),
        ("P", 1e15),
        ("E", 1e18),
    ];

    let raw = raw.trim();
    for (suffix, factor) in BINARY {
        if let Some(n) = raw.strip_suffix(suffix) {
            return parse_non_negative(n).map(|v| v * factor);
        }
    }
    for (suffix, bytes) in DECIMAL {
        if let Some(n) = raw.strip_suffix(suffix) {
            return parse_non_negative(n).map(|v| v * bytes / MI);
        }
    }
    parse_non_negative(raw).map(|bytes| bytes / MI)
}

/// Renders cores as whole millicores, e.g. `0.25` -> `"250m"`.
pub fn format_cpu(cores: f64) -> String {
    format!("{}m", (cores * 1000.0).round() as i64)
}

/// Renders mebibytes rounded to the nearest whole unit, e.g. `"256Mi"`.
pub fn format_memory(mebibytes: f64) -> String {
    format!("{}Mi", mebibytes.round() as i64)
}

fn parse_non_negative(number: &str) -> Option<f64> {
    let value = number.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts).ok().map(|dt| dt.to_utc())
}

/// Age bucketed to the largest whole unit: `"3d"`, `"5h"`, `"0m"`.
pub fn age_between(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created).num_seconds().max(0);
    if secs >= 86_400 {
        format!("{}d", secs / 86_400)
    } else if secs >= 3_600 {
        format!("{}h", secs / 3_600)
    } else {
        format!("{}m", secs / 60)
    }
}

pub fn parse_age(creation_timestamp: Option<&str>, now: DateTime<Utc>) -> String {
    creation_timestamp
        .and_then(parse_timestamp)
        .map(|created| age_between(created, now))
        .unwrap_or_else(|| "0m".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn cpu_suffixes() {
        assert_eq!(parse_cpu("500000u"), Some(0.5));
        assert_eq!(parse_cpu("250m"), Some(0.25));
        assert_eq!(parse_cpu("1500000000n"), Some(1.5));
        assert_eq!(parse_cpu("2"), Some(2.0));
        assert_eq!(parse_cpu("0.1"), Some(0.1));
    }

    #[test]
    fn cpu_round_trips_through_millicores() {
        assert_eq!(format_cpu(parse_cpu("250m").unwrap()), "250m");
        assert_eq!(format_cpu(parse_cpu("12345678n").unwrap()), "12m");
    }

    #[test]
    fn malformed_quantities_are_rejected() {
        assert_eq!(parse_cpu("abcm"), None);
        assert_eq!(parse_cpu(""), None);
        assert_eq!(parse_cpu("-5m"), None);
        assert_eq!(parse_memory("lotsMi"), None);
        assert_eq!(parse_memory(""), None);
    }

    #[test]
    fn memory_suffixes() {
        assert_eq!(parse_memory("1024Ki"), Some(1.0));
        assert_eq!(parse_memory("256Mi"), Some(256.0));
        assert_eq!(parse_memory("2Gi"), Some(2048.0));
        assert_eq!(parse_memory("1Ti"), Some(1_048_576.0));
        assert_eq!(parse_memory("1048576"), Some(1.0));
        assert_eq!(parse_memory("1048576k"), Some(1000.0));
        assert_eq!(parse_memory("1Pi"), Some(1_073_741_824.0));
        assert_eq!(parse_memory("1Ei"), Some(1_099_511_627_776.0));
    }

    #[test]
    fn memory_large_decimal_and_milli_suffixes() {
        assert_eq!(parse_memory("1P").map(format_memory).as_deref(), Some("953674316Mi"));
        assert_eq!(parse_memory("1E").map(format_memory).as_deref(), Some("953674316406Mi"));
        assert_eq!(parse_memory("2097152000m").map(format_memory).as_deref(), Some("2Mi"));
        assert_eq!(parse_memory("oopsm"), None);
    }

    #[test]
    fn memory_formatting_rounds() {
        assert_eq!(format_memory(2048.0), "2048Mi");
        assert_eq!(format_memory(12.6), "13Mi");
        assert_eq!(format_memory(0.0), "0Mi");
    }

    #[test]
    fn age_uses_largest_nonzero_unit() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(age_between(now - Duration::days(3) - Duration::hours(5), now), "3d");
        assert_eq!(age_between(now - Duration::hours(5) - Duration::minutes(9), now), "5h");
        assert_eq!(age_between(now - Duration::minutes(42), now), "42m");
        assert_eq!(age_between(now - Duration::seconds(20), now), "0m");
    }

    #[test]
    fn age_clamps_future_and_missing_timestamps() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(age_between(now + Duration::hours(1), now), "0m");
        assert_eq!(parse_age(None, now), "0m");
        assert_eq!(parse_age(Some("not a time"), now), "0m");
        assert_eq!(parse_age(Some("2026-03-09T12:00:00Z"), now), "1d");
    }
}
