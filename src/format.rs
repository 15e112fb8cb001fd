//! Human-readable rendering of sizes, speeds and ETAs for table output.

const UNIT: i64 = 1024;
const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];
const MAX_URL_LEN: usize = 80;

/// Formats a byte count using binary prefixes, e.g. `1.5 KiB`
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_size(bytes: Option<i64>) -> String {
    let Some(bytes) = bytes else {
        return String::from("N/A");
    };
    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}iB", bytes as f64 / div as f64, PREFIXES[exp])
}

/// Formats remaining seconds as `HH:MM:SS`, prefixed with the day count when non-zero
#[must_use]
pub fn format_eta(seconds: Option<i64>) -> String {
    let Some(seconds) = seconds else {
        return String::from("N/A");
    };

    let days = seconds / 86400;
    let hours = seconds % 86400 / 3600;
    let minutes = seconds % 3600 / 60;
    let seconds = seconds % 60;

    let mut res = String::new();
    if days > 0 {
        res.push_str(&format!("{days} days "));
    }
    res.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    res
}

/// Formats a speed in bytes per second, e.g. `9.8 KiB/s`
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn format_speed(bytes_per_second: Option<f64>) -> String {
    match bytes_per_second {
        Some(speed) => format!("{}/s", format_size(Some(speed as i64))),
        None => String::from("N/A"),
    }
}

/// Truncates a URL to the first 80 characters
#[must_use]
pub fn compress_url(url: &str) -> String {
    url.chars().take(MAX_URL_LEN).collect()
}
