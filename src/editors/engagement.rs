//! Engagement counters: free-form count parsing, K/M display, presets

use crate::store::EngagementPatch;

/// Parse a display count such as `15.3K`, `1,234` or `2M`.
///
/// Thousands separators are dropped and the leading decimal number is scaled
/// by 1,000 when the text mentions `k`, otherwise by 1,000,000 when it
/// mentions `m`. The result is floored. Unparsable or negative input is 0.
pub fn parse_count(raw: &str) -> u64 {
    let clean = raw.replace(',', "").to_lowercase();
    let Some(number) = leading_float(&clean) else {
        return 0;
    };
    let scaled = if clean.contains('k') {
        number * 1_000.0
    } else if clean.contains('m') {
        number * 1_000_000.0
    } else {
        number
    };
    let floored = scaled.floor();
    if floored.is_nan() || floored <= 0.0 {
        0
    } else if floored >= u64::MAX as f64 {
        u64::MAX
    } else {
        floored as u64
    }
}

/// Longest decimal prefix of `s` (after leading whitespace): sign, digits,
/// fraction and exponent, the way `parseFloat` reads it.
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && bytes[end] == b'e' {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

/// Compact display form: `999`, `1.5K`, `125K`, `2M`, `15.3M`.
///
/// One decimal rounded the way `toFixed(1)` does (exact halves go up) and a
/// trailing `.0` dropped.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{}M", one_decimal(n as f64 / 1_000_000.0))
    } else if n >= 1_000 {
        format!("{}K", one_decimal(n as f64 / 1_000.0))
    } else {
        n.to_string()
    }
}

fn one_decimal(v: f64) -> String {
    // Only quarter values such as 1.25 sit exactly between two tenths
    let quarters = v * 4.0;
    let s = if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        format!("{:.1}", (v * 10.0 + 0.5).floor() / 10.0)
    } else {
        format!("{:.1}", v)
    };
    match s.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => s,
    }
}

/// The individually editable counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Likes,
    Retweets,
    Comments,
    Quotes,
    Views,
}

impl Counter {
    /// Patch for one counter from raw text. Empty views input hides views.
    pub fn patch(self, raw: &str) -> EngagementPatch {
        let value = parse_count(raw);
        let mut patch = EngagementPatch::default();
        match self {
            Counter::Likes => patch.likes = Some(value),
            Counter::Retweets => patch.retweets = Some(value),
            Counter::Comments => patch.comments = Some(value),
            Counter::Quotes => patch.quotes = Some(value),
            Counter::Views => {
                patch.views = Some(if raw.trim().is_empty() { None } else { Some(value) })
            }
        }
        patch
    }
}

/// A named set of counters applied in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementPreset {
    pub label: &'static str,
    pub likes: u64,
    pub retweets: u64,
    pub comments: u64,
    pub quotes: u64,
    pub views: u64,
}

pub const PRESETS: &[EngagementPreset] = &[
    EngagementPreset { label: "Viral", likes: 125_000, retweets: 45_000, comments: 8_500, quotes: 2_100, views: 1_200_000 },
    EngagementPreset { label: "Popular", likes: 15_000, retweets: 3_200, comments: 850, quotes: 420, views: 180_000 },
    EngagementPreset { label: "Moderate", likes: 1_200, retweets: 180, comments: 45, quotes: 12, views: 15_000 },
    EngagementPreset { label: "Low", likes: 25, retweets: 3, comments: 2, quotes: 0, views: 500 },
    EngagementPreset { label: "Zero", likes: 0, retweets: 0, comments: 0, quotes: 0, views: 0 },
];

impl EngagementPreset {
    /// Case-insensitive lookup by label.
    pub fn find(label: &str) -> Option<&'static EngagementPreset> {
        PRESETS.iter().find(|p| p.label.eq_ignore_ascii_case(label.trim()))
    }

    pub fn patch(&self) -> EngagementPatch {
        EngagementPatch {
            likes: Some(self.likes),
            retweets: Some(self.retweets),
            comments: Some(self.comments),
            quotes: Some(self.quotes),
            views: Some(Some(self.views)),
        }
    }
}
