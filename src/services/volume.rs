//! Training volume (weight x reps) and its change against a baseline.

use std::fmt;

use serde::Serialize;

/// Lenient weight parsing: takes the leading number, so "80kg" reads as 80,
/// and anything else counts as zero.
pub fn parse_weight(input: &str) -> f64 {
    leading_float(input).unwrap_or(0.0)
}

/// Lenient reps parsing: takes the leading integer, so "8.5" and "8 reps"
/// both read as 8, and anything else counts as zero.
pub fn parse_reps(input: &str) -> i64 {
    leading_integer(input).unwrap_or(0)
}

/// Strict parsing used when persisting: `None` unless the field holds a
/// number.
pub fn parse_weight_strict(input: &str) -> Option<f64> {
    leading_float(input)
}

pub fn parse_reps_strict(input: &str) -> Option<i64> {
    leading_integer(input)
}

fn leading_integer(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

fn leading_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let mut seen_dot = false;
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| match c {
            '0'..='9' => false,
            '-' | '+' => i != 0,
            '.' if !seen_dot => {
                seen_dot = true;
                false
            }
            _ => true,
        })
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite())
}

pub fn total_volume(sets: &[(f64, i64)]) -> f64 {
    sets.iter().map(|(weight, reps)| weight * *reps as f64).sum()
}

/// One decimal place, as shown in the volume badges.
pub fn format_volume(volume: f64) -> String {
    format!("{:.1}", volume)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VolumeChange {
    NotApplicable,
    Delta { percent: f64, absolute: f64 },
}

impl VolumeChange {
    pub fn between(baseline: f64, current: f64) -> Self {
        if baseline == 0.0 || current == 0.0 {
            return VolumeChange::NotApplicable;
        }
        let absolute = current - baseline;
        VolumeChange::Delta {
            percent: absolute / baseline * 100.0,
            absolute,
        }
    }

    /// `None` when there is nothing to compare.
    pub fn is_gain(&self) -> Option<bool> {
        match self {
            VolumeChange::NotApplicable => None,
            VolumeChange::Delta { absolute, .. } => Some(*absolute >= 0.0),
        }
    }
}

impl fmt::Display for VolumeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeChange::NotApplicable => write!(f, "N/A"),
            VolumeChange::Delta { percent, absolute } => {
                let sign = if *absolute >= 0.0 { "+" } else { "" };
                write!(
                    f,
                    "{sign}{percent:.1}% ({sign}{absolute:.1} kg)",
                    sign = sign,
                    percent = percent,
                    absolute = absolute
                )
            }
        }
    }
}
