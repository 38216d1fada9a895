use std::fmt::Write;

use anyhow::{bail, Context, Result};
use chrono::Duration;

/// `1h30m`や`5m`、`90s`のような文字列を`Duration`に変換する。
///
/// 単位は`h`、`m`、`s`、`ms`に対応し、`1.5h`のような小数も受け付ける。
/// 単位を省略できるのは`0`のみ。
pub fn parse_duration(s: &str) -> Result<Duration> {
    let input = s.trim();
    if input.is_empty() {
        bail!("Duration must not be empty");
    }

    let (negative, mut rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        bail!("Invalid duration: {}", s);
    }

    let mut total_millis = 0.0_f64;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            bail!("Invalid duration: {}", s);
        }
        let value: f64 = rest[..number_end]
            .parse()
            .with_context(|| format!("Invalid number in duration: {}", s))?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let millis_per_unit = match &rest[..unit_end] {
            "ms" => 1.0,
            "s" => 1_000.0,
            "m" => 60_000.0,
            "h" => 3_600_000.0,
            "" => bail!("Missing unit in duration: {}", s),
            unit => bail!("Unknown unit {} in duration: {}", unit, s),
        };
        rest = &rest[unit_end..];

        total_millis += value * millis_per_unit;
    }

    let millis = total_millis.round();
    if !millis.is_finite() || millis >= i64::MAX as f64 {
        bail!("Duration is out of range: {}", s);
    }
    let millis = millis as i64;
    Ok(Duration::milliseconds(if negative { -millis } else { millis }))
}

/// `Duration`を`2h30m0s`の形式で文字列にする。
///
/// 1秒未満の場合は`500ms`、0の場合は`0s`とする。
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.num_milliseconds();
    if millis == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    if millis < 0 {
        out.push('-');
    }
    let millis = millis.unsigned_abs();
    if millis < 1_000 {
        let _ = write!(out, "{}ms", millis);
        return out;
    }

    let hours = millis / 3_600_000;
    let minutes = millis / 60_000 % 60;
    let seconds = millis / 1_000 % 60;
    let fraction = millis % 1_000;

    if hours > 0 {
        let _ = write!(out, "{}h", hours);
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{}m", minutes);
    }
    if fraction > 0 {
        let fraction = format!("{:03}", fraction);
        let _ = write!(out, "{}.{}s", seconds, fraction.trim_end_matches('0'));
    } else {
        let _ = write!(out, "{}s", seconds);
    }

    out
}
