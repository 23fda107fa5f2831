// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

/// Splits `n` into whole units, minutes and seconds. Each step truncates the
/// fractional remainder of the previous one; nothing is rounded, so e.g. 10.1
/// comes out as 10, 5, 59. The sign of `n` is ignored; callers that need it
/// format it themselves.
pub fn to_dms_truncated(n: f64) -> (u32, u32, u32) {
    let n_abs = n.abs();
    let whole = n_abs.trunc();
    let total_min = (n_abs - whole) * 60.0;
    let minutes = total_min.trunc();
    let total_sec = (total_min - minutes) * 60.0;
    let seconds = total_sec.trunc();
    (whole as u32, minutes as u32, seconds as u32)
}

/// Parses separately supplied degree (or hour), minute and second fields
/// into a decimal value. The degree field may carry a leading sign, which
/// applies to the whole value (so "-00" with 30 minutes is -0.5).
pub fn parse_sexagesimal(d: &str, m: &str, s: &str) -> Option<f64> {
    let d = d.trim();
    let is_negative = d.starts_with('-');
    let degrees: i32 = d.parse().ok()?;
    let minutes: u32 = m.trim().parse().ok()?;
    let seconds: u32 = s.trim().parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    let value = degrees.unsigned_abs() as f64
        + minutes as f64 / 60.0
        + seconds as f64 / 3600.0;
    Some(if is_negative { -value } else { value })
}

/// Parses a degrees/minutes pair as used by site latitude and longitude.
pub fn parse_location(deg: &str, min: &str) -> Option<f64> {
    parse_sexagesimal(deg, min, "0")
}

// mod tests.
