/// Round `value` to `decimals` places, half away from zero.
///
/// # Examples
///
/// ```
/// use monitor_core::formatting::round_to;
///
/// assert_eq!(round_to(2.25, 1), 2.3);
/// assert_eq!(round_to(-2.25, 1), -2.3);
/// assert_eq!(round_to(45.0, 0), 45.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10_f64.powi(decimals as i32);
    // f64::round already rounds half away from zero.
    (value * factor).round() / factor
}

/// Round to one decimal place. Every derived temperature goes through this.
///
/// ```
/// use monitor_core::formatting::round1;
///
/// assert_eq!(round1(50.66), 50.7);
/// assert_eq!(round1(round1(50.66)), 50.7);
/// ```
pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

/// Format a temperature in degrees Celsius with one decimal.
///
/// ```
/// use monitor_core::formatting::format_temperature;
///
/// assert_eq!(format_temperature(51.0), "51.0°C");
/// assert_eq!(format_temperature(36.04), "36.0°C");
/// ```
pub fn format_temperature(celsius: f64) -> String {
    format!("{:.1}°C", round1(celsius))
}

/// Format a relative humidity reading with one decimal.
pub fn format_humidity(percent: f64) -> String {
    format!("{:.1}%", round1(percent))
}

/// Format an optional temperature, rendering `None` as `"--"`.
pub fn format_optional_temperature(celsius: Option<f64>) -> String {
    celsius.map(format_temperature).unwrap_or_else(|| "--".to_string())
}

/// Left-align `text` in a column of `width` characters, truncating with `…`
/// when it does not fit.
///
/// ```
/// use monitor_core::formatting::pad_cell;
///
/// assert_eq!(pad_cell("CPU", 6), "CPU   ");
/// assert_eq!(pad_cell("CPU Package", 6), "CPU P…");
/// ```
pub fn pad_cell(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        let mut out = String::with_capacity(width);
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(width - len));
        out
    } else if width == 0 {
        String::new()
    } else {
        let mut out: String = text.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── round_to / round1 ───────────────────────────────────────────────────

    #[test]
    fn test_round1_half_away_from_zero() {
        assert_eq!(round1(0.25), 0.3);
        assert_eq!(round1(-0.25), -0.3);
        assert_eq!(round1(51.0), 51.0);
    }

    #[test]
    fn test_round1_idempotent() {
        for v in [0.1, 12.3, 45.3, 50.7, 99.9, 36.0, 1234.5] {
            assert_eq!(round1(round1(v)), round1(v));
            assert_eq!(round1(v), v);
        }
    }

    #[test]
    fn test_round_to_non_finite_passthrough() {
        assert!(round_to(f64::NAN, 1).is_nan());
        assert_eq!(round_to(f64::INFINITY, 1), f64::INFINITY);
    }

    // ── formatting ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_temperature() {
        assert_eq!(format_temperature(45.25), "45.3°C");
        assert_eq!(format_temperature(0.0), "0.0°C");
    }

    #[test]
    fn test_format_humidity() {
        assert_eq!(format_humidity(48.24), "48.2%");
    }

    #[test]
    fn test_format_optional_temperature() {
        assert_eq!(format_optional_temperature(Some(54.0)), "54.0°C");
        assert_eq!(format_optional_temperature(None), "--");
    }

    #[test]
    fn test_pad_cell() {
        assert_eq!(pad_cell("HDD1", 4), "HDD1");
        assert_eq!(pad_cell("°C", 3), "°C ");
        assert_eq!(pad_cell("abc", 0), "");
        assert_eq!(pad_cell("abcdef", 1), "…");
    }
}
