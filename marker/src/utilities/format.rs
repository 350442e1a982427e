use crate::types::is_valid_metric;

/// Display value for a metric that is missing or invalid.
pub const NOT_AVAILABLE: &str = "N/A";

/// Seconds with millisecond precision, e.g. `"0.125 s"`.
pub fn format_time(secs: Option<f64>) -> String {
    match secs.filter(|v| is_valid_metric(*v)) {
        Some(s) => format!("{s:.3} s"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Kilobytes shown as megabytes with two decimals, e.g. `"1.50 MB"`.
pub fn format_memory(kb: Option<f64>) -> String {
    match kb.filter(|v| is_valid_metric(*v)) {
        Some(kb) => format!("{:.2} MB", kb / 1024.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_fixed_precision() {
        assert_eq!(format_time(Some(0.0123)), "0.012 s");
        assert_eq!(format_time(Some(2.0)), "2.000 s");
        assert_eq!(format_memory(Some(1536.0)), "1.50 MB");
        assert_eq!(format_memory(Some(0.0)), "0.00 MB");
    }

    #[test]
    fn invalid_values_never_render_as_nan() {
        for bad in [None, Some(f64::NAN), Some(f64::INFINITY), Some(-1.0)] {
            assert_eq!(format_time(bad), NOT_AVAILABLE);
            assert_eq!(format_memory(bad), NOT_AVAILABLE);
        }
    }
}
