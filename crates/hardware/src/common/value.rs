//! Display formatting for simulated values.
//!
//! Every simulated quantity (register contents, operands, results, memory cells) is an
//! `f64`. Integral values print without a fractional part; everything else is shown
//! with a single decimal digit, which is the precision the value generator produces.

/// Formats a simulated value for display.
///
/// # Arguments
///
/// * `value` - The value to format.
///
/// # Returns
///
/// `"78"` for integral values, `"12.3"` for fractional ones, and Rust's own rendering
/// (`"NaN"`, `"inf"`) for non-finite results such as a division by zero.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    if value.fract() == 0.0 {
        format!("{value}")
    } else {
        format!("{value:.1}")
    }
}

/// Formats an optional value, using `-` for an absent one.
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_value)
}
