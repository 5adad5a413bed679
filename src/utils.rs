//! Small formatting helpers shared by the player and the console front end.

/// Format a duration in seconds as `M:SS`.
///
/// Minutes are unbounded and not zero-padded; seconds are floor-truncated
/// and padded to two digits. Non-finite or negative input formats as
/// `0:00`, the clock shown before the engine has reported a duration.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Clamp a fraction to `[0.0, 1.0]`, treating non-finite input as zero.
pub fn clamp_fraction(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
