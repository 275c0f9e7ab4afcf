//! Timecode formatting utilities.
//!
//! Captions use the SRT timecode form `HH:MM:SS,mmm`.

/// Format seconds as an SRT timecode (`HH:MM:SS,mmm`).
///
/// Milliseconds are truncated, never rounded. Negative and non-finite
/// inputs are treated as zero.
///
/// # Examples
/// ```
/// use autoclip_models::timestamp::format_timecode;
/// assert_eq!(format_timecode(3725.4), "01:02:05,400");
/// assert_eq!(format_timecode(0.0), "00:00:00,000");
/// ```
pub fn format_timecode(total_secs: f64) -> String {
    // The epsilon absorbs binary representation error (59.999 is stored as
    // 59.99899...) without ever rounding a real fraction up.
    let total_ms = if total_secs.is_finite() && total_secs > 0.0 {
        (total_secs * 1000.0 + 1e-6).floor() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Format seconds as `HH:MM:SS.mmm` for logs.
pub fn format_seconds(total_secs: f64) -> String {
    format_timecode(total_secs).replacen(',', ".", 1)
}
