/// Format a duration in seconds as "Xh Ym" or "Ym".
pub fn format_duration_secs(secs: u32) -> String {
    if secs == 0 {
        return "now".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Zero-padded "HH:MM:SS" clock string.
pub fn format_hms(hours: u32, minutes: u32, seconds: u32) -> String {
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Create a simple ASCII progress bar for a ratio in [0, 1].
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration_secs(0), "now");
        assert_eq!(format_duration_secs(90), "1m");
        assert_eq!(format_duration_secs(3661), "1h 1m");
    }

    #[test]
    fn hms_is_zero_padded() {
        assert_eq!(format_hms(2, 5, 9), "02:05:09");
    }

    #[test]
    fn progress_bar_clamps() {
        assert_eq!(progress_bar(1.5, 4), "████");
        assert_eq!(progress_bar(-0.5, 4), "░░░░");
        assert_eq!(progress_bar(0.5, 4), "██░░");
    }
}
