//! Player-facing rendering of combat power.
//!
//! Raw power (DPS x effective HP) grows quadratically with stats, so the UI
//! shows its square root instead.

use crate::core::constants::{POWER_MILLIONS_THRESHOLD, POWER_THOUSANDS_THRESHOLD};

/// Square root of raw combat power.
pub fn display_power(raw_power: f64) -> f64 {
    raw_power.max(0.0).sqrt()
}

/// Format a displayed power value: one decimal below 1 000, then K / M suffixes.
pub fn format_power(value: f64) -> String {
    if value >= POWER_MILLIONS_THRESHOLD {
        format!("{:.2}M", value / POWER_MILLIONS_THRESHOLD)
    } else if value >= POWER_THOUSANDS_THRESHOLD {
        format!("{:.1}K", value / POWER_THOUSANDS_THRESHOLD)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_power_is_square_root() {
        assert_eq!(display_power(1_440_000.0), 1200.0);
        assert_eq!(display_power(-5.0), 0.0);
    }

    #[test]
    fn test_format_power() {
        assert_eq!(format_power(34.64), "34.6");
        assert_eq!(format_power(999.9), "999.9");
        assert_eq!(format_power(1_500.0), "1.5K");
        assert_eq!(format_power(2_345_678.0), "2.35M");
    }
}
