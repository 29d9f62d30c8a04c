//! Human-readable formatting of distances and durations

/// Default walking pace in minutes per kilometer
pub const DEFAULT_PACE_MIN_PER_KM: f64 = 5.0;

/// Time needed to cover `meters` at `pace` minutes per kilometer, as
/// `"1h 2m 3s"`. Hours are left out when zero; minutes and seconds are always
/// shown. Rounded seconds that reach 60 carry into minutes, and 60 minutes
/// carry into hours.
pub fn meters_to_time(meters: f64, pace: f64) -> String {
    let minutes = (meters.max(0.0) / 1000.0) * pace.max(0.0);
    let mut hours = (minutes / 60.0).floor() as u64;
    let mut mins = (minutes % 60.0).floor() as u64;
    let mut secs = ((minutes - mins as f64 - hours as f64 * 60.0) * 60.0).round() as u64;

    if secs == 60 {
        mins += 1;
        secs = 0;
    }
    if mins == 60 {
        hours += 1;
        mins = 0;
    }

    hms(hours, mins, secs)
}

/// Format a duration in seconds as `"1h 2m 3s"` (hours left out when zero)
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    hms(total / 3600, (total % 3600) / 60, total % 60)
}

fn hms(hours: u64, mins: u64, secs: u64) -> String {
    if hours > 0 {
        format!("{hours}h {mins}m {secs}s")
    } else {
        format!("{mins}m {secs}s")
    }
}

/// Format a distance in meters as `"850 m"`, `"12.34 km"` or `"123 km"`
pub fn format_distance(meters: f64) -> String {
    let km = meters / 1000.0;
    if km < 1.0 {
        format!("{:.0} m", meters)
    } else if km < 100.0 {
        format!("{:.2} km", km)
    } else {
        format!("{:.0} km", km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_to_time_zero() {
        assert_eq!(meters_to_time(0.0, DEFAULT_PACE_MIN_PER_KM), "0m 0s");
    }

    #[test]
    fn test_meters_to_time_one_km() {
        assert_eq!(meters_to_time(1000.0, 5.0), "5m 0s");
    }

    #[test]
    fn test_meters_to_time_shows_hours() {
        assert_eq!(meters_to_time(5000.0, 12.0), "1h 0m 0s");
        assert_eq!(meters_to_time(15_500.0, 5.0), "1h 17m 30s");
    }

    #[test]
    fn test_meters_to_time_seconds() {
        // 1.234 km * 5 = 6.17 min = 6m 10.2s
        assert_eq!(meters_to_time(1234.0, 5.0), "6m 10s");
    }

    #[test]
    fn test_meters_to_time_rounding_carry() {
        // 11.999 min rounds to 60 seconds, carrying into minutes
        assert_eq!(meters_to_time(2399.9, 5.0), "12m 0s");
        // 59.999 min carries all the way into hours
        assert_eq!(meters_to_time(11_999.9, 5.0), "1h 0m 0s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0m 0s");
        assert_eq!(format_duration(125.4), "2m 5s");
        assert_eq!(format_duration(3725.0), "1h 2m 5s");
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(850.0), "850 m");
        assert_eq!(format_distance(12_340.0), "12.34 km");
        assert_eq!(format_distance(123_456.0), "123 km");
    }
}
