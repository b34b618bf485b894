//! Plain-text current-conditions report.

use std::fmt::Write;

use crate::protocol::{ComfortLevel, Forecast};
use crate::snapshot::WeatherSnapshot;
use crate::units::{c_to_f, mb_to_inhg, mm_to_in, ms_to_mph};

/// Render a snapshot as a human-readable conditions report.
///
/// Display units are imperial. Sections with no data are omitted entirely,
/// so an empty snapshot renders as an empty string.
#[must_use]
pub fn generate_report(snapshot: &WeatherSnapshot, include_indoor: bool) -> String {
    let mut report = String::new();

    // Indoor
    if include_indoor {
        if let (Some(temp), Some(humidity)) =
            (snapshot.indoor_temperature, snapshot.indoor_humidity)
        {
            report.push_str("Indoor Conditions:\n");
            let _ = writeln!(
                report,
                " -> {:.1} F with {humidity:.0}% humidity",
                c_to_f(temp)
            );
            if let Some(dewpoint) = snapshot.indoor_dewpoint {
                let _ = writeln!(report, " -> dew point is {:.1} F", c_to_f(dewpoint));
            }
            if let Some(pressure) = snapshot.pressure {
                let _ = writeln!(
                    report,
                    " -> barometric pressure is {:.2} in-Hg",
                    mb_to_inhg(pressure)
                );
            }
            match snapshot.comfort {
                Some(ComfortLevel::Unknown) | None => {}
                Some(comfort) => {
                    let _ = writeln!(report, " -> comfort level is {comfort}");
                }
            }
            report.push('\n');
        }
    }

    // Outdoor
    if let (Some(temp), Some(humidity)) = (snapshot.temperature, snapshot.humidity) {
        report.push_str("Outdoor Conditions:\n");
        let _ = writeln!(
            report,
            " -> {:.1} F with {humidity:.0}% humidity",
            c_to_f(temp)
        );
        if let Some(dewpoint) = snapshot.dewpoint {
            let _ = writeln!(report, " -> dew point is {:.1} F", c_to_f(dewpoint));
        }
        if let Some(windchill) = snapshot.windchill {
            if windchill != temp {
                let _ = writeln!(report, " -> windchill is {:.1} F", c_to_f(windchill));
            }
        }
        for slot in 0..4 {
            if let Some(alt_temp) = snapshot.alt_temperature[slot] {
                let humidity = snapshot.alt_humidity[slot].unwrap_or(0.0);
                let _ = writeln!(
                    report,
                    "    #{}: {:.1} F with {humidity:.0}% humidity",
                    slot + 1,
                    c_to_f(alt_temp)
                );
                if let Some(alt_dew) = snapshot.alt_dewpoint[slot] {
                    let _ = writeln!(report, "         dew point is {:.1} F", c_to_f(alt_dew));
                }
            }
        }
        report.push('\n');
    }

    // Wind
    if let Some(average) = snapshot.wind_average {
        report.push_str("Wind:\n");
        let _ = writeln!(
            report,
            " -> average {:.1} mph @ {:.0} degrees",
            ms_to_mph(average),
            snapshot.wind_direction.unwrap_or(0.0)
        );
        if let Some(gust) = snapshot.wind_gust {
            let _ = writeln!(report, " -> gust {:.1} mph", ms_to_mph(gust));
        }
        report.push('\n');
    }

    // Rainfall
    if let (Some(rate), Some(total)) = (snapshot.rain_rate, snapshot.rain_total) {
        report.push_str("Rainfall:\n");
        let _ = writeln!(
            report,
            " -> {:.2} in/hr, {:.2} in total",
            mm_to_in(rate),
            mm_to_in(total)
        );
        report.push('\n');
    }

    // Forecast
    match snapshot.forecast {
        Some(Forecast::Unknown) | None => {}
        Some(forecast) => {
            report.push_str("Forecast:\n");
            let _ = writeln!(report, " -> {forecast}");
            report.push('\n');
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_snapshot() -> WeatherSnapshot {
        let mut snapshot = WeatherSnapshot::new();
        snapshot.temperature = Some(2.5);
        snapshot.humidity = Some(80.0);
        snapshot.dewpoint = Some(-0.6);
        snapshot.windchill = Some(-2.0);
        snapshot.indoor_temperature = Some(21.0);
        snapshot.indoor_humidity = Some(38.0);
        snapshot.indoor_dewpoint = Some(6.3);
        snapshot.pressure = Some(1013.25);
        snapshot.comfort = Some(ComfortLevel::Comfortable);
        snapshot.forecast = Some(Forecast::PartlyCloudy);
        snapshot.rain_rate = Some(2.54);
        snapshot.rain_total = Some(254.0);
        snapshot.wind_average = Some(5.0);
        snapshot.wind_gust = Some(7.5);
        snapshot.wind_direction = Some(270.0);
        snapshot.alt_temperature[1] = Some(1.0);
        snapshot.alt_humidity[1] = Some(85.0);
        snapshot.alt_dewpoint[1] = Some(-1.2);
        snapshot
    }

    #[test]
    fn test_empty_snapshot_renders_empty() {
        let report = generate_report(&WeatherSnapshot::new(), true);
        assert!(report.is_empty());
    }

    #[test]
    fn test_full_report_sections() {
        let report = generate_report(&full_snapshot(), true);

        assert!(report.contains("Indoor Conditions:"));
        assert!(report.contains("69.8 F with 38% humidity"));
        assert!(report.contains("barometric pressure is 29.92 in-Hg"));
        assert!(report.contains("comfort level is comfortable"));

        assert!(report.contains("Outdoor Conditions:"));
        assert!(report.contains("36.5 F with 80% humidity"));
        assert!(report.contains("windchill is 28.4 F"));
        assert!(report.contains("#2: 33.8 F with 85% humidity"));

        assert!(report.contains("Wind:"));
        assert!(report.contains("average 11.2 mph @ 270 degrees"));
        assert!(report.contains("gust 16.8 mph"));

        assert!(report.contains("Rainfall:"));
        assert!(report.contains("0.10 in/hr, 10.00 in total"));

        assert!(report.contains("Forecast:"));
        assert!(report.contains("partly cloudy"));
    }

    #[test]
    fn test_indoor_section_suppressed() {
        let report = generate_report(&full_snapshot(), false);
        assert!(!report.contains("Indoor Conditions:"));
        assert!(report.contains("Outdoor Conditions:"));
    }

    #[test]
    fn test_windchill_equal_to_temperature_omitted() {
        let mut snapshot = WeatherSnapshot::new();
        snapshot.temperature = Some(15.0);
        snapshot.humidity = Some(50.0);
        snapshot.windchill = Some(15.0);
        let report = generate_report(&snapshot, true);
        assert!(!report.contains("windchill"));
    }

    #[test]
    fn test_unknown_forecast_omitted() {
        let mut snapshot = WeatherSnapshot::new();
        snapshot.forecast = Some(Forecast::Unknown);
        let report = generate_report(&snapshot, true);
        assert!(report.is_empty());
    }

    #[test]
    fn test_outdoor_only() {
        let mut snapshot = WeatherSnapshot::new();
        snapshot.temperature = Some(10.0);
        snapshot.humidity = Some(60.0);
        let report = generate_report(&snapshot, true);
        assert!(report.contains("Outdoor Conditions:"));
        assert!(!report.contains("Wind:"));
        assert!(!report.contains("Rainfall:"));
    }
}
