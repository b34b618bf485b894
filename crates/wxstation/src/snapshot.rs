//! The unified in-memory weather state.

use serde::{Deserialize, Serialize};

use crate::protocol::{ComfortLevel, Forecast};

/// One coherent view of the weather, accumulated across packets and polling
/// cycles.
///
/// Every field is optional: a fresh snapshot knows nothing, and each decoded
/// packet fills in only the fields it carries. Readings from BHTR968 indoor
/// units land in the `indoor_*` fields; THGR968 readings land in the
/// canonical outdoor fields; THGR268 units multiplex into the four `alt_*`
/// slots by channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSnapshot {
    /// Outdoor temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Outdoor relative humidity percentage.
    pub humidity: Option<f64>,
    /// Outdoor dew point in degrees Celsius.
    pub dewpoint: Option<f64>,
    /// Windchill in degrees Celsius.
    pub windchill: Option<f64>,
    /// Indoor temperature in degrees Celsius.
    pub indoor_temperature: Option<f64>,
    /// Indoor relative humidity percentage.
    pub indoor_humidity: Option<f64>,
    /// Indoor dew point in degrees Celsius.
    pub indoor_dewpoint: Option<f64>,
    /// Barometric pressure in millibar.
    pub pressure: Option<f64>,
    /// Rainfall rate in mm/hr.
    pub rain_rate: Option<f64>,
    /// Total rainfall in mm.
    pub rain_total: Option<f64>,
    /// Average wind speed in m/s.
    pub wind_average: Option<f64>,
    /// Gust wind speed in m/s.
    pub wind_gust: Option<f64>,
    /// Wind direction in degrees (N = 0).
    pub wind_direction: Option<f64>,
    /// UV index.
    pub uv_index: Option<f64>,
    /// Indoor comfort level.
    pub comfort: Option<ComfortLevel>,
    /// Pressure-based forecast.
    pub forecast: Option<Forecast>,
    /// Temperatures from alternate outdoor units, one slot per channel.
    pub alt_temperature: [Option<f64>; 4],
    /// Humidities from alternate outdoor units, one slot per channel.
    pub alt_humidity: [Option<f64>; 4],
    /// Dew points from alternate outdoor units, one slot per channel.
    pub alt_dewpoint: [Option<f64>; 4],
}

impl WeatherSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether any field holds a reading.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Store an alternate outdoor reading in the slot for `channel` (1-4).
    ///
    /// Only `Some` values overwrite the slot; a `None` keeps whatever the
    /// slot already held.
    pub fn set_alt(
        &mut self,
        channel: u8,
        temperature: Option<f64>,
        humidity: Option<f64>,
        dewpoint: Option<f64>,
    ) {
        let slot = usize::from(channel.clamp(1, 4)) - 1;
        if temperature.is_some() {
            self.alt_temperature[slot] = temperature;
        }
        if humidity.is_some() {
            self.alt_humidity[slot] = humidity;
        }
        if dewpoint.is_some() {
            self.alt_dewpoint[slot] = dewpoint;
        }
    }
}
