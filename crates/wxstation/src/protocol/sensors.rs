//! Per-family field decoders for Oregon Scientific v2.1 sensors.
//!
//! Numeric fields arrive least-significant digit first, so each substring is
//! digit-reversed before parsing. Temperature, humidity, rain, and wind
//! fields are decimal; the BHTR968 pressure byte is hex. A substring that
//! fails to parse invalidates the whole packet.

use serde::{Deserialize, Serialize};

/// The Oregon Scientific v2.1 sensor families understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorFamily {
    /// Indoor temperature/humidity/pressure unit.
    Bhtr968,
    /// Rain gauge.
    Rgr968,
    /// Anemometer.
    Wgr968,
    /// Outdoor temperature/humidity unit (channels 1-4).
    Thgr268,
    /// Primary outdoor temperature/humidity unit.
    Thgr968,
}

impl SensorFamily {
    /// Look up a family from its four-digit sensor id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "5D60" => Some(Self::Bhtr968),
            "2D10" => Some(Self::Rgr968),
            "3D00" => Some(Self::Wgr968),
            "1D20" => Some(Self::Thgr268),
            "1D30" => Some(Self::Thgr968),
            _ => None,
        }
    }

    /// The four-digit sensor id transmitted after the sync nibble.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::Bhtr968 => "5D60",
            Self::Rgr968 => "2D10",
            Self::Wgr968 => "3D00",
            Self::Thgr268 => "1D20",
            Self::Thgr968 => "1D30",
        }
    }

    /// Number of data-section digits this family's decoder consumes.
    #[must_use]
    pub fn data_len(&self) -> usize {
        match self {
            Self::Bhtr968 => 11,
            Self::Rgr968 => 8,
            Self::Wgr968 => 9,
            Self::Thgr268 | Self::Thgr968 => 7,
        }
    }
}

impl std::fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bhtr968 => write!(f, "BHTR968"),
            Self::Rgr968 => write!(f, "RGR968"),
            Self::Wgr968 => write!(f, "WGR968"),
            Self::Thgr268 => write!(f, "THGR268"),
            Self::Thgr968 => write!(f, "THGR968"),
        }
    }
}

/// Indoor "comfort level" reported by the BHTR968.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComfortLevel {
    /// Nibble 0x0.
    Normal,
    /// Nibble 0x4.
    Comfortable,
    /// Nibble 0x8.
    Dry,
    /// Nibble 0xC.
    Wet,
    /// Any other nibble value.
    Unknown,
}

impl ComfortLevel {
    /// Map the comfort nibble to a level.
    #[must_use]
    pub fn from_nibble(value: u32) -> Self {
        match value {
            0x0 => Self::Normal,
            0x4 => Self::Comfortable,
            0x8 => Self::Dry,
            0xC => Self::Wet,
            _ => Self::Unknown,
        }
    }

    /// Parse a display label back to a level, defaulting to unknown.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "normal" => Self::Normal,
            "comfortable" => Self::Comfortable,
            "dry" => Self::Dry,
            "wet" => Self::Wet,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ComfortLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Comfortable => write!(f, "comfortable"),
            Self::Dry => write!(f, "dry"),
            Self::Wet => write!(f, "wet"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Pressure-based weather forecast reported by the BHTR968.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Forecast {
    /// Nibble 0x2.
    Cloudy,
    /// Nibble 0x3.
    Rainy,
    /// Nibble 0x6.
    PartlyCloudy,
    /// Nibble 0xC.
    Sunny,
    /// Any other nibble value.
    Unknown,
}

impl Forecast {
    /// Map the forecast nibble to a forecast.
    #[must_use]
    pub fn from_nibble(value: u32) -> Self {
        match value {
            0x2 => Self::Cloudy,
            0x3 => Self::Rainy,
            0x6 => Self::PartlyCloudy,
            0xC => Self::Sunny,
            _ => Self::Unknown,
        }
    }

    /// Parse a display label back to a forecast, defaulting to unknown.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "cloudy" => Self::Cloudy,
            "rainy" => Self::Rainy,
            "partly cloudy" => Self::PartlyCloudy,
            "sunny" => Self::Sunny,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Forecast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cloudy => write!(f, "cloudy"),
            Self::Rainy => write!(f, "rainy"),
            Self::PartlyCloudy => write!(f, "partly cloudy"),
            Self::Sunny => write!(f, "sunny"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The measurements recovered from one packet's data section.
///
/// Every field is optional; a family's decoder fills only the fields that
/// family transmits. Absent fields stay `None` and are never reported as a
/// physical reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    /// Temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Relative humidity percentage.
    pub humidity: Option<f64>,
    /// Barometric pressure in millibar.
    pub pressure: Option<f64>,
    /// Indoor comfort level (BHTR968).
    pub comfort: Option<ComfortLevel>,
    /// Pressure-based forecast (BHTR968).
    pub forecast: Option<Forecast>,
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
}

/// Parse a digit-reversed decimal substring.
fn rev_dec(digits: &str) -> Option<f64> {
    let reversed: String = digits.chars().rev().collect();
    reversed.parse::<u32>().ok().map(f64::from)
}

/// Parse a digit-reversed hex substring.
fn rev_hex(digits: &str) -> Option<u32> {
    let reversed: String = digits.chars().rev().collect();
    u32::from_str_radix(&reversed, 16).ok()
}

/// Interpret an 8-bit value as signed.
fn signed_byte(value: u32) -> i32 {
    let value = i32::try_from(value).unwrap_or(0);
    if value >= 128 {
        value - 256
    } else {
        value
    }
}

/// Hex value of the nibble at `idx`.
fn nibble(data: &str, idx: usize) -> Option<u32> {
    char::from(*data.as_bytes().get(idx)?).to_digit(16)
}

/// Negate `value` when the sign nibble at `idx` is nonzero.
fn signed(data: &str, idx: usize, value: f64) -> Option<f64> {
    Some(if nibble(data, idx)? != 0 { -value } else { value })
}

/// Decode the data section of a BHTR968 indoor
/// temperature/humidity/pressure packet.
pub(crate) fn decode_bhtr968(data: &str) -> Option<Measurements> {
    let mut out = Measurements::default();

    // Indoor temperature in C
    let temp = rev_dec(data.get(0..3)?)? / 10.0;
    out.temperature = Some(signed(data, 3, temp)?);

    // Indoor relative humidity as a percentage
    out.humidity = Some(rev_dec(data.get(4..6)?)?);

    // Indoor "comfort level"
    out.comfort = Some(ComfortLevel::from_nibble(nibble(data, 6)?));

    // Barometric pressure in mbar; the signed-byte-plus-856 offset is a
    // device calibration constant
    let baro = rev_hex(data.get(7..9)?)?;
    out.pressure = Some(f64::from(signed_byte(baro) + 856));

    // Pressure-based weather forecast
    out.forecast = Some(Forecast::from_nibble(nibble(data, 10)?));

    Some(out)
}

/// Decode the data section of a RGR968 rain gauge packet.
pub(crate) fn decode_rgr968(data: &str) -> Option<Measurements> {
    let mut out = Measurements::default();

    // Rainfall rate in mm/hr
    out.rain_rate = Some(rev_dec(data.get(0..3)?)? / 10.0);

    // Total rainfall in mm
    out.rain_total = Some(rev_dec(data.get(3..8)?)? / 10.0);

    Some(out)
}

/// Decode the data section of a WGR968 anemometer packet.
pub(crate) fn decode_wgr968(data: &str) -> Option<Measurements> {
    let mut out = Measurements::default();

    // Wind direction in degrees (N = 0)
    out.wind_direction = Some(rev_dec(data.get(0..3)?)?);

    // Gust wind speed in m/s
    out.wind_gust = Some(rev_dec(data.get(3..6)?)? / 10.0);

    // Average wind speed in m/s
    out.wind_average = Some(rev_dec(data.get(6..9)?)? / 10.0);

    Some(out)
}

/// Decode the data section of a THGR268/THGR968 temperature/humidity packet.
pub(crate) fn decode_thgr(data: &str) -> Option<Measurements> {
    let mut out = Measurements::default();

    // Temperature in C
    let temp = rev_dec(data.get(0..3)?)? / 10.0;
    out.temperature = Some(signed(data, 3, temp)?);

    // Relative humidity as a percentage
    out.humidity = Some(rev_dec(data.get(4..6)?)?);

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_id_round_trip() {
        for family in [
            SensorFamily::Bhtr968,
            SensorFamily::Rgr968,
            SensorFamily::Wgr968,
            SensorFamily::Thgr268,
            SensorFamily::Thgr968,
        ] {
            assert_eq!(SensorFamily::from_id(family.id()), Some(family));
        }
        assert_eq!(SensorFamily::from_id("9D90"), None);
    }

    #[test]
    fn test_family_display() {
        assert_eq!(SensorFamily::Bhtr968.to_string(), "BHTR968");
        assert_eq!(SensorFamily::Thgr268.to_string(), "THGR268");
    }

    #[test]
    fn test_comfort_level_nibbles() {
        assert_eq!(ComfortLevel::from_nibble(0x0), ComfortLevel::Normal);
        assert_eq!(ComfortLevel::from_nibble(0x4), ComfortLevel::Comfortable);
        assert_eq!(ComfortLevel::from_nibble(0x8), ComfortLevel::Dry);
        assert_eq!(ComfortLevel::from_nibble(0xC), ComfortLevel::Wet);
        assert_eq!(ComfortLevel::from_nibble(0x5), ComfortLevel::Unknown);
    }

    #[test]
    fn test_forecast_nibbles() {
        assert_eq!(Forecast::from_nibble(0x2), Forecast::Cloudy);
        assert_eq!(Forecast::from_nibble(0x3), Forecast::Rainy);
        assert_eq!(Forecast::from_nibble(0x6), Forecast::PartlyCloudy);
        assert_eq!(Forecast::from_nibble(0xC), Forecast::Sunny);
        assert_eq!(Forecast::from_nibble(0x0), Forecast::Unknown);
    }

    #[test]
    fn test_label_round_trip() {
        for comfort in [
            ComfortLevel::Normal,
            ComfortLevel::Comfortable,
            ComfortLevel::Dry,
            ComfortLevel::Wet,
            ComfortLevel::Unknown,
        ] {
            assert_eq!(ComfortLevel::from_label(&comfort.to_string()), comfort);
        }
        for forecast in [
            Forecast::Cloudy,
            Forecast::Rainy,
            Forecast::PartlyCloudy,
            Forecast::Sunny,
            Forecast::Unknown,
        ] {
            assert_eq!(Forecast::from_label(&forecast.to_string()), forecast);
        }
    }

    #[test]
    fn test_signed_byte() {
        assert_eq!(signed_byte(0), 0);
        assert_eq!(signed_byte(127), 127);
        assert_eq!(signed_byte(128), -128);
        assert_eq!(signed_byte(220), -36);
        assert_eq!(signed_byte(255), -1);
    }

    #[test]
    fn test_rev_dec() {
        assert_eq!(rev_dec("571"), Some(175.0));
        assert_eq!(rev_dec("00"), Some(0.0));
        // Hex digits are not valid in decimal fields
        assert_eq!(rev_dec("5A1"), None);
    }

    #[test]
    fn test_rev_hex() {
        assert_eq!(rev_hex("CD"), Some(0xDC));
        assert_eq!(rev_hex("GG"), None);
    }

    #[test]
    fn test_decode_thgr_positive() {
        // Data section of captured frame A1D201BB05710818544A
        let out = decode_thgr("5710818").unwrap();
        assert_eq!(out.temperature, Some(17.5));
        assert_eq!(out.humidity, Some(18.0));
        assert_eq!(out.pressure, None);
    }

    #[test]
    fn test_decode_thgr_negative() {
        // Sign nibble set: -18.8 C at 71% humidity
        let out = decode_thgr("8818170").unwrap();
        assert_eq!(out.temperature, Some(-18.8));
        assert_eq!(out.humidity, Some(71.0));
    }

    #[test]
    fn test_decode_thgr_malformed() {
        // Stray hex digit in the decimal temperature field
        assert_eq!(decode_thgr("5B10818"), None);
    }

    #[test]
    fn test_decode_bhtr968_captured_frame() {
        // Data section of captured frame A5D600BB09220528CD83E6AF
        let out = decode_bhtr968("9220528CD83").unwrap();
        assert_eq!(out.temperature, Some(22.9));
        assert_eq!(out.humidity, Some(52.0));
        assert_eq!(out.comfort, Some(ComfortLevel::Dry));
        assert_eq!(out.pressure, Some(820.0));
        assert_eq!(out.forecast, Some(Forecast::Rainy));
    }

    #[test]
    fn test_decode_bhtr968_positive_pressure_offset() {
        // Pressure byte 0x50 = 80, below the sign threshold: 856 + 80
        let out = decode_bhtr968("92205280530").unwrap();
        assert_eq!(out.pressure, Some(936.0));
    }

    #[test]
    fn test_decode_rgr968() {
        // rate digits "031" -> 130 tenths; total digits "00521" -> 12500 tenths
        let out = decode_rgr968("03100521").unwrap();
        assert_eq!(out.rain_rate, Some(13.0));
        assert_eq!(out.rain_total, Some(1250.0));
        assert_eq!(out.temperature, None);
    }

    #[test]
    fn test_decode_wgr968_captured_frame() {
        // Data section of captured frame A3D000470712930730B3AE
        let out = decode_wgr968("712930730").unwrap();
        assert_eq!(out.wind_direction, Some(217.0));
        assert_eq!(out.wind_gust, Some(3.9));
        assert_eq!(out.wind_average, Some(3.7));
    }

    #[test]
    fn test_measurements_default_is_all_none() {
        let out = Measurements::default();
        assert_eq!(out, Measurements::default());
        assert!(out.temperature.is_none());
        assert!(out.forecast.is_none());
        assert!(out.rain_total.is_none());
    }
}
