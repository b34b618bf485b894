//! Folding decoded packets into a weather snapshot.
//!
//! One polling cycle hands a batch of framed packets plus the prior snapshot
//! to [`decode_stream`]; invalid packets are skipped, valid ones merge field
//! by field, and the derived quantities (dew point, sea-level pressure,
//! windchill) are computed along the way. Fields absent from the batch keep
//! their carried-in values, so the result is always a superset of the prior
//! snapshot.

use tracing::{debug, trace};

use crate::protocol::{self, RawPacket, SensorFamily};
use crate::snapshot::WeatherSnapshot;
use crate::units;

/// Overwrite `dst` only when the new value is present.
fn merge<T>(dst: &mut Option<T>, src: Option<T>) {
    if src.is_some() {
        *dst = src;
    }
}

/// Decode a packet batch and fold it into a snapshot.
///
/// Packets that fail validation are skipped without mutating the snapshot.
/// For thermo/hygro families the dew point is derived; BHTR968 pressure is
/// corrected to sea level when `elevation_m` is nonzero; BHTR968 readings
/// are renamed to the `indoor_*` fields; THGR268 readings multiplex into the
/// `alt_*` slot for their channel. After the whole batch, windchill is
/// recomputed whenever both outdoor temperature and average wind speed are
/// known.
#[must_use]
pub fn decode_stream(
    packets: &[RawPacket],
    elevation_m: f64,
    prior: Option<WeatherSnapshot>,
) -> WeatherSnapshot {
    let mut output = prior.unwrap_or_default();

    for packet in packets {
        let Some(decoded) = protocol::decode(packet) else {
            trace!(kind = %packet.kind, "skipping packet");
            continue;
        };
        let m = &decoded.measurements;
        debug!(family = %decoded.family, channel = decoded.channel, "decoded packet");

        // Dew point for the thermo/hygro families. Humidity must be
        // positive; the formula takes its logarithm.
        let dewpoint = match decoded.family {
            SensorFamily::Bhtr968 | SensorFamily::Thgr268 | SensorFamily::Thgr968 => {
                match (m.temperature, m.humidity) {
                    (Some(t), Some(h)) if h > 0.0 => Some(units::dew_point(t, h)),
                    _ => None,
                }
            }
            SensorFamily::Rgr968 | SensorFamily::Wgr968 => None,
        };

        // Sea-level corrected barometric pressure
        let pressure = match m.pressure {
            Some(p) if decoded.family == SensorFamily::Bhtr968 && elevation_m != 0.0 => {
                Some(units::sea_level_pressure(p, elevation_m))
            }
            other => other,
        };

        match decoded.family {
            // The BHTR968 is the indoor unit; its readings must not collide
            // with the outdoor keys.
            SensorFamily::Bhtr968 => {
                merge(&mut output.indoor_temperature, m.temperature);
                merge(&mut output.indoor_humidity, m.humidity);
                merge(&mut output.indoor_dewpoint, dewpoint);
                merge(&mut output.pressure, pressure);
                merge(&mut output.comfort, m.comfort);
                merge(&mut output.forecast, m.forecast);
            }
            // The THGR968 is the primary outdoor unit.
            SensorFamily::Thgr968 => {
                merge(&mut output.temperature, m.temperature);
                merge(&mut output.humidity, m.humidity);
                merge(&mut output.dewpoint, dewpoint);
            }
            // Other outdoor units multiplex by channel.
            SensorFamily::Thgr268 => {
                output.set_alt(decoded.channel, m.temperature, m.humidity, dewpoint);
            }
            SensorFamily::Rgr968 => {
                merge(&mut output.rain_rate, m.rain_rate);
                merge(&mut output.rain_total, m.rain_total);
            }
            SensorFamily::Wgr968 => {
                merge(&mut output.wind_average, m.wind_average);
                merge(&mut output.wind_gust, m.wind_gust);
                merge(&mut output.wind_direction, m.wind_direction);
            }
        }
    }

    // Combined quantities
    if let (Some(temp), Some(wind)) = (output.temperature, output.wind_average) {
        output.windchill = Some(units::windchill(temp, wind));
    }

    output
}
