//! Oregon Scientific v2.1 packet decoding.
//!
//! A frame arrives from the radio layer as a tagged string of hex nibbles:
//! sync nibble, four-digit sensor id, channel nibble, two-digit rolling
//! code, flags nibble, data section, two-digit checksum, two-digit
//! postamble. Decoding walks the frame through sync check, sensor
//! identification, checksum verification, and family-specific field
//! decoding; any failure along the way rejects the packet without touching
//! downstream state.

pub mod checksum;
pub mod sensors;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use sensors::{ComfortLevel, Forecast, Measurements, SensorFamily};

/// Kind tag of Oregon Scientific v2.1 frames.
pub const OSV2: &str = "OSV2";

/// Nibble offset of the channel within the payload.
const CHANNEL: usize = 5;
/// Nibble offset of the data section within the payload.
const DATA_START: usize = 9;
/// Trailing nibbles: two checksum digits plus two postamble digits.
const TRAILER_LEN: usize = 4;

/// A framed packet as delivered by the radio layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPacket {
    /// Protocol tag (e.g. "OSV2").
    pub kind: String,
    /// The frame as hex-nibble text.
    pub payload: String,
}

impl RawPacket {
    /// Create a packet with an arbitrary kind tag.
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Create an OSV2 packet.
    #[must_use]
    pub fn osv2(payload: impl Into<String>) -> Self {
        Self::new(OSV2, payload)
    }

    /// Check whether this packet carries an OSV2 frame.
    #[must_use]
    pub fn is_osv2(&self) -> bool {
        self.kind == OSV2
    }
}

/// A packet that passed validation and field decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPacket {
    /// Which sensor family produced the frame.
    pub family: SensorFamily,
    /// Transmit channel, coerced to 1-4.
    pub channel: u8,
    /// The decoded measurement set.
    pub measurements: Measurements,
}

/// Decode a single packet.
///
/// Returns `None` for anything that is not a trustworthy OSV2 frame: wrong
/// kind tag, non-hex payload, bad sync nibble, unrecognized sensor id,
/// short frame, checksum mismatch, or a data section that fails to parse.
#[must_use]
pub fn decode(packet: &RawPacket) -> Option<DecodedPacket> {
    if !packet.is_osv2() {
        return None;
    }
    let payload = packet.payload.as_str();
    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_hexdigit()) {
        debug!(payload, "rejecting frame with non-hex payload");
        return None;
    }

    // SyncCheck
    if !payload.starts_with('A') {
        debug!(payload, "rejecting frame with bad sync nibble");
        return None;
    }

    // SensorIdentify
    let id = payload.get(1..5)?;
    let Some(family) = SensorFamily::from_id(id) else {
        debug!(id, "rejecting frame with unrecognized sensor id");
        return None;
    };
    if payload.len() < DATA_START + family.data_len() + TRAILER_LEN {
        debug!(%family, len = payload.len(), "rejecting short frame");
        return None;
    }

    // ChecksumVerify
    let body = &payload[1..payload.len() - TRAILER_LEN];
    let embedded = &payload[payload.len() - 4..payload.len() - 2];
    if !checksum::validate(body, embedded) {
        debug!(%family, payload, "rejecting frame with checksum mismatch");
        return None;
    }

    // FieldDecode
    let data = &payload[DATA_START..payload.len() - TRAILER_LEN];
    let measurements = match family {
        SensorFamily::Bhtr968 => sensors::decode_bhtr968(data),
        SensorFamily::Rgr968 => sensors::decode_rgr968(data),
        SensorFamily::Wgr968 => sensors::decode_wgr968(data),
        SensorFamily::Thgr268 | SensorFamily::Thgr968 => sensors::decode_thgr(data),
    }?;

    let channel_nibble = char::from(payload.as_bytes()[CHANNEL]).to_digit(16)?;
    let channel = u8::try_from(channel_nibble.clamp(1, 4)).ok()?;

    Some(DecodedPacket {
        family,
        channel,
        measurements,
    })
}

/// Test-only mirror encoder: builds valid frames for each sensor family so
/// tests can round-trip arbitrary field values.
#[cfg(test)]
pub(crate) mod testenc {
    use super::{checksum, RawPacket, SensorFamily};

    fn rev(digits: &str) -> String {
        digits.chars().rev().collect()
    }

    fn dec(value: u32, width: usize) -> String {
        rev(&format!("{value:0width$}"))
    }

    /// Four temperature nibbles: three reversed tenths digits plus the
    /// sign nibble.
    fn temp4(temp_c: f64) -> String {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let tenths = (temp_c.abs() * 10.0).round() as u32;
        let sign = if temp_c < 0.0 { '8' } else { '0' };
        format!("{}{sign}", dec(tenths, 3))
    }

    /// Assemble a full payload around a data section: sync, sensor id,
    /// channel, rolling code, flags, data, checksum, postamble.
    pub fn frame(family: SensorFamily, channel: u32, data: &str) -> String {
        let mut payload = format!("A{}{channel:X}4B0{data}", family.id());
        let sum = checksum::compute(&payload[1..]).expect("encoder emits hex digits");
        let swapped: String = format!("{sum:02X}").chars().rev().collect();
        payload.push_str(&swapped);
        payload.push_str("55");
        payload
    }

    pub fn thgr268(channel: u32, temp_c: f64, humidity: u32) -> RawPacket {
        let data = format!("{}{}0", temp4(temp_c), dec(humidity, 2));
        RawPacket::osv2(frame(SensorFamily::Thgr268, channel, &data))
    }

    pub fn thgr968(temp_c: f64, humidity: u32) -> RawPacket {
        let data = format!("{}{}0", temp4(temp_c), dec(humidity, 2));
        RawPacket::osv2(frame(SensorFamily::Thgr968, 1, &data))
    }

    pub fn bhtr968(
        temp_c: f64,
        humidity: u32,
        comfort_nibble: char,
        pressure_mb: i32,
        forecast_nibble: char,
    ) -> RawPacket {
        #[allow(clippy::cast_sign_loss)]
        let baro = ((pressure_mb - 856) & 0xFF) as u32;
        let data = format!(
            "{}{}{comfort_nibble}{}0{forecast_nibble}",
            temp4(temp_c),
            dec(humidity, 2),
            rev(&format!("{baro:02X}")),
        );
        RawPacket::osv2(frame(SensorFamily::Bhtr968, 0, &data))
    }

    pub fn rgr968(rate_mm_hr: f64, total_mm: f64) -> RawPacket {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let data = format!(
            "{}{}",
            dec((rate_mm_hr * 10.0).round() as u32, 3),
            dec((total_mm * 10.0).round() as u32, 5),
        );
        RawPacket::osv2(frame(SensorFamily::Rgr968, 0, &data))
    }

    pub fn wgr968(direction: u32, gust_ms: f64, average_ms: f64) -> RawPacket {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let data = format!(
            "{}{}{}",
            dec(direction, 3),
            dec((gust_ms * 10.0).round() as u32, 3),
            dec((average_ms * 10.0).round() as u32, 3),
        );
        RawPacket::osv2(frame(SensorFamily::Wgr968, 0, &data))
    }
}
