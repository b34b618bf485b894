//! Frame integrity checking for Oregon Scientific v2.1 packets.
//!
//! The protocol checksums a frame by summing the values of its hex digits
//! and folding the sum to 8 bits. The checksum byte is transmitted with its
//! two hex digits in swapped order.

/// Compute the folded digit-sum checksum over a frame body.
///
/// The body runs from the sensor id through the end of the data section,
/// excluding the checksum and postamble digits. Returns `None` if the body
/// contains a non-hex character.
///
/// A single carry fold is enough: the longest frame body is 19 digits, so
/// the digit sum stays below 512.
#[must_use]
pub fn compute(body: &str) -> Option<u32> {
    let mut sum: u32 = 0;
    for ch in body.chars() {
        sum += ch.to_digit(16)?;
    }
    Some((sum & 0xFF) + (sum >> 8))
}

/// Validate a frame body against the checksum digits embedded in the packet.
///
/// The computed checksum is formatted as two upper-case hex digits and the
/// digit order is swapped before comparison, matching the transmitted byte
/// order.
#[must_use]
pub fn validate(body: &str, embedded: &str) -> bool {
    let Some(sum) = compute(body) else {
        return false;
    };
    let swapped: String = format!("{sum:02X}").chars().rev().collect();
    swapped == embedded.to_ascii_uppercase()
}
