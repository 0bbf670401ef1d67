//! Helper for computing sentence checksums.

/// Accumulate a slice of bytes into a sentence checksum value.
///
/// The NMEA checksum is the exclusive-or of every byte between the leading `$`
/// and the `*` delimiter.
pub fn compute_checksum(init: u8, r: &[u8]) -> u8 {
    r.iter().fold(init, |acc, b| acc ^ b)
}

/// Decode the two hexadecimal digits following a `*` delimiter.
pub fn decode_checksum(r: &str) -> Option<u8> {
    if r.len() != 2 {
        return None;
    }

    u8::from_str_radix(r, 16).ok()
}
