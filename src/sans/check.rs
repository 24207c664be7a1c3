//! Helper for computing cyclic redundancy checks.
//!
//! The FIT check is a table-driven 16-bit value built one nibble at a time. It
//! is not interchangeable with the common CRC-16 variants.

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Accumulate a slice of bytes into a cyclic redundancy check value.
///
/// Pass `0` as `init` to start a new check. Passing the result of an earlier
/// call continues that check, so a document may be fed in pieces.
pub fn compute_crc(init: u16, r: &[u8]) -> u16 {
    r.iter().fold(init, |acc, b| crc_byte(acc, *b))
}

/// Accumulate a single byte into a cyclic redundancy check value.
fn crc_byte(crc: u16, b: u8) -> u16 {
    let crc = crc_nibble(crc, b & 0xF);
    crc_nibble(crc, b >> 4)
}

fn crc_nibble(crc: u16, nibble: u8) -> u16 {
    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    let crc = (crc >> 4) & 0x0FFF;
    crc ^ tmp ^ CRC_TABLE[nibble as usize]
}
