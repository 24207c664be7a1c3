//! A small FIT reader, independent of the crate under test, used to check
//! encoded documents.

#![allow(dead_code)]

use std::path::Path;

use csv::ReaderBuilder;
use tinyvec::ArrayVec;
use zerocopy::FromBytes;

type FieldTriple = (u8, u8, u8);

#[derive(Debug, Default, Clone)]
struct Definition {
    global: u16,
    fields: ArrayVec<[FieldTriple; 32]>,
}

/// A decoded document: one row per data record, holding the global message
/// number followed by field number and value pairs. Fields holding their
/// 'invalid' marker are skipped.
pub fn read(data: &[u8]) -> Vec<Vec<String>> {
    #[repr(C, packed)]
    #[derive(FromBytes)]
    struct FileHeader {
        header_size: u8,
        protocol_version: u8,
        profile_version: [u8; 2],
        data_size: [u8; 4],
        data_type: [u8; 4],
    }

    let head: [u8; 12] = data[..12].try_into().unwrap();
    let FileHeader {
        header_size,
        data_size,
        data_type,
        ..
    } = zerocopy::transmute!(head);

    assert_eq!(header_size, 14);
    assert_eq!(&data_type, b".FIT");
    assert_eq!(
        crc(&data[..12]),
        u16::from_le_bytes([data[12], data[13]]),
        "header check"
    );

    let end = 14 + u32::from_le_bytes(data_size) as usize;
    assert_eq!(data.len(), end + 2, "document length");
    assert_eq!(
        crc(&data[14..end]),
        u16::from_le_bytes([data[end], data[end + 1]]),
        "document check"
    );

    let mut definitions: [Option<Definition>; 16] = Default::default();
    let mut rows = Vec::new();
    let mut i = 14;

    while i < end {
        let header = data[i];
        i += 1;

        assert_eq!(header & 0xA0, 0, "compressed or developer header");
        let local = (header & 0x0F) as usize;

        if header & 0x40 != 0 {
            assert_eq!(data[i], 0, "reserved byte");
            assert_eq!(data[i + 1], 0, "architecture");
            let global = u16::from_le_bytes([data[i + 2], data[i + 3]]);
            let count = data[i + 4] as usize;
            i += 5;

            let mut fields = ArrayVec::new();
            for _ in 0..count {
                fields.push((data[i], data[i + 1], data[i + 2]));
                i += 3;
            }

            definitions[local] = Some(Definition { global, fields });
        } else {
            let definition = definitions[local].as_ref().expect("data before definition");
            let mut row = vec![definition.global.to_string()];

            for &(field, size, base_type) in definition.fields.iter() {
                let bytes = &data[i..i + size as usize];
                i += size as usize;

                if let Some(value) = render(base_type, bytes) {
                    row.push(field.to_string());
                    row.push(value);
                }
            }

            rows.push(row);
        }
    }

    assert_eq!(i, end, "record section overrun");

    rows
}

/// Read the expected rows of a CSV fixture.
pub fn expected(path: impl AsRef<Path>) -> Vec<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .unwrap();

    reader
        .records()
        .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
        .collect()
}

fn render(base_type: u8, b: &[u8]) -> Option<String> {
    fn le<const N: usize>(b: &[u8]) -> [u8; N] {
        b[..N].try_into().unwrap()
    }

    let (value, invalid) = match base_type {
        0x00 | 0x02 | 0x0D => (b[0].to_string(), b[0] == u8::MAX),
        0x0A => (b[0].to_string(), b[0] == 0),
        0x01 => (i8::from_le_bytes(le(b)).to_string(), b[0] == 0x7F),
        0x83 => {
            let x = i16::from_le_bytes(le(b));
            (x.to_string(), x == i16::MAX)
        }
        0x84 => {
            let x = u16::from_le_bytes(le(b));
            (x.to_string(), x == u16::MAX)
        }
        0x8B => {
            let x = u16::from_le_bytes(le(b));
            (x.to_string(), x == 0)
        }
        0x85 => {
            let x = i32::from_le_bytes(le(b));
            (x.to_string(), x == i32::MAX)
        }
        0x86 => {
            let x = u32::from_le_bytes(le(b));
            (x.to_string(), x == u32::MAX)
        }
        0x8C => {
            let x = u32::from_le_bytes(le(b));
            (x.to_string(), x == 0)
        }
        0x88 => {
            let x = f32::from_le_bytes(le(b));
            (x.to_string(), le::<4>(b) == [0xFF; 4])
        }
        0x89 => {
            let x = f64::from_le_bytes(le(b));
            (x.to_string(), le::<8>(b) == [0xFF; 8])
        }
        0x07 => {
            let text = b.split(|c| *c == 0).next().unwrap_or_default();
            (String::from_utf8(text.to_vec()).unwrap(), text.is_empty())
        }
        other => panic!("unexpected base type {other:#04x}"),
    };

    if invalid { None } else { Some(value) }
}

pub fn crc(data: &[u8]) -> u16 {
    const TABLE: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
        0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
    ];

    let mut crc = 0u16;
    for b in data {
        for nibble in [b & 0xF, b >> 4] {
            let tmp = TABLE[(crc & 0xF) as usize];
            crc = (crc >> 4) & 0x0FFF;
            crc ^= tmp ^ TABLE[nibble as usize];
        }
    }
    crc
}
