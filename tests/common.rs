use cassette::{
    avec::{Encoder, Error, StrictEncoder},
    sans::{
        check::compute_crc,
        data::{RecordError, Value},
        definition::{BaseType, FieldDefinition},
    },
};

mod reader;

const FIXTURE: &str = "fixtures/workout.csv";

/// 2024-01-01T00:00:00Z.
const TIME_CREATED: u32 = 1_073_001_600;

const FILE_ID: u16 = 0;
const WORKOUT: u16 = 26;
const WORKOUT_STEP: u16 = 27;

fn workout_document() -> Vec<u8> {
    let mut e = Encoder::new();

    e.define(
        FILE_ID,
        &[
            FieldDefinition::new(0, 1, BaseType::Enum),
            FieldDefinition::new(1, 2, BaseType::Uint16),
            FieldDefinition::new(2, 2, BaseType::Uint16),
            FieldDefinition::new(3, 4, BaseType::Uint32z),
            FieldDefinition::new(4, 4, BaseType::Uint32),
        ],
    )
    .unwrap();

    e.write(
        FILE_ID,
        [
            &5u8.to_le_bytes()[..],
            &1u16.to_le_bytes()[..],
            &1u16.to_le_bytes()[..],
            &12345u32.to_le_bytes()[..],
            &TIME_CREATED.to_le_bytes()[..],
        ],
    )
    .unwrap();

    e.define(
        WORKOUT,
        &[
            FieldDefinition::new(4, 1, BaseType::Enum),
            FieldDefinition::new(5, 4, BaseType::Uint32z),
            FieldDefinition::new(6, 2, BaseType::Uint16),
            FieldDefinition::new(8, 24, BaseType::String),
        ],
    )
    .unwrap();

    e.write(
        WORKOUT,
        [
            &2u8.to_le_bytes()[..],
            &32u32.to_le_bytes()[..],
            &1u16.to_le_bytes()[..],
            &Value::FixedString {
                width: 24,
                value: "1h 150W Steady",
            }
            .encode()[..],
        ],
    )
    .unwrap();

    e.define(
        WORKOUT_STEP,
        &[
            FieldDefinition::new(254, 2, BaseType::Uint16),
            FieldDefinition::new(0, 16, BaseType::String),
            FieldDefinition::new(1, 1, BaseType::Enum),
            FieldDefinition::new(2, 4, BaseType::Uint32),
            FieldDefinition::new(3, 1, BaseType::Enum),
            FieldDefinition::new(4, 4, BaseType::Uint32),
            FieldDefinition::new(5, 4, BaseType::Uint32),
            FieldDefinition::new(6, 4, BaseType::Uint32),
            FieldDefinition::new(7, 1, BaseType::Enum),
        ],
    )
    .unwrap();

    e.write_values(
        WORKOUT_STEP,
        &[
            Value::UInt { width: 2, value: 0 },
            Value::FixedString {
                width: 16,
                value: "150W Steady",
            },
            Value::UInt { width: 1, value: 0 },
            Value::UInt {
                width: 4,
                value: 3600 * 1000,
            },
            Value::UInt { width: 1, value: 3 },
            Value::UInt { width: 4, value: 0 },
            Value::UInt {
                width: 4,
                value: 150,
            },
            Value::UInt {
                width: 4,
                value: 150,
            },
            Value::UInt { width: 1, value: 0 },
        ],
    )
    .unwrap();

    e.finalize().unwrap()
}

#[test]
fn encode_workout() {
    let document = workout_document();
    assert_eq!(reader::read(&document), reader::expected(FIXTURE));
}

#[test]
fn encode_workout_layout() {
    let document = workout_document();

    // Three definitions of 5, 4 and 9 fields, and records of 13, 31 and 37
    // bytes, each with a record header.
    let data_size = (6 + 15) + (6 + 12) + (6 + 27) + (1 + 13) + (1 + 31) + (1 + 37);
    assert_eq!(document.len(), 14 + data_size + 2);
    assert_eq!(&document[4..8], &(data_size as u32).to_le_bytes());

    let end = document.len() - 2;
    let crc = u16::from_le_bytes([document[end], document[end + 1]]);
    assert_eq!(crc, reader::crc(&document[14..end]));
    assert_eq!(crc, compute_crc(0, &document[14..end]));
}

#[test]
fn encode_empty() {
    let document = Encoder::new().finalize().unwrap();

    assert_eq!(document.len(), 16);
    assert_eq!(&document[4..8], &[0, 0, 0, 0]);
    assert_eq!(u16::from_le_bytes([document[14], document[15]]), 0);
    assert!(reader::read(&document).is_empty());
}

#[test]
fn encode_definition_and_data() {
    let mut e = Encoder::new();
    e.define(
        0,
        &[
            FieldDefinition::new(0, 1, BaseType::Enum),
            FieldDefinition::new(1, 2, BaseType::Uint16),
        ],
    )
    .unwrap();
    e.write(0, [&[0x05u8][..], &[0x01, 0x00][..]]).unwrap();

    let document = e.finalize().unwrap();

    let payload = [
        0x40, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x01, 0x02, 0x84, 0x00, 0x05, 0x01,
        0x00,
    ];
    assert_eq!(document.len(), 14 + payload.len() + 2);
    assert_eq!(&document[14..30], &payload);
    assert_eq!(&document[30..], &reader::crc(&payload).to_le_bytes());

    assert_eq!(
        reader::read(&document),
        vec![vec!["0", "0", "5", "1", "1"]]
    );
}

#[test]
fn encode_strict_rejects_short_record() {
    let mut e = StrictEncoder::new();
    e.define(FILE_ID, &[FieldDefinition::new(3, 4, BaseType::Uint32z)])
        .unwrap();

    assert_eq!(
        e.write(FILE_ID, &[&12345u16.to_le_bytes()[..]]),
        Err(Error::Record(RecordError::FieldSize {
            field: 3,
            expected: 4,
            found: 2
        }))
    );

    let document = e.finalize().unwrap();
    assert!(reader::read(&document).is_empty());
}
