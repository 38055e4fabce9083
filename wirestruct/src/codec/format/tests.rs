use super::*;
use crate::testing::gen_range;
use bytes::BytesMut;

fn round_trip(format: WireFormat, value: &Value) -> Value {
    let encoded = format.encode(value).expect("should encode the value");
    assert_eq!(encoded.as_slice().len(), format.width().bytes());
    format
        .decode(encoded.as_slice())
        .expect("should decode the value")
}

macro_rules! test_round_trip {
    ($t:ty, $name:ident, [$($format:ident),+]) => {
        #[test]
        fn $name() {
            $(
                let format = WireFormat::$format;
                for value in [<$t>::MIN, <$t>::MAX, 0 as $t, gen_range(<$t>::MIN..=<$t>::MAX)] {
                    assert_eq!(round_trip(format, &Value::from(value)), Value::from(value));
                }
            )+
        }
    };
}

test_round_trip!(u8, round_trip_u8, [UINT8]);
test_round_trip!(i8, round_trip_i8, [INT8]);
test_round_trip!(u16, round_trip_u16, [UINT16, UINT16BE, UINT16LE]);
test_round_trip!(i16, round_trip_i16, [INT16, INT16BE, INT16LE]);
test_round_trip!(u32, round_trip_u32, [UINT32, UINT32BE, UINT32LE]);
test_round_trip!(i32, round_trip_i32, [INT32, INT32BE, INT32LE]);
test_round_trip!(u64, round_trip_u64, [UINT64, UINT64BE, UINT64LE]);
test_round_trip!(i64, round_trip_i64, [INT64, INT64BE, INT64LE]);

#[test]
fn round_trip_floats() {
    for format in [
        WireFormat::FLOAT32,
        WireFormat::FLOAT32BE,
        WireFormat::FLOAT32LE,
    ] {
        for value in [f32::MIN, f32::MAX, 0.0, -1.5, gen_range(-1.0e6..1.0e6)] {
            assert_eq!(round_trip(format, &Value::from(value)), Value::from(value));
        }
    }
    for format in [
        WireFormat::FLOAT64,
        WireFormat::FLOAT64BE,
        WireFormat::FLOAT64LE,
    ] {
        for value in [f64::MIN, f64::MAX, 0.0, -1.5, gen_range(-1.0e12..1.0e12)] {
            assert_eq!(round_trip(format, &Value::from(value)), Value::from(value));
        }
    }
}

#[test]
fn byte_orders() {
    let value = Value::from(0x0102_u16);
    assert_eq!(
        WireFormat::UINT16BE.encode(&value).map(|e| e.as_slice().to_vec()),
        Some(vec![0x01, 0x02])
    );
    assert_eq!(
        WireFormat::UINT16LE.encode(&value).map(|e| e.as_slice().to_vec()),
        Some(vec![0x02, 0x01])
    );
    assert_eq!(
        WireFormat::UINT16.encode(&value).map(|e| e.as_slice().to_vec()),
        Some(0x0102_u16.to_ne_bytes().to_vec())
    );
    assert_eq!(
        WireFormat::FLOAT32BE
            .encode(&Value::from(1.0f32))
            .map(|e| e.as_slice().to_vec()),
        Some(1.0f32.to_be_bytes().to_vec())
    );
}

#[test]
fn encode_checks_width() {
    assert!(WireFormat::UINT8.encode(&Value::from(255u64)).is_some());
    assert!(WireFormat::UINT8.encode(&Value::from(256u64)).is_none());
    assert!(WireFormat::UINT32.encode(&Value::from(-1i8)).is_none());
    assert!(WireFormat::INT8.encode(&Value::from(-128i64)).is_some());
    assert!(WireFormat::INT8.encode(&Value::from(128u64)).is_none());
    assert!(WireFormat::INT64.encode(&Value::from(u64::MAX)).is_none());
}

#[test]
fn encode_checks_kind() {
    assert!(WireFormat::UINT16.encode(&Value::from("ab")).is_none());
    assert!(WireFormat::UINT16.encode(&Value::from(1.0f64)).is_none());
    assert!(WireFormat::FLOAT64.encode(&Value::from(3u8)).is_some());
}

#[test]
fn write_reports_field() {
    let mut buf = BytesMut::new();
    let mut ser = Serializer::new(&mut buf);
    assert_eq!(
        WireFormat::UINT8.write("count", &Value::from(300u16), &mut ser),
        Err(Error::OutOfRange {
            field: String::from("count"),
            format: WireFormat::UINT8
        })
    );
    assert!(buf.is_empty());
}

#[test]
fn read_underflow() {
    let mut de = Deserializer::new(&[1u8, 2, 3]);
    assert_eq!(
        WireFormat::UINT32LE.read(&mut de),
        Err(Error::Underflow {
            needed: 4,
            remaining: 3
        })
    );
    assert_eq!(de.position(), 0);
}

#[test]
fn names() {
    assert_eq!(WireFormat::ALL.len(), 26);
    for format in WireFormat::ALL {
        assert_eq!(format.to_string().parse::<WireFormat>(), Ok(*format));
    }
    assert_eq!(WireFormat::UINT8.to_string(), "uint8");
    assert_eq!(WireFormat::INT64LE.to_string(), "int64le");
    assert!("uint24".parse::<WireFormat>().is_err());
}
