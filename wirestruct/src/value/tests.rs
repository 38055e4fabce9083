use super::*;

#[test]
fn integers_convert_between_variants() {
    assert_eq!(Value::from(7u8).as_i64(), Some(7));
    assert_eq!(Value::from(-1i16).as_u64(), None);
    assert_eq!(Value::from(u64::MAX).as_i64(), None);
    assert_eq!(Value::from(u64::MAX).as_i128(), Some(i128::from(u64::MAX)));
    assert_eq!(Value::from(3i32).as_f64(), Some(3.0));
    assert_eq!(Value::from(1.5f32).as_i128(), None);
}

#[test]
fn strings_hold_bytes() {
    let value = Value::from("ab");
    assert_eq!(value.as_bytes().map(|bytes| &bytes[..]), Some(&b"ab"[..]));
    assert_eq!(value, Value::string(String::from("ab")));
    assert!(!value.is_number());
}

#[test]
fn display() {
    assert_eq!(Value::from(42u16).to_string(), "42");
    assert_eq!(Value::from(-42i64).to_string(), "-42");
    assert_eq!(Value::from(0.5f64).to_string(), "0.5");
    assert_eq!(Value::from("a\"b\0").to_string(), "\"a\\\"b\\x00\"");
    assert_eq!(Value::array([1i8, -1]).to_string(), "[1, -1]");
    assert_eq!(Value::Array(Vec::new()).to_string(), "[]");
}

#[test]
fn from_value() {
    assert_eq!(u8::from_value(Value::from(255u64)), Some(255u8));
    assert_eq!(u8::from_value(Value::from(256u64)), None);
    assert_eq!(i8::from_value(Value::from(-128i64)), Some(-128i8));
    assert_eq!(f32::from_value(Value::from(2u8)), Some(2.0f32));
    assert_eq!(
        String::from_value(Value::from("rust")),
        Some(String::from("rust"))
    );
    assert_eq!(String::from_value(Value::from(1u8)), None);
    assert_eq!(
        Vec::<Value>::from_value(Value::array([1u8])),
        Some(vec![Value::Unsigned(1)])
    );
}
