//! Ready-made field readers.
//!
//! Fields of fixed width are deserialized by their format alone. Strings and arrays carry no
//! size of their own on the wire, so their types must say how to read them. The functions in
//! this module build readers for the common layouts, to be passed to [`FieldOptions::reader`].
//!
//! # Examples
//!
//! ```rust
//! use wirestruct::{readers, FieldOptions, MessageType, WireFormat};
//!
//! let mut builder = MessageType::builder("Samples");
//! builder
//!     .scalar("count", WireFormat::UINT8, FieldOptions::new())?
//!     .array(
//!         "samples",
//!         WireFormat::INT16LE,
//!         FieldOptions::new().reader(readers::counted_array(WireFormat::INT16LE, "count")),
//!     )?;
//! let samples = builder.finalize()?;
//!
//! let message = samples.deserialize(&[0x02, 0xff, 0xff, 0x05, 0x00])?;
//! assert_eq!(message.get_as::<Vec<i16>>("samples")?, [-1, 5]);
//! # Ok::<(), wirestruct::Error>(())
//! ```
//!
//! [`FieldOptions::reader`]: crate::FieldOptions::reader

use crate::codec::{Deserializer, WireFormat};
use crate::{Error, Message, Result, Value};


/// Reads bytes up to a zero byte, which is consumed but not kept.
pub fn stringz() -> impl Fn(&Message, &mut Deserializer<'_>) -> Result<Value> + Send + Sync {
    |_, de| de.read_until(0x00).map(Value::string)
}

/// Reads every byte up to the end of the enclosing length prefix, or of the input.
pub fn remaining() -> impl Fn(&Message, &mut Deserializer<'_>) -> Result<Value> + Send + Sync {
    |_, de| Ok(Value::string(de.read_remaining()))
}

/// Reads exactly `len` bytes.
pub fn fixed(len: usize) -> impl Fn(&Message, &mut Deserializer<'_>) -> Result<Value> + Send + Sync {
    move |_, de| de.read_slice(len).map(Value::string)
}

/// Reads as many bytes as the earlier field `count` holds.
pub fn counted(count: &str) -> impl Fn(&Message, &mut Deserializer<'_>) -> Result<Value> + Send + Sync {
    let count = count.to_owned();
    move |message, de| {
        let len = count_of(message, &count)?;
        de.read_slice(len).map(Value::string)
    }
}

/// Reads `count` items of the given format.
pub fn fixed_array(
    format: WireFormat,
    count: usize,
) -> impl Fn(&Message, &mut Deserializer<'_>) -> Result<Value> + Send + Sync {
    move |_, de| read_items(format, count, de)
}

/// Reads as many items of the given format as the earlier field `count` holds.
pub fn counted_array(
    format: WireFormat,
    count: &str,
) -> impl Fn(&Message, &mut Deserializer<'_>) -> Result<Value> + Send + Sync {
    let count = count.to_owned();
    move |message, de| read_items(format, count_of(message, &count)?, de)
}

/// Reads items of the given format up to the end of the enclosing length prefix, or of the
/// input.
///
/// Fails if the bytes left are not a whole number of items.
pub fn remaining_array(
    format: WireFormat,
) -> impl Fn(&Message, &mut Deserializer<'_>) -> Result<Value> + Send + Sync {
    move |_, de| {
        let width = format.width().bytes();
        let remaining = de.remaining();
        if remaining % width != 0 {
            return Err(Error::Underflow {
                needed: remaining.next_multiple_of(width),
                remaining,
            });
        }
        read_items(format, remaining / width, de)
    }
}

fn read_items(format: WireFormat, count: usize, de: &mut Deserializer<'_>) -> Result<Value> {
    let width = format.width().bytes();
    let needed = count.saturating_mul(width);
    if needed > de.remaining() {
        de.skip(needed)?;
    }
    (0..count)
        .map(|_| format.read(de))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

fn count_of(message: &Message, field: &str) -> Result<usize> {
    let value = message.get(field)?;
    value
        .as_u64()
        .and_then(|count| usize::try_from(count).ok())
        .ok_or(Error::TypeMismatch {
            field: field.to_owned(),
            expected: "a non-negative count",
        })
}
