//! Byte-level reading and writing.
//!
//! [`Serializer`] appends to a growable buffer and can overwrite bytes it already wrote, which is
//! what length prefixes are patched with. [`Deserializer`] walks a byte slice and enforces the
//! regions announced by length prefixes. [`WireFormat`] converts single scalars between
//! [`Value`](crate::Value)s and their on-wire bytes.

pub mod de;
pub mod format;
pub mod ser;

pub use de::Deserializer;
pub use format::{ByteOrder, Encoded, ScalarKind, WireFormat, Width};
pub use ser::Serializer;
