//! Declarative binary message definitions.
//!
//! ## Overview
//!
//! This library describes binary messages as an ordered list of typed fields, and turns those
//! descriptions into serializers and deserializers at runtime.
//!
//! Fields are declared on a [`Builder`], which is then finalized into a [`MessageType`]. Every
//! field has a wire representation, either a fixed-width [`WireFormat`] or a byte string, and may
//! carry a default value, be recomputed on every access, or act as a length prefix which is
//! patched automatically with the size of the fields declared inside it. Types can be extended
//! into subtypes which start out with a copy of every field of the parent.
//!
//! ## Example
//!
//! ```rust
//! use wirestruct::{readers, FieldOptions, MessageType, WireFormat};
//!
//! let mut builder = MessageType::builder("Packet");
//! builder
//!     .scalar("kind", WireFormat::UINT8, FieldOptions::new().always(1u8))?
//!     .length_prefixed("length", WireFormat::UINT16LE, FieldOptions::new(), |body| {
//!         body.scalar("id", WireFormat::UINT32BE, FieldOptions::new())?
//!             .string("payload", FieldOptions::new().reader(readers::remaining()))?;
//!         Ok(())
//!     })?;
//! let packet = builder.finalize()?;
//!
//! let mut message = packet.instance();
//! message.set("id", 0xaabb_u32)?;
//! message.set("payload", "hi")?;
//! let bytes = message.to_bytes()?;
//! assert_eq!(bytes[..], [0x01u8, 0x06, 0x00, 0x00, 0x00, 0xaa, 0xbb, b'h', b'i']);
//!
//! let decoded = packet.deserialize(&bytes)?;
//! assert_eq!(decoded.get_as::<u32>("id")?, 0xaabb);
//! assert_eq!(decoded.get_as::<String>("payload")?, "hi");
//! # Ok::<(), wirestruct::Error>(())
//! ```

#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::expect_used,
    clippy::unwrap_used
)]
#![allow(clippy::missing_const_for_fn, clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod codec;
pub use codec::WireFormat;

mod error;
pub use error::{Error, Result};

mod value;
pub use value::{FromValue, Value};

pub mod schema;
pub use schema::{Builder, FieldOptions, MessageType};

mod message;
pub use message::Message;

pub mod readers;

pub(crate) mod testing;

pub use bytes::{Bytes, BytesMut};
