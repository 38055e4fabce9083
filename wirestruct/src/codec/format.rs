//! Scalar wire formats.
//!
//! A [`WireFormat`] names one concrete binary encoding: how many bytes a scalar occupies, in
//! which order they are laid out, and whether they hold an unsigned, signed or floating point
//! number.

use super::{Deserializer, Serializer};
use crate::{Error, Result, Value};

#[cfg(test)]
mod tests;

/// Interpretation of the bytes of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Unsigned,
    Signed,
    Float,
}

/// Size of a scalar on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// Returns the amount of bytes occupied by this width.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::W8 => 1,
            Self::W16 => 2,
            Self::W32 => 4,
            Self::W64 => 8,
        }
    }
}

/// Order of the bytes of a multi-byte scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Byte order of the host.
    Native,
    Big,
    Little,
}

/// Binary encoding of a single scalar field.
///
/// All formats are available as associated constants, and can also be parsed from their names:
///
/// ```rust
/// use wirestruct::WireFormat;
///
/// assert_eq!("uint16be".parse::<WireFormat>(), Ok(WireFormat::UINT16BE));
/// assert_eq!(WireFormat::FLOAT64LE.to_string(), "float64le");
/// assert_eq!(WireFormat::INT32.width().bytes(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireFormat {
    kind: ScalarKind,
    width: Width,
    order: ByteOrder,
}

macro_rules! wire_formats {
    ($($name:ident => $kind:ident, $width:ident, $order:ident;)+) => {
        impl WireFormat {
            $(
                #[doc = concat!("The `", stringify!($name), "` wire format.")]
                pub const $name: Self = Self::new(ScalarKind::$kind, Width::$width, ByteOrder::$order);
            )+

            /// Every supported wire format.
            pub const ALL: &'static [Self] = &[$(Self::$name),+];
        }
    };
}

wire_formats! {
    UINT8 => Unsigned, W8, Native;
    INT8 => Signed, W8, Native;
    UINT16 => Unsigned, W16, Native;
    UINT16BE => Unsigned, W16, Big;
    UINT16LE => Unsigned, W16, Little;
    INT16 => Signed, W16, Native;
    INT16BE => Signed, W16, Big;
    INT16LE => Signed, W16, Little;
    UINT32 => Unsigned, W32, Native;
    UINT32BE => Unsigned, W32, Big;
    UINT32LE => Unsigned, W32, Little;
    INT32 => Signed, W32, Native;
    INT32BE => Signed, W32, Big;
    INT32LE => Signed, W32, Little;
    UINT64 => Unsigned, W64, Native;
    UINT64BE => Unsigned, W64, Big;
    UINT64LE => Unsigned, W64, Little;
    INT64 => Signed, W64, Native;
    INT64BE => Signed, W64, Big;
    INT64LE => Signed, W64, Little;
    FLOAT32 => Float, W32, Native;
    FLOAT32BE => Float, W32, Big;
    FLOAT32LE => Float, W32, Little;
    FLOAT64 => Float, W64, Native;
    FLOAT64BE => Float, W64, Big;
    FLOAT64LE => Float, W64, Little;
}

macro_rules! encode_as {
    ($t:ty, $value:expr, $order:expr) => {{
        let value: $t = $value;
        Encoded::new(&match $order {
            ByteOrder::Native => value.to_ne_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        })
    }};
}

macro_rules! read_as {
    ($t:ty, $de:expr, $order:expr) => {
        $de.read::<[u8; std::mem::size_of::<$t>()]>()
            .map(|raw| match $order {
                ByteOrder::Native => <$t>::from_ne_bytes(raw),
                ByteOrder::Big => <$t>::from_be_bytes(raw),
                ByteOrder::Little => <$t>::from_le_bytes(raw),
            })
    };
}

impl WireFormat {
    const fn new(kind: ScalarKind, width: Width, order: ByteOrder) -> Self {
        Self { kind, width, order }
    }

    /// Returns how the bytes of this format are interpreted.
    #[must_use]
    pub const fn kind(self) -> ScalarKind {
        self.kind
    }

    /// Returns the size of this format on the wire.
    #[must_use]
    pub const fn width(self) -> Width {
        self.width
    }

    /// Returns the byte order of this format.
    #[must_use]
    pub const fn order(self) -> ByteOrder {
        self.order
    }

    /// Returns `true` if this format holds an integer.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self.kind, ScalarKind::Float)
    }

    /// Encodes `value` into the bytes of this format.
    ///
    /// Returns [`None`] if the value is not a number, or if it does not fit the width of an
    /// integer format. Floating point formats accept any number, narrowing it if needed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::{Value, WireFormat};
    ///
    /// let encoded = WireFormat::INT32LE.encode(&Value::from(7)).unwrap();
    /// assert_eq!(encoded.as_slice(), &[7u8, 0, 0, 0]);
    /// assert!(WireFormat::UINT8.encode(&Value::from(256)).is_none());
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn encode(self, value: &Value) -> Option<Encoded> {
        if self.kind == ScalarKind::Float {
            let value = value.as_f64()?;
            return match self.width {
                Width::W32 => Some(encode_as!(f32, value as f32, self.order)),
                Width::W64 => Some(encode_as!(f64, value, self.order)),
                Width::W8 | Width::W16 => None,
            };
        }
        let value = value.as_i128()?;
        Some(match (self.kind, self.width) {
            (ScalarKind::Unsigned, Width::W8) => encode_as!(u8, value.try_into().ok()?, self.order),
            (ScalarKind::Unsigned, Width::W16) => encode_as!(u16, value.try_into().ok()?, self.order),
            (ScalarKind::Unsigned, Width::W32) => encode_as!(u32, value.try_into().ok()?, self.order),
            (ScalarKind::Unsigned, Width::W64) => encode_as!(u64, value.try_into().ok()?, self.order),
            (ScalarKind::Signed, Width::W8) => encode_as!(i8, value.try_into().ok()?, self.order),
            (ScalarKind::Signed, Width::W16) => encode_as!(i16, value.try_into().ok()?, self.order),
            (ScalarKind::Signed, Width::W32) => encode_as!(i32, value.try_into().ok()?, self.order),
            (ScalarKind::Signed, Width::W64) => encode_as!(i64, value.try_into().ok()?, self.order),
            (ScalarKind::Float, _) => return None,
        })
    }

    /// Encodes `value` and appends it to the serializer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the value cannot be encoded in this format. The `field`
    /// name is only used to describe the error.
    pub fn write(self, field: &str, value: &Value, ser: &mut Serializer) -> Result<()> {
        let encoded = self.encode(value).ok_or_else(|| Error::OutOfRange {
            field: field.to_owned(),
            format: self,
        })?;
        ser.write(encoded.as_slice());
        Ok(())
    }

    /// Reads exactly as many bytes as this format occupies, and decodes them.
    ///
    /// Unsigned formats produce [`Value::Unsigned`], signed formats [`Value::Signed`], and
    /// floating point formats [`Value::Float`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::{Value, WireFormat, codec::Deserializer};
    ///
    /// let mut de = Deserializer::new(&[0xff, 0xfe]);
    /// assert_eq!(WireFormat::INT16BE.read(&mut de), Ok(Value::Signed(-2)));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if fewer bytes than the width of this format can be read.
    pub fn read(self, de: &mut Deserializer) -> Result<Value> {
        match (self.kind, self.width) {
            (ScalarKind::Unsigned, Width::W8) => read_as!(u8, de, self.order).map(Value::from),
            (ScalarKind::Unsigned, Width::W16) => read_as!(u16, de, self.order).map(Value::from),
            (ScalarKind::Unsigned, Width::W32) => read_as!(u32, de, self.order).map(Value::from),
            (ScalarKind::Unsigned, Width::W64) => read_as!(u64, de, self.order).map(Value::from),
            (ScalarKind::Signed, Width::W8) => read_as!(i8, de, self.order).map(Value::from),
            (ScalarKind::Signed, Width::W16) => read_as!(i16, de, self.order).map(Value::from),
            (ScalarKind::Signed, Width::W32) => read_as!(i32, de, self.order).map(Value::from),
            (ScalarKind::Signed, Width::W64) => read_as!(i64, de, self.order).map(Value::from),
            (ScalarKind::Float, Width::W32) => read_as!(f32, de, self.order).map(Value::from),
            (ScalarKind::Float, Width::W64) => read_as!(f64, de, self.order).map(Value::from),
            (ScalarKind::Float, Width::W8 | Width::W16) => {
                Err(Error::custom(format!("{self} is not a valid format")))
            }
        }
    }

    /// Decodes a value from exactly [`Width::bytes`] bytes.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<Value> {
        if bytes.len() != self.width.bytes() {
            return None;
        }
        self.read(&mut Deserializer::new(bytes)).ok()
    }
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ScalarKind::Unsigned => "uint",
            ScalarKind::Signed => "int",
            ScalarKind::Float => "float",
        };
        let order = match self.order {
            ByteOrder::Native => "",
            ByteOrder::Big => "be",
            ByteOrder::Little => "le",
        };
        write!(f, "{kind}{}{order}", self.width.bytes() * 8)
    }
}

impl std::str::FromStr for WireFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.to_string() == s)
            .ok_or_else(|| Error::custom(format!("unknown wire format `{s}`")))
    }
}

/// The bytes of one encoded scalar.
///
/// Holds at most eight bytes inline, which is the widest format available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    bytes: [u8; 8],
    len: usize,
}

impl Encoded {
    fn new(src: &[u8]) -> Self {
        let mut bytes = [0u8; 8];
        bytes[..src.len()].copy_from_slice(src);
        Self {
            bytes,
            len: src.len(),
        }
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Encoded {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
