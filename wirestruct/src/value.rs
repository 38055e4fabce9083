//! Field values.

use bytes::Bytes;

#[cfg(test)]
mod tests;

/// The value held by a field of a [`Message`](crate::Message).
///
/// Integer fields hold [`Value::Unsigned`] or [`Value::Signed`], floating point fields hold
/// [`Value::Float`], string fields hold [`Value::Bytes`] and array fields hold [`Value::Array`].
/// Numbers convert freely between the integer variants as long as they fit.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bytes(Bytes),
    Array(Vec<Value>),
}

impl Value {
    /// Creates a [`Value::Array`] from a sequence of values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::Value;
    ///
    /// let value = Value::array([1u8, 2, 3]);
    /// assert_eq!(value.to_string(), "[1, 2, 3]");
    /// ```
    pub fn array<T>(items: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<Self>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Creates a [`Value::Bytes`] by copying the given bytes.
    pub fn string(bytes: impl AsRef<[u8]>) -> Self {
        Self::Bytes(Bytes::copy_from_slice(bytes.as_ref()))
    }

    /// Returns the value as an integer wide enough for every integer variant.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::Unsigned(value) => Some(value.into()),
            Self::Signed(value) => Some(value.into()),
            _ => None,
        }
    }

    /// Returns the value as a `u64`, if it is a non-negative integer.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i128().and_then(|value| value.try_into().ok())
    }

    /// Returns the value as an `i64`, if it is an integer in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|value| value.try_into().ok())
    }

    /// Returns the value as a floating point number, if it is any number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Unsigned(value) => Some(value as f64),
            Self::Signed(value) => Some(value as f64),
            Self::Float(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw bytes of a string value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the elements of an array value.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` for the numeric variants.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Unsigned(_) | Self::Signed(_) | Self::Float(_))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsigned(value) => write!(f, "{value}"),
            Self::Signed(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bytes(bytes) => write!(f, "\"{}\"", bytes.escape_ascii()),
            Self::Array(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

macro_rules! value_from {
    ($variant:ident => $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

value_from!(Unsigned => u8, u16, u32, u64);
value_from!(Signed => i8, i16, i32, i64);
value_from!(Float => f32, f64);
value_from!(Bytes => Bytes, Vec<u8>, String, &'static str, &'static [u8]);

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::Array(value)
    }
}

/// Conversion out of a [`Value`], used by [`Message::get_as`](crate::Message::get_as).
pub trait FromValue: Sized {
    /// Describes the expected value, for error messages.
    const EXPECTED: &'static str;

    /// Converts the value, returning [`None`] if it has the wrong kind or does not fit.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! from_value_int {
    ($($t:ty),+) => {
        $(
            impl FromValue for $t {
                const EXPECTED: &'static str = concat!("a value that fits ", stringify!($t));

                fn from_value(value: Value) -> Option<Self> {
                    value.as_i128().and_then(|value| value.try_into().ok())
                }
            }
        )+
    };
}

from_value_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

impl FromValue for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_value(value: Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for f32 {
    const EXPECTED: &'static str = "a number";

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value) -> Option<Self> {
        value.as_f64().map(|value| value as f32)
    }
}

impl FromValue for Bytes {
    const EXPECTED: &'static str = "a byte string";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "a UTF-8 string";

    fn from_value(value: Value) -> Option<Self> {
        Bytes::from_value(value).and_then(|bytes| Self::from_utf8(bytes.to_vec()).ok())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "an array";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any value";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}
