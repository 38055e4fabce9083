//! Field descriptors and their options.

use crate::codec::{Deserializer, Serializer, WireFormat};
use crate::{Error, Message, Result, Value};
use std::sync::Arc;

/// Zero-argument producer of a field value.
pub type Producer = Arc<dyn Fn() -> Value + Send + Sync>;

/// Field-specific reader, invoked with the message read so far.
pub type FieldReader = Arc<dyn Fn(&Message, &mut Deserializer<'_>) -> Result<Value> + Send + Sync>;

/// Whole-message reader which replaces per-field dispatch.
pub type MessageReader =
    Arc<dyn Fn(&mut Message, &mut Deserializer<'_>) -> Result<()> + Send + Sync>;

/// Source of a computed field value.
#[derive(Clone)]
pub enum Resolver {
    Constant(Value),
    Producer(Producer),
}

impl Resolver {
    /// Computes the value.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Producer(producer) => producer(),
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Producer(_) => f.write_str("Producer"),
        }
    }
}

/// How the value of a field is obtained.
#[derive(Debug, Clone, Default)]
pub enum Mutability {
    /// Set through accessors or deserialization; reads as zero or empty until then.
    #[default]
    Free,
    /// Like [`Mutability::Free`], but computed on first read when unset and remembered from then
    /// on.
    Default(Resolver),
    /// Computed on every read, and never assigned.
    Always(Resolver),
}

/// Encoding of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(WireFormat),
    /// Raw bytes, without any delimiter.
    String,
    /// Raw bytes followed by a zero byte.
    StringZ,
    Array(WireFormat),
    /// A scalar holding the size of the fields declared inside it.
    LengthPrefix(WireFormat),
}

impl FieldKind {
    /// Returns the scalar format of the field, if it has one.
    #[must_use]
    pub const fn format(self) -> Option<WireFormat> {
        match self {
            Self::Scalar(format) | Self::Array(format) | Self::LengthPrefix(format) => Some(format),
            Self::String | Self::StringZ => None,
        }
    }

    /// Returns the width of the field on the wire, if it is fixed.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Scalar(format) | Self::LengthPrefix(format) => Some(format.width().bytes()),
            Self::String | Self::StringZ | Self::Array(_) => None,
        }
    }

    /// Value a free field reads as before anything is assigned to it.
    pub(crate) fn zero(self) -> Value {
        match self {
            Self::Scalar(format) | Self::LengthPrefix(format) if !format.is_integer() => {
                Value::Float(0.0)
            }
            Self::Scalar(_) | Self::LengthPrefix(_) => Value::Unsigned(0),
            Self::String | Self::StringZ => Value::Bytes(bytes::Bytes::new()),
            Self::Array(_) => Value::Array(Vec::new()),
        }
    }

    /// Checks that `value` is of a kind this field can hold.
    pub(crate) fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Scalar(format) | Self::LengthPrefix(format) if format.is_integer() => {
                value.as_i128().is_some()
            }
            Self::Scalar(_) | Self::LengthPrefix(_) => value.is_number(),
            Self::String | Self::StringZ => value.as_bytes().is_some(),
            Self::Array(_) => value.as_array().is_some(),
        }
    }

    pub(crate) const fn expected(self) -> &'static str {
        match self {
            Self::Scalar(format) | Self::LengthPrefix(format) if format.is_integer() => {
                "an integer"
            }
            Self::Scalar(_) | Self::LengthPrefix(_) => "a number",
            Self::String | Self::StringZ => "a byte string",
            Self::Array(_) => "an array",
        }
    }
}

type Writer = fn(&FieldDescriptor, &Value, &mut Serializer) -> Result<()>;

type Decoder = fn(&FieldDescriptor, &mut Deserializer) -> Result<Value>;

/// How a field is read during deserialization.
#[derive(Clone)]
pub(crate) enum Reader {
    Decode(Decoder),
    Custom(FieldReader),
    Missing,
}

/// A declared field of a message type.
///
/// Carries everything the serialization and deserialization pipelines need to process the
/// field: its name, encoding and mutability, and the functions which write and read it.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    mutability: Mutability,
    inclusive: bool,
    group: usize,
    writer: Writer,
    reader: Reader,
}

impl FieldDescriptor {
    pub(crate) fn new(
        name: String,
        kind: FieldKind,
        mutability: Mutability,
        inclusive: bool,
        reader: Option<FieldReader>,
    ) -> Self {
        let (writer, decoder): (Writer, Option<Decoder>) = match kind {
            FieldKind::Scalar(_) | FieldKind::LengthPrefix(_) => {
                (write_scalar as Writer, Some(read_scalar as Decoder))
            }
            FieldKind::String => (write_string as Writer, None),
            FieldKind::StringZ => (write_stringz as Writer, None),
            FieldKind::Array(_) => (write_array as Writer, None),
        };
        let reader = match (reader, decoder) {
            (Some(reader), _) => Reader::Custom(reader),
            (None, Some(decoder)) => Reader::Decode(decoder),
            (None, None) => Reader::Missing,
        };
        Self {
            name,
            kind,
            mutability,
            inclusive,
            group: 0,
            writer,
            reader,
        }
    }

    /// Returns the name of the field.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the encoding of the field.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns how the value of the field is obtained.
    #[must_use]
    pub const fn mutability(&self) -> &Mutability {
        &self.mutability
    }

    /// Returns `true` for length prefixes which count their own width.
    #[must_use]
    pub const fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    /// Returns `true` for length prefixes.
    #[must_use]
    pub const fn is_length_prefix(&self) -> bool {
        matches!(self.kind, FieldKind::LengthPrefix(_))
    }

    /// Returns the amount of fields declared inside this length prefix.
    ///
    /// They are the descriptors immediately following this one.
    #[must_use]
    pub const fn group(&self) -> usize {
        self.group
    }

    /// Returns `true` if the field can be deserialized.
    ///
    /// String, null-terminated string and array fields have no reader unless one is supplied
    /// with [`FieldOptions::reader`].
    #[must_use]
    pub fn has_reader(&self) -> bool {
        !matches!(self.reader, Reader::Missing)
    }

    pub(crate) fn set_group(&mut self, group: usize) {
        self.group = group;
    }

    pub(crate) fn shrink_group(&mut self) {
        self.group -= 1;
    }

    pub(crate) fn reader(&self) -> &Reader {
        &self.reader
    }

    /// Encodes `value` and appends it to the serializer.
    pub(crate) fn write(&self, value: &Value, ser: &mut Serializer) -> Result<()> {
        (self.writer)(self, value, ser)
    }

    pub(crate) fn type_mismatch(&self) -> Error {
        Error::TypeMismatch {
            field: self.name.clone(),
            expected: self.kind.expected(),
        }
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("mutability", &self.mutability)
            .field("inclusive", &self.inclusive)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

fn write_scalar(field: &FieldDescriptor, value: &Value, ser: &mut Serializer) -> Result<()> {
    let Some(format) = field.kind.format() else {
        return Err(field.type_mismatch());
    };
    if !field.kind.accepts(value) {
        return Err(field.type_mismatch());
    }
    format.write(&field.name, value, ser)
}

fn read_scalar(field: &FieldDescriptor, de: &mut Deserializer) -> Result<Value> {
    field
        .kind
        .format()
        .ok_or_else(|| field.type_mismatch())
        .and_then(|format| format.read(de))
}

fn write_string(field: &FieldDescriptor, value: &Value, ser: &mut Serializer) -> Result<()> {
    let bytes = value.as_bytes().ok_or_else(|| field.type_mismatch())?;
    ser.write(bytes);
    Ok(())
}

fn write_stringz(field: &FieldDescriptor, value: &Value, ser: &mut Serializer) -> Result<()> {
    write_string(field, value, ser)?;
    ser.write(&[0x00]); // Delimiter.
    Ok(())
}

fn write_array(field: &FieldDescriptor, value: &Value, ser: &mut Serializer) -> Result<()> {
    let (Some(format), Some(items)) = (field.kind.format(), value.as_array()) else {
        return Err(field.type_mismatch());
    };
    items
        .iter()
        .try_for_each(|item| format.write(&field.name, item, ser))
}

/// Options of a field declaration.
///
/// # Examples
///
/// ```rust
/// use wirestruct::{FieldOptions, MessageType, WireFormat};
///
/// let mut builder = MessageType::builder("Header");
/// builder
///     .scalar("version", WireFormat::UINT8, FieldOptions::new().always(2u8))?
///     .scalar("flags", WireFormat::UINT16BE, FieldOptions::new().default_value(0x8000u16))?;
/// let header = builder.finalize()?;
/// assert_eq!(header.instance().to_bytes()?[..], [0x02u8, 0x80, 0x00]);
/// # Ok::<(), wirestruct::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct FieldOptions {
    pub(crate) default: Option<Resolver>,
    pub(crate) always: Option<Resolver>,
    pub(crate) inclusive: bool,
    pub(crate) array: bool,
    pub(crate) reader: Option<FieldReader>,
}

impl FieldOptions {
    /// Creates options for a free field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the field read as `value` until something else is assigned to it.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(Resolver::Constant(value.into()));
        self
    }

    /// Makes the field read as the result of `producer` until something else is assigned to it.
    ///
    /// The producer runs at most once per message.
    #[must_use]
    pub fn default_fn<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(Resolver::Producer(Arc::new(producer)));
        self
    }

    /// Makes the field read-only, always holding `value`.
    #[must_use]
    pub fn always(mut self, value: impl Into<Value>) -> Self {
        self.always = Some(Resolver::Constant(value.into()));
        self
    }

    /// Makes the field read-only, holding the result of `producer`.
    ///
    /// The producer runs again on every read.
    #[must_use]
    pub fn always_fn<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.always = Some(Resolver::Producer(Arc::new(producer)));
        self
    }

    /// Makes a length prefix count its own width.
    #[must_use]
    pub const fn inclusive(mut self) -> Self {
        self.inclusive = true;
        self
    }

    /// Makes a scalar field hold a sequence of values.
    #[must_use]
    pub const fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Supplies the reader used to deserialize the field.
    ///
    /// The reader receives the message as deserialized so far, so it can look at fields which
    /// were declared before this one.
    #[must_use]
    pub fn reader<F>(mut self, reader: F) -> Self
    where
        F: Fn(&Message, &mut Deserializer<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.reader = Some(Arc::new(reader));
        self
    }

    pub(crate) fn mutability(&self, field: &str) -> Result<Mutability> {
        match (&self.default, &self.always) {
            (None, None) => Ok(Mutability::Free),
            (Some(resolver), None) => Ok(Mutability::Default(resolver.clone())),
            (None, Some(resolver)) => Ok(Mutability::Always(resolver.clone())),
            (Some(_), Some(_)) => Err(Error::InvalidDeclaration {
                field: field.to_owned(),
                reason: "default and always are mutually exclusive",
            }),
        }
    }
}

impl std::fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldOptions")
            .field("default", &self.default)
            .field("always", &self.always)
            .field("inclusive", &self.inclusive)
            .field("array", &self.array)
            .field("reader", &self.reader.is_some())
            .finish()
    }
}
