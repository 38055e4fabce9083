//! Message instances.

use crate::codec::{Deserializer, Serializer};
use crate::schema::{FieldDescriptor, FieldKind, MessageType, Mutability, Phase, Reader};
use crate::value::FromValue;
use crate::{Error, Result, Value};
use bytes::{Bytes, BytesMut};
use std::cell::OnceCell;
use tracing::trace;


/// A message of a given [`MessageType`].
///
/// Holds the value of every field: values assigned with [`Message::set`] or read by
/// [`Message::deserialize`], defaults computed on first read, and the offsets at which length
/// prefixes start while [`Message::serialize`] runs.
///
/// A message can be sent to another thread, but it is not meant to be shared between threads.
#[derive(Debug, Clone)]
pub struct Message {
    schema: MessageType,
    values: Vec<Option<Value>>,
    defaults: Vec<OnceCell<Value>>,
    markers: Vec<Option<usize>>,
}

impl Message {
    pub(crate) fn new(schema: MessageType) -> Self {
        let len = schema.fields().len();
        Self {
            schema,
            values: vec![None; len],
            defaults: vec![OnceCell::new(); len],
            markers: vec![None; len],
        }
    }

    /// Returns the type of this message.
    #[must_use]
    pub const fn message_type(&self) -> &MessageType {
        &self.schema
    }

    /// Returns the value of the field with the given name.
    ///
    /// Fields which were never assigned read as their default, or as zero or empty if they have
    /// none. Defaults are computed once and then remembered, while `always` fields are computed
    /// again on every read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the type has no such field.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.index(name).map(|index| self.resolve(index))
    }

    /// Returns the value of the field with the given name, converted to `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::{FieldOptions, MessageType, WireFormat};
    ///
    /// let mut builder = MessageType::builder("Point");
    /// builder.scalar("x", WireFormat::INT16BE, FieldOptions::new())?;
    /// let mut point = builder.finalize()?.instance();
    /// point.set("x", -3)?;
    /// assert_eq!(point.get_as::<i16>("x")?, -3);
    /// assert!(point.get_as::<u16>("x").is_err());
    /// # Ok::<(), wirestruct::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the type has no such field, or if the value cannot be converted.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        T::from_value(self.get(name)?).ok_or_else(|| Error::TypeMismatch {
            field: name.to_owned(),
            expected: T::EXPECTED,
        })
    }

    /// Assigns a value to the field with the given name.
    ///
    /// Whether the value fits the wire format of the field is only checked when serializing.
    ///
    /// # Errors
    ///
    /// Returns an error if the type has no such field, if the field is `always` computed, or if
    /// the value is of the wrong kind for the field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.index(name)?;
        let field = &self.schema.fields()[index];
        if matches!(field.mutability(), Mutability::Always(_)) {
            return Err(Error::ReadOnly(name.to_owned()));
        }
        let value = value.into();
        if !field.kind().accepts(&value) {
            return Err(field.type_mismatch());
        }
        self.values[index] = Some(value);
        Ok(())
    }

    /// Returns `self` with the given field assigned.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Message::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Forgets the value assigned to the field, so it reads as its default again.
    ///
    /// A memoized default is forgotten too, and computed anew on the next read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the type has no such field.
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let index = self.index(name)?;
        self.values[index] = None;
        self.defaults[index] = OnceCell::new();
        Ok(())
    }

    /// Serializes the message, appending it to `buffer`.
    ///
    /// Runs every serialization step of the type in order. Length prefixes are reserved as zero
    /// bytes first, and patched in place once the fields inside them have been written; the
    /// patched size is then also assigned to the prefix field.
    ///
    /// Returns the amount of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit its field. The buffer is left as it was before
    /// the call.
    pub fn serialize(&mut self, buffer: &mut BytesMut) -> Result<usize> {
        let origin = buffer.len();
        let result = {
            let mut ser = Serializer::new(buffer);
            self.write_to(&mut ser).map(|()| ser.written())
        };
        self.markers.fill(None);
        if result.is_err() {
            buffer.truncate(origin);
        }
        result
    }

    /// Serializes the message into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit its field.
    pub fn to_bytes(&mut self) -> Result<Bytes> {
        let mut buffer = BytesMut::new();
        self.serialize(&mut buffer)?;
        Ok(buffer.freeze())
    }

    /// Runs the serialization steps against the serializer.
    ///
    /// This is what [`Message::serialize`] does, without restoring the buffer on failure. It is
    /// meant for messages embedded in larger encodings.
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit its field.
    pub fn write_to(&mut self, ser: &mut Serializer) -> Result<()> {
        let schema = self.schema.clone();
        for step in schema.steps() {
            let index = step.field();
            let field = &schema.fields()[index];
            match step.phase() {
                Phase::Before => self.markers[index] = Some(ser.position()),
                Phase::Write => match field.kind() {
                    FieldKind::LengthPrefix(format) => {
                        ser.skip(format.width().bytes());
                    }
                    _ => field.write(&self.resolve(index), ser)?,
                },
                Phase::After => self.patch(index, field, ser)?,
            }
        }
        Ok(())
    }

    /// Deserializes the message from `buffer`, replacing the values of the fields read.
    ///
    /// Returns the amount of bytes consumed. Bytes after the end of the message are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if any field fails to deserialize, in which case the message is left
    /// partially deserialized and should be discarded.
    pub fn deserialize(&mut self, buffer: &[u8]) -> Result<usize> {
        let mut de = Deserializer::new(buffer);
        self.read_from(&mut de)?;
        Ok(de.position())
    }

    /// Reads the message from the deserializer.
    ///
    /// Uses the whole-message reader of the type if it has one, and [`Message::read_fields`]
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if any field fails to deserialize.
    pub fn read_from(&mut self, de: &mut Deserializer) -> Result<()> {
        let schema = self.schema.clone();
        match schema.reader() {
            Some(reader) => {
                trace!(type_name = %schema.name(), "using custom message reader");
                reader(self, de)
            }
            None => self.read_fields(de),
        }
    }

    /// Reads every field in declaration order with its own reader.
    ///
    /// After a length prefix is read, the fields declared inside it are confined to the size it
    /// announces. Bytes of that region which are left over after its last field are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if any field fails to deserialize, or reads past the end of its region.
    pub fn read_fields(&mut self, de: &mut Deserializer) -> Result<()> {
        let schema = self.schema.clone();
        let mut regions: Vec<usize> = Vec::new();
        for (index, field) in schema.fields().iter().enumerate() {
            self.read_field(index, field, de)?;
            if field.is_length_prefix() {
                de.push_limit(self.region(index, field)?)?;
                regions.push(index + field.group());
            }
            while regions.last() == Some(&index) {
                regions.pop();
                de.read_remaining();
                de.pop_limit()?;
            }
        }
        Ok(())
    }

    fn read_field(&mut self, index: usize, field: &FieldDescriptor, de: &mut Deserializer) -> Result<()> {
        if matches!(field.mutability(), Mutability::Always(_)) {
            // The bytes are consumed, but the computed value is kept.
            match (field.reader(), field.kind().fixed_width()) {
                (Reader::Custom(reader), _) => {
                    reader(&*self, de)?;
                }
                (_, Some(width)) if de.remaining() >= width => de.skip(width)?,
                _ => {}
            }
            return Ok(());
        }
        let value = match field.reader() {
            Reader::Decode(decode) => decode(field, de)?,
            Reader::Custom(reader) => reader(&*self, de)?,
            Reader::Missing => {
                return Err(Error::NotImplemented {
                    type_name: self.schema.name().to_owned(),
                    field: field.name().to_owned(),
                    operation: "deserialize",
                })
            }
        };
        self.values[index] = Some(value);
        Ok(())
    }

    /// Returns the size of the region announced by the length prefix at `index`.
    fn region(&self, index: usize, field: &FieldDescriptor) -> Result<usize> {
        let length = self.resolve(index);
        let underflow = || Error::LengthUnderflow {
            field: field.name().to_owned(),
            length: length.as_u64().unwrap_or_default(),
        };
        let size = length
            .as_u64()
            .and_then(|length| usize::try_from(length).ok())
            .ok_or_else(underflow)?;
        if !field.is_inclusive() {
            return Ok(size);
        }
        field
            .kind()
            .fixed_width()
            .and_then(|width| size.checked_sub(width))
            .ok_or_else(underflow)
    }

    fn patch(&mut self, index: usize, field: &FieldDescriptor, ser: &mut Serializer) -> Result<()> {
        let (Some(start), FieldKind::LengthPrefix(format)) = (self.markers[index].take(), field.kind())
        else {
            return Err(Error::custom(format!(
                "`{}` is not a length prefix being written",
                field.name()
            )));
        };
        let width = format.width().bytes();
        let reserved = if field.is_inclusive() { 0 } else { width };
        let size = ser.position() - start - reserved;
        let encoded = u64::try_from(size)
            .ok()
            .and_then(|size| format.encode(&Value::Unsigned(size)))
            .ok_or_else(|| Error::LengthOverflow {
                field: field.name().to_owned(),
                format,
                length: size,
            })?;
        ser.write_to(start..start + width, encoded.as_slice())?;
        trace!(field = %field.name(), start, size, "patched length prefix");
        self.values[index] = format.decode(encoded.as_slice());
        Ok(())
    }

    fn resolve(&self, index: usize) -> Value {
        let field = &self.schema.fields()[index];
        match field.mutability() {
            Mutability::Always(resolver) => resolver.resolve(),
            Mutability::Default(resolver) => self.values[index]
                .clone()
                .unwrap_or_else(|| self.defaults[index].get_or_init(|| resolver.resolve()).clone()),
            Mutability::Free => self.values[index]
                .clone()
                .unwrap_or_else(|| field.kind().zero()),
        }
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.schema
            .position(name)
            .ok_or_else(|| Error::UnknownField(name.to_owned()))
    }
}

impl std::fmt::Display for Message {
    /// Formats the message as `<TypeName field=value field=value ...>`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}", self.schema.name())?;
        for (index, field) in self.schema.fields().iter().enumerate() {
            write!(f, " {}={}", field.name(), self.resolve(index))?;
        }
        write!(f, ">")
    }
}
