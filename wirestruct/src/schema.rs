//! Message schemas.
//!
//! A schema is declared once with a [`Builder`] and frozen into a [`MessageType`] by
//! [`Builder::finalize`]. The frozen schema holds two ordered lists: the field descriptors, whose
//! order is the deserialization order, and the serialization steps. Plain fields contribute a
//! single [`Phase::Write`] step, while length prefixes contribute a [`Phase::Before`] step, a
//! [`Phase::Write`] step, the steps of the fields declared inside them, and a [`Phase::After`]
//! step which patches the prefix once the size of those fields is known.

use crate::codec::Deserializer;
use crate::{Message, Result};
use std::collections::HashMap;
use std::sync::Arc;

mod builder;
pub use builder::Builder;

mod field;
pub use field::{
    FieldDescriptor, FieldKind, FieldOptions, FieldReader, MessageReader, Mutability, Producer,
    Resolver,
};
pub(crate) use field::Reader;

#[cfg(test)]
mod tests;

/// Stage of the serialization of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Marks where a length prefix starts.
    Before,
    /// Writes the value of the field.
    Write,
    /// Patches a length prefix with the size of everything written since it started.
    After,
}

/// One unit of the serialization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    field: usize,
    phase: Phase,
}

impl Step {
    pub(crate) const fn new(field: usize, phase: Phase) -> Self {
        Self { field, phase }
    }

    /// Returns the index of the field this step belongs to.
    #[must_use]
    pub const fn field(self) -> usize {
        self.field
    }

    /// Returns the stage this step performs.
    #[must_use]
    pub const fn phase(self) -> Phase {
        self.phase
    }

    pub(crate) fn shift_down(&mut self) {
        self.field -= 1;
    }
}

struct Schema {
    name: String,
    fields: Box<[FieldDescriptor]>,
    steps: Box<[Step]>,
    index: HashMap<String, usize>,
    reader: Option<MessageReader>,
}

/// A finalized message schema.
///
/// Cloning a [`MessageType`] is cheap, and the schema can be shared between threads. Messages are
/// created with [`MessageType::instance`] or [`MessageType::deserialize`].
///
/// # Examples
///
/// ```rust
/// use wirestruct::{FieldOptions, MessageType, WireFormat};
///
/// let mut builder = MessageType::builder("Greeting");
/// builder.length_prefixed("length", WireFormat::UINT16BE, FieldOptions::new(), |inner| {
///     inner.stringz("name", FieldOptions::new())?;
///     Ok(())
/// })?;
/// let greeting = builder.finalize()?;
///
/// let mut message = greeting.instance();
/// message.set("name", "ab")?;
/// assert_eq!(message.to_bytes()?[..], [0x00u8, 0x03, 0x61, 0x62, 0x00]);
/// assert_eq!(message.to_string(), "<Greeting length=3 name=\"ab\">");
/// # Ok::<(), wirestruct::Error>(())
/// ```
#[derive(Clone)]
pub struct MessageType(Arc<Schema>);

impl MessageType {
    /// Starts the declaration of a new message type.
    pub fn builder(name: impl Into<String>) -> Builder {
        Builder::new(name)
    }

    pub(crate) fn new(
        name: String,
        fields: Vec<FieldDescriptor>,
        steps: Vec<Step>,
        reader: Option<MessageReader>,
    ) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(position, field)| (field.name().to_owned(), position))
            .collect();
        Self(Arc::new(Schema {
            name,
            fields: fields.into_boxed_slice(),
            steps: steps.into_boxed_slice(),
            index,
            reader,
        }))
    }

    /// Starts the declaration of a subtype.
    ///
    /// The subtype starts out with a copy of every field of `self`, and may re-declare any of
    /// them, which moves them after the fields declared before the re-declaration.
    pub fn extend(&self, name: impl Into<String>) -> Builder {
        Builder::from_parts(
            name.into(),
            self.0.fields.to_vec(),
            self.0.steps.to_vec(),
            self.0.reader.clone(),
        )
    }

    /// Returns the name of the type.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the fields of the type, in deserialization order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.0.fields
    }

    /// Returns the serialization steps of the type, in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.0.steps
    }

    /// Returns the field with the given name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.position(name).map(|position| &self.0.fields[position])
    }

    /// Returns `true` if a whole-message reader replaces per-field deserialization.
    #[must_use]
    pub fn has_custom_reader(&self) -> bool {
        self.0.reader.is_some()
    }

    /// Creates a blank message of this type.
    #[must_use]
    pub fn instance(&self) -> Message {
        Message::new(self.clone())
    }

    /// Creates a message of this type, and deserializes it from `buffer`.
    ///
    /// Bytes after the end of the message are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if deserializing any of the fields fails.
    pub fn deserialize(&self, buffer: &[u8]) -> Result<Message> {
        let mut message = self.instance();
        message.deserialize(buffer)?;
        Ok(message)
    }

    /// Creates a message of this type, and reads it from the deserializer.
    ///
    /// # Errors
    ///
    /// Returns an error if deserializing any of the fields fails.
    pub fn read_from(&self, de: &mut Deserializer) -> Result<Message> {
        let mut message = self.instance();
        message.read_from(de)?;
        Ok(message)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.0.index.get(name).copied()
    }

    pub(crate) fn reader(&self) -> Option<&MessageReader> {
        self.0.reader.as_ref()
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MessageType {}

impl std::fmt::Debug for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageType")
            .field("name", &self.0.name)
            .field("fields", &self.0.fields)
            .field("steps", &self.0.steps)
            .finish_non_exhaustive()
    }
}
