use super::{
    FieldDescriptor, FieldKind, FieldOptions, MessageReader, MessageType, Mutability, Phase, Step,
};
use crate::codec::{Deserializer, WireFormat};
use crate::{Error, Message, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

#[cfg(test)]
mod tests;

/// Declares the fields of a message type.
///
/// Every declarator appends one field, and returns the builder again so declarations can be
/// chained with `?`. Once [`Builder::finalize`] is called the builder is locked, and further
/// declarations fail with [`Error::Finalized`].
///
/// # Examples
///
/// ```rust
/// use wirestruct::{FieldOptions, MessageType, WireFormat, readers};
///
/// let mut builder = MessageType::builder("Record");
/// builder
///     .scalar("id", WireFormat::INT32LE, FieldOptions::new().default_value(7))?
///     .stringz("tag", FieldOptions::new().reader(readers::stringz()))?;
/// let record = builder.finalize()?;
///
/// assert_eq!(record.instance().to_bytes()?[..], [0x07u8, 0x00, 0x00, 0x00, 0x00]);
/// assert!(builder.scalar("late", WireFormat::UINT8, FieldOptions::new()).is_err());
/// # Ok::<(), wirestruct::Error>(())
/// ```
pub struct Builder {
    name: String,
    fields: Vec<FieldDescriptor>,
    steps: Vec<Step>,
    inherited: HashSet<String>,
    reader: Option<MessageReader>,
    require_readers: bool,
    finalized: bool,
    open_groups: usize,
}

impl Builder {
    /// Creates a builder for a type without any fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(name.into(), Vec::new(), Vec::new(), None)
    }

    pub(crate) fn from_parts(
        name: String,
        fields: Vec<FieldDescriptor>,
        steps: Vec<Step>,
        reader: Option<MessageReader>,
    ) -> Self {
        let inherited = fields.iter().map(|field| field.name().to_owned()).collect();
        Self {
            name,
            fields,
            steps,
            inherited,
            reader,
            require_readers: false,
            finalized: false,
            open_groups: 0,
        }
    }

    /// Starts the declaration of a subtype from the fields declared so far.
    ///
    /// The subtype gets an independent copy: fields declared on `self` afterwards do not show up
    /// in the subtype, and the other way around.
    ///
    /// # Errors
    ///
    /// Returns an error if called from inside [`Builder::length_prefixed`], where the copy would
    /// hold an unterminated length prefix.
    pub fn derive(&self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if self.open_groups > 0 {
            return Err(Error::InvalidDeclaration {
                field: name,
                reason: "cannot derive a type while a length prefix is open",
            });
        }
        let mut builder =
            Self::from_parts(name, self.fields.clone(), self.steps.clone(), self.reader.clone());
        builder.require_readers = self.require_readers;
        Ok(builder)
    }

    /// Returns the name of the type being declared.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields declared so far.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the serialization steps declared so far.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns `true` once [`Builder::finalize`] has been called.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Declares a scalar field in the given wire format.
    ///
    /// With [`FieldOptions::array`] the field holds a sequence of scalars instead, as declared by
    /// [`Builder::array`].
    ///
    /// # Errors
    ///
    /// Returns an error if the type is finalized, the name is taken, or the options conflict.
    pub fn scalar(
        &mut self,
        name: impl Into<String>,
        format: WireFormat,
        options: FieldOptions,
    ) -> Result<&mut Self> {
        let kind = if options.array {
            FieldKind::Array(format)
        } else {
            FieldKind::Scalar(format)
        };
        self.declare(name.into(), kind, options)
    }

    /// Declares a field holding a sequence of scalars in the given wire format.
    ///
    /// Elements are written back to back, without a count. Arrays cannot be deserialized unless
    /// a reader is supplied with [`FieldOptions::reader`].
    ///
    /// # Errors
    ///
    /// Returns an error if the type is finalized, the name is taken, or the options conflict.
    pub fn array(
        &mut self,
        name: impl Into<String>,
        format: WireFormat,
        options: FieldOptions,
    ) -> Result<&mut Self> {
        self.declare(name.into(), FieldKind::Array(format), options)
    }

    /// Declares a field holding raw bytes, written verbatim.
    ///
    /// Strings cannot be deserialized unless a reader is supplied with [`FieldOptions::reader`].
    ///
    /// # Errors
    ///
    /// Returns an error if the type is finalized, the name is taken, or the options conflict.
    pub fn string(&mut self, name: impl Into<String>, options: FieldOptions) -> Result<&mut Self> {
        self.declare(name.into(), FieldKind::String, options)
    }

    /// Declares a field holding raw bytes, written verbatim and followed by a zero byte.
    ///
    /// Strings cannot be deserialized unless a reader is supplied with [`FieldOptions::reader`].
    ///
    /// # Errors
    ///
    /// Returns an error if the type is finalized, the name is taken, or the options conflict.
    pub fn stringz(&mut self, name: impl Into<String>, options: FieldOptions) -> Result<&mut Self> {
        self.declare(name.into(), FieldKind::StringZ, options)
    }

    /// Declares an integer field holding the size of the fields declared by `inner`.
    ///
    /// The fields declared by `inner` are part of this type, and follow the length prefix both on
    /// the wire and in [`MessageType::fields`]. When serializing, the prefix is first reserved as
    /// zero bytes, and overwritten with the size of the inner fields once they have been
    /// written. The size excludes the prefix itself, unless [`FieldOptions::inclusive`] is set.
    ///
    /// When deserializing, the inner fields are confined to the size read from the prefix.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::{FieldOptions, MessageType, WireFormat};
    ///
    /// let mut builder = MessageType::builder("Frame");
    /// builder.length_prefixed("size", WireFormat::UINT8, FieldOptions::new().inclusive(), |inner| {
    ///     inner.scalar("a", WireFormat::UINT16LE, FieldOptions::new().always(1u16))?;
    ///     Ok(())
    /// })?;
    /// let frame = builder.finalize()?;
    /// assert_eq!(frame.instance().to_bytes()?[..], [0x03u8, 0x01, 0x00]);
    /// # Ok::<(), wirestruct::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the type is finalized, the name is taken, the format is not an integer,
    /// the options conflict, or `inner` fails.
    pub fn length_prefixed<F>(
        &mut self,
        name: impl Into<String>,
        format: WireFormat,
        options: FieldOptions,
        inner: F,
    ) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let name = name.into();
        if !format.is_integer() {
            return Err(invalid(name, "a length prefix needs an integer format"));
        }
        if options.always.is_some() {
            return Err(invalid(name, "a length prefix cannot be always computed"));
        }
        let snapshot = (self.fields.clone(), self.steps.clone(), self.inherited.clone());
        let index = self.declare(name, FieldKind::LengthPrefix(format), options)?.fields.len() - 1;
        let mark = self.steps.len() - 1;
        self.steps.insert(mark, Step::new(index, Phase::Before));

        self.open_groups += 1;
        let result = inner(self);
        self.open_groups -= 1;
        if let Err(err) = result {
            (self.fields, self.steps, self.inherited) = snapshot;
            return Err(err);
        }

        let group = self.fields.len() - index - 1;
        self.fields[index].set_group(group);
        self.steps.push(Step::new(index, Phase::After));
        Ok(self)
    }

    /// Installs a reader which replaces per-field deserialization for the whole message.
    ///
    /// The reader can still fall back to the per-field readers with [`Message::read_fields`].
    /// Subtypes inherit it.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is finalized.
    pub fn reader<F>(&mut self, reader: F) -> Result<&mut Self>
    where
        F: Fn(&mut Message, &mut Deserializer<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.ensure_open()?;
        self.reader = Some(Arc::new(reader));
        Ok(self)
    }

    /// Makes [`Builder::finalize`] fail while a string or array field has no reader.
    pub fn require_readers(&mut self) -> &mut Self {
        self.require_readers = true;
        self
    }

    /// Locks the declaration, and returns the finalized type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Finalized`] if called twice, and [`Error::NotImplemented`] if
    /// [`Builder::require_readers`] is set and a field has no reader.
    pub fn finalize(&mut self) -> Result<MessageType> {
        self.ensure_open()?;
        if self.open_groups > 0 {
            return Err(invalid(self.name.clone(), "cannot finalize inside a length prefix"));
        }
        if self.require_readers && self.reader.is_none() {
            if let Some(field) = self.fields.iter().find(|field| {
                !field.has_reader() && !matches!(field.mutability(), Mutability::Always(_))
            }) {
                return Err(Error::NotImplemented {
                    type_name: self.name.clone(),
                    field: field.name().to_owned(),
                    operation: "deserialize",
                });
            }
        }
        self.finalized = true;
        debug!(
            name = %self.name,
            fields = self.fields.len(),
            steps = self.steps.len(),
            "finalized message type"
        );
        Ok(MessageType::new(
            self.name.clone(),
            self.fields.clone(),
            self.steps.clone(),
            self.reader.clone(),
        ))
    }

    fn declare(&mut self, name: String, kind: FieldKind, options: FieldOptions) -> Result<&mut Self> {
        self.ensure_open()?;
        if options.inclusive && !matches!(kind, FieldKind::LengthPrefix(_)) {
            return Err(invalid(name, "only length prefixes can be inclusive"));
        }
        if options.array && matches!(kind, FieldKind::LengthPrefix(_)) {
            return Err(invalid(name, "a length prefix cannot be an array"));
        }
        let mutability = options.mutability(&name)?;
        if let Some(position) = self.position(&name) {
            self.redeclare(position, &name)?;
        }
        trace!(type_name = %self.name, field = %name, ?kind, "declared field");
        self.fields.push(FieldDescriptor::new(
            name,
            kind,
            mutability,
            options.inclusive,
            options.reader,
        ));
        self.steps.push(Step::new(self.fields.len() - 1, Phase::Write));
        Ok(self)
    }

    /// Removes an inherited field so it can be declared again.
    fn redeclare(&mut self, position: usize, name: &str) -> Result<()> {
        if !self.inherited.contains(name) {
            return Err(Error::DuplicateField(name.to_owned()));
        }
        if self.open_groups > 0 {
            return Err(invalid(
                name.to_owned(),
                "cannot re-declare an inherited field inside a length prefix",
            ));
        }
        if self.fields[position].is_length_prefix() {
            return Err(invalid(
                name.to_owned(),
                "cannot re-declare an inherited length prefix",
            ));
        }
        self.inherited.remove(name);
        for (index, field) in self.fields[..position].iter_mut().enumerate() {
            if index + field.group() >= position {
                field.shrink_group();
            }
        }
        self.fields.remove(position);
        self.steps.retain(|step| step.field() != position);
        self.steps
            .iter_mut()
            .filter(|step| step.field() > position)
            .for_each(Step::shift_down);
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name() == name)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finalized {
            Err(Error::Finalized(self.name.clone()))
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("steps", &self.steps)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

fn invalid(field: String, reason: &'static str) -> Error {
    Error::InvalidDeclaration { field, reason }
}
