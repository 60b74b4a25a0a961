//! Field descriptors and the shapes a field can be declared in.

use crate::validation::Validator;
use keel_mask::PropertyMask;
use keel_store::Record;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Reads a field from (possibly restricted) record data.
pub type Getter = Arc<dyn Fn(&Record) -> Option<Value> + Send + Sync>;
/// Writes a field into record data.
pub type Setter = Arc<dyn Fn(&mut Record, Value) + Send + Sync>;
/// Merges an external field entry into property-keyed data.
pub type Translator = Arc<dyn Fn(&mut Record, Value) + Send + Sync>;

/// Static capabilities of a locally defined field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub readable: bool,
    pub writable: bool,
}

/// How a field reads, writes, translates and validates its value.
///
/// A descriptor without [`requires`](Self::requires) is dependency-opaque: any
/// dependency computation that covers it resolves to `None`.
#[derive(Clone, Default)]
pub struct FieldDescriptor {
    pub(crate) getter: Option<Getter>,
    pub(crate) setter: Option<Setter>,
    pub(crate) translate: Option<Translator>,
    pub(crate) validators: Vec<Validator>,
    pub(crate) requires: Option<PropertyMask>,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A read-only field with a fixed value and no dependencies.
    #[must_use]
    pub fn constant(value: Value) -> Self {
        Self::new().getter(move |_| Some(value.clone())).requires(PropertyMask::empty())
    }

    #[must_use]
    pub fn getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Record) -> Option<Value> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }

    #[must_use]
    pub fn setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut Record, Value) + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    #[must_use]
    pub fn translate<F>(mut self, translate: F) -> Self
    where
        F: Fn(&mut Record, Value) + Send + Sync + 'static,
    {
        self.translate = Some(Arc::new(translate));
        self
    }

    /// Validators run in registration order.
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// The storage properties the getter and setter need present.
    #[must_use]
    pub fn requires(mut self, properties: impl Into<PropertyMask>) -> Self {
        self.requires = Some(properties.into());
        self
    }

    #[must_use]
    pub const fn info(&self) -> FieldInfo {
        FieldInfo { readable: self.getter.is_some(), writable: self.setter.is_some() }
    }

    #[must_use]
    pub const fn requirements(&self) -> Option<&PropertyMask> {
        self.requires.as_ref()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("readable", &self.getter.is_some())
            .field("writable", &self.setter.is_some())
            .field("translatable", &self.translate.is_some())
            .field("validators", &self.validators)
            .field("requires", &self.requires)
            .finish()
    }
}

/// A field mapped straight onto one storage property.
///
/// The property defaults to the field's own name. Reads return the stored value, or
/// the declared default when it is missing or null. A field that is both readable
/// and writable also translates entries straight through.
#[derive(Debug, Clone)]
pub struct AliasField {
    property: Option<String>,
    readable: bool,
    writable: bool,
    default: Option<Value>,
    validators: Vec<Validator>,
}

impl Default for AliasField {
    fn default() -> Self {
        Self { property: None, readable: true, writable: true, default: None, validators: Vec::new() }
    }
}

impl AliasField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    #[must_use]
    pub const fn readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }

    #[must_use]
    pub const fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub(crate) fn into_descriptor(self, field: &str) -> FieldDescriptor {
        let property = self.property.unwrap_or_else(|| field.to_owned());
        let mut descriptor = FieldDescriptor::new()
            .requires(PropertyMask::from(property.as_str()))
            .validators(self.validators);

        if self.readable {
            let (property, default) = (property.clone(), self.default);
            descriptor = descriptor.getter(move |data| {
                data.get(&property).filter(|value| !value.is_null()).cloned().or_else(|| default.clone())
            });
        }
        if self.writable {
            let property = property.clone();
            descriptor = descriptor.setter(move |data, value| {
                data.insert(property.clone(), value);
            });
        }
        if self.readable && self.writable {
            descriptor = descriptor.translate(move |data, value| {
                data.insert(property.clone(), value);
            });
        }
        descriptor
    }
}

/// Anything that can produce a descriptor on registration.
pub trait IntoFieldDescriptor: Send + Sync {
    fn into_field_descriptor(self: Box<Self>) -> FieldDescriptor;
}

/// The declaration shapes accepted by [`Model::add_field`](crate::Model::add_field),
/// resolved into one [`FieldDescriptor`] at registration time.
pub enum FieldSpec {
    /// A read-only constant with no dependencies.
    Constant(Value),
    Alias(AliasField),
    Descriptor(FieldDescriptor),
    Convertible(Box<dyn IntoFieldDescriptor>),
}

impl FieldSpec {
    pub fn convertible(source: impl IntoFieldDescriptor + 'static) -> Self {
        Self::Convertible(Box::new(source))
    }

    pub(crate) fn resolve(self, field: &str) -> FieldDescriptor {
        match self {
            Self::Constant(value) => FieldDescriptor::constant(value),
            Self::Alias(alias) => alias.into_descriptor(field),
            Self::Descriptor(descriptor) => descriptor,
            Self::Convertible(source) => source.into_field_descriptor(),
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Alias(alias) => f.debug_tuple("Alias").field(alias).finish(),
            Self::Descriptor(descriptor) => f.debug_tuple("Descriptor").field(descriptor).finish(),
            Self::Convertible(_) => f.write_str("Convertible(..)"),
        }
    }
}

impl From<Value> for FieldSpec {
    fn from(value: Value) -> Self {
        Self::Constant(value)
    }
}

impl From<AliasField> for FieldSpec {
    fn from(alias: AliasField) -> Self {
        Self::Alias(alias)
    }
}

impl From<FieldDescriptor> for FieldSpec {
    fn from(descriptor: FieldDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<Box<dyn IntoFieldDescriptor>> for FieldSpec {
    fn from(source: Box<dyn IntoFieldDescriptor>) -> Self {
        Self::Convertible(source)
    }
}
