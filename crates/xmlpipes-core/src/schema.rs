//! Index schema: full-text fields and typed attributes.
//!
//! The schema is declared once per [`Index`](crate::Index) and is embedded
//! as the preamble of every exported document-set. Declaration order matters:
//! it is the order of the `<sphinx:field>`/`<sphinx:attr>` elements and of
//! the per-document elements.
//!
//! # Attribute Types
//!
//! | Method | Wire type | Extra |
//! |--------|-----------|-------|
//! | [`Schema::boolean`] | `bool` | |
//! | [`Schema::integer`] | `int` | `bits` in `1..=32` |
//! | [`Schema::float`] | `float` | |
//! | [`Schema::timestamp`] | `timestamp` | |
//! | [`Schema::multi`] | `multi` | |
//! | [`Schema::ordinal`] | `str2ordinal` | |
//!
//! The first attribute of every schema is the internal class tag
//! ([`CLASS_TAG_ATTRIBUTE`]), added automatically.

use std::fmt;
use std::str::FromStr;

use crate::cast::{self, DEFAULT_INT_BITS};
use crate::error::{Error, Result};
use crate::value::Value;

/// Name of the internal attribute holding the owning type's class tag.
pub const CLASS_TAG_ATTRIBUTE: &str = "xmlpipes_class_crc";

/// Attribute types understood by the daemon's xmlpipe2 source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// Boolean (`0`/`1`).
    Bool,
    /// Unsigned integer with configurable width.
    Int,
    /// Floating point.
    Float,
    /// UNIX timestamp.
    Timestamp,
    /// Multi-valued integer list.
    Multi,
    /// String sorted by ordinal.
    Ordinal,
}

impl AttributeType {
    /// Wire name of the type, as written to `<sphinx:attr type="...">`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Bool => "bool",
            AttributeType::Int => "int",
            AttributeType::Float => "float",
            AttributeType::Timestamp => "timestamp",
            AttributeType::Multi => "multi",
            AttributeType::Ordinal => "str2ordinal",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bool" | "boolean" => Ok(AttributeType::Bool),
            "int" | "integer" => Ok(AttributeType::Int),
            "float" => Ok(AttributeType::Float),
            "timestamp" => Ok(AttributeType::Timestamp),
            "multi" => Ok(AttributeType::Multi),
            "str2ordinal" | "ordinal" => Ok(AttributeType::Ordinal),
            other => Err(Error::invalid_attribute(
                other,
                format!("unknown attribute type '{other}'"),
            )),
        }
    }
}

/// A full-text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
}

impl Field {
    /// Create a field.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Field name, also the element name in exported documents.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Options accepted when declaring an attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeOptions {
    /// Default value used when a document omits the attribute.
    pub default: Option<Value>,
    /// Width of an integer attribute (ignored for other types).
    pub bits: Option<u32>,
}

impl AttributeOptions {
    /// Options with no default and default width.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the integer width.
    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = Some(bits);
        self
    }
}

/// A typed attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    kind: AttributeType,
    bits: Option<u32>,
    default: Option<Value>,
}

impl Attribute {
    /// Declare an attribute, casting its default immediately.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAttribute`] if an integer width is outside `1..=32`
    /// - [`Error::Cast`] / [`Error::Range`] if the default cannot be cast
    pub fn new(name: impl Into<String>, kind: AttributeType, options: AttributeOptions) -> Result<Self> {
        let name = name.into();

        let bits = match kind {
            AttributeType::Int => {
                let bits = options.bits.unwrap_or(DEFAULT_INT_BITS);
                if !(1..=DEFAULT_INT_BITS).contains(&bits) {
                    return Err(Error::invalid_attribute(
                        name,
                        format!("bits must be within 1..={DEFAULT_INT_BITS}, got {bits}"),
                    ));
                }
                Some(bits)
            }
            _ => None,
        };

        let mut attribute = Self {
            name,
            kind,
            bits,
            default: None,
        };
        if let Some(default) = options.default {
            attribute.default = Some(attribute.cast(&default)?);
        }
        Ok(attribute)
    }

    /// The internal class-tag attribute (32-bit integer).
    pub fn class_tag() -> Self {
        Self {
            name: CLASS_TAG_ATTRIBUTE.to_string(),
            kind: AttributeType::Int,
            bits: Some(DEFAULT_INT_BITS),
            default: None,
        }
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute type.
    pub fn kind(&self) -> AttributeType {
        self.kind
    }

    /// Integer width (`Some` only for integer attributes).
    pub fn bits(&self) -> Option<u32> {
        self.bits
    }

    /// Declared default, already cast.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether this is the internal class-tag attribute.
    pub fn is_class_tag(&self) -> bool {
        self.name == CLASS_TAG_ATTRIBUTE
    }

    /// Cast a value through the caster matching this attribute's type.
    pub fn cast(&self, value: &Value) -> Result<Value> {
        Ok(match self.kind {
            AttributeType::Bool => Value::Int(cast::bool(value)),
            AttributeType::Int => Value::Int(cast::int(
                value,
                self.bits.unwrap_or(DEFAULT_INT_BITS),
                false,
            )?),
            AttributeType::Float => Value::Float(cast::float(value)?),
            AttributeType::Timestamp => Value::Int(cast::timestamp(value)?),
            AttributeType::Multi => Value::Str(cast::multi(value)?),
            AttributeType::Ordinal => Value::Str(cast::ordinal(value)),
        })
    }
}

/// Ordered fields and attributes of one index.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
    attributes: Vec<Attribute>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// Create an empty schema holding only the class-tag attribute.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            attributes: vec![Attribute::class_tag()],
        }
    }

    /// Declare a full-text field.
    pub fn field(&mut self, name: impl Into<String>) -> &mut Self {
        self.fields.push(Field::new(name));
        self
    }

    /// Alias of [`Schema::field`].
    pub fn indexes(&mut self, name: impl Into<String>) -> &mut Self {
        self.field(name)
    }

    /// Declare a boolean attribute.
    pub fn boolean(&mut self, name: impl Into<String>, options: AttributeOptions) -> Result<&mut Self> {
        self.attribute(name, AttributeType::Bool, options)
    }

    /// Declare an integer attribute.
    pub fn integer(&mut self, name: impl Into<String>, options: AttributeOptions) -> Result<&mut Self> {
        self.attribute(name, AttributeType::Int, options)
    }

    /// Declare a float attribute.
    pub fn float(&mut self, name: impl Into<String>, options: AttributeOptions) -> Result<&mut Self> {
        self.attribute(name, AttributeType::Float, options)
    }

    /// Declare a timestamp attribute.
    pub fn timestamp(&mut self, name: impl Into<String>, options: AttributeOptions) -> Result<&mut Self> {
        self.attribute(name, AttributeType::Timestamp, options)
    }

    /// Declare a multi-value attribute.
    pub fn multi(&mut self, name: impl Into<String>, options: AttributeOptions) -> Result<&mut Self> {
        self.attribute(name, AttributeType::Multi, options)
    }

    /// Declare an ordinal (`str2ordinal`) attribute.
    pub fn ordinal(&mut self, name: impl Into<String>, options: AttributeOptions) -> Result<&mut Self> {
        self.attribute(name, AttributeType::Ordinal, options)
    }

    /// Declare an attribute whose type is only known as a string.
    pub fn attribute_of_type(
        &mut self,
        name: impl Into<String>,
        kind: &str,
        options: AttributeOptions,
    ) -> Result<&mut Self> {
        let kind = kind.parse()?;
        self.attribute(name, kind, options)
    }

    /// Declare an attribute of the given type.
    pub fn attribute(
        &mut self,
        name: impl Into<String>,
        kind: AttributeType,
        options: AttributeOptions,
    ) -> Result<&mut Self> {
        self.attributes.push(Attribute::new(name, kind, options)?);
        Ok(self)
    }

    /// Declared fields, in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// All attributes, class tag first.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// User-declared attributes (everything but the class tag).
    pub fn declared_attributes(&self) -> &[Attribute] {
        &self.attributes[1..]
    }

    /// Look up an attribute by name.
    pub fn attribute_named(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

// ============================================================================
// Tests
// ============================================================================
