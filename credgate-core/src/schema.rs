//! Type descriptors and the schema registry.
//!
//! Descriptors are serde-serializable so a registry can be exported to, or
//! built from, a JSON IDL document (see [`crate::idl`]).

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::idl::CodecIdl;
use crate::instruction::KnownType;
use crate::primitive::{LengthPrefix, PrimitiveType};

/// Maximum number of variants a one-byte discriminant can address.
pub const MAX_VARIANTS: usize = 256;

/// Type of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldType {
    Primitive(PrimitiveType),
    Option {
        option: Box<FieldType>,
    },
    Vec {
        vec: Box<FieldType>,
        #[serde(default, skip_serializing_if = "LengthPrefix::is_default")]
        prefix: LengthPrefix,
    },
    Array {
        array: (Box<FieldType>, usize),
    },
    Defined {
        defined: String,
    },
}

impl FieldType {
    pub fn option(inner: FieldType) -> Self {
        FieldType::Option {
            option: Box::new(inner),
        }
    }

    pub fn vec(elem: FieldType, prefix: LengthPrefix) -> Self {
        FieldType::Vec {
            vec: Box::new(elem),
            prefix,
        }
    }

    pub fn array(elem: FieldType, len: usize) -> Self {
        FieldType::Array {
            array: (Box::new(elem), len),
        }
    }

    pub fn defined(name: impl Into<String>) -> Self {
        FieldType::Defined {
            defined: name.into(),
        }
    }
}

impl From<PrimitiveType> for FieldType {
    fn from(p: PrimitiveType) -> Self {
        FieldType::Primitive(p)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(p) => write!(f, "{}", p),
            FieldType::Option { option } => write!(f, "Option<{}>", option),
            FieldType::Vec { vec, prefix } if prefix.is_default() => write!(f, "Vec<{}>", vec),
            FieldType::Vec { vec, prefix } => {
                write!(f, "Vec<{}, {}>", vec, prefix_name(*prefix))
            }
            FieldType::Array { array } => write!(f, "[{}; {}]", array.0, array.1),
            FieldType::Defined { defined } => f.write_str(defined),
        }
    }
}

fn prefix_name(prefix: LengthPrefix) -> &'static str {
    match prefix {
        LengthPrefix::U8 => "u8",
        LengthPrefix::U16 => "u16",
        LengthPrefix::U32 => "u32",
    }
}

/// A named field in a struct or variant payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

/// Shorthand for building a [`FieldDef`].
pub fn field(name: impl Into<String>, ty: impl Into<FieldType>) -> FieldDef {
    FieldDef {
        name: name.into(),
        ty: ty.into(),
    }
}

/// A union variant and its payload fields (possibly none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
}

/// Descriptor for a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDescriptor {
    Struct { fields: Vec<FieldDef> },
    Union { variants: Vec<VariantDef> },
}

impl TypeDescriptor {
    pub fn structure(fields: impl IntoIterator<Item = FieldDef>) -> Self {
        TypeDescriptor::Struct {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn union<S: Into<String>>(
        variants: impl IntoIterator<Item = (S, Vec<FieldDef>)>,
    ) -> Self {
        TypeDescriptor::Union {
            variants: variants
                .into_iter()
                .map(|(name, fields)| VariantDef {
                    name: name.into(),
                    fields,
                })
                .collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TypeDescriptor::Struct { .. } => "struct",
            TypeDescriptor::Union { .. } => "union",
        }
    }
}

/// A registered type: name plus descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    #[serde(flatten)]
    pub descriptor: TypeDescriptor,
}

/// Append-only table of type descriptors.
///
/// Built once during start-up and then shared immutably: the
/// [`Codec`](crate::codec::Codec) borrows it, so no registration can
/// happen while encoders or decoders are alive. A type may only reference
/// types registered before it, which rules out recursive layouts.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: Vec<NamedType>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`KnownType`], in declaration order.
    pub fn with_known_types() -> CodecResult<Self> {
        let mut registry = Self::new();
        for known in KnownType::ALL {
            registry.register(known.name(), known.descriptor())?;
        }
        Ok(registry)
    }

    /// Build a registry from the types of an IDL document, in order.
    pub fn from_idl(idl: &CodecIdl) -> CodecResult<Self> {
        let mut registry = Self::new();
        for ty in &idl.types {
            registry.register(ty.name.clone(), ty.descriptor.clone())?;
        }
        Ok(registry)
    }

    /// Export every registered type into an IDL document.
    pub fn to_idl(&self, name: impl Into<String>) -> CodecIdl {
        let mut idl = CodecIdl::new(name);
        idl.types = self.types.clone();
        idl
    }

    /// Register a descriptor under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        descriptor: TypeDescriptor,
    ) -> CodecResult<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(CodecError::DuplicateType { name });
        }
        self.validate(&name, &descriptor)?;

        tracing::debug!(
            name = %name,
            kind = descriptor.kind(),
            position = self.types.len(),
            "registered type"
        );
        self.index.insert(name.clone(), self.types.len());
        self.types.push(NamedType { name, descriptor });
        Ok(())
    }

    fn validate(&self, name: &str, descriptor: &TypeDescriptor) -> CodecResult<()> {
        let invalid = |message: String| CodecError::InvalidDescriptor {
            name: name.to_string(),
            message,
        };
        match descriptor {
            TypeDescriptor::Struct { fields } => self.validate_fields(name, fields),
            TypeDescriptor::Union { variants } => {
                if variants.is_empty() {
                    return Err(invalid("union has no variants".to_string()));
                }
                if variants.len() > MAX_VARIANTS {
                    return Err(invalid(format!(
                        "{} variants do not fit a one-byte discriminant",
                        variants.len()
                    )));
                }
                let mut seen = HashSet::new();
                for variant in variants {
                    if !seen.insert(variant.name.as_str()) {
                        return Err(invalid(format!("duplicate variant '{}'", variant.name)));
                    }
                    self.validate_fields(name, &variant.fields)?;
                }
                Ok(())
            }
        }
    }

    fn validate_fields(&self, name: &str, fields: &[FieldDef]) -> CodecResult<()> {
        let mut seen = HashSet::new();
        for f in fields {
            if !seen.insert(f.name.as_str()) {
                return Err(CodecError::InvalidDescriptor {
                    name: name.to_string(),
                    message: format!("duplicate field '{}'", f.name),
                });
            }
            self.validate_field_type(name, &f.ty)?;
        }
        self.fields_min_size(fields).map(|_| ())
    }

    fn validate_field_type(&self, name: &str, ty: &FieldType) -> CodecResult<()> {
        match ty {
            FieldType::Primitive(_) => Ok(()),
            FieldType::Option { option } => self.validate_field_type(name, option),
            FieldType::Vec { vec: elem, .. } | FieldType::Array { array: (elem, _) } => {
                self.validate_field_type(name, elem)?;
                // Zero-sized elements would let a short buffer declare any count.
                if self.field_min_size(elem)? == 0 {
                    return Err(CodecError::InvalidDescriptor {
                        name: name.to_string(),
                        message: format!("collection element {} encodes to zero bytes", elem),
                    });
                }
                self.field_min_size(ty).map(|_| ())
            }
            FieldType::Defined { defined } => self.get(defined).map(|_| ()),
        }
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> CodecResult<&TypeDescriptor> {
        self.index
            .get(name)
            .map(|&idx| &self.types[idx].descriptor)
            .ok_or_else(|| CodecError::unknown_type(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered type names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Smallest number of bytes any value of `name` encodes to.
    pub fn min_size(&self, name: &str) -> CodecResult<usize> {
        match self.get(name)? {
            TypeDescriptor::Struct { fields } => self.fields_min_size(fields),
            TypeDescriptor::Union { variants } => {
                let mut smallest = usize::MAX;
                for variant in variants {
                    smallest = smallest.min(self.fields_min_size(&variant.fields)?);
                }
                smallest.checked_add(1).ok_or_else(|| size_overflow(name))
            }
        }
    }

    fn fields_min_size(&self, fields: &[FieldDef]) -> CodecResult<usize> {
        fields
            .iter()
            .try_fold(0usize, |acc, f| -> CodecResult<usize> {
                acc.checked_add(self.field_min_size(&f.ty)?)
                    .ok_or_else(|| size_overflow(&f.name))
            })
    }

    /// Smallest encoding of a single field of type `ty`.
    pub fn field_min_size(&self, ty: &FieldType) -> CodecResult<usize> {
        Ok(match ty {
            FieldType::Primitive(p) => p.static_size(),
            FieldType::Option { .. } => 1,
            FieldType::Vec { prefix, .. } => prefix.size(),
            FieldType::Array { array } => array
                .1
                .checked_mul(self.field_min_size(&array.0)?)
                .ok_or_else(|| size_overflow(&ty.to_string()))?,
            FieldType::Defined { defined } => self.min_size(defined)?,
        })
    }
}

fn size_overflow(name: &str) -> CodecError {
    CodecError::InvalidDescriptor {
        name: name.to_string(),
        message: "encoded size overflows usize".to_string(),
    }
}
