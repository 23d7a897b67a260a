//! Dynamic values encoded and decoded by the schema engine.

use std::fmt;

use crate::error::{CodecError, CodecResult};
use crate::primitive::{Identifier, Primitive};

/// Ordered `(field name, value)` pairs. Order is encoding order.
pub type Fields = Vec<(String, Value)>;

/// A value tree matching some registered descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Primitive(Primitive),
    Option(Option<Box<Value>>),
    /// Elements of a collection or fixed array.
    List(Vec<Value>),
    Struct(StructValue),
    Union(UnionValue),
}

/// A struct value carrying the name of its registered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructValue {
    pub ty: String,
    pub fields: Fields,
}

/// A tagged-union value: exactly one active variant and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionValue {
    pub ty: String,
    pub variant: String,
    pub fields: Fields,
}

impl Value {
    pub fn none() -> Self {
        Value::Option(None)
    }

    pub fn some(value: impl Into<Value>) -> Self {
        Value::Option(Some(Box::new(value.into())))
    }

    pub fn from_option<T: Into<Value>>(value: Option<T>) -> Self {
        Value::Option(value.map(|v| Box::new(v.into())))
    }

    /// Short description of the value's shape, used in error messages.
    pub fn kind(&self) -> String {
        match self {
            Value::Primitive(p) => p.ty().to_string(),
            Value::Option(_) => "option".to_string(),
            Value::List(items) => format!("list of {}", items.len()),
            Value::Struct(s) => format!("struct {}", s.ty),
            Value::Union(u) => format!("union {}", u.ty),
        }
    }

    pub fn into_primitive(self) -> CodecResult<Primitive> {
        match self {
            Value::Primitive(p) => Ok(p),
            other => Err(CodecError::mismatch("primitive", other.kind())),
        }
    }

    pub fn into_option(self) -> CodecResult<Option<Value>> {
        match self {
            Value::Option(inner) => Ok(inner.map(|b| *b)),
            other => Err(CodecError::mismatch("option", other.kind())),
        }
    }

    pub fn into_list(self) -> CodecResult<Vec<Value>> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(CodecError::mismatch("list", other.kind())),
        }
    }

    pub fn into_struct(self) -> CodecResult<StructValue> {
        match self {
            Value::Struct(s) => Ok(s),
            other => Err(CodecError::mismatch("struct", other.kind())),
        }
    }

    pub fn into_union(self) -> CodecResult<UnionValue> {
        match self {
            Value::Union(u) => Ok(u),
            other => Err(CodecError::mismatch("union", other.kind())),
        }
    }

    /// Fixed-length byte array contents.
    pub fn into_bytes(self) -> CodecResult<Vec<u8>> {
        match self.into_primitive()? {
            Primitive::Bytes(b) => Ok(b),
            other => Err(CodecError::mismatch("byte array", other.ty().to_string())),
        }
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        Value::Primitive(p)
    }
}

impl From<StructValue> for Value {
    fn from(s: StructValue) -> Self {
        Value::Struct(s)
    }
}

impl From<UnionValue> for Value {
    fn from(u: UnionValue) -> Self {
        Value::Union(u)
    }
}

macro_rules! primitive_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Primitive(Primitive::$variant(v))
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = CodecError;

                fn try_from(value: Value) -> CodecResult<Self> {
                    match value.into_primitive()? {
                        Primitive::$variant(v) => Ok(v),
                        other => Err(CodecError::mismatch(
                            stringify!($variant).to_lowercase(),
                            other.ty().to_string(),
                        )),
                    }
                }
            }
        )*
    };
}

primitive_conversions! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i64 => I64,
    bool => Bool,
    Identifier => Identifier,
}

fn take_field(ty: &str, fields: &mut Fields, name: &str) -> CodecResult<Value> {
    let idx = fields
        .iter()
        .position(|(n, _)| n == name)
        .ok_or_else(|| CodecError::FieldMismatch {
            ty: ty.to_string(),
            expected: name.to_string(),
            found: "<missing>".to_string(),
        })?;
    Ok(fields.remove(idx).1)
}

impl StructValue {
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field. Fields must be added in descriptor order.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Remove and return a field by name.
    pub fn take(&mut self, name: &str) -> CodecResult<Value> {
        take_field(&self.ty, &mut self.fields, name)
    }
}

impl UnionValue {
    pub fn new(ty: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            variant: variant.into(),
            fields: Vec::new(),
        }
    }

    /// Build a union from a set of candidate variants where `Some` marks a
    /// supplied variant. Exactly one must be supplied.
    ///
    /// ```rust
    /// use credgate_core::value::UnionValue;
    ///
    /// let ok = UnionValue::from_candidates("State", [("Active", None), ("Frozen", Some(vec![]))]);
    /// assert_eq!(ok.unwrap().variant, "Frozen");
    ///
    /// let none = UnionValue::from_candidates("State", [("Active", None), ("Frozen", None)]);
    /// assert!(none.is_err());
    /// ```
    pub fn from_candidates<S: Into<String>>(
        ty: impl Into<String>,
        candidates: impl IntoIterator<Item = (S, Option<Fields>)>,
    ) -> CodecResult<Self> {
        let ty = ty.into();
        let mut supplied: Vec<(String, Fields)> = candidates
            .into_iter()
            .filter_map(|(name, fields)| fields.map(|f| (name.into(), f)))
            .collect();
        if supplied.len() != 1 {
            return Err(CodecError::InvalidVariantCount {
                ty,
                count: supplied.len(),
            });
        }
        let (variant, fields) = supplied.remove(0);
        Ok(Self { ty, variant, fields })
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn take(&mut self, name: &str) -> CodecResult<Value> {
        let ty = format!("{}::{}", self.ty, self.variant);
        take_field(&ty, &mut self.fields, name)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Primitive(p) => write!(f, "{}", p),
            Value::Option(None) => f.write_str("None"),
            Value::Option(Some(inner)) => write!(f, "Some({})", inner),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Struct(s) => {
                write!(f, "{}", s.ty)?;
                write_fields(f, &s.fields)
            }
            Value::Union(u) => {
                write!(f, "{}::{}", u.ty, u.variant)?;
                write_fields(f, &u.fields)
            }
        }
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &Fields) -> fmt::Result {
    if fields.is_empty() {
        return Ok(());
    }
    f.write_str(" { ")?;
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", name, value)?;
    }
    f.write_str(" }")
}
