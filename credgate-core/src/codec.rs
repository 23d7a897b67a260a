//! Generic encoder/decoder driven by the registry.

use crate::cursor::{Cursor, Writer};
use crate::error::{CodecError, CodecResult};
use crate::primitive::Primitive;
use crate::schema::{FieldDef, FieldType, Registry, TypeDescriptor};
use crate::value::{Fields, StructValue, UnionValue, Value};

/// Encoder/decoder over a borrowed [`Registry`].
///
/// Holds no per-call state: each call threads its own [`Writer`] or
/// [`Cursor`], so a single `Codec` can be used from many threads at once.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'r> {
    registry: &'r Registry,
}

impl<'r> Codec<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Encode a struct or union value, dispatching on the type name it carries.
    pub fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        let mut writer = Writer::new();
        self.encode_into(value, &mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Append the encoding of `value` to `writer`. On failure the writer is
    /// left as it was before the call.
    pub fn encode_into(&self, value: &Value, writer: &mut Writer) -> CodecResult<()> {
        let mark = writer.written();
        let result = match value {
            Value::Struct(StructValue { ty, .. }) | Value::Union(UnionValue { ty, .. }) => {
                self.encode_defined(ty, value, writer)
            }
            other => Err(CodecError::mismatch("struct or union", other.kind())),
        };
        if result.is_err() {
            writer.truncate(mark);
        }
        result
    }

    fn encode_defined(&self, name: &str, value: &Value, writer: &mut Writer) -> CodecResult<()> {
        match (self.registry.get(name)?, value) {
            (TypeDescriptor::Struct { fields }, Value::Struct(s)) if s.ty == name => {
                self.encode_fields(name, fields, &s.fields, writer)
            }
            (TypeDescriptor::Union { variants }, Value::Union(u)) if u.ty == name => {
                let idx = variants
                    .iter()
                    .position(|v| v.name == u.variant)
                    .ok_or_else(|| CodecError::FieldMismatch {
                        ty: name.to_string(),
                        expected: variants
                            .iter()
                            .map(|v| v.name.as_str())
                            .collect::<Vec<_>>()
                            .join("|"),
                        found: u.variant.clone(),
                    })?;
                writer.write_u8(idx as u8);
                let variant_ty = format!("{}::{}", name, u.variant);
                self.encode_fields(&variant_ty, &variants[idx].fields, &u.fields, writer)
            }
            (_, other) => Err(CodecError::mismatch(name, other.kind())),
        }
    }

    fn encode_fields(
        &self,
        ty: &str,
        defs: &[FieldDef],
        values: &Fields,
        writer: &mut Writer,
    ) -> CodecResult<()> {
        for i in 0..defs.len().max(values.len()) {
            match (defs.get(i), values.get(i)) {
                (Some(def), Some((name, value))) if def.name == *name => {
                    self.encode_field(&def.ty, value, writer)?;
                }
                (def, value) => {
                    return Err(CodecError::FieldMismatch {
                        ty: ty.to_string(),
                        expected: def.map_or("<end>", |d| d.name.as_str()).to_string(),
                        found: value.map_or("<end>", |(n, _)| n.as_str()).to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn encode_field(&self, ty: &FieldType, value: &Value, writer: &mut Writer) -> CodecResult<()> {
        match (ty, value) {
            (FieldType::Primitive(declared), Value::Primitive(p)) => {
                if p.ty() != *declared {
                    return Err(CodecError::mismatch(declared.to_string(), p.ty().to_string()));
                }
                p.encode(writer);
                Ok(())
            }
            (FieldType::Option { .. }, Value::Option(None)) => {
                writer.write_u8(0);
                Ok(())
            }
            (FieldType::Option { option }, Value::Option(Some(inner))) => {
                writer.write_u8(1);
                self.encode_field(option, inner, writer)
            }
            (FieldType::Vec { vec, prefix }, Value::List(items)) => {
                writer.write_len(*prefix, items.len())?;
                items
                    .iter()
                    .try_for_each(|item| self.encode_field(vec, item, writer))
            }
            (FieldType::Array { array }, Value::List(items)) => {
                let (elem, len) = (&array.0, array.1);
                if items.len() != len {
                    return Err(CodecError::mismatch(
                        ty.to_string(),
                        format!("{} elements", items.len()),
                    ));
                }
                items
                    .iter()
                    .try_for_each(|item| self.encode_field(elem, item, writer))
            }
            (FieldType::Defined { defined }, value) => self.encode_defined(defined, value, writer),
            (ty, value) => Err(CodecError::mismatch(ty.to_string(), value.kind())),
        }
    }

    /// Decode a complete buffer as type `name`. Every byte must be consumed.
    pub fn decode(&self, name: &str, bytes: &[u8]) -> CodecResult<Value> {
        let mut cursor = Cursor::new(bytes);
        let value = self.decode_at(name, &mut cursor)?;
        cursor.finish()?;
        Ok(value)
    }

    /// Decode one value of type `name` from the cursor's position.
    pub fn decode_at(&self, name: &str, cursor: &mut Cursor<'_>) -> CodecResult<Value> {
        match self.registry.get(name)? {
            TypeDescriptor::Struct { fields } => Ok(Value::Struct(StructValue {
                ty: name.to_string(),
                fields: self.decode_fields(fields, cursor)?,
            })),
            TypeDescriptor::Union { variants } => {
                let discriminant = cursor.read_u8()?;
                let variant = variants.get(discriminant as usize).ok_or_else(|| {
                    CodecError::UnknownVariant {
                        ty: name.to_string(),
                        discriminant,
                        count: variants.len(),
                    }
                })?;
                tracing::trace!(ty = name, variant = %variant.name, discriminant, "decoding variant");
                Ok(Value::Union(UnionValue {
                    ty: name.to_string(),
                    variant: variant.name.clone(),
                    fields: self.decode_fields(&variant.fields, cursor)?,
                }))
            }
        }
    }

    fn decode_fields(&self, defs: &[FieldDef], cursor: &mut Cursor<'_>) -> CodecResult<Fields> {
        defs.iter()
            .map(|def| -> CodecResult<(String, Value)> {
                Ok((def.name.clone(), self.decode_field(&def.ty, cursor)?))
            })
            .collect()
    }

    fn decode_field(&self, ty: &FieldType, cursor: &mut Cursor<'_>) -> CodecResult<Value> {
        match ty {
            FieldType::Primitive(p) => Primitive::decode(*p, cursor).map(Value::Primitive),
            FieldType::Option { option } => {
                let inner = cursor.read_option(|c| self.decode_field(option, c))?;
                Ok(Value::Option(inner.map(Box::new)))
            }
            FieldType::Vec { vec, prefix } => {
                let count = cursor.read_len(*prefix)?;
                let elem_min = self.registry.field_min_size(vec)?;
                let remaining = cursor.remaining();
                let limit = remaining.checked_div(elem_min).unwrap_or(0) as u64;
                if count > limit {
                    return Err(CodecError::MalformedLength {
                        declared: count,
                        limit,
                    });
                }
                let mut items = Vec::with_capacity((count as usize).min(remaining));
                for _ in 0..count {
                    items.push(self.decode_field(vec, cursor)?);
                }
                Ok(Value::List(items))
            }
            FieldType::Array { array } => {
                let (elem, len) = (&array.0, array.1);
                let needed = self.registry.field_min_size(ty)?;
                let remaining = cursor.remaining();
                if needed > remaining {
                    return Err(CodecError::TruncatedBuffer {
                        needed: cursor.position() + needed,
                        available: cursor.position() + remaining,
                    });
                }
                let mut items = Vec::with_capacity(len.min(remaining));
                for _ in 0..len {
                    items.push(self.decode_field(elem, cursor)?);
                }
                Ok(Value::List(items))
            }
            FieldType::Defined { defined } => self.decode_at(defined, cursor),
        }
    }
}
