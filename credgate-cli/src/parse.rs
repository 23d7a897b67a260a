//! Field-type-aware value parsing from CLI strings.

use credgate_core::primitive::{Primitive, PrimitiveType};
use credgate_core::schema::{FieldType, Registry, TypeDescriptor};
use credgate_core::value::{UnionValue, Value};

use crate::hex::{decode_identifier, hex_decode, strip_hex_prefix};

/// Parse a CLI string value according to its declared field type.
///
/// Collections are comma-separated. Unions whose variants carry no fields
/// are selected by variant name, case-insensitively.
pub fn parse_value(raw: &str, ty: &FieldType, registry: &Registry) -> Result<Value, String> {
    match ty {
        FieldType::Primitive(p) => parse_primitive(raw, *p).map(Value::Primitive),
        FieldType::Option { option } => {
            if matches!(raw, "none" | "null" | "") {
                Ok(Value::none())
            } else {
                Ok(Value::some(parse_value(raw, option, registry)?))
            }
        }
        FieldType::Vec { vec, .. } => split_list(raw)
            .map(|part| parse_value(part, vec, registry))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        FieldType::Array { array } => {
            let (elem, len) = (&array.0, array.1);
            let items = split_list(raw)
                .map(|part| parse_value(part, elem, registry))
                .collect::<Result<Vec<_>, _>>()?;
            if items.len() != len {
                return Err(format!("Expected {} elements, got {}", len, items.len()));
            }
            Ok(Value::List(items))
        }
        FieldType::Defined { defined } => parse_defined(raw, defined, registry),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_primitive(raw: &str, ty: PrimitiveType) -> Result<Primitive, String> {
    match ty {
        PrimitiveType::Bool => match raw {
            "true" | "1" | "yes" => Ok(Primitive::Bool(true)),
            "false" | "0" | "no" => Ok(Primitive::Bool(false)),
            _ => Err(format!("Invalid bool '{}': expected true/false", raw)),
        },
        PrimitiveType::Identifier => decode_identifier(raw).map(Primitive::Identifier),
        PrimitiveType::Bytes(len) => parse_byte_array(raw, len).map(Primitive::Bytes),
        integer => {
            let value = raw
                .parse::<i128>()
                .map_err(|e| format!("Invalid {} '{}': {}", integer, raw, e))?;
            Primitive::integer(integer, value).map_err(|e| e.to_string())
        }
    }
}

/// `[u8; N]` from exactly `2 * N` hex chars (optionally `0x`-prefixed), or
/// from a string of at most `N` bytes, right-padded with zeros.
fn parse_byte_array(raw: &str, size: usize) -> Result<Vec<u8>, String> {
    let hex = strip_hex_prefix(raw);
    let is_hex = hex.len() == size * 2 && hex.chars().all(|c| c.is_ascii_hexdigit());
    if is_hex {
        return hex_decode(hex);
    }
    if raw.starts_with("0x") || raw.starts_with("0X") {
        return Err(format!("Expected {} hex chars after 0x, got {}", size * 2, hex.len()));
    }
    let str_bytes = raw.as_bytes();
    if str_bytes.len() > size {
        return Err(format!(
            "String '{}' is {} bytes, max {} for [u8; {}]",
            raw,
            str_bytes.len(),
            size,
            size
        ));
    }
    let mut bytes = vec![0u8; size];
    bytes[..str_bytes.len()].copy_from_slice(str_bytes);
    Ok(bytes)
}

fn parse_defined(raw: &str, name: &str, registry: &Registry) -> Result<Value, String> {
    match registry.get(name).map_err(|e| e.to_string())? {
        TypeDescriptor::Union { variants } => {
            let variant = variants
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(raw))
                .ok_or_else(|| {
                    let names: Vec<String> =
                        variants.iter().map(|v| v.name.to_lowercase()).collect();
                    format!("Invalid {} '{}': expected {}", name, raw, names.join("|"))
                })?;
            if !variant.fields.is_empty() {
                return Err(format!(
                    "{}::{} carries fields; use `encode {}` instead",
                    name, variant.name, name
                ));
            }
            Ok(Value::Union(UnionValue::new(name, variant.name.clone())))
        }
        TypeDescriptor::Struct { .. } => Err(format!(
            "Struct {} cannot be given inline; use `encode {}` instead",
            name, name
        )),
    }
}
