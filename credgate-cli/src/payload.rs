//! Payload building: instructions, arbitrary registered types, decoding.
//!
//! Nothing here talks to a network. Built instructions are printed as hex.

use std::collections::HashMap;

use credgate_core::codec::Codec;
use credgate_core::error::CodecError;
use credgate_core::instruction::{Command, CommandKind, Instruction, InstructionBuilder, KnownType};
use credgate_core::primitive::Identifier;
use credgate_core::schema::{FieldDef, FieldType, Registry, TypeDescriptor};
use credgate_core::value::{Fields, StructValue, UnionValue, Value};

use crate::cli::{snake_to_kebab, to_pascal_case};
use crate::hex::{decode_identifier, hex_decode, hex_encode, identifier_base58};
use crate::parse::parse_value;

pub fn codec_error(e: CodecError) -> String {
    format!("{} (code {})", e, e.error_code())
}

/// Parse the fields of a struct or variant from `--kebab-name` args.
///
/// A missing optional field is taken as `none`; any other missing field is
/// an error, reported together with the others.
pub fn parse_fields(
    defs: &[FieldDef],
    args: &HashMap<String, String>,
    registry: &Registry,
) -> Result<Fields, String> {
    let mut missing = vec![];
    let mut errors = vec![];
    let mut fields = Fields::new();

    for def in defs {
        let key = snake_to_kebab(&def.name);
        let raw = match (args.get(&key), &def.ty) {
            (Some(raw), _) => raw.as_str(),
            (None, FieldType::Option { .. }) => "none",
            (None, _) => {
                missing.push(format!("--{}", key));
                continue;
            }
        };
        match parse_value(raw, &def.ty, registry) {
            Ok(value) => fields.push((def.name.clone(), value)),
            Err(e) => errors.push(format!("--{}: {}", key, e)),
        }
    }

    if !missing.is_empty() {
        errors.insert(0, format!("Missing required arguments: {}", missing.join(", ")));
    }
    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(errors.join("\n   "))
    }
}

/// Build a credential program instruction from CLI args.
pub fn build_instruction(
    builder: &InstructionBuilder<'_>,
    kind: CommandKind,
    args: &HashMap<String, String>,
) -> Result<Instruction, String> {
    let registry = builder.registry();
    let fields = parse_fields(&kind.args(), args, registry)?;
    let mut union = UnionValue::new(KnownType::Command.name(), kind.name());
    union.fields = fields;
    let command = Command::from_value(Value::Union(union)).map_err(codec_error)?;

    let mut accounts = Vec::with_capacity(kind.accounts().len());
    let mut missing = vec![];
    for role in kind.accounts() {
        let key = format!("{}-account", snake_to_kebab(role.name));
        match args.get(&key) {
            Some(raw) => {
                accounts.push(decode_identifier(raw).map_err(|e| format!("--{}: {}", key, e))?)
            }
            None => missing.push(format!("--{}", key)),
        }
    }
    if !missing.is_empty() {
        return Err(format!("Missing required accounts: {}", missing.join(", ")));
    }

    builder.build(&command, &accounts).map_err(codec_error)
}

/// Build and print an instruction. Always a dry run.
pub fn execute_instruction(
    registry: &Registry,
    kind: CommandKind,
    args: &HashMap<String, String>,
) -> Result<(), String> {
    let program_id = match args.get("program-id") {
        Some(raw) => decode_identifier(raw).map_err(|e| format!("--program-id: {}", e))?,
        None => Identifier::default(),
    };
    let builder = InstructionBuilder::new(registry, program_id).map_err(codec_error)?;
    let ix = build_instruction(&builder, kind, args)?;
    let command = builder.parse(&ix.data).map_err(codec_error)?;
    tracing::debug!(command = kind.snake_name(), accounts = ix.accounts.len(), "dry run");

    println!("📋 Instruction: {}", kind.snake_name());
    println!();
    println!("Accounts:");
    for (role, meta) in kind.accounts().iter().zip(&ix.accounts) {
        let mut flags = vec![];
        if meta.writable {
            flags.push("mut");
        }
        if meta.signer {
            flags.push("signer");
        }
        println!(
            "  📦 {} → {} [{}]",
            role.name,
            identifier_base58(&meta.address),
            flags.join(", ")
        );
    }
    println!();
    println!("🔧 Command:");
    println!("  program: {}", identifier_base58(&ix.program_id));
    println!("  discriminant: {}", kind.discriminant());
    println!("  {:?}", command);
    println!();
    println!("  Instruction data ({} bytes):", ix.data.len());
    println!("    {}", hex_encode(&ix.data));
    println!();
    println!("⚠️  Dry run — payloads are printed, never submitted.");
    Ok(())
}

/// Encode any registered struct or union from CLI args.
///
/// Unions take the variant from `--variant`.
pub fn encode_type(
    registry: &Registry,
    name: &str,
    args: &HashMap<String, String>,
) -> Result<Vec<u8>, String> {
    let value = match registry.get(name).map_err(codec_error)? {
        TypeDescriptor::Struct { fields } => {
            let mut value = StructValue::new(name);
            value.fields = parse_fields(fields, args, registry)?;
            Value::Struct(value)
        }
        TypeDescriptor::Union { variants } => {
            let wanted = args
                .get("variant")
                .ok_or_else(|| format!("Union {} needs --variant <NAME>", name))?;
            let variant = variants
                .iter()
                .find(|v| v.name == *wanted || v.name == to_pascal_case(wanted))
                .ok_or_else(|| {
                    let names: Vec<&str> = variants.iter().map(|v| v.name.as_str()).collect();
                    format!("Unknown variant '{}' for {}: expected {}", wanted, name, names.join("|"))
                })?;
            let mut value = UnionValue::new(name, variant.name.clone());
            value.fields = parse_fields(&variant.fields, args, registry)?;
            Value::Union(value)
        }
    };
    Codec::new(registry).encode(&value).map_err(codec_error)
}

/// Decode hex-encoded bytes as type `ty`.
pub fn decode_value(registry: &Registry, ty: &str, hex: &str) -> Result<Value, String> {
    let bytes = hex_decode(hex)?;
    Codec::new(registry).decode(ty, &bytes).map_err(codec_error)
}

/// Decode hex-encoded instruction data as a command.
pub fn decode_command(registry: &Registry, hex: &str) -> Result<Command, String> {
    let bytes = hex_decode(hex)?;
    let builder = InstructionBuilder::new(registry, Identifier::default()).map_err(codec_error)?;
    builder.parse(&bytes).map_err(codec_error)
}
