//! CLI helpers: help text, argument parsing, string utilities.

use std::collections::HashMap;

use credgate_core::idl::{CodecIdl, IdlInstruction};
use credgate_core::primitive::PrimitiveType;
use credgate_core::schema::FieldType;

/// Print help for all commands derived from the IDL.
pub fn print_help(idl: &CodecIdl, binary_name: &str) {
    println!("🔧 {} v{} — IDL-driven payload builder", idl.name, idl.version);
    println!();
    println!("USAGE:");
    println!("  {} [OPTIONS] <COMMAND> [ARGS]", binary_name);
    println!();
    println!("OPTIONS:");
    println!("  -i, --idl <FILE>           Load the type registry from an IDL JSON file");
    println!("  --program-id <ID>          Program identifier for built instructions");
    println!();
    println!("COMMANDS:");
    println!("  idl                        Print the registry as an IDL document");
    println!("  encode <TYPE> [--variant <NAME>] --<field> <VALUE>...");
    println!("                             Encode a registered struct or union");
    println!("  decode <HEX> [--type <TYPE>]");
    println!("                             Decode instruction data (or any registered type)");
    println!("  inspect --kind <credential|network> <FILE>...");
    println!("                             Parse raw account dumps");

    for ix in &idl.instructions {
        let cmd = snake_to_kebab(&ix.name);
        let args_desc = ix
            .args
            .iter()
            .map(|a| format!("--{} <{}>", snake_to_kebab(&a.name), type_hint(&a.ty)));
        let acct_desc = ix
            .accounts
            .iter()
            .map(|a| format!("--{}-account <ID>", snake_to_kebab(&a.name)));
        let all_args: Vec<String> = args_desc.chain(acct_desc).collect();
        println!("  {:<26} {}", cmd, all_args.join(" "));
    }
    println!();
    println!("TYPE FORMATS:");
    println!("  u8, u16, u32, u64, i64     Decimal number");
    println!("  identifier                 Base58 or 64 hex chars");
    println!("  [u8; N]                    Hex (2*N chars) or UTF-8 string (≤N bytes, zero-padded)");
    println!("  Option<T>                  'none' or a T");
    println!("  Vec<T>                     Comma-separated list");
    println!();
    println!("Instructions are never submitted; the encoded payload is printed.");
}

/// Print detailed help for a single instruction.
pub fn print_instruction_help(ix: &IdlInstruction) {
    println!(
        "📋 {} (discriminant {}) — {} account(s), {} arg(s)",
        ix.name,
        ix.discriminant,
        ix.accounts.len(),
        ix.args.len()
    );
    println!();
    println!("ACCOUNTS:");
    for acc in &ix.accounts {
        let mut flags = vec![];
        if acc.writable {
            flags.push("mut");
        }
        if acc.signer {
            flags.push("signer");
        }
        let flags_str = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("  --{}-account{}", snake_to_kebab(&acc.name), flags_str);
    }
    println!();
    println!("ARGS:");
    for arg in &ix.args {
        println!(
            "  --{:<25} {} — format: {}",
            snake_to_kebab(&arg.name),
            arg.ty,
            type_hint(&arg.ty)
        );
    }
}

/// Split `--key value` pairs into a map. A flag with no value maps to
/// `"true"`; bare words are returned as positionals, in order.
pub fn parse_flag_args(args: &[String]) -> (HashMap<String, String>, Vec<String>) {
    let mut map = HashMap::new();
    let mut positional = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if let Some(key) = args[i].strip_prefix("--") {
            match args.get(i + 1) {
                Some(value) if !value.starts_with("--") => {
                    map.insert(key.to_string(), value.clone());
                    i += 2;
                }
                _ => {
                    map.insert(key.to_string(), "true".to_string());
                    i += 1;
                }
            }
        } else {
            positional.push(args[i].clone());
            i += 1;
        }
    }
    (map, positional)
}

pub fn wants_help(map: &HashMap<String, String>) -> bool {
    map.contains_key("help") || map.contains_key("h")
}

// ─── String utilities ────────────────────────────────────────────

pub fn snake_to_kebab(s: &str) -> String {
    s.replace('_', "-")
}

pub fn kebab_to_snake(s: &str) -> String {
    s.replace('-', "_")
}

pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-')
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                None => String::new(),
                Some(ch) => ch.to_uppercase().collect::<String>() + c.as_str(),
            }
        })
        .collect()
}

pub fn type_hint(ty: &FieldType) -> String {
    match ty {
        FieldType::Primitive(p) => match p {
            PrimitiveType::Bool => "true|false".to_string(),
            PrimitiveType::Identifier => "ID".to_string(),
            PrimitiveType::Bytes(n) => format!("HEX{}|STR≤{}", n * 2, n),
            _ => "NUMBER".to_string(),
        },
        FieldType::Option { option } => format!("OPT<{}>", type_hint(option)),
        FieldType::Vec { vec, .. } => format!("{},...", type_hint(vec)),
        FieldType::Array { array } => format!("{},...(×{})", type_hint(&array.0), array.1),
        FieldType::Defined { defined } => defined.clone(),
    }
}
