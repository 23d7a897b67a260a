//! Generic IDL-driven CLI library for the credential program.
//!
//! Provides:
//! - IDL loading and type-aware argument handling
//! - Instruction payload building (printed, never submitted)
//! - Encoding and decoding of any registered type
//! - Account dump inspection
//!
//! Use this as a library to build program-specific CLIs, or use the
//! `credgate` binary for a fully generic IDL-driven experience.

pub mod cli;
pub mod hex;
pub mod inspect;
pub mod parse;
pub mod payload;

use std::fs;

use credgate_core::account::AccountKind;
use credgate_core::idl::CodecIdl;
use credgate_core::instruction::{program_idl, CommandKind};
use credgate_core::schema::Registry;

use crate::cli::{kebab_to_snake, parse_flag_args, print_help, print_instruction_help, wants_help};
use crate::hex::hex_encode;
use crate::payload::codec_error;

/// Load an IDL document from a JSON file.
pub fn load_idl(path: &str) -> Result<CodecIdl, String> {
    let json = fs::read_to_string(path).map_err(|e| format!("Failed to read IDL '{}': {}", path, e))?;
    CodecIdl::from_json(&json).map_err(|e| format!("Failed to parse IDL '{}': {}", path, e))
}

/// The IDL and registry to work with: from `--idl` if given, else built in.
pub fn load_registry(idl_path: Option<&str>) -> Result<(CodecIdl, Registry), String> {
    let idl = match idl_path {
        Some(path) => load_idl(path)?,
        None => program_idl(),
    };
    let registry = Registry::from_idl(&idl).map_err(codec_error)?;
    tracing::debug!(types = registry.len(), source = idl_path.unwrap_or("built-in"), "loaded registry");
    Ok((idl, registry))
}

/// Run the CLI on `args` (without the binary name).
pub fn run(args: &[String]) -> Result<(), String> {
    let (idl_path, rest) = split_idl_option(args)?;
    let (idl, registry) = load_registry(idl_path.as_deref())?;

    let Some((command, rest)) = rest.split_first() else {
        print_help(&idl, "credgate");
        return Ok(());
    };
    let (flags, positional) = parse_flag_args(rest);

    match command.as_str() {
        "help" | "--help" | "-h" => {
            print_help(&idl, "credgate");
            Ok(())
        }
        "idl" => {
            let json = idl.to_json_pretty().map_err(|e| e.to_string())?;
            println!("{}", json);
            Ok(())
        }
        "encode" => {
            let ty = positional
                .first()
                .ok_or("Usage: credgate encode <TYPE> [--variant <NAME>] --<field> <VALUE>...")?;
            let bytes = payload::encode_type(&registry, ty, &flags)?;
            println!("{}", hex_encode(&bytes));
            Ok(())
        }
        "decode" => {
            let hex = positional
                .first()
                .ok_or("Usage: credgate decode <HEX> [--type <TYPE>]")?;
            match flags.get("type") {
                Some(ty) => println!("{}", payload::decode_value(&registry, ty, hex)?),
                None => println!("{:?}", payload::decode_command(&registry, hex)?),
            }
            Ok(())
        }
        "inspect" => {
            let kind = flags
                .get("kind")
                .ok_or("inspect needs --kind <credential|network>")?;
            let kind = AccountKind::from_name(kind).map_err(codec_error)?;
            inspect::inspect_accounts(kind, &positional)
        }
        other => {
            let name = kebab_to_snake(other);
            let kind = CommandKind::from_name(&name).ok_or_else(|| {
                format!("Unknown command '{}'. Run with --help for usage.", other)
            })?;
            if wants_help(&flags) {
                if let Some(ix) = idl.instruction(kind.snake_name()) {
                    print_instruction_help(ix);
                }
                return Ok(());
            }
            payload::execute_instruction(&registry, kind, &flags)
        }
    }
}

/// Pull `-i/--idl FILE` out of the argument list.
fn split_idl_option(args: &[String]) -> Result<(Option<String>, Vec<String>), String> {
    let mut idl_path = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--idl" || arg == "-i" {
            let path = iter.next().ok_or("--idl needs a file path")?;
            idl_path = Some(path.clone());
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((idl_path, rest))
}
