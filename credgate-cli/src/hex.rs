//! Hex and base58 helpers for identifiers and payloads.

use base58::{FromBase58, ToBase58};
use credgate_core::primitive::{Identifier, IDENTIFIER_LEN};

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn hex_decode(hex: &str) -> Result<Vec<u8>, String> {
    let hex = strip_hex_prefix(hex);
    if hex.len() % 2 != 0 {
        return Err(format!("Hex string has odd length: {}", hex.len()));
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = hex
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| format!("Invalid hex at position {}", i))?;
        bytes.push(byte);
    }
    Ok(bytes)
}

pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode an identifier from base58 or 64 hex chars.
pub fn decode_identifier(input: &str) -> Result<Identifier, String> {
    let looks_hex = input.starts_with("0x")
        || (input.len() == IDENTIFIER_LEN * 2 && input.chars().all(|c| c.is_ascii_hexdigit()));

    let bytes = if looks_hex {
        hex_decode(input)?
    } else {
        input
            .from_base58()
            .map_err(|e| format!("Invalid identifier '{}': not base58 or hex ({:?})", input, e))?
    };

    let arr: [u8; IDENTIFIER_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
        format!(
            "Expected {} bytes, got {} (provide base58 or {} hex chars)",
            IDENTIFIER_LEN,
            b.len(),
            IDENTIFIER_LEN * 2
        )
    })?;
    Ok(Identifier::new(arr))
}

pub fn identifier_base58(id: &Identifier) -> String {
    id.as_bytes()[..].to_base58()
}
