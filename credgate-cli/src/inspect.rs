//! Account inspection: parse raw account dumps and print their fields.

use std::fs;

use credgate_core::account::{parse_account, AccountData, AccountKind, AuthorityKey};
use credgate_core::primitive::Identifier;

use crate::hex::identifier_base58;
use crate::payload::codec_error;

const FLAG_NAMES: [(u16, &str); 8] = [
    (AuthorityKey::AUTH, "auth"),
    (AuthorityKey::ISSUE, "issue"),
    (AuthorityKey::REFRESH, "refresh"),
    (AuthorityKey::SET_EXPIRE, "set_expire"),
    (AuthorityKey::FREEZE, "freeze"),
    (AuthorityKey::UNFREEZE, "unfreeze"),
    (AuthorityKey::REVOKE, "revoke"),
    (AuthorityKey::ADJUST_FEES, "adjust_fees"),
];

pub fn flag_names(flags: u16) -> String {
    let names: Vec<&str> = FLAG_NAMES
        .iter()
        .filter(|(bit, _)| flags & bit == *bit)
        .map(|(_, name)| *name)
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join("|")
    }
}

/// Human-readable lines describing a parsed account.
pub fn describe_account(account: &AccountData) -> Vec<String> {
    let opt = |id: Option<Identifier>| id.as_ref().map_or("none".to_string(), identifier_base58);
    match account {
        AccountData::Credential(c) => vec![
            format!("version: {}", c.version),
            format!("parent: {}", opt(c.parent)),
            format!("owner: {}", identifier_base58(&c.owner)),
            format!("owner_identity: {}", opt(c.owner_identity)),
            format!("network: {}", identifier_base58(&c.network)),
            format!("issuing_authority: {}", identifier_base58(&c.issuing_authority)),
            format!("state: {}", c.state.name()),
            format!(
                "expire_time: {}",
                c.expire_time.map_or("never".to_string(), |t| t.to_string())
            ),
        ],
        AccountData::Network(n) => {
            let mut lines = vec![
                format!("version: {}", n.version),
                format!("authority: {}", identifier_base58(&n.authority)),
                format!("network_index: {}", n.network_index),
                format!("network_bump: {}", n.network_bump),
                format!("pass_expire_time: {}", n.pass_expire_time),
                format!("fees: {}", n.fees.len()),
            ];
            for fee in &n.fees {
                lines.push(format!(
                    "  {} issue={} refresh={} expire={} verify={}",
                    identifier_base58(&fee.token),
                    fee.issue,
                    fee.refresh,
                    fee.expire,
                    fee.verify
                ));
            }
            lines.push(format!("auth_keys: {}", n.auth_keys.len()));
            for key in &n.auth_keys {
                lines.push(format!(
                    "  {} [{}]",
                    identifier_base58(&key.key),
                    flag_names(key.flags)
                ));
            }
            lines.push(format!("network_features: {:#018x}", n.network_features));
            lines
        }
    }
}

/// Parse one or more account dumps of the same kind and print them.
///
/// Every file is attempted; the call fails if any of them did.
pub fn inspect_accounts(kind: AccountKind, paths: &[String]) -> Result<(), String> {
    if paths.is_empty() {
        return Err("Usage: credgate inspect --kind <credential|network> <FILE> [FILE...]".to_string());
    }
    let mut failed = 0;
    for path in paths {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("❌ {}: {}", path, e);
                failed += 1;
                continue;
            }
        };
        match parse_account(kind, &bytes) {
            Ok(account) => {
                println!("📦 {} ({} account, {} bytes)", path, kind.name(), bytes.len());
                for line in describe_account(&account) {
                    println!("   {}", line);
                }
                println!();
            }
            Err(e) => {
                eprintln!("❌ {}: {}", path, codec_error(e));
                failed += 1;
            }
        }
    }
    match failed {
        0 => Ok(()),
        n => Err(format!(
            "{} of {} file(s) failed to parse as {} accounts (minimum {} bytes)",
            n,
            paths.len(),
            kind.name(),
            kind.min_size()
        )),
    }
}
