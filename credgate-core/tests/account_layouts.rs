//! Account layout parsing: fixed capacity regions, alignment and truncation.

use credgate_core::account::{
    parse_account, AccountData, AccountKind, AuthorityKey, CredentialAccount, FeeEntry,
    NetworkAccount, MAX_AUTHORITY_KEYS, MAX_FEES,
};
use credgate_core::cursor::Cursor;
use credgate_core::error::CodecError;
use credgate_core::instruction::CredentialState;
use credgate_core::layout::{self, AccountLayout};
use credgate_core::primitive::{Identifier, LengthPrefix};

const AUTH_KEYS_OFFSET: usize = 5170;
const FEATURES_OFFSET: usize = 9528;

fn id(byte: u8) -> Identifier {
    Identifier::new([byte; 32])
}

fn network(fees: usize, keys: usize) -> NetworkAccount {
    NetworkAccount {
        version: 1,
        authority: id(0xA0),
        network_index: 3,
        network_bump: 254,
        pass_expire_time: 86_400,
        fees: (0..fees)
            .map(|i| FeeEntry {
                token: id(i as u8),
                issue: 10,
                refresh: 20,
                expire: 30,
                verify: 40,
            })
            .collect(),
        auth_keys: (0..keys)
            .map(|i| AuthorityKey::new(id(0x80 | i as u8), AuthorityKey::AUTH))
            .collect(),
        network_features: 0x0102_0304_0506_0708,
    }
}

fn credential() -> CredentialAccount {
    CredentialAccount {
        version: 0,
        parent: None,
        owner: id(1),
        owner_identity: Some(id(2)),
        network: id(3),
        issuing_authority: id(4),
        state: CredentialState::Active,
        expire_time: Some(1_700_000_000),
    }
}

#[test]
fn test_network_account_is_fixed_size() {
    for (fees, keys) in [(0, 0), (1, 2), (MAX_FEES, MAX_AUTHORITY_KEYS)] {
        let bytes = layout::serialize(&network(fees, keys)).unwrap();
        assert_eq!(bytes.len(), 9536, "fees={} keys={}", fees, keys);
    }
}

#[test]
fn test_auth_keys_region_width() {
    let account = network(0, 2);
    let bytes = layout::serialize(&account).unwrap();

    // Count prefix, then two keys, then 126 zeroed slots.
    assert_eq!(&bytes[AUTH_KEYS_OFFSET..AUTH_KEYS_OFFSET + 2], &[2, 0]);
    let region = &bytes[AUTH_KEYS_OFFSET + 2..AUTH_KEYS_OFFSET + 2 + 128 * 34];
    assert_eq!(&region[..2], &AuthorityKey::AUTH.to_le_bytes());
    assert!(region[2 * 34..].iter().all(|&b| b == 0));

    // The field after the region sits at the same offset whatever the count.
    assert_eq!(
        &bytes[FEATURES_OFFSET..],
        &0x0102_0304_0506_0708u64.to_le_bytes()
    );
}

#[test]
fn test_padding_contents_ignored() {
    let account = network(1, 1);
    let mut bytes = layout::serialize(&account).unwrap();
    // Garbage in unused fee slots and in the alignment gap.
    bytes[48 + 2 + 40 * 5] = 0xFF;
    bytes[37] = 0xEE;
    let parsed: NetworkAccount = layout::parse(&bytes).unwrap();
    assert_eq!(parsed, account);
}

#[test]
fn test_network_parse_roundtrip() {
    let account = network(3, 5);
    let bytes = layout::serialize(&account).unwrap();
    let parsed: NetworkAccount = layout::parse(&bytes).unwrap();
    assert_eq!(parsed, account);
    assert_eq!(parsed.fee(&id(2)).map(|f| f.verify), Some(40));
    assert!(parsed.is_authorized(&id(0x81), AuthorityKey::AUTH));
    assert!(!parsed.is_authorized(&id(0x81), AuthorityKey::REVOKE));
}

#[test]
fn test_short_by_one_byte() {
    let bytes = layout::serialize(&network(0, 0)).unwrap();
    let err = layout::parse::<NetworkAccount>(&bytes[..bytes.len() - 1]).unwrap_err();
    assert_eq!(
        err,
        CodecError::TruncatedBuffer {
            needed: 9536,
            available: 9535,
        }
    );
}

#[test]
fn test_count_exceeds_capacity() {
    let mut bytes = layout::serialize(&network(0, 0)).unwrap();
    bytes[AUTH_KEYS_OFFSET..AUTH_KEYS_OFFSET + 2].copy_from_slice(&129u16.to_le_bytes());
    let err = layout::parse::<NetworkAccount>(&bytes).unwrap_err();
    assert_eq!(
        err,
        CodecError::MalformedLength {
            declared: 129,
            limit: 128,
        }
    );
}

#[test]
fn test_serialize_over_capacity() {
    let err = layout::serialize(&network(MAX_FEES + 1, 0)).unwrap_err();
    assert_eq!(
        err,
        CodecError::CapacityExceeded {
            len: 129,
            capacity: 128,
        }
    );
}

#[test]
fn test_credential_minimum_and_layout() {
    assert_eq!(CredentialAccount::min_size(), 101);

    let account = credential();
    let bytes = layout::serialize(&account).unwrap();
    // One option present for owner identity, one for expiry.
    assert_eq!(bytes.len(), 101 + 32 + 8);
    assert_eq!(bytes[0], 0);
    assert_eq!(bytes[1], 0);
    assert_eq!(&bytes[2..34], id(1).as_bytes());
    assert_eq!(bytes[34], 1);

    let parsed: CredentialAccount = layout::parse(&bytes).unwrap();
    assert_eq!(parsed, account);
    assert!(parsed.is_active());
    assert!(parsed.is_expired(1_700_000_000));
    assert!(!parsed.is_expired(1_699_999_999));
}

#[test]
fn test_credential_over_allocated() {
    let mut bytes = layout::serialize(&credential()).unwrap();
    bytes.extend_from_slice(&[0; 64]);
    let parsed: CredentialAccount = layout::parse(&bytes).unwrap();
    assert_eq!(parsed, credential());
}

#[test]
fn test_credential_bad_state() {
    let mut account = credential();
    account.owner_identity = None;
    account.expire_time = None;
    let mut bytes = layout::serialize(&account).unwrap();
    assert_eq!(bytes.len(), 101);
    // version, parent flag, owner, identity flag, network, authority, state
    let state_offset = 1 + 1 + 32 + 1 + 32 + 32;
    bytes[state_offset] = 7;
    assert!(matches!(
        layout::parse::<CredentialAccount>(&bytes),
        Err(CodecError::UnknownVariant { discriminant: 7, .. })
    ));
}

#[test]
fn test_credential_short_buffer() {
    let err = layout::parse::<CredentialAccount>(&[0; 100]).unwrap_err();
    assert_eq!(
        err,
        CodecError::TruncatedBuffer {
            needed: 101,
            available: 100,
        }
    );
}

#[test]
fn test_parse_account_by_kind() {
    let bytes = layout::serialize(&network(1, 1)).unwrap();
    let kind = AccountKind::from_name("network").unwrap();
    match parse_account(kind, &bytes).unwrap() {
        AccountData::Network(n) => assert_eq!(n.fees.len(), 1),
        other => panic!("expected network account, got {:?}", other),
    }
    assert!(matches!(
        AccountKind::from_name("gatekeeper"),
        Err(CodecError::UnknownType { .. })
    ));
}

#[test]
fn test_bounded_element_size_is_enforced() {
    // count 1, capacity 2, declared 4-byte elements
    let bytes = [1, 0, 0xAA, 0xBB, 0xCC, 0xDD, 0, 0, 0, 0];

    let mut cursor = Cursor::new(&bytes);
    let short = cursor.read_bounded(LengthPrefix::U16, 2, 4, |c| c.read_u16());
    assert!(matches!(short, Err(CodecError::TypeMismatch { .. })), "{:?}", short);

    let mut cursor = Cursor::new(&bytes);
    let long = cursor.read_bounded(LengthPrefix::U16, 2, 4, |c| c.read_u64());
    assert!(matches!(long, Err(CodecError::TypeMismatch { .. })), "{:?}", long);

    let mut cursor = Cursor::new(&bytes);
    let exact = cursor.read_bounded(LengthPrefix::U16, 2, 4, |c| c.read_u32()).unwrap();
    assert_eq!(exact, vec![0xDDCC_BBAA]);
    assert_eq!(cursor.remaining(), 0);
}

#[test]
fn test_section_offset_past_end_is_layout_size() {
    let sections = NetworkAccount::SECTIONS;
    assert_eq!(layout::section_offset(sections, sections.len()), 9536);
    assert_eq!(layout::section_offset(sections, sections.len() + 5), 9536);
    assert_eq!(layout::section_offset(sections, usize::MAX), 9536);
}
