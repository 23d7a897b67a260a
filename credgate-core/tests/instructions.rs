//! Credential program instruction encoding.
//!
//! The borsh-derived mirror below is how the on-chain program decodes
//! instruction data; every command must produce identical bytes.

use borsh::{BorshDeserialize, BorshSerialize};
use credgate_core::error::CodecError;
use credgate_core::instruction::{
    program_idl, Command, CommandKind, CredentialState, InstructionBuilder, KnownType,
};
use credgate_core::primitive::{Identifier, PrimitiveType};
use credgate_core::schema::{field, Registry, TypeDescriptor};

#[derive(Debug, PartialEq, BorshSerialize, BorshDeserialize)]
enum MirrorState {
    Active,
    Frozen,
    Revoked,
}

#[derive(Debug, PartialEq, BorshSerialize, BorshDeserialize)]
enum MirrorCommand {
    RegisterAuthority,
    IssueCredential {
        seed: Option<[u8; 8]>,
        expire_time: Option<i64>,
    },
    SetCredentialState {
        state: MirrorState,
    },
    UpdateExpiry {
        expire_time: i64,
    },
    RevokeAuthority,
}

const PROGRAM_ID: Identifier = Identifier::new([0x11; 32]);

fn id(byte: u8) -> Identifier {
    Identifier::new([byte; 32])
}

fn known_registry() -> Registry {
    Registry::with_known_types().unwrap()
}

#[test]
fn test_issue_credential_bytes() {
    let registry = known_registry();
    let builder = InstructionBuilder::new(&registry, PROGRAM_ID).unwrap();

    let ix = builder
        .issue_credential([id(1), id(2), id(3), id(4), id(5), id(6)], None, Some(1_700_000_000))
        .unwrap();

    let mut expected = vec![1, 0, 1];
    expected.extend_from_slice(&1_700_000_000i64.to_le_bytes());
    assert_eq!(ix.data, expected);
    assert_eq!(ix.program_id, PROGRAM_ID);

    let parsed = builder.parse(&ix.data).unwrap();
    assert_eq!(
        parsed,
        Command::IssueCredential {
            seed: None,
            expire_time: Some(1_700_000_000),
        }
    );
}

#[test]
fn test_issue_credential_account_roles() {
    let registry = known_registry();
    let builder = InstructionBuilder::new(&registry, PROGRAM_ID).unwrap();
    let ix = builder
        .issue_credential([id(1), id(2), id(3), id(4), id(5), id(6)], Some([7; 8]), None)
        .unwrap();

    let flags: Vec<(bool, bool)> = ix.accounts.iter().map(|a| (a.signer, a.writable)).collect();
    assert_eq!(
        flags,
        vec![
            (true, true),
            (false, true),
            (false, false),
            (false, false),
            (true, false),
            (false, false),
        ]
    );
    // Subject is carried as an account, not in the payload.
    assert_eq!(ix.accounts[2].address, id(3));
    assert_eq!(ix.data, vec![1, 1, 7, 7, 7, 7, 7, 7, 7, 7, 0]);
}

#[test]
fn test_matches_borsh_layout() {
    let registry = known_registry();
    let builder = InstructionBuilder::new(&registry, PROGRAM_ID).unwrap();

    let pairs = [
        (Command::RegisterAuthority, MirrorCommand::RegisterAuthority),
        (
            Command::IssueCredential {
                seed: Some(*b"abcdefgh"),
                expire_time: Some(-5),
            },
            MirrorCommand::IssueCredential {
                seed: Some(*b"abcdefgh"),
                expire_time: Some(-5),
            },
        ),
        (
            Command::SetCredentialState {
                state: CredentialState::Revoked,
            },
            MirrorCommand::SetCredentialState {
                state: MirrorState::Revoked,
            },
        ),
        (
            Command::UpdateExpiry { expire_time: i64::MAX },
            MirrorCommand::UpdateExpiry { expire_time: i64::MAX },
        ),
        (Command::RevokeAuthority, MirrorCommand::RevokeAuthority),
    ];

    for (command, mirror) in pairs {
        let ours = builder.encode(&command).unwrap();
        let theirs = borsh::to_vec(&mirror).unwrap();
        assert_eq!(ours, theirs, "{:?}", command);
        assert_eq!(MirrorCommand::try_from_slice(&ours).unwrap(), mirror);
        assert_eq!(builder.parse(&theirs).unwrap(), command);
    }
}

#[test]
fn test_set_state_encoding() {
    let registry = known_registry();
    let builder = InstructionBuilder::new(&registry, PROGRAM_ID).unwrap();
    let ix = builder
        .set_credential_state([id(1), id(2), id(3)], CredentialState::Frozen)
        .unwrap();
    assert_eq!(ix.data, vec![2, 1]);
    assert!(ix.accounts[0].signer);
    assert!(ix.accounts[1].writable);
}

#[test]
fn test_unknown_command_discriminant() {
    let registry = known_registry();
    let builder = InstructionBuilder::new(&registry, PROGRAM_ID).unwrap();
    let err = builder.parse(&[5]).unwrap_err();
    assert_eq!(
        err,
        CodecError::UnknownVariant {
            ty: "Command".to_string(),
            discriminant: 5,
            count: 5,
        }
    );
}

#[test]
fn test_unknown_state_discriminant() {
    let registry = known_registry();
    let builder = InstructionBuilder::new(&registry, PROGRAM_ID).unwrap();
    assert!(matches!(
        builder.parse(&[2, 3]),
        Err(CodecError::UnknownVariant { discriminant: 3, .. })
    ));
}

#[test]
fn test_account_count_checked() {
    let registry = known_registry();
    let builder = InstructionBuilder::new(&registry, PROGRAM_ID).unwrap();
    assert!(matches!(
        builder.build(&Command::RevokeAuthority, &[id(1), id(2)]),
        Err(CodecError::FieldMismatch { .. })
    ));
}

#[test]
fn test_state_from_flags() {
    assert_eq!(
        CredentialState::from_flags(false, true, false).unwrap(),
        CredentialState::Frozen
    );
    assert!(matches!(
        CredentialState::from_flags(false, false, false),
        Err(CodecError::InvalidVariantCount { count: 0, .. })
    ));
    assert!(matches!(
        CredentialState::from_flags(true, false, true),
        Err(CodecError::InvalidVariantCount { count: 2, .. })
    ));
}

#[test]
fn test_builder_requires_known_types() {
    let empty = Registry::new();
    assert!(matches!(
        InstructionBuilder::new(&empty, PROGRAM_ID),
        Err(CodecError::UnknownType { .. })
    ));

    // Same names, different layout.
    let mut wrong = Registry::new();
    wrong
        .register(
            KnownType::CredentialState.name(),
            TypeDescriptor::union([("Active", vec![]), ("Frozen", vec![])]),
        )
        .unwrap();
    wrong
        .register(
            KnownType::Command.name(),
            TypeDescriptor::union([("Noop", vec![field("x", PrimitiveType::U8)])]),
        )
        .unwrap();
    assert!(matches!(
        InstructionBuilder::new(&wrong, PROGRAM_ID),
        Err(CodecError::InvalidDescriptor { .. })
    ));
}

#[test]
fn test_registry_from_program_idl() {
    let idl = program_idl();
    let registry = Registry::from_idl(&idl).unwrap();
    assert!(InstructionBuilder::new(&registry, PROGRAM_ID).is_ok());

    assert_eq!(idl.instructions.len(), CommandKind::ALL.len());
    let issue = idl.instruction("issue_credential").unwrap();
    assert_eq!(issue.discriminant, 1);
    assert_eq!(issue.accounts.len(), 6);
    assert_eq!(issue.args.len(), 2);
}

#[test]
fn test_command_kind_names() {
    for kind in CommandKind::ALL {
        assert_eq!(CommandKind::from_name(kind.name()), Some(kind));
        assert_eq!(CommandKind::from_name(kind.snake_name()), Some(kind));
    }
    assert_eq!(CommandKind::from_name("close_credential"), None);
}
