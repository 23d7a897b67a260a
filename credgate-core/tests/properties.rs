//! Property tests over generated commands, values and account data.

use credgate_core::account::{AuthorityKey, CredentialAccount, NetworkAccount, MAX_AUTHORITY_KEYS};
use credgate_core::codec::Codec;
use credgate_core::error::CodecError;
use credgate_core::instruction::{Command, CredentialState, InstructionBuilder};
use credgate_core::layout;
use credgate_core::primitive::{Identifier, Primitive, PrimitiveType};
use credgate_core::schema::Registry;
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = Identifier> {
    any::<[u8; 32]>().prop_map(Identifier::new)
}

fn state() -> impl Strategy<Value = CredentialState> {
    prop_oneof![
        Just(CredentialState::Active),
        Just(CredentialState::Frozen),
        Just(CredentialState::Revoked),
    ]
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::RegisterAuthority),
        (any::<Option<[u8; 8]>>(), any::<Option<i64>>())
            .prop_map(|(seed, expire_time)| Command::IssueCredential { seed, expire_time }),
        state().prop_map(|state| Command::SetCredentialState { state }),
        any::<i64>().prop_map(|expire_time| Command::UpdateExpiry { expire_time }),
        Just(Command::RevokeAuthority),
    ]
}

fn credential() -> impl Strategy<Value = CredentialAccount> {
    (
        any::<u8>(),
        proptest::option::of(identifier()),
        identifier(),
        proptest::option::of(identifier()),
        (identifier(), identifier()),
        state(),
        any::<Option<i64>>(),
    )
        .prop_map(
            |(version, parent, owner, owner_identity, (network, issuing_authority), state, expire_time)| {
                CredentialAccount {
                    version,
                    parent,
                    owner,
                    owner_identity,
                    network,
                    issuing_authority,
                    state,
                    expire_time,
                }
            },
        )
}

proptest! {
    #[test]
    fn command_decode_inverts_encode(cmd in command()) {
        let registry = Registry::with_known_types().unwrap();
        let builder = InstructionBuilder::new(&registry, Identifier::default()).unwrap();
        let bytes = builder.encode(&cmd).unwrap();
        prop_assert_eq!(bytes[0], cmd.kind().discriminant());
        prop_assert_eq!(builder.parse(&bytes).unwrap(), cmd);
    }

    #[test]
    fn accepted_bytes_reencode_identically(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
        let registry = Registry::with_known_types().unwrap();
        let codec = Codec::new(&registry);
        if let Ok(value) = codec.decode("Command", &bytes) {
            prop_assert_eq!(codec.encode(&value).unwrap(), bytes);
        }
    }

    #[test]
    fn integer_bounds(value in any::<i64>()) {
        let wide = value as i128;
        let in_u16 = (0..=u16::MAX as i128).contains(&wide);
        let result = Primitive::integer(PrimitiveType::U16, wide);
        prop_assert_eq!(result.is_ok(), in_u16);
        if let Err(err) = result {
            let is_out_of_range = matches!(err, CodecError::OutOfRange { .. });
            prop_assert!(is_out_of_range);
        }
    }

    #[test]
    fn credential_parse_inverts_serialize(account in credential()) {
        let bytes = layout::serialize(&account).unwrap();
        let parsed: CredentialAccount = layout::parse(&bytes).unwrap();
        prop_assert_eq!(parsed, account);
    }

    #[test]
    fn network_size_independent_of_key_count(
        keys in proptest::collection::vec((any::<u16>(), identifier()), 0..=MAX_AUTHORITY_KEYS),
        features in any::<u64>(),
    ) {
        let account = NetworkAccount {
            version: 1,
            authority: Identifier::default(),
            network_index: 0,
            network_bump: 0,
            pass_expire_time: 0,
            fees: vec![],
            auth_keys: keys.into_iter().map(|(flags, key)| AuthorityKey::new(key, flags)).collect(),
            network_features: features,
        };
        let bytes = layout::serialize(&account).unwrap();
        prop_assert_eq!(bytes.len(), 9536);
        prop_assert_eq!(&bytes[9528..], &features.to_le_bytes()[..]);
        let parsed: NetworkAccount = layout::parse(&bytes).unwrap();
        prop_assert_eq!(parsed, account);
    }
}
