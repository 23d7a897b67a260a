//! Instruction builder for the credential program.
//!
//! Commands are encoded as a tagged union (`Command`) whose discriminant is
//! the command's position in [`CommandKind::ALL`]. That order is part of the
//! wire format: new commands are appended, never inserted.

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::idl::{CodecIdl, IdlAccountItem, IdlInstruction};
use crate::primitive::{Identifier, Primitive, PrimitiveType};
use crate::schema::{field, FieldDef, FieldType, NamedType, Registry, TypeDescriptor};
use crate::value::{Fields, UnionValue, Value};

/// Seed mixed into a credential's address derivation.
pub type AddressSeed = [u8; SEED_LEN];

pub const SEED_LEN: usize = 8;

/// Name of the program in exported IDL documents.
pub const PROGRAM_NAME: &str = "credential_program";

/// The closed set of composite types the builder relies on.
///
/// Registration order is dependency order: `Command` references
/// `CredentialState`, so the state is registered first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownType {
    CredentialState,
    Command,
}

impl KnownType {
    pub const ALL: [KnownType; 2] = [KnownType::CredentialState, KnownType::Command];

    pub fn name(self) -> &'static str {
        match self {
            KnownType::CredentialState => "CredentialState",
            KnownType::Command => "Command",
        }
    }

    pub fn descriptor(self) -> TypeDescriptor {
        match self {
            KnownType::CredentialState => TypeDescriptor::union(
                CredentialState::ALL.map(|state| (state.name(), Vec::new())),
            ),
            KnownType::Command => {
                TypeDescriptor::union(CommandKind::ALL.map(|kind| (kind.name(), kind.args())))
            }
        }
    }
}

// ── Credential state ─────────────────────────────────────────────────────────

/// State of an issued credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CredentialState {
    #[default]
    Active = 0,
    Frozen = 1,
    Revoked = 2,
}

impl CredentialState {
    pub const ALL: [CredentialState; 3] = [
        CredentialState::Active,
        CredentialState::Frozen,
        CredentialState::Revoked,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CredentialState::Active => "Active",
            CredentialState::Frozen => "Frozen",
            CredentialState::Revoked => "Revoked",
        }
    }

    pub fn discriminant(self) -> u8 {
        self as u8
    }

    pub fn from_discriminant(discriminant: u8) -> CodecResult<Self> {
        Self::ALL
            .get(discriminant as usize)
            .copied()
            .ok_or_else(|| CodecError::UnknownVariant {
                ty: KnownType::CredentialState.name().to_string(),
                discriminant,
                count: Self::ALL.len(),
            })
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Pick the state from a set of flags; exactly one must be set.
    pub fn from_flags(active: bool, frozen: bool, revoked: bool) -> CodecResult<Self> {
        let candidates = [(active, Self::Active), (frozen, Self::Frozen), (revoked, Self::Revoked)];
        let selected = UnionValue::from_candidates(
            KnownType::CredentialState.name(),
            candidates.map(|(set, state)| (state.name(), set.then(Fields::new))),
        )?;
        Self::from_value(Value::Union(selected))
    }

    pub fn to_value(self) -> Value {
        Value::Union(UnionValue::new(KnownType::CredentialState.name(), self.name()))
    }

    pub fn from_value(value: Value) -> CodecResult<Self> {
        let union = expect_union(value, KnownType::CredentialState)?;
        Self::from_name(&union.variant).ok_or_else(|| CodecError::FieldMismatch {
            ty: union.ty.clone(),
            expected: "Active|Frozen|Revoked".to_string(),
            found: union.variant.clone(),
        })
    }
}

fn expect_union(value: Value, known: KnownType) -> CodecResult<UnionValue> {
    let union = value.into_union()?;
    if union.ty != known.name() {
        return Err(CodecError::mismatch(known.name(), union.ty));
    }
    Ok(union)
}

// ── Commands ─────────────────────────────────────────────────────────────────

/// Discriminant-only view of [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandKind {
    RegisterAuthority = 0,
    IssueCredential = 1,
    SetCredentialState = 2,
    UpdateExpiry = 3,
    RevokeAuthority = 4,
}

/// An account an instruction touches, by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRole {
    pub name: &'static str,
    pub signer: bool,
    pub writable: bool,
}

const fn role(name: &'static str, signer: bool, writable: bool) -> AccountRole {
    AccountRole {
        name,
        signer,
        writable,
    }
}

const REGISTER_AUTHORITY_ACCOUNTS: [AccountRole; 4] = [
    role("funder", true, true),
    role("authority_record", false, true),
    role("authority", true, false),
    role("network", true, false),
];

const ISSUE_CREDENTIAL_ACCOUNTS: [AccountRole; 6] = [
    role("funder", true, true),
    role("credential", false, true),
    role("subject", false, false),
    role("authority_record", false, false),
    role("authority", true, false),
    role("network", false, false),
];

const CREDENTIAL_UPDATE_ACCOUNTS: [AccountRole; 3] = [
    role("authority", true, false),
    role("credential", false, true),
    role("authority_record", false, false),
];

const REVOKE_AUTHORITY_ACCOUNTS: [AccountRole; 3] = [
    role("destination", false, true),
    role("authority_record", false, true),
    role("network", true, false),
];

impl CommandKind {
    /// Every command, in discriminant order. Append only.
    pub const ALL: [CommandKind; 5] = [
        CommandKind::RegisterAuthority,
        CommandKind::IssueCredential,
        CommandKind::SetCredentialState,
        CommandKind::UpdateExpiry,
        CommandKind::RevokeAuthority,
    ];

    pub fn discriminant(self) -> u8 {
        self as u8
    }

    /// Variant name in the `Command` union.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::RegisterAuthority => "RegisterAuthority",
            CommandKind::IssueCredential => "IssueCredential",
            CommandKind::SetCredentialState => "SetCredentialState",
            CommandKind::UpdateExpiry => "UpdateExpiry",
            CommandKind::RevokeAuthority => "RevokeAuthority",
        }
    }

    /// Instruction name in IDL documents.
    pub fn snake_name(self) -> &'static str {
        match self {
            CommandKind::RegisterAuthority => "register_authority",
            CommandKind::IssueCredential => "issue_credential",
            CommandKind::SetCredentialState => "set_credential_state",
            CommandKind::UpdateExpiry => "update_expiry",
            CommandKind::RevokeAuthority => "revoke_authority",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name || k.snake_name() == name)
    }

    /// Payload fields, in encoding order.
    pub fn args(self) -> Vec<FieldDef> {
        let expire_time = || FieldType::from(PrimitiveType::I64);
        match self {
            CommandKind::RegisterAuthority | CommandKind::RevokeAuthority => vec![],
            CommandKind::IssueCredential => vec![
                field("seed", FieldType::option(PrimitiveType::Bytes(SEED_LEN).into())),
                field("expire_time", FieldType::option(expire_time())),
            ],
            CommandKind::SetCredentialState => vec![field(
                "state",
                FieldType::defined(KnownType::CredentialState.name()),
            )],
            CommandKind::UpdateExpiry => vec![field("expire_time", expire_time())],
        }
    }

    /// Accounts the command expects, in order.
    pub fn accounts(self) -> &'static [AccountRole] {
        match self {
            CommandKind::RegisterAuthority => &REGISTER_AUTHORITY_ACCOUNTS,
            CommandKind::IssueCredential => &ISSUE_CREDENTIAL_ACCOUNTS,
            CommandKind::SetCredentialState | CommandKind::UpdateExpiry => {
                &CREDENTIAL_UPDATE_ACCOUNTS
            }
            CommandKind::RevokeAuthority => &REVOKE_AUTHORITY_ACCOUNTS,
        }
    }
}

/// A typed credential program command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add an authority to a network.
    RegisterAuthority,
    /// Issue a credential. `None` means "no seed" / "never expires".
    IssueCredential {
        seed: Option<AddressSeed>,
        expire_time: Option<i64>,
    },
    /// Move a credential to another state.
    SetCredentialState { state: CredentialState },
    /// Replace a credential's expiry.
    UpdateExpiry { expire_time: i64 },
    /// Remove an authority from its network.
    RevokeAuthority,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::RegisterAuthority => CommandKind::RegisterAuthority,
            Command::IssueCredential { .. } => CommandKind::IssueCredential,
            Command::SetCredentialState { .. } => CommandKind::SetCredentialState,
            Command::UpdateExpiry { .. } => CommandKind::UpdateExpiry,
            Command::RevokeAuthority => CommandKind::RevokeAuthority,
        }
    }

    pub fn to_value(&self) -> Value {
        let union = UnionValue::new(KnownType::Command.name(), self.kind().name());
        let union = match self {
            Command::RegisterAuthority | Command::RevokeAuthority => union,
            Command::IssueCredential { seed, expire_time } => union
                .with(
                    "seed",
                    Value::from_option(seed.map(|s| Primitive::Bytes(s.to_vec()))),
                )
                .with("expire_time", Value::from_option(*expire_time)),
            Command::SetCredentialState { state } => union.with("state", state.to_value()),
            Command::UpdateExpiry { expire_time } => union.with("expire_time", *expire_time),
        };
        Value::Union(union)
    }

    pub fn from_value(value: Value) -> CodecResult<Self> {
        let mut union = expect_union(value, KnownType::Command)?;
        let kind = CommandKind::from_name(&union.variant).ok_or_else(|| {
            CodecError::FieldMismatch {
                ty: union.ty.clone(),
                expected: "a known command".to_string(),
                found: union.variant.clone(),
            }
        })?;
        let command = match kind {
            CommandKind::RegisterAuthority => Command::RegisterAuthority,
            CommandKind::IssueCredential => {
                let seed = match union.take("seed")?.into_option()? {
                    Some(v) => Some(seed_from_bytes(v.into_bytes()?)?),
                    None => None,
                };
                let expire_time = union
                    .take("expire_time")?
                    .into_option()?
                    .map(i64::try_from)
                    .transpose()?;
                Command::IssueCredential { seed, expire_time }
            }
            CommandKind::SetCredentialState => Command::SetCredentialState {
                state: CredentialState::from_value(union.take("state")?)?,
            },
            CommandKind::UpdateExpiry => Command::UpdateExpiry {
                expire_time: i64::try_from(union.take("expire_time")?)?,
            },
            CommandKind::RevokeAuthority => Command::RevokeAuthority,
        };
        if let Some((extra, _)) = union.fields.first() {
            return Err(CodecError::FieldMismatch {
                ty: format!("{}::{}", union.ty, union.variant),
                expected: "<end>".to_string(),
                found: extra.clone(),
            });
        }
        Ok(command)
    }
}

fn seed_from_bytes(bytes: Vec<u8>) -> CodecResult<AddressSeed> {
    let found = PrimitiveType::Bytes(bytes.len()).to_string();
    bytes
        .try_into()
        .map_err(|_| CodecError::mismatch(PrimitiveType::Bytes(SEED_LEN).to_string(), found))
}

// ── Instructions ─────────────────────────────────────────────────────────────

/// An account reference attached to an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub address: Identifier,
    pub signer: bool,
    pub writable: bool,
}

/// A fully encoded instruction, ready for signing and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Identifier,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// Builds credential program instructions over a registry.
#[derive(Debug, Clone, Copy)]
pub struct InstructionBuilder<'r> {
    codec: Codec<'r>,
    program_id: Identifier,
}

impl<'r> InstructionBuilder<'r> {
    /// Create a builder. Fails unless every [`KnownType`] is registered with
    /// the expected descriptor, so later encodes cannot hit an unknown type.
    pub fn new(registry: &'r Registry, program_id: Identifier) -> CodecResult<Self> {
        for known in KnownType::ALL {
            if *registry.get(known.name())? != known.descriptor() {
                return Err(CodecError::InvalidDescriptor {
                    name: known.name().to_string(),
                    message: "registered descriptor differs from the built-in layout".to_string(),
                });
            }
        }
        Ok(Self {
            codec: Codec::new(registry),
            program_id,
        })
    }

    pub fn program_id(&self) -> Identifier {
        self.program_id
    }

    pub fn registry(&self) -> &'r Registry {
        self.codec.registry()
    }

    /// Instruction data for `command`.
    pub fn encode(&self, command: &Command) -> CodecResult<Vec<u8>> {
        self.codec.encode(&command.to_value())
    }

    /// Parse instruction data back into a command.
    pub fn parse(&self, data: &[u8]) -> CodecResult<Command> {
        let value = self.codec.decode(KnownType::Command.name(), data)?;
        Command::from_value(value)
    }

    /// Encode `command` and attach `accounts` in the order of
    /// [`CommandKind::accounts`].
    pub fn build(&self, command: &Command, accounts: &[Identifier]) -> CodecResult<Instruction> {
        let kind = command.kind();
        let roles = kind.accounts();
        if accounts.len() != roles.len() {
            return Err(CodecError::FieldMismatch {
                ty: format!("{} accounts", kind.name()),
                expected: format!("{} accounts", roles.len()),
                found: format!("{} accounts", accounts.len()),
            });
        }
        let data = self.encode(command)?;
        tracing::debug!(command = kind.name(), len = data.len(), "built instruction");
        Ok(Instruction {
            program_id: self.program_id,
            accounts: roles
                .iter()
                .zip(accounts)
                .map(|(role, &address)| AccountMeta {
                    address,
                    signer: role.signer,
                    writable: role.writable,
                })
                .collect(),
            data,
        })
    }

    /// Accounts: funder, authority record, authority, network.
    pub fn register_authority(&self, accounts: [Identifier; 4]) -> CodecResult<Instruction> {
        self.build(&Command::RegisterAuthority, &accounts)
    }

    /// Accounts: funder, credential, subject, authority record, authority,
    /// network.
    pub fn issue_credential(
        &self,
        accounts: [Identifier; 6],
        seed: Option<AddressSeed>,
        expire_time: Option<i64>,
    ) -> CodecResult<Instruction> {
        self.build(&Command::IssueCredential { seed, expire_time }, &accounts)
    }

    /// Accounts: authority, credential, authority record.
    pub fn set_credential_state(
        &self,
        accounts: [Identifier; 3],
        state: CredentialState,
    ) -> CodecResult<Instruction> {
        self.build(&Command::SetCredentialState { state }, &accounts)
    }

    /// Accounts: authority, credential, authority record.
    pub fn update_expiry(
        &self,
        accounts: [Identifier; 3],
        expire_time: i64,
    ) -> CodecResult<Instruction> {
        self.build(&Command::UpdateExpiry { expire_time }, &accounts)
    }

    /// Accounts: destination, authority record, network.
    pub fn revoke_authority(&self, accounts: [Identifier; 3]) -> CodecResult<Instruction> {
        self.build(&Command::RevokeAuthority, &accounts)
    }
}

/// IDL document describing the credential program's types and instructions.
pub fn program_idl() -> CodecIdl {
    let mut idl = CodecIdl::new(PROGRAM_NAME);
    idl.types = KnownType::ALL
        .into_iter()
        .map(|known| NamedType {
            name: known.name().to_string(),
            descriptor: known.descriptor(),
        })
        .collect();
    idl.instructions = CommandKind::ALL
        .into_iter()
        .map(|kind| IdlInstruction {
            name: kind.snake_name().to_string(),
            discriminant: kind.discriminant(),
            accounts: kind
                .accounts()
                .iter()
                .map(|role| IdlAccountItem {
                    name: role.name.to_string(),
                    writable: role.writable,
                    signer: role.signer,
                })
                .collect(),
            args: kind.args(),
        })
        .collect();
    idl
}
