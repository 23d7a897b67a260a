//! Concrete account layouts of the credential program.

use crate::cursor::{Cursor, Writer};
use crate::error::{CodecError, CodecResult};
use crate::instruction::CredentialState;
use crate::layout::{self, AccountLayout, LayoutElement, Section};
use crate::primitive::{Identifier, LengthPrefix, PrimitiveType, IDENTIFIER_LEN};

/// Fee table capacity reserved in every network account.
pub const MAX_FEES: usize = 128;
/// Authority key capacity reserved in every network account.
pub const MAX_AUTHORITY_KEYS: usize = 128;

/// A credential issued to a subject.
///
/// ```text
/// version            u8
/// parent             Option<identifier>
/// owner              identifier
/// owner_identity     Option<identifier>
/// network            identifier
/// issuing_authority  identifier
/// state              u8 (CredentialState discriminant)
/// expire_time        Option<i64>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialAccount {
    pub version: u8,
    pub parent: Option<Identifier>,
    pub owner: Identifier,
    pub owner_identity: Option<Identifier>,
    pub network: Identifier,
    pub issuing_authority: Identifier,
    pub state: CredentialState,
    pub expire_time: Option<i64>,
}

impl CredentialAccount {
    pub fn is_active(&self) -> bool {
        self.state == CredentialState::Active
    }

    /// Whether the credential has an expiry at or before `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_time.is_some_and(|t| t <= now)
    }
}

impl AccountLayout for CredentialAccount {
    const NAME: &'static str = "credential";
    const SECTIONS: &'static [Section] = &[
        Section::Field(PrimitiveType::U8),
        Section::Optional(PrimitiveType::Identifier),
        Section::Field(PrimitiveType::Identifier),
        Section::Optional(PrimitiveType::Identifier),
        Section::Field(PrimitiveType::Identifier),
        Section::Field(PrimitiveType::Identifier),
        Section::Field(PrimitiveType::U8),
        Section::Optional(PrimitiveType::I64),
    ];

    fn read(cursor: &mut Cursor<'_>) -> CodecResult<Self> {
        Ok(Self {
            version: cursor.read_u8()?,
            parent: cursor.read_option(Cursor::read_identifier)?,
            owner: cursor.read_identifier()?,
            owner_identity: cursor.read_option(Cursor::read_identifier)?,
            network: cursor.read_identifier()?,
            issuing_authority: cursor.read_identifier()?,
            state: CredentialState::from_discriminant(cursor.read_u8()?)?,
            expire_time: cursor.read_option(Cursor::read_i64)?,
        })
    }

    fn write(&self, writer: &mut Writer) -> CodecResult<()> {
        writer.write_u8(self.version);
        writer.write_option(self.parent.as_ref(), Writer::write_identifier);
        writer.write_identifier(&self.owner);
        writer.write_option(self.owner_identity.as_ref(), Writer::write_identifier);
        writer.write_identifier(&self.network);
        writer.write_identifier(&self.issuing_authority);
        writer.write_u8(self.state.discriminant());
        writer.write_option(self.expire_time.as_ref(), |w, t| w.write_i64(*t));
        Ok(())
    }
}

/// Fee schedule for one token, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeEntry {
    pub token: Identifier,
    pub issue: u16,
    pub refresh: u16,
    pub expire: u16,
    pub verify: u16,
}

impl LayoutElement for FeeEntry {
    const SIZE: usize = IDENTIFIER_LEN + 4 * 2;

    fn read(cursor: &mut Cursor<'_>) -> CodecResult<Self> {
        Ok(Self {
            token: cursor.read_identifier()?,
            issue: cursor.read_u16()?,
            refresh: cursor.read_u16()?,
            expire: cursor.read_u16()?,
            verify: cursor.read_u16()?,
        })
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_identifier(&self.token);
        writer.write_u16(self.issue);
        writer.write_u16(self.refresh);
        writer.write_u16(self.expire);
        writer.write_u16(self.verify);
    }
}

/// A key allowed to act for the network, with its permission flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthorityKey {
    pub flags: u16,
    pub key: Identifier,
}

impl AuthorityKey {
    pub const AUTH: u16 = 1 << 0;
    pub const ISSUE: u16 = 1 << 1;
    pub const REFRESH: u16 = 1 << 2;
    pub const SET_EXPIRE: u16 = 1 << 3;
    pub const FREEZE: u16 = 1 << 4;
    pub const UNFREEZE: u16 = 1 << 5;
    pub const REVOKE: u16 = 1 << 6;
    pub const ADJUST_FEES: u16 = 1 << 7;

    pub fn new(key: Identifier, flags: u16) -> Self {
        Self { flags, key }
    }

    /// True when every bit of `flag` is set.
    pub fn has_flag(&self, flag: u16) -> bool {
        self.flags & flag == flag
    }
}

impl LayoutElement for AuthorityKey {
    const SIZE: usize = 2 + IDENTIFIER_LEN;

    fn read(cursor: &mut Cursor<'_>) -> CodecResult<Self> {
        Ok(Self {
            flags: cursor.read_u16()?,
            key: cursor.read_identifier()?,
        })
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_u16(self.flags);
        writer.write_identifier(&self.key);
    }
}

/// Network configuration account. Always exactly 9536 bytes.
///
/// ```text
/// offset  field
///      0  version              u8
///      1  authority            identifier
///     33  network_index        u16
///     35  network_bump         u8
///     36  (pad to 8)
///     40  pass_expire_time     i64
///     48  fees                 u16 count + 128 * FeeEntry (40)
///   5170  auth_keys            u16 count + 128 * AuthorityKey (34)
///   9524  (pad to 8)
///   9528  network_features     u64
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAccount {
    pub version: u8,
    pub authority: Identifier,
    pub network_index: u16,
    pub network_bump: u8,
    pub pass_expire_time: i64,
    pub fees: Vec<FeeEntry>,
    pub auth_keys: Vec<AuthorityKey>,
    pub network_features: u64,
}

impl NetworkAccount {
    pub const ALIGN: usize = 8;

    pub fn fee(&self, token: &Identifier) -> Option<&FeeEntry> {
        self.fees.iter().find(|f| f.token == *token)
    }

    /// Whether `key` holds every permission in `flag`.
    pub fn is_authorized(&self, key: &Identifier, flag: u16) -> bool {
        self.auth_keys
            .iter()
            .any(|k| k.key == *key && k.has_flag(flag))
    }
}

impl AccountLayout for NetworkAccount {
    const NAME: &'static str = "network";
    const SECTIONS: &'static [Section] = &[
        Section::Field(PrimitiveType::U8),
        Section::Field(PrimitiveType::Identifier),
        Section::Field(PrimitiveType::U16),
        Section::Field(PrimitiveType::U8),
        Section::Align(NetworkAccount::ALIGN),
        Section::Field(PrimitiveType::I64),
        Section::Bounded {
            prefix: LengthPrefix::U16,
            capacity: MAX_FEES,
            element_size: FeeEntry::SIZE,
        },
        Section::Bounded {
            prefix: LengthPrefix::U16,
            capacity: MAX_AUTHORITY_KEYS,
            element_size: AuthorityKey::SIZE,
        },
        Section::Align(NetworkAccount::ALIGN),
        Section::Field(PrimitiveType::U64),
    ];

    fn read(cursor: &mut Cursor<'_>) -> CodecResult<Self> {
        let version = cursor.read_u8()?;
        let authority = cursor.read_identifier()?;
        let network_index = cursor.read_u16()?;
        let network_bump = cursor.read_u8()?;
        cursor.align_to(Self::ALIGN)?;
        let pass_expire_time = cursor.read_i64()?;
        let fees = cursor.read_bounded(LengthPrefix::U16, MAX_FEES, FeeEntry::SIZE, FeeEntry::read)?;
        let auth_keys = cursor.read_bounded(
            LengthPrefix::U16,
            MAX_AUTHORITY_KEYS,
            AuthorityKey::SIZE,
            AuthorityKey::read,
        )?;
        cursor.align_to(Self::ALIGN)?;
        let network_features = cursor.read_u64()?;
        Ok(Self {
            version,
            authority,
            network_index,
            network_bump,
            pass_expire_time,
            fees,
            auth_keys,
            network_features,
        })
    }

    fn write(&self, writer: &mut Writer) -> CodecResult<()> {
        writer.write_u8(self.version);
        writer.write_identifier(&self.authority);
        writer.write_u16(self.network_index);
        writer.write_u8(self.network_bump);
        writer.pad_to(Self::ALIGN);
        writer.write_i64(self.pass_expire_time);
        writer.write_bounded(
            LengthPrefix::U16,
            MAX_FEES,
            FeeEntry::SIZE,
            &self.fees,
            |w, f| f.write(w),
        )?;
        writer.write_bounded(
            LengthPrefix::U16,
            MAX_AUTHORITY_KEYS,
            AuthorityKey::SIZE,
            &self.auth_keys,
            |w, k| k.write(w),
        )?;
        writer.pad_to(Self::ALIGN);
        writer.write_u64(self.network_features);
        Ok(())
    }
}

/// Account kinds that can be parsed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Credential,
    Network,
}

impl AccountKind {
    pub const ALL: [AccountKind; 2] = [AccountKind::Credential, AccountKind::Network];

    pub fn name(self) -> &'static str {
        match self {
            AccountKind::Credential => CredentialAccount::NAME,
            AccountKind::Network => NetworkAccount::NAME,
        }
    }

    pub fn from_name(name: &str) -> CodecResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| CodecError::unknown_type(name))
    }

    pub fn min_size(self) -> usize {
        match self {
            AccountKind::Credential => CredentialAccount::min_size(),
            AccountKind::Network => NetworkAccount::min_size(),
        }
    }
}

/// A parsed account of any known kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountData {
    Credential(CredentialAccount),
    Network(NetworkAccount),
}

/// Parse account data whose kind is only known at runtime.
pub fn parse_account(kind: AccountKind, bytes: &[u8]) -> CodecResult<AccountData> {
    Ok(match kind {
        AccountKind::Credential => AccountData::Credential(layout::parse(bytes)?),
        AccountKind::Network => AccountData::Network(layout::parse(bytes)?),
    })
}
