//! # credgate core
//!
//! Binary codec for a credential-issuing program: primitive wire types, a
//! schema-driven encoder/decoder, typed instruction building and account
//! layout parsing.

pub mod account;
pub mod codec;
pub mod cursor;
pub mod error;
pub mod idl;
pub mod instruction;
pub mod layout;
pub mod primitive;
pub mod schema;
pub mod value;

pub mod prelude {
    pub use crate::account::{
        parse_account, AccountData, AccountKind, AuthorityKey, CredentialAccount, FeeEntry,
        NetworkAccount,
    };
    pub use crate::codec::Codec;
    pub use crate::cursor::{Cursor, Writer};
    pub use crate::error::{CodecError, CodecResult};
    pub use crate::idl::CodecIdl;
    pub use crate::instruction::{
        AccountMeta, Command, CommandKind, CredentialState, Instruction, InstructionBuilder,
        KnownType,
    };
    pub use crate::layout::AccountLayout;
    pub use crate::primitive::{Identifier, LengthPrefix, Primitive, PrimitiveType};
    pub use crate::schema::{field, FieldType, Registry, TypeDescriptor};
    pub use crate::value::{StructValue, UnionValue, Value};
}
