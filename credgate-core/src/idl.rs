//! IDL (Interface Definition Language) documents.
//!
//! An IDL describes registered types and, for a program, its instructions
//! and their accounts. It is the configuration format for dynamic
//! registries: tools load one from JSON and build a
//! [`Registry`](crate::schema::Registry) from it.

use serde::{Deserialize, Serialize};

use crate::schema::{FieldDef, NamedType};

/// Top-level IDL document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecIdl {
    pub version: String,
    pub name: String,
    /// Types in registration order. A type may only reference earlier ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<NamedType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<IdlInstruction>,
}

/// An instruction in the IDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    pub discriminant: u8,
    pub accounts: Vec<IdlAccountItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<FieldDef>,
}

/// An account expected by an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlAccountItem {
    pub name: String,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub signer: bool,
}

impl CodecIdl {
    /// Create an empty IDL with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: name.into(),
            types: vec![],
            instructions: vec![],
        }
    }

    /// Find an instruction by its snake_case name.
    pub fn instruction(&self, name: &str) -> Option<&IdlInstruction> {
        self.instructions.iter().find(|ix| ix.name == name)
    }

    /// Serialize the IDL to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
