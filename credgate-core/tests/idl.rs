//! IDL JSON forms and registry export/import.

use credgate_core::codec::Codec;
use credgate_core::idl::{CodecIdl, IdlAccountItem};
use credgate_core::instruction::{program_idl, Command};
use credgate_core::primitive::{LengthPrefix, PrimitiveType};
use credgate_core::schema::{field, FieldType, Registry, TypeDescriptor};

#[test]
fn test_account_item_flags_default_false() {
    let json = r#"{"name":"network"}"#;
    let acc: IdlAccountItem = serde_json::from_str(json).unwrap();
    assert_eq!(acc.name, "network");
    assert!(!acc.writable);
    assert!(!acc.signer);
}

#[test]
fn test_field_type_json_forms() {
    let ty: FieldType = serde_json::from_str(r#""[u8; 8]""#).unwrap();
    assert_eq!(ty, FieldType::Primitive(PrimitiveType::Bytes(8)));

    let ty: FieldType = serde_json::from_str(r#"{"option":"i64"}"#).unwrap();
    assert_eq!(ty, FieldType::option(PrimitiveType::I64.into()));

    let ty: FieldType = serde_json::from_str(r#"{"vec":"identifier","prefix":"u16"}"#).unwrap();
    assert_eq!(
        ty,
        FieldType::vec(PrimitiveType::Identifier.into(), LengthPrefix::U16)
    );

    let ty: FieldType = serde_json::from_str(r#"{"array":["u8",4]}"#).unwrap();
    assert_eq!(ty, FieldType::array(PrimitiveType::U8.into(), 4));

    let ty: FieldType = serde_json::from_str(r#"{"defined":"CredentialState"}"#).unwrap();
    assert_eq!(ty, FieldType::defined("CredentialState"));
}

#[test]
fn test_default_prefix_omitted() {
    let ty = FieldType::vec(PrimitiveType::U8.into(), LengthPrefix::U32);
    let json = serde_json::to_string(&ty).unwrap();
    assert!(!json.contains("prefix"), "JSON: {}", json);
}

#[test]
fn test_unknown_primitive_rejected() {
    assert!(serde_json::from_str::<FieldType>(r#""f32""#).is_err());
}

#[test]
fn test_type_descriptor_tagging() {
    let json = r#"{
        "name": "Limits",
        "kind": "struct",
        "fields": [
            {"name": "max", "type": "u32"},
            {"name": "owner", "type": {"option": "identifier"}}
        ]
    }"#;
    let idl_json = format!(r#"{{"version":"0.1.0","name":"limits","types":[{}]}}"#, json);
    let idl = CodecIdl::from_json(&idl_json).unwrap();
    assert_eq!(idl.types.len(), 1);
    assert_eq!(
        idl.types[0].descriptor,
        TypeDescriptor::structure([
            field("max", PrimitiveType::U32),
            field("owner", FieldType::option(PrimitiveType::Identifier.into())),
        ])
    );
    assert!(idl.instructions.is_empty());
}

#[test]
fn test_program_idl_roundtrip() {
    let idl = program_idl();
    let json = idl.to_json_pretty().unwrap();
    assert!(json.contains("\"kind\": \"union\""), "JSON: {}", json);
    assert!(json.contains("\"issue_credential\""));

    let back = CodecIdl::from_json(&json).unwrap();
    assert_eq!(back, idl);
}

#[test]
fn test_registry_export_import() {
    let registry = Registry::with_known_types().unwrap();
    let idl = registry.to_idl("exported");
    let json = idl.to_json_pretty().unwrap();
    let rebuilt = Registry::from_idl(&CodecIdl::from_json(&json).unwrap()).unwrap();
    assert_eq!(
        rebuilt.names().collect::<Vec<_>>(),
        registry.names().collect::<Vec<_>>()
    );

    let command = Command::IssueCredential {
        seed: Some([1; 8]),
        expire_time: None,
    };
    let value = command.to_value();
    assert_eq!(
        Codec::new(&rebuilt).encode(&value).unwrap(),
        Codec::new(&registry).encode(&value).unwrap()
    );
}

#[test]
fn test_out_of_order_idl_rejected() {
    let mut idl = program_idl();
    idl.types.reverse();
    assert!(Registry::from_idl(&idl).is_err());
}
