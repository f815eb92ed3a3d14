//! Unit tests for tool descriptors and input schemas.

use mcpwebkit::mcp::schema::{InputSchema, PropertyKind, ToolDescriptor};
use serde_json::json;

#[test]
fn empty_schema_has_object_shape() {
    assert_eq!(
        InputSchema::empty().to_json(),
        json!({ "type": "object", "properties": {}, "required": [] })
    );
}

#[test]
fn properties_serialize_in_declaration_order() {
    let schema = InputSchema::empty()
        .required("zeta", PropertyKind::String, "last letter")
        .optional("alpha", PropertyKind::Boolean, "first letter");

    let text = serde_json::to_string(&schema).expect("serialize");
    assert_eq!(
        text,
        r#"{"type":"object","properties":{"zeta":{"type":"string","description":"last letter"},"alpha":{"type":"boolean","description":"first letter"}},"required":["zeta"]}"#
    );
}

#[test]
fn required_names_are_always_properties() {
    let schema = InputSchema::empty()
        .required("a", PropertyKind::String, "")
        .optional("b", PropertyKind::Integer, "")
        .required("c", PropertyKind::Number, "");

    let names: Vec<&str> = schema.properties().map(|(name, _)| name).collect();
    assert_eq!(names, ["a", "b", "c"]);
    for required in schema.required_names() {
        assert!(names.contains(&required.as_str()));
    }
    assert_eq!(schema.required_names(), ["a", "c"]);
}

#[test]
fn redeclaring_a_property_replaces_it_in_place() {
    let schema = InputSchema::empty()
        .optional("x", PropertyKind::String, "old")
        .optional("y", PropertyKind::String, "")
        .required("x", PropertyKind::Integer, "new");

    let (name, descriptor) = schema.properties().next().expect("first property");
    assert_eq!(name, "x");
    assert_eq!(descriptor.kind, PropertyKind::Integer);
    assert_eq!(descriptor.description, "new");
    assert_eq!(schema.properties().count(), 2);
    assert_eq!(schema.required_names(), ["x"]);
}

#[test]
fn descriptor_uses_input_schema_key() {
    let descriptor = ToolDescriptor::new(
        "echo",
        "Echo a message",
        InputSchema::empty().required("message", PropertyKind::String, "text"),
    );
    let value = serde_json::to_value(&descriptor).expect("serialize");
    assert_eq!(
        value,
        json!({
            "name": "echo",
            "description": "Echo a message",
            "inputSchema": {
                "type": "object",
                "properties": { "message": { "type": "string", "description": "text" } },
                "required": ["message"],
            },
        })
    );
}
