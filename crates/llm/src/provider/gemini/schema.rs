//! JSON Schema to Gemini `Schema` conversion for tool parameters.
//!
//! Gemini accepts a small OpenAPI subset: one type per node, a `nullable` flag
//! instead of `null` union members, no `anyOf`/`oneOf`/`allOf` and no exclusive
//! bounds. Nodes that cannot be given a type are dropped.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::json_number;
use crate::protocol::gemini::{Schema, SchemaType};

const SUPPORTED_STRING_FORMATS: [&str; 2] = ["enum", "date-time"];

/// Translates one JSON Schema node. `None` when no type can be derived.
pub fn translate(node: &Value) -> Option<Schema> {
    let Value::Object(map) = node else {
        return None;
    };

    let description = map.get("description").and_then(Value::as_str).map(str::to_string);

    if let Some(Value::Array(branches)) = map.get("allOf") {
        return merge_all_of(branches, description);
    }

    match (map.get("anyOf"), map.get("oneOf")) {
        (Some(Value::Array(branches)), _) | (_, Some(Value::Array(branches))) => {
            first_union_branch(branches, description)
        }
        _ => translate_node(map),
    }
}

fn merge_all_of(branches: &[Value], description: Option<String>) -> Option<Schema> {
    let mut merged: Option<Schema> = None;

    for branch in branches {
        let Some(schema) = translate(branch) else {
            continue;
        };

        merged = Some(match merged {
            Some(acc) => merge(acc, schema),
            None => schema,
        });
    }

    let mut merged = merged?;

    // Branches that did not translate still constrain which names are required.
    for branch in branches {
        for name in required_names(branch.get("required")) {
            push_unique(merged.required.get_or_insert_with(Vec::new), name);
        }
    }

    if merged.description.as_deref().is_none_or(str::is_empty) {
        merged.description = description.or(merged.description);
    }

    Some(merged)
}

fn merge(mut acc: Schema, next: Schema) -> Schema {
    acc.r#type = next.r#type;
    acc.nullable |= next.nullable;

    if acc.description.as_deref().is_none_or(str::is_empty) && next.description.is_some() {
        acc.description = next.description;
    }

    if let Some(required) = next.required {
        let names = acc.required.get_or_insert_with(Vec::new);

        for name in required {
            push_unique(names, name);
        }
    }

    if let Some(properties) = next.properties {
        acc.properties.get_or_insert_with(IndexMap::new).extend(properties);
    }

    acc.items = next.items.or(acc.items);
    acc.r#enum = next.r#enum.or(acc.r#enum);
    acc.format = next.format.or(acc.format);
    acc.minimum = next.minimum.or(acc.minimum);
    acc.maximum = next.maximum.or(acc.maximum);
    acc.min_length = next.min_length.or(acc.min_length);
    acc.max_length = next.max_length.or(acc.max_length);
    acc.min_items = next.min_items.or(acc.min_items);
    acc.max_items = next.max_items.or(acc.max_items);

    acc
}

/// Keeps the first branch that translates; `null` branches only mark the
/// result nullable. Other branches are discarded since Gemini has no union.
fn first_union_branch(branches: &[Value], description: Option<String>) -> Option<Schema> {
    let mut nullable = false;
    let mut kept = None;

    for branch in branches {
        if is_null_branch(branch) {
            nullable = true;
            continue;
        }

        if kept.is_none() {
            kept = translate(branch);
        }
    }

    let mut schema = kept?;
    schema.nullable |= nullable;

    if schema.description.is_none() {
        schema.description = description;
    }

    Some(schema)
}

fn is_null_branch(branch: &Value) -> bool {
    match branch.get("type") {
        Some(Value::String(name)) => name == "null",
        Some(Value::Array(names)) => !names.is_empty() && names.iter().all(|name| name.as_str() == Some("null")),
        _ => false,
    }
}

fn translate_node(map: &Map<String, Value>) -> Option<Schema> {
    let (declared, nullable) = declared_type(map.get("type"));
    let r#type = declared.or_else(|| infer_type(map))?;

    let mut schema = Schema::new(r#type);
    schema.nullable = nullable || map.get("nullable").and_then(Value::as_bool).unwrap_or(false);
    schema.description = map.get("description").and_then(Value::as_str).map(str::to_string);
    schema.r#enum = enum_members(map.get("enum"));

    match r#type {
        SchemaType::String => {
            schema.format = map
                .get("format")
                .and_then(Value::as_str)
                .filter(|format| SUPPORTED_STRING_FORMATS.contains(format))
                .map(str::to_string);

            schema.min_length = map.get("minLength").and_then(Value::as_u64);
            schema.max_length = map.get("maxLength").and_then(Value::as_u64);
        }
        SchemaType::Number | SchemaType::Integer => {
            let integer = r#type == SchemaType::Integer;

            schema.minimum = lower_bound(map, integer).and_then(json_number);
            schema.maximum = upper_bound(map, integer).and_then(json_number);
        }
        SchemaType::Array => {
            schema.items = map.get("items").and_then(translate).map(Box::new);
            schema.min_items = map.get("minItems").and_then(Value::as_u64);
            schema.max_items = map.get("maxItems").and_then(Value::as_u64);
        }
        SchemaType::Object => {
            if let Some(Value::Object(properties)) = map.get("properties") {
                let properties: IndexMap<_, _> = properties
                    .iter()
                    .filter_map(|(name, property)| Some((name.clone(), translate(property)?)))
                    .collect();

                schema.properties = (!properties.is_empty()).then_some(properties);
            }

            // Names whose property failed to translate stay required.
            let required = required_names(map.get("required"));
            schema.required = (!required.is_empty()).then_some(required);
        }
        SchemaType::Boolean => (),
    }

    Some(schema)
}

/// Declared type and whether `null` was among the declared types.
fn declared_type(value: Option<&Value>) -> (Option<SchemaType>, bool) {
    match value {
        Some(Value::String(name)) => (SchemaType::from_json_schema(name), name == "null"),
        Some(Value::Array(names)) => {
            let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
            let nullable = names.contains(&"null");

            let remaining: Vec<&str> = names.into_iter().filter(|name| *name != "null").collect();

            match remaining.as_slice() {
                [name] => (SchemaType::from_json_schema(name), nullable),
                _ => (None, nullable),
            }
        }
        _ => (None, false),
    }
}

fn infer_type(map: &Map<String, Value>) -> Option<SchemaType> {
    if map.get("properties").is_some_and(Value::is_object) {
        return Some(SchemaType::Object);
    }

    if map.get("items").is_some_and(|items| !items.is_null()) {
        return Some(SchemaType::Array);
    }

    let Some(Value::Array(members)) = map.get("enum") else {
        return None;
    };

    if members.is_empty() {
        return None;
    }

    let inferred = members.iter().find(|member| !member.is_null()).and_then(|member| match member {
        Value::String(_) => Some(SchemaType::String),
        Value::Bool(_) => Some(SchemaType::Boolean),
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(SchemaType::Integer),
        Value::Number(_) => Some(SchemaType::Number),
        _ => None,
    });

    Some(inferred.unwrap_or(SchemaType::String))
}

fn enum_members(value: Option<&Value>) -> Option<Vec<Value>> {
    let Some(Value::Array(members)) = value else {
        return None;
    };

    let members: Vec<Value> = members
        .iter()
        .filter(|member| !member.is_array() && !member.is_object())
        .cloned()
        .collect();

    (!members.is_empty()).then_some(members)
}

fn lower_bound(map: &Map<String, Value>, integer: bool) -> Option<f64> {
    let minimum = map.get("minimum").and_then(Value::as_f64);

    let (inclusive, exclusive) = match map.get("exclusiveMinimum") {
        Some(Value::Number(bound)) => (minimum, bound.as_f64()),
        // Draft 4: the flag turns `minimum` itself exclusive.
        Some(Value::Bool(true)) => (None, minimum),
        _ => (minimum, None),
    };

    let exclusive = exclusive.map(|bound| if integer { bound.floor() + 1.0 } else { bound });

    match (inclusive, exclusive) {
        (Some(inclusive), Some(exclusive)) => Some(inclusive.max(exclusive)),
        (inclusive, exclusive) => inclusive.or(exclusive),
    }
}

fn upper_bound(map: &Map<String, Value>, integer: bool) -> Option<f64> {
    let maximum = map.get("maximum").and_then(Value::as_f64);

    let (inclusive, exclusive) = match map.get("exclusiveMaximum") {
        Some(Value::Number(bound)) => (maximum, bound.as_f64()),
        Some(Value::Bool(true)) => (None, maximum),
        _ => (maximum, None),
    };

    let exclusive = exclusive.map(|bound| if integer { bound.ceil() - 1.0 } else { bound });

    match (inclusive, exclusive) {
        (Some(inclusive), Some(exclusive)) => Some(inclusive.min(exclusive)),
        (inclusive, exclusive) => inclusive.or(exclusive),
    }
}

fn required_names(value: Option<&Value>) -> Vec<String> {
    let mut names = Vec::new();

    if let Some(Value::Array(values)) = value {
        for name in values.iter().filter_map(Value::as_str) {
            push_unique(&mut names, name.to_string());
        }
    }

    names
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn translated(schema: Value) -> Value {
        serde_json::to_value(translate(&schema)).unwrap()
    }

    #[test]
    fn nullable_type_array() {
        for (name, tag) in [
            ("string", "STRING"),
            ("number", "NUMBER"),
            ("integer", "INTEGER"),
            ("boolean", "BOOLEAN"),
        ] {
            let schema = translated(json!({ "type": [name, "null"] }));
            assert_eq!(schema, json!({ "type": tag, "nullable": true }));

            let schema = translated(json!({ "type": ["null", name] }));
            assert_eq!(schema, json!({ "type": tag, "nullable": true }));
        }
    }

    #[test]
    fn object_with_nested_properties() {
        let schema = translated(json!({
            "type": "object",
            "description": "Search parameters",
            "properties": {
                "query": { "type": "string", "minLength": 1 },
                "tags": { "type": "array", "items": { "type": "string" }, "maxItems": 5 },
                "since": { "type": "string", "format": "date-time" },
                "url": { "type": "string", "format": "uri" },
                "limit": { "type": "integer", "minimum": 1, "maximum": 100 }
            },
            "required": ["query"],
            "additionalProperties": false,
            "$schema": "http://json-schema.org/draft-07/schema#"
        }));

        insta::assert_json_snapshot!(schema, @r#"
        {
          "type": "OBJECT",
          "description": "Search parameters",
          "properties": {
            "query": {
              "type": "STRING",
              "minLength": 1
            },
            "tags": {
              "type": "ARRAY",
              "maxItems": 5,
              "items": {
                "type": "STRING"
              }
            },
            "since": {
              "type": "STRING",
              "format": "date-time"
            },
            "url": {
              "type": "STRING"
            },
            "limit": {
              "type": "INTEGER",
              "minimum": 1,
              "maximum": 100
            }
          },
          "required": [
            "query"
          ]
        }
        "#);
    }

    #[test]
    fn all_of_unions_required_and_properties() {
        let schema = translated(json!({
            "allOf": [
                {
                    "type": "object",
                    "description": "",
                    "properties": { "a": { "type": "string" }, "b": { "type": "string" } },
                    "required": ["a"]
                },
                {
                    "type": "object",
                    "description": "second",
                    "properties": { "b": { "type": "integer" }, "c": { "type": "boolean" } },
                    "required": ["b", "a"]
                },
                { "required": ["c"] }
            ]
        }));

        insta::assert_json_snapshot!(schema, @r#"
        {
          "type": "OBJECT",
          "description": "second",
          "properties": {
            "a": {
              "type": "STRING"
            },
            "b": {
              "type": "INTEGER"
            },
            "c": {
              "type": "BOOLEAN"
            }
          },
          "required": [
            "a",
            "b",
            "c"
          ]
        }
        "#);
    }

    #[test]
    fn all_of_ors_nullable_and_keeps_last_items() {
        let schema = translate(&json!({
            "description": "outer",
            "allOf": [
                { "type": ["array", "null"], "items": { "type": "string" } },
                { "type": "array", "items": { "type": "integer" } }
            ]
        }))
        .unwrap();

        assert!(schema.nullable);
        assert_eq!(schema.description.as_deref(), Some("outer"));
        assert_eq!(schema.items.map(|items| items.r#type), Some(SchemaType::Integer));
    }

    #[test]
    fn all_of_without_translatable_branch() {
        assert_eq!(translate(&json!({ "allOf": [{ "required": ["a"] }, true] })), None);
    }

    #[test]
    fn any_of_keeps_first_branch_and_nullable() {
        let schema = translated(json!({
            "description": "A value",
            "anyOf": [
                { "type": "null" },
                { "description": "untyped" },
                { "type": "string", "enum": ["a", "b"] },
                { "type": "integer" }
            ]
        }));

        insta::assert_json_snapshot!(schema, @r#"
        {
          "type": "STRING",
          "nullable": true,
          "description": "A value",
          "enum": [
            "a",
            "b"
          ]
        }
        "#);
    }

    #[test]
    fn one_of_with_trailing_null() {
        let schema = translate(&json!({ "oneOf": [{ "type": "number" }, { "type": ["null"] }] })).unwrap();

        assert_eq!(schema.r#type, SchemaType::Number);
        assert!(schema.nullable);
    }

    #[test]
    fn union_of_nulls_only() {
        assert_eq!(translate(&json!({ "anyOf": [{ "type": "null" }] })), None);
    }

    #[test]
    fn multiple_non_null_types_fall_back_to_inference() {
        assert_eq!(translate(&json!({ "type": ["string", "integer"] })), None);

        let schema = translate(&json!({ "type": ["string", "integer", "null"], "enum": [1, 2] })).unwrap();
        assert_eq!(schema.r#type, SchemaType::Integer);
        assert!(schema.nullable);
    }

    #[test]
    fn integer_exclusive_bounds_become_inclusive() {
        let schema = translated(json!({ "type": "integer", "exclusiveMinimum": 0, "exclusiveMaximum": 10.5 }));
        assert_eq!(schema, json!({ "type": "INTEGER", "minimum": 1, "maximum": 10 }));

        let schema = translated(json!({ "type": "integer", "exclusiveMinimum": -2.5, "exclusiveMaximum": 3 }));
        assert_eq!(schema, json!({ "type": "INTEGER", "minimum": -2, "maximum": 2 }));
    }

    #[test]
    fn number_exclusive_bounds_pass_through() {
        let schema = translated(json!({ "type": "number", "exclusiveMinimum": 0.5, "exclusiveMaximum": 1 }));
        assert_eq!(schema, json!({ "type": "NUMBER", "minimum": 0.5, "maximum": 1 }));
    }

    #[test]
    fn tighter_bound_wins() {
        let schema = translated(json!({
            "type": "integer",
            "minimum": 5,
            "exclusiveMinimum": 2,
            "maximum": 8,
            "exclusiveMaximum": 8
        }));

        assert_eq!(schema, json!({ "type": "INTEGER", "minimum": 5, "maximum": 7 }));
    }

    #[test]
    fn draft4_boolean_exclusive_bounds() {
        let schema = translated(json!({
            "type": "integer",
            "minimum": 0,
            "exclusiveMinimum": true,
            "maximum": 10,
            "exclusiveMaximum": false
        }));

        assert_eq!(schema, json!({ "type": "INTEGER", "minimum": 1, "maximum": 10 }));
    }

    #[test]
    fn bounds_only_for_matching_types() {
        let schema = translated(json!({ "type": "string", "minimum": 1, "minItems": 2, "maxLength": 3 }));
        assert_eq!(schema, json!({ "type": "STRING", "maxLength": 3 }));

        let schema = translated(json!({ "type": "array", "items": {"type": "string"}, "minLength": 1, "minItems": 1 }));
        assert_eq!(schema, json!({ "type": "ARRAY", "minItems": 1, "items": { "type": "STRING" } }));
    }

    #[test]
    fn type_inference() {
        assert_eq!(
            translate(&json!({ "properties": { "a": { "type": "string" } } })).map(|s| s.r#type),
            Some(SchemaType::Object)
        );
        assert_eq!(
            translate(&json!({ "items": { "type": "string" } })).map(|s| s.r#type),
            Some(SchemaType::Array)
        );
        assert_eq!(translate(&json!({ "enum": ["x"] })).map(|s| s.r#type), Some(SchemaType::String));
        assert_eq!(translate(&json!({ "enum": [true] })).map(|s| s.r#type), Some(SchemaType::Boolean));
        assert_eq!(translate(&json!({ "enum": [null, 1.5] })).map(|s| s.r#type), Some(SchemaType::Number));
        assert_eq!(translate(&json!({ "enum": [null] })).map(|s| s.r#type), Some(SchemaType::String));
        assert_eq!(translate(&json!({ "type": "whatever", "enum": [3] })).map(|s| s.r#type), Some(SchemaType::Integer));
    }

    #[test]
    fn untranslatable_nodes() {
        assert_eq!(translate(&json!({})), None);
        assert_eq!(translate(&json!({ "description": "only words" })), None);
        assert_eq!(translate(&json!({ "enum": [] })), None);
        assert_eq!(translate(&json!({ "type": "null" })), None);
        assert_eq!(translate(&json!("string")), None);
        assert_eq!(translate(&Value::Null), None);
    }

    #[test]
    fn dropped_properties_stay_required() {
        let schema = translated(json!({
            "type": "object",
            "properties": {
                "kept": { "type": "boolean" },
                "dropped": { "description": "no type" }
            },
            "required": ["kept", "dropped", "kept"]
        }));

        assert_eq!(
            schema,
            json!({
                "type": "OBJECT",
                "properties": { "kept": { "type": "BOOLEAN" } },
                "required": ["kept", "dropped"]
            })
        );
    }

    #[test]
    fn enum_keeps_scalars_and_null() {
        let schema = translated(json!({ "type": "string", "enum": ["a", null, ["b"], { "c": 1 }, 2] }));
        assert_eq!(schema, json!({ "type": "STRING", "enum": ["a", null, 2] }));
    }
}
