use axum::body::Bytes;
use http::{HeaderValue, Request, header::CONTENT_LENGTH};
use serde_json::{Map, Value, json};

const INTENT: &str = "_intent";
const DISPLAY_NAME: &str = "_displayName";

/// Asks the model to explain each MCP tool call by adding `_intent` and
/// `_displayName` to the parameters of tools whose name starts with `prefix`.
///
/// Applying it twice yields the same body. Bodies that are not a JSON object
/// are returned untouched.
pub(crate) fn inject_metadata(request: Request<Bytes>, prefix: &str) -> Request<Bytes> {
    let Ok(mut body) = serde_json::from_slice::<Value>(request.body()) else {
        return request;
    };

    let Some(tools) = body.get_mut("tools").and_then(Value::as_array_mut) else {
        return request;
    };

    let mut changed = false;

    for tool in tools.iter_mut().filter_map(Value::as_object_mut) {
        let is_mcp = tool
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| name.starts_with(prefix));

        if is_mcp {
            changed |= annotate(tool);
        }
    }

    if !changed {
        return request;
    }

    let body = match serde_json::to_vec(&body) {
        Ok(body) => body,
        Err(err) => {
            log::warn!("Failed to serialize request with MCP metadata: {err}");
            return request;
        }
    };

    let (mut parts, _) = request.into_parts();
    parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

    log::debug!("Injected MCP metadata into {}", parts.uri);

    Request::from_parts(parts, Bytes::from(body))
}

/// Returns whether the tool was modified.
fn annotate(tool: &mut Map<String, Value>) -> bool {
    let schema = tool
        .entry("input_schema")
        .or_insert_with(|| json!({ "type": "object" }));

    let Some(schema) = schema.as_object_mut() else {
        return false;
    };

    let mut changed = false;

    let properties = schema.entry("properties").or_insert_with(|| Value::Object(Map::new()));

    if let Some(properties) = properties.as_object_mut() {
        for (name, description) in [
            (INTENT, "Why this tool is being called, in one short sentence."),
            (DISPLAY_NAME, "Short human-readable label for this call."),
        ] {
            if !properties.contains_key(name) {
                properties.insert(name.to_string(), json!({ "type": "string", "description": description }));
                changed = true;
            }
        }
    }

    let required = schema.entry("required").or_insert_with(|| Value::Array(Vec::new()));

    if let Some(required) = required.as_array_mut() {
        for name in [INTENT, DISPLAY_NAME] {
            if !required.iter().any(|entry| entry.as_str() == Some(name)) {
                required.push(Value::String(name.to_string()));
                changed = true;
            }
        }
    }

    changed
}
