use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Trait for types that can be used as a Gemini response schema.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Generate a Gemini-compatible response schema for this type.
    ///
    /// Gemini accepts an OpenAPI-style subset of JSON Schema:
    /// 1. no `$ref`/`definitions` — schemas must be fully inlined
    /// 2. `type` must be a single string; optionality is `nullable: true`
    /// 3. no `additionalProperties`, no unsupported `format` values
    fn gemini_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);
        normalize_nullable(&mut value);
        strip_unsupported_keys(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
            map.remove("title");
        }

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn inline_refs(value: &mut Value) {
    let definitions = if let Value::Object(map) = value {
        map.get("definitions").cloned()
    } else {
        None
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                if ref_path.starts_with("#/definitions/") {
                    let type_name = ref_path.trim_start_matches("#/definitions/");
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(Value::Array(all_of)) = map.get("allOf").cloned() {
                if all_of.len() == 1 {
                    *value = all_of.into_iter().next().unwrap();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

/// Rewrite schemars nullability into Gemini's `nullable: true` form.
///
/// schemars emits `Option<T>` either as `"type": ["string", "null"]` or as
/// `anyOf: [<schema>, {"type": "null"}]`; Gemini accepts neither.
fn normalize_nullable(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(types)) = map.get("type").cloned() {
                let non_null: Vec<Value> = types
                    .iter()
                    .filter(|t| t.as_str() != Some("null"))
                    .cloned()
                    .collect();
                if non_null.len() < types.len() {
                    map.insert("nullable".to_string(), Value::Bool(true));
                }
                if non_null.len() == 1 {
                    map.insert("type".to_string(), non_null.into_iter().next().unwrap());
                }
            }

            if let Some(Value::Array(any_of)) = map.get("anyOf").cloned() {
                let (null_arms, mut real_arms): (Vec<Value>, Vec<Value>) =
                    any_of.into_iter().partition(|arm| {
                        arm.get("type").and_then(Value::as_str) == Some("null")
                    });
                if real_arms.len() == 1 {
                    let mut inner = real_arms.remove(0);
                    normalize_nullable(&mut inner);
                    if let (Value::Object(inner_map), true) =
                        (&mut inner, !null_arms.is_empty())
                    {
                        inner_map.insert("nullable".to_string(), Value::Bool(true));
                    }
                    let description = map.get("description").cloned();
                    *value = inner;
                    if let (Value::Object(new_map), Some(desc)) = (&mut *value, description) {
                        new_map.entry("description".to_string()).or_insert(desc);
                    }
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                normalize_nullable(v);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                normalize_nullable(item);
            }
        }
        _ => {}
    }
}

/// Formats Gemini understands; anything else is dropped.
const SUPPORTED_FORMATS: [&str; 5] = ["float", "double", "int32", "int64", "date-time"];

fn strip_unsupported_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("additionalProperties");
            if let Some(format) = map.get("format").and_then(Value::as_str) {
                if !SUPPORTED_FORMATS.contains(&format) {
                    map.remove("format");
                }
            }
            for (_, v) in map.iter_mut() {
                strip_unsupported_keys(v);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                strip_unsupported_keys(item);
            }
        }
        _ => {}
    }
}
