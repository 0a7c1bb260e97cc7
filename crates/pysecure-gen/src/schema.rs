use serde_json::{json, Value};

/// How the output schema is spelled for a given provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDialect {
    /// Gemini `responseSchema`: upper-case type names, no `additionalProperties`.
    Gemini,
    /// Plain JSON Schema as used by OpenAI-style structured output.
    JsonSchema,
}

impl SchemaDialect {
    pub fn for_provider(provider: &str) -> Self {
        match provider {
            "google" => SchemaDialect::Gemini,
            _ => SchemaDialect::JsonSchema,
        }
    }
}

fn string() -> Value {
    json!({ "type": "string" })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn array(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// The strict shape every response must have: files, documentation and the mental map.
pub fn bundle_schema(dialect: SchemaDialect) -> Value {
    let file = object(
        json!({ "name": string(), "content": string(), "description": string() }),
        &["name", "content", "description"],
    );
    let node = object(
        json!({ "id": string(), "label": string(), "type": string() }),
        &["id", "label", "type"],
    );
    let link = object(
        json!({ "source": string(), "target": string() }),
        &["source", "target"],
    );
    let mental_map = object(
        json!({ "nodes": array(node), "links": array(link) }),
        &["nodes", "links"],
    );
    let mut schema = object(
        json!({
            "files": array(file),
            "documentation": string(),
            "mentalMap": mental_map,
        }),
        &["files", "documentation", "mentalMap"],
    );

    if dialect == SchemaDialect::Gemini {
        to_gemini(&mut schema);
    }
    schema
}

fn to_gemini(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };
    obj.remove("additionalProperties");
    if let Some(Value::String(t)) = obj.get_mut("type") {
        *t = t.to_uppercase();
    }
    if let Some(items) = obj.get_mut("items") {
        to_gemini(items);
    }
    if let Some(Value::Object(props)) = obj.get_mut("properties") {
        props.values_mut().for_each(to_gemini);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_at(schema: &Value, pointer: &str) -> Vec<String> {
        schema
            .pointer(pointer)
            .and_then(|v| v.get("required"))
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_top_level_required_fields() {
        let schema = bundle_schema(SchemaDialect::JsonSchema);
        assert_eq!(required_at(&schema, ""), ["files", "documentation", "mentalMap"]);
        assert_eq!(
            required_at(&schema, "/properties/files/items"),
            ["name", "content", "description"]
        );
        assert_eq!(
            required_at(&schema, "/properties/mentalMap/properties/nodes/items"),
            ["id", "label", "type"]
        );
        assert_eq!(
            required_at(&schema, "/properties/mentalMap/properties/links/items"),
            ["source", "target"]
        );
    }

    #[test]
    fn test_json_schema_dialect_is_closed() {
        let schema = bundle_schema(SchemaDialect::JsonSchema);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["properties"]["files"]["type"], "array");
    }

    #[test]
    fn test_gemini_dialect_uses_upper_case_types() {
        let schema = bundle_schema(SchemaDialect::Gemini);
        assert_eq!(schema["type"], "OBJECT");
        assert!(schema.get("additionalProperties").is_none());
        assert_eq!(schema["properties"]["files"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["files"]["items"]["type"], "OBJECT");
        assert_eq!(
            schema["properties"]["mentalMap"]["properties"]["links"]["items"]["properties"]
                ["source"]["type"],
            "STRING"
        );
        assert!(!schema.to_string().contains("additionalProperties"));
    }

    #[test]
    fn test_dialect_for_provider() {
        assert_eq!(SchemaDialect::for_provider("google"), SchemaDialect::Gemini);
        assert_eq!(SchemaDialect::for_provider("openai"), SchemaDialect::JsonSchema);
        assert_eq!(SchemaDialect::for_provider("ollama"), SchemaDialect::JsonSchema);
    }
}
