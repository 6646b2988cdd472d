//! JSON-Schema generation for tool parameters.
//!
//! Mirrors the type-mapping table for reflective tool discovery: since this
//! core has no runtime type introspection, callers describe each parameter's
//! shape explicitly via [`ParamType`] and a schema is derived from it.

use serde_json::{json, Value};

/// The declared shape of one tool parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    Integer,
    Number,
    Boolean,
    String,
    /// A string restricted to one of the given names.
    Enum(Vec<String>),
    /// A homogeneous array of the given element type.
    Array(Box<ParamType>),
    /// An object with the given named fields.
    Object(Vec<(String, ParamType)>),
    /// `T` or absent/null; required-ness is governed by the parameter marker,
    /// not by this wrapper.
    Nullable(Box<ParamType>),
}

impl ParamType {
    pub fn array(element: ParamType) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn nullable(inner: ParamType) -> Self {
        Self::Nullable(Box::new(inner))
    }

    /// Render the JSON-Schema fragment for this type.
    pub fn to_json_schema(&self) -> Value {
        match self {
            ParamType::Integer => json!({ "type": "integer" }),
            ParamType::Number => json!({ "type": "number" }),
            ParamType::Boolean => json!({ "type": "boolean" }),
            ParamType::String => json!({ "type": "string" }),
            ParamType::Enum(names) => json!({ "type": "string", "enum": names }),
            ParamType::Array(element) => json!({
                "type": "array",
                "items": element.to_json_schema(),
            }),
            ParamType::Object(fields) => {
                let properties: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|(name, field_type)| (name.clone(), field_type.to_json_schema()))
                    .collect();
                json!({
                    "type": "object",
                    "properties": properties,
                })
            }
            ParamType::Nullable(inner) => inner.to_json_schema(),
        }
    }

    /// Whether a JSON value conforms to this type, performing the same
    /// widening a dynamic caller would expect (e.g. a whole-number `f64`
    /// satisfies [`ParamType::Integer`]).
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::Integer => value.as_i64().is_some() || value.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false),
            ParamType::Number => value.as_f64().is_some(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::String => value.is_string(),
            ParamType::Enum(names) => value.as_str().map(|s| names.iter().any(|n| n == s)).unwrap_or(false),
            ParamType::Array(element) => value.as_array().map(|items| items.iter().all(|item| element.accepts(item))).unwrap_or(false),
            ParamType::Object(fields) => value
                .as_object()
                .map(|obj| fields.iter().all(|(name, field_type)| obj.get(name).map(|v| field_type.accepts(v)).unwrap_or(true)))
                .unwrap_or(false),
            ParamType::Nullable(inner) => value.is_null() || inner.accepts(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_schema_matches_spec_mapping() {
        assert_eq!(ParamType::Integer.to_json_schema(), json!({ "type": "integer" }));
    }

    #[test]
    fn enum_schema_carries_variant_names() {
        let schema = ParamType::Enum(vec!["a".into(), "b".into()]).to_json_schema();
        assert_eq!(schema["enum"], json!(["a", "b"]));
    }

    #[test]
    fn array_of_objects_schema_recurses() {
        let schema = ParamType::array(ParamType::Object(vec![("name".into(), ParamType::String)])).to_json_schema();
        assert_eq!(schema["type"], json!("array"));
        assert_eq!(schema["items"]["properties"]["name"], json!({ "type": "string" }));
    }

    #[test]
    fn nullable_accepts_null_or_inner() {
        let ty = ParamType::nullable(ParamType::Integer);
        assert!(ty.accepts(&Value::Null));
        assert!(ty.accepts(&json!(5)));
        assert!(!ty.accepts(&json!("five")));
    }

    #[test]
    fn integer_accepts_whole_number_float() {
        assert!(ParamType::Integer.accepts(&json!(5.0)));
        assert!(!ParamType::Integer.accepts(&json!(5.5)));
    }
}
