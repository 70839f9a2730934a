//! Declarative OpenAPI document model for the performance HTTP API.
//!
//! A deliberately small, serialize-only subset of OpenAPI 3.1: just the
//! vocabulary the performance API document needs. The [`performance`]
//! module declares the document itself; the `generate-openapi` binary
//! writes it out as YAML.

pub mod performance;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// A complete OpenAPI document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub openapi: &'static str,
    pub info: Info,
    pub tags: Vec<Tag>,
    pub paths: BTreeMap<&'static str, PathItem>,
    pub components: Components,
}

impl Document {
    /// Render the document as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub version: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub tags: Vec<&'static str>,
    pub summary: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    pub operation_id: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<&'static str, Response>,
}

/// A query parameter of an operation.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: &'static str,
    #[serde(rename = "in")]
    pub location: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    pub schema: Schema,
}

impl Parameter {
    pub fn query(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            location: "query",
            required: false,
            description: None,
            schema,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    pub content: BTreeMap<&'static str, MediaType>,
    pub required: bool,
}

impl RequestBody {
    pub fn json(schema: Schema) -> Self {
        Self {
            content: [("application/json", MediaType { schema })].into_iter().collect(),
            required: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaType {
    pub schema: Schema,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<&'static str, MediaType>>,
}

impl Response {
    pub fn json(description: &'static str, schema: Schema) -> Self {
        Self {
            description,
            content: Some([("application/json", MediaType { schema })].into_iter().collect()),
        }
    }

    pub fn html(description: &'static str, schema: Schema) -> Self {
        Self {
            description,
            content: Some([("text/html", MediaType { schema })].into_iter().collect()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Components {
    pub schemas: BTreeMap<&'static str, Schema>,
}

/// JSON-Schema-flavoured object used everywhere a schema is accepted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// `"string"`, `"object"`, ... or `["number", "null"]` for nullable
    /// types (OpenAPI 3.1 spells nullability as a type union).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<&'static str, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Schema {
    pub fn string() -> Self {
        Self {
            kind: Some("string".into()),
            ..Default::default()
        }
    }

    pub fn number() -> Self {
        Self {
            kind: Some("number".into()),
            ..Default::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            kind: Some("array".into()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn object<P>(properties: P, required: &[&'static str]) -> Self
    where
        P: IntoIterator<Item = (&'static str, Schema)>,
    {
        Self {
            kind: Some("object".into()),
            properties: Some(properties.into_iter().collect()),
            required: if required.is_empty() {
                None
            } else {
                Some(required.to_vec())
            },
            ..Default::default()
        }
    }

    pub fn enumeration(values: &[&'static str]) -> Self {
        Self {
            kind: Some("string".into()),
            allowed: Some(values.to_vec()),
            ..Default::default()
        }
    }

    /// Pointer to a schema registered under `components.schemas`.
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{name}")),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }

    /// Widen the type to also accept `null`.
    pub fn nullable(mut self) -> Self {
        if let Some(Value::String(kind)) = self.kind.take() {
            self.kind = Some(serde_json::json!([kind, "null"]));
        }
        self
    }

    pub fn minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn min_length(mut self, min_length: u32) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}
