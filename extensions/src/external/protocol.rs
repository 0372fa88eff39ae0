//! JSON-over-stdout protocol spoken by external extensions.

use lantern_core::error::SourceError;
use lantern_core::types::WeightedKeyword;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const INTERFACE_ID: &str = "org.lantern.extension.external/v1";

/// Environment variable carrying the operation.
pub const OP_VAR: &str = "LANTERN_OP";
/// Environment variable carrying the search term of a `QUERY`.
pub const QUERY_VAR: &str = "LANTERN_QUERY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Metadata,
    Initialize,
    Finalize,
    SetupSession,
    TeardownSession,
    Query,
    Index,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metadata => "METADATA",
            Self::Initialize => "INITIALIZE",
            Self::Finalize => "FINALIZE",
            Self::SetupSession => "SETUPSESSION",
            Self::TeardownSession => "TEARDOWNSESSION",
            Self::Query => "QUERY",
            Self::Index => "INDEX",
        }
    }

    /// Used as log prefix, e.g. "Session setup failed: ...".
    pub fn describe(self) -> &'static str {
        match self {
            Self::Metadata => "Getting metadata",
            Self::Initialize => "Initialization",
            Self::Finalize => "Finalization",
            Self::SetupSession => "Session setup",
            Self::TeardownSession => "Session teardown",
            Self::Query => "Handle query",
            Self::Index => "Indexing",
        }
    }

    /// Whether the answer must carry an `items` array.
    pub fn expects_items(self) -> bool {
        matches!(self, Self::Query | Self::Index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Metadata {
    pub iid: String,
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Answer to any operation but `METADATA`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
    #[serde(default)]
    pub items: Option<Vec<Value>>,
}

impl Response {
    /// The string-valued variables; other values are dropped.
    pub fn string_variables(&self) -> BTreeMap<String, String> {
        self.variables
            .iter()
            .flatten()
            .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub keywords: Vec<WeightedKeyword>,
    #[serde(default)]
    pub actions: Vec<ExternalAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalAction {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// Parses stdout that must hold a single JSON object.
pub fn parse_object(out: &[u8]) -> Result<Map<String, Value>, SourceError> {
    let value: Value =
        serde_json::from_slice(out).map_err(|e| SourceError::InvalidJson(e.to_string()))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(SourceError::Schema("expected a JSON object".to_string())),
    }
}

pub fn parse_metadata(out: &[u8]) -> Result<Metadata, SourceError> {
    let object = parse_object(out)?;
    if !object.contains_key("iid") {
        return Err(SourceError::Schema(
            "does not contain an interface id".to_string(),
        ));
    }

    let metadata: Metadata = serde_json::from_value(Value::Object(object))
        .map_err(|e| SourceError::Schema(e.to_string()))?;
    if metadata.iid != INTERFACE_ID {
        return Err(SourceError::InterfaceMismatch {
            expected: INTERFACE_ID.to_string(),
            found: metadata.iid,
        });
    }
    Ok(metadata)
}

/// Parses the answer to `op`. Empty output means "nothing to report",
/// except for operations that must return items.
pub fn parse_response(op: Operation, out: &[u8]) -> Result<Option<Response>, SourceError> {
    if out.iter().all(u8::is_ascii_whitespace) {
        if op.expects_items() {
            return Err(SourceError::Schema("result contains no items".to_string()));
        }
        return Ok(None);
    }

    let object = parse_object(out)?;
    let response: Response = serde_json::from_value(Value::Object(object))
        .map_err(|e| SourceError::Schema(e.to_string()))?;
    if op.expects_items() && response.items.is_none() {
        return Err(SourceError::Schema("result contains no items".to_string()));
    }
    Ok(Some(response))
}
