use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One academic program from the catalog file.
///
/// Every field is optional. Scalar JSON values of any type are accepted as text and
/// `null` counts as absent, so loosely maintained data files still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Program name, e.g. "BSc (Hons) Agricultural Engineering"
    #[serde(default, rename = "program_name", deserialize_with = "lenient_text")]
    pub name: Option<String>,
    /// Owning faculty or college
    #[serde(default, rename = "faculty_or_college", deserialize_with = "lenient_text")]
    pub category: Option<String>,
    /// Morning / evening / weekend etc.
    #[serde(default, rename = "program_schedule", deserialize_with = "lenient_text")]
    pub schedule: Option<String>,
    #[serde(default, rename = "eligibility_criteria", deserialize_with = "lenient_text")]
    pub eligibility: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub additional_requirements: Option<String>,
    /// Entry test streams accepted for admission.
    #[serde(default, rename = "entry_test_streams", deserialize_with = "lenient_tags")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
}

/// A record paired with its keyword score. Lives only inside one ranking pass.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub record: &'a Record,
    pub score: usize,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        single => scalar_text(single).into_iter().collect(),
    };
    Ok(Some(tags))
}
