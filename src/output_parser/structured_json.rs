//! Parser that checks model output for a declared set of string fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OutputParser, OutputParserError};

const FORMAT_INSTRUCTIONS: &str = "your input should strict follow json schema: \n\n{\n{fields}}\n";

/// Placeholder replaced by the rendered field lines in
/// [`StructuredJson::format_instructions_with_template`].
pub const FIELDS_PLACEHOLDER: &str = "{fields}";

/// One declared output field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub description: String,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Checks that model output is a flat JSON object carrying every declared
/// field as a string.
///
/// Holds no mutable state; one instance can serve any number of concurrent
/// parses.
///
/// ```
/// use langrig::output_parser::{ResponseSchema, StructuredJson};
///
/// let parser = StructuredJson::new(vec![
///     ResponseSchema::new("answer", "the answer"),
/// ]);
/// let fields = parser.parse(r#"{"answer": "42"}"#).unwrap();
/// assert_eq!(fields["answer"], "42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredJson {
    schemas: Vec<ResponseSchema>,
}

impl StructuredJson {
    pub fn new(schemas: Vec<ResponseSchema>) -> Self {
        Self { schemas }
    }

    pub fn schemas(&self) -> &[ResponseSchema] {
        &self.schemas
    }

    /// Decode `text` and verify every declared field is present.
    ///
    /// A surrounding markdown code fence is tolerated. Entries whose value is
    /// not a string are dropped and count as missing if declared.
    pub fn parse(&self, text: &str) -> Result<HashMap<String, String>, OutputParserError> {
        let object: serde_json::Map<String, Value> = serde_json::from_str(strip_code_fences(text))
            .map_err(|source| OutputParserError::Decode {
                text: text.to_string(),
                source,
            })?;

        let parsed: HashMap<String, String> = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect();

        let missing: Vec<String> = self
            .schemas
            .iter()
            .filter(|s| !parsed.contains_key(&s.name))
            .map(|s| s.name.clone())
            .collect();

        if !missing.is_empty() {
            return Err(OutputParserError::MissingFields {
                text: text.to_string(),
                missing,
            });
        }

        Ok(parsed)
    }

    /// The default instructions: a brace-delimited pseudo-schema with one
    /// `"name": string // description` line per field.
    pub fn format_instructions(&self) -> String {
        self.format_instructions_with_template(FORMAT_INSTRUCTIONS)
    }

    /// Render the field lines into `template` at [`FIELDS_PLACEHOLDER`].
    /// A template without the placeholder is returned unchanged.
    pub fn format_instructions_with_template(&self, template: &str) -> String {
        template.replace(FIELDS_PLACEHOLDER, &self.field_lines())
    }

    fn field_lines(&self) -> String {
        self.schemas
            .iter()
            .map(|s| format!("\t\"{}\": string // {}\n", s.name, s.description))
            .collect()
    }
}

impl OutputParser for StructuredJson {
    type Output = HashMap<String, String>;

    fn parse(&self, text: &str) -> Result<Self::Output, OutputParserError> {
        StructuredJson::parse(self, text)
    }

    fn format_instructions(&self) -> String {
        StructuredJson::format_instructions(self)
    }

    fn parser_type(&self) -> &'static str {
        "structured_json_parser"
    }
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
