//! JSONL batch records and the photo references embedded in them.

use rehost_error::{JsonError, RehostResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Longest diagnostic string embedded in an output record.
pub const MAX_DIAGNOSTIC_CHARS: usize = 200;

/// Entity id used when a record carries none of the configured id fields.
pub const UNKNOWN_ENTITY_ID: &str = "unknown";

/// One line of a batch file.
///
/// Only `photos` is interpreted; every other field is carried through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// All fields other than `photos`
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// The `photos` value; `None` only when the field is absent
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub photos: Option<Photos>,
}

/// A present field is always `Some`, even when it holds `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Photos>, D::Error>
where
    D: Deserializer<'de>,
{
    Photos::deserialize(deserializer).map(Some)
}

/// The value of a record's `photos` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Photos {
    /// An array of photo entries
    List(Vec<PhotoEntry>),
    /// Any non-array value; preserved verbatim and never interpreted
    Other(Value),
}

impl Record {
    /// Parse one JSONL line. `line_number` is 1-based and only used for the
    /// error message.
    pub fn from_line(line: &str, line_number: usize) -> RehostResult<Self> {
        serde_json::from_str(line).map_err(|e| JsonError::input_line(line_number, e).into())
    }

    /// Serialize to a single line without the trailing newline.
    pub fn to_line(&self) -> RehostResult<String> {
        serde_json::to_string(self)
            .map_err(|e| JsonError::new(format!("failed to serialize record: {}", e)).into())
    }

    /// First present id field, rendered as a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rehost_core::Record;
    ///
    /// let record = Record::from_line(r#"{"m2mId": 7}"#, 1).unwrap();
    /// let fields = ["sourceAnimalId".to_string(), "m2mId".to_string()];
    /// assert_eq!(record.entity_id(&fields), "7");
    /// ```
    pub fn entity_id(&self, id_fields: &[String]) -> String {
        id_fields
            .iter()
            .filter_map(|field| match self.fields.get(field) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .next()
            .unwrap_or_else(|| UNKNOWN_ENTITY_ID.to_string())
    }

    /// Mutable access to every object-shaped photo reference.
    pub fn photo_references_mut(&mut self) -> impl Iterator<Item = &mut PhotoReference> {
        let entries = match &mut self.photos {
            Some(Photos::List(entries)) => entries.as_mut_slice(),
            _ => &mut [],
        };
        entries.iter_mut().filter_map(|entry| match entry {
                PhotoEntry::Reference(photo) => Some(photo),
                PhotoEntry::Other(_) => None,
            })
    }
}

/// An element of a record's `photos` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotoEntry {
    /// An object with a string `url`
    Reference(PhotoReference),
    /// Anything else; preserved verbatim
    Other(Value),
}

/// A photo reference as it appears in batch files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoReference {
    /// Current URL; rewritten in place when the photo is mirrored
    #[serde(default)]
    pub url: String,
    /// Diagnostic from the last failed attempt
    #[serde(
        rename = "rehostError",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rehost_error: Option<String>,
    /// Set when the vendor confirmed the image is gone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<bool>,
    /// Other fields on the photo object
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PhotoReference {
    /// Reference with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            rehost_error: None,
            missing: None,
            extra: Map::new(),
        }
    }

    /// URL with surrounding whitespace removed.
    pub fn trimmed_url(&self) -> &str {
        self.url.trim()
    }

    /// True when an earlier attempt left a diagnostic behind.
    pub fn has_error(&self) -> bool {
        self.rehost_error.is_some()
    }

    /// Point at the mirrored copy and clear any stale diagnostic.
    pub fn mark_rehosted(&mut self, public_url: impl Into<String>) {
        self.url = public_url.into();
        self.rehost_error = None;
    }

    /// Record a failure; the URL is left as it was.
    pub fn mark_failed(&mut self, diagnostic: &str) {
        self.rehost_error = Some(truncate_chars(diagnostic, MAX_DIAGNOSTIC_CHARS));
    }

    /// The source is confirmed gone: blank the URL and flag it.
    pub fn mark_missing(&mut self) {
        self.url.clear();
        self.missing = Some(true);
        self.rehost_error = None;
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
