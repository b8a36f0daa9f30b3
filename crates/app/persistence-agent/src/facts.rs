//! Durable user facts and their extraction from free text.

use std::fmt;
use std::sync::LazyLock;

use agent_graph_checkpoint::Namespace;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use xxhash_rust::xxh3::xxh3_64;

/// Second label of every memory namespace.
pub const MEMORIES: &str = "memories";

/// The namespace holding a user's facts, shared by all of their threads.
pub fn memory_namespace(user_id: &str) -> Namespace {
    Namespace::new([user_id, MEMORIES])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactKind {
    Name,
    Likes,
    Preference,
    Bio,
}

impl FactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Likes => "likes",
            Self::Preference => "preference",
            Self::Bio => "bio",
        }
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running the extraction rules over a message.
#[derive(Debug, Clone, PartialEq)]
pub enum FactMatch {
    NoFact,
    Fact {
        kind: FactKind,
        value: String,
        confidence: f32,
    },
}

struct Rule {
    pattern: Regex,
    kind: FactKind,
    confidence: f32,
}

impl Rule {
    fn new(pattern: &str, kind: FactKind, confidence: f32) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("fact pattern is a valid regex"),
            kind,
            confidence,
        }
    }
}

/// Evaluated in order; the first rule that matches wins.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            r"(?i)\bmy name is\s+([a-zA-Z][a-zA-Z '-]{0,60})",
            FactKind::Name,
            0.9,
        ),
        Rule::new(
            r"(?i)\bi (?:like|love)\s+([a-zA-Z0-9 ,.'-]{1,80})",
            FactKind::Likes,
            0.8,
        ),
    ]
});

/// Extract at most one fact from `message`.
///
/// A name statement takes precedence over a like, even when both appear.
pub fn extract_fact(message: &str) -> FactMatch {
    for rule in RULES.iter() {
        let Some(captures) = rule.pattern.captures(message) else {
            continue;
        };
        let Some(value) = captures.get(1).map(|m| m.as_str().trim()) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        return FactMatch::Fact {
            kind: rule.kind,
            value: value.to_string(),
            confidence: rule.confidence,
        };
    }
    FactMatch::NoFact
}

/// A durable fact about a user. Never modified once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: Uuid,
    pub kind: FactKind,
    pub value: String,
    /// In `[0, 1]`.
    pub confidence: f32,
    /// The message the fact was extracted from.
    pub source_text: String,
}

impl Fact {
    pub fn new(
        kind: FactKind,
        value: impl Into<String>,
        confidence: f32,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source_text: source_text.into(),
        }
    }

    /// Build the fact for a successful match.
    pub fn from_match(found: &FactMatch, source_text: &str) -> Option<Self> {
        match found {
            FactMatch::NoFact => None,
            FactMatch::Fact {
                kind,
                value,
                confidence,
            } => Some(Self::new(*kind, value.clone(), *confidence, source_text)),
        }
    }

    /// Display form, e.g. `name: Jon`.
    pub fn text(&self) -> String {
        format!("{}: {}", self.kind, self.value)
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(self.kind, &self.value)
    }

    /// The JSON record written to the store.
    pub fn to_record(&self) -> serde_json::Value {
        json!({
            "fact": self.text(),
            "id": self.id,
            "kind": self.kind,
            "value": self.value,
            "confidence": self.confidence,
            "source_text": self.source_text,
            "fingerprint": self.fingerprint(),
        })
    }
}

/// Dedupe key of a fact: xxh3 of its kind and whitespace-collapsed,
/// lowercased value.
pub fn fingerprint(kind: FactKind, value: &str) -> String {
    let normalized = value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    format!("{:016x}", xxh3_64(format!("{kind}:{normalized}").as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(message: &str) -> Option<String> {
        match extract_fact(message) {
            FactMatch::NoFact => None,
            FactMatch::Fact { kind, value, .. } => Some(format!("{kind}: {value}")),
        }
    }

    #[test]
    fn test_extract_name() {
        assert_eq!(extracted("my name is Jon").as_deref(), Some("name: Jon"));
        assert_eq!(
            extracted("Hi! My name is Mary-Jane O'Neil.").as_deref(),
            Some("name: Mary-Jane O'Neil")
        );
    }

    #[test]
    fn test_extract_likes() {
        assert_eq!(extracted("i like pizza").as_deref(), Some("likes: pizza"));
        assert_eq!(extracted("I love ramen").as_deref(), Some("likes: ramen"));
    }

    #[test]
    fn test_name_beats_likes() {
        assert_eq!(
            extracted("I like pizza and my name is Jon").as_deref(),
            Some("name: Jon")
        );
    }

    #[test]
    fn test_no_fact() {
        assert_eq!(extract_fact("what do you remember?"), FactMatch::NoFact);
        assert_eq!(extract_fact(""), FactMatch::NoFact);
        // Word boundary: "semi like" is not "i like".
        assert_eq!(extract_fact("a semi like thing"), FactMatch::NoFact);
    }

    #[test]
    fn test_name_is_capped() {
        let long = format!("my name is {}", "a".repeat(100));
        let Some(text) = extracted(&long) else {
            panic!("expected a name");
        };
        assert_eq!(text.len(), "name: ".len() + 61);
    }

    #[test]
    fn test_fingerprint_normalizes_value() {
        assert_eq!(
            fingerprint(FactKind::Likes, "Pizza"),
            fingerprint(FactKind::Likes, "  pizza ")
        );
        assert_ne!(
            fingerprint(FactKind::Likes, "pizza"),
            fingerprint(FactKind::Name, "pizza")
        );
    }

    #[test]
    fn test_record_shape() {
        let found = extract_fact("my name is Jon");
        let fact = Fact::from_match(&found, "my name is Jon").unwrap();
        let record = fact.to_record();

        assert_eq!(record["fact"], "name: Jon");
        assert_eq!(record["kind"], "name");
        assert_eq!(record["source_text"], "my name is Jon");
        assert_eq!(record["fingerprint"], fact.fingerprint());
    }

    #[test]
    fn test_memory_namespace() {
        assert_eq!(memory_namespace("u-1").labels(), ["u-1", "memories"]);
    }
}
