//! Core types for Cogniscope
//!
//! This module defines the fundamental types shared across the engine:
//! - Cognitive domains and expected response types
//! - Pattern keys for likelihood lookup
//! - Timestamps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type alias
pub type Timestamp = DateTime<Utc>;

/// Create a timestamp for the current moment
pub fn now() -> Timestamp {
    Utc::now()
}

/// Cognitive domain probed by a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveDomain {
    EthicalReasoning,
    LogicalReasoning,
    RiskAssessment,
    SocialCognition,
    CausalReasoning,
}

impl CognitiveDomain {
    /// All domains, in declaration order
    pub const ALL: [CognitiveDomain; 5] = [
        CognitiveDomain::EthicalReasoning,
        CognitiveDomain::LogicalReasoning,
        CognitiveDomain::RiskAssessment,
        CognitiveDomain::SocialCognition,
        CognitiveDomain::CausalReasoning,
    ];

    /// Canonical snake_case name, as used in pattern keys
    pub fn as_str(self) -> &'static str {
        match self {
            CognitiveDomain::EthicalReasoning => "ethical_reasoning",
            CognitiveDomain::LogicalReasoning => "logical_reasoning",
            CognitiveDomain::RiskAssessment => "risk_assessment",
            CognitiveDomain::SocialCognition => "social_cognition",
            CognitiveDomain::CausalReasoning => "causal_reasoning",
        }
    }
}

impl fmt::Display for CognitiveDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected shape of a scenario response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    BinaryChoice,
    MultipleChoice,
    LikertScale,
    FreeText,
    Numerical,
}

impl ResponseType {
    /// All response types, in declaration order
    pub const ALL: [ResponseType; 5] = [
        ResponseType::BinaryChoice,
        ResponseType::MultipleChoice,
        ResponseType::LikertScale,
        ResponseType::FreeText,
        ResponseType::Numerical,
    ];

    /// Canonical snake_case name, as used in pattern keys
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseType::BinaryChoice => "binary_choice",
            ResponseType::MultipleChoice => "multiple_choice",
            ResponseType::LikertScale => "likert_scale",
            ResponseType::FreeText => "free_text",
            ResponseType::Numerical => "numerical",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key for predicted response patterns: (domain, response type)
///
/// The canonical string form is `"{domain}_{response_type}"`, e.g.
/// `ethical_reasoning_binary_choice`. This is the form used in hypothesis
/// pattern maps and in generated hypothesis proposals. The key serializes
/// as that string so pattern maps stay plain JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternKey {
    pub domain: CognitiveDomain,
    pub response_type: ResponseType,
}

impl Serialize for PatternKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PatternKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PatternKey::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("not a pattern key: {raw}")))
    }
}

impl PatternKey {
    /// Create a pattern key from its parts
    pub fn new(domain: CognitiveDomain, response_type: ResponseType) -> Self {
        Self {
            domain,
            response_type,
        }
    }

    /// Parse the canonical string form back into a key.
    ///
    /// Domain names themselves contain underscores, so the split point is
    /// found by matching a known response-type suffix rather than counting
    /// separators. Returns `None` for anything that is not a canonical key.
    pub fn parse(key: &str) -> Option<Self> {
        for response_type in ResponseType::ALL {
            let suffix = response_type.as_str();
            if let Some(prefix) = key.strip_suffix(suffix) {
                let domain_part = prefix.strip_suffix('_')?;
                for domain in CognitiveDomain::ALL {
                    if domain.as_str() == domain_part {
                        return Some(Self::new(domain, response_type));
                    }
                }
            }
        }
        None
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.domain, self.response_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_key_display() {
        let key = PatternKey::new(CognitiveDomain::EthicalReasoning, ResponseType::BinaryChoice);
        assert_eq!(key.to_string(), "ethical_reasoning_binary_choice");
    }

    #[test]
    fn test_pattern_key_parse_round_trip() {
        for domain in CognitiveDomain::ALL {
            for response_type in ResponseType::ALL {
                let key = PatternKey::new(domain, response_type);
                assert_eq!(PatternKey::parse(&key.to_string()), Some(key));
            }
        }
    }

    #[test]
    fn test_pattern_key_serializes_as_string() {
        let key = PatternKey::new(CognitiveDomain::RiskAssessment, ResponseType::FreeText);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"risk_assessment_free_text\"");
        let back: PatternKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_pattern_key_parse_rejects_garbage() {
        assert_eq!(PatternKey::parse("not_a_key"), None);
        assert_eq!(PatternKey::parse("ethical_reasoning"), None);
        assert_eq!(PatternKey::parse("binary_choice"), None);
        assert_eq!(PatternKey::parse(""), None);
    }
}
