//! Lead data model: raw input, intermediate extraction records, canonical Lead.
//!
//! Every stage has its own record type. `Option` marks "not present in
//! source"; it is never an error by itself.

use serde::{Deserialize, Serialize};

use super::enums::{Civilite, Confidence, ExtractionMethod, Provider};

// ═══════════════════════════════════════════
// Input
// ═══════════════════════════════════════════

/// Optional caller metadata carried into the lead's provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadMetadata {
    pub email_id: Option<String>,
    pub source: Option<String>,
}

/// Raw, untrusted message body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInput {
    pub text: String,
    pub subject: Option<String>,
    #[serde(default)]
    pub metadata: LeadMetadata,
}

impl LeadInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_metadata(mut self, metadata: LeadMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Outcome of provider classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDetectionResult {
    pub provider: Provider,
    pub confidence: Confidence,
    /// Every signal that fired, in evaluation order.
    pub signals: Vec<String>,
}

impl ProviderDetectionResult {
    pub fn unknown() -> Self {
        Self {
            provider: Provider::Unknown,
            confidence: Confidence::Low,
            signals: Vec::new(),
        }
    }
}

// ═══════════════════════════════════════════
// Intermediate extraction records
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContact {
    pub civilite: Option<Civilite>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub adresse: Option<String>,
    pub code_postal: Option<String>,
    pub ville: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
}

/// Subscriber or spouse. Identity fields override the contact block when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPerson {
    pub civilite: Option<Civilite>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub date_naissance: Option<String>,
    pub profession: Option<String>,
    pub regime_social: Option<String>,
    pub nombre_enfants: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedChild {
    pub date_naissance: String,
    pub ordre: Option<u32>,
}

/// Declared need level per coverage category (1 = minimum, 4 = maximum).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedScores {
    pub soins_medicaux: Option<u8>,
    pub hospitalisation: Option<u8>,
    pub optique: Option<u8>,
    pub dentaire: Option<u8>,
}

impl NeedScores {
    pub fn is_empty(&self) -> bool {
        self.soins_medicaux.is_none()
            && self.hospitalisation.is_none()
            && self.optique.is_none()
            && self.dentaire.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedBesoin {
    pub date_effet: Option<String>,
    pub actuellement_assure: Option<bool>,
    pub besoins: NeedScores,
}

/// Provider-agnostic extraction result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLead {
    pub contact: Option<ExtractedContact>,
    pub souscripteur: Option<ExtractedPerson>,
    pub conjoint: Option<ExtractedPerson>,
    pub enfants: Option<Vec<ExtractedChild>>,
    pub besoin: Option<ExtractedBesoin>,
}

// ═══════════════════════════════════════════
// Canonical lead
// ═══════════════════════════════════════════

/// Primary insured: contact merged with souscripteur.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub civilite: Option<Civilite>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub adresse: Option<String>,
    pub code_postal: Option<String>,
    pub ville: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub date_naissance: Option<String>,
    pub profession: Option<String>,
    pub regime_social: Option<String>,
    pub nombre_enfants: Option<u32>,
}

impl Subscriber {
    /// True when no field carries data.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spouse {
    pub civilite: Option<Civilite>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub date_naissance: Option<String>,
    pub profession: Option<String>,
    pub regime_social: Option<String>,
}

/// Where a lead came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub provider: Provider,
    pub confidence: Confidence,
    pub method: ExtractionMethod,
    pub email_id: Option<String>,
    pub source: Option<String>,
}

/// Coverage project: need, spouse and provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub date_effet: Option<String>,
    pub actuellement_assure: Option<bool>,
    pub besoins: NeedScores,
    pub conjoint: Option<Spouse>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub date_naissance: String,
    pub ordre: u32,
}

/// Canonical, immutable lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Deterministic identity hash (UUID-shaped).
    pub id: String,
    pub subscriber: Subscriber,
    pub project: Option<Project>,
    pub children: Option<Vec<Child>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_input_builder() {
        let input = LeadInput::new("body")
            .with_subject("Nouveau lead")
            .with_metadata(LeadMetadata {
                email_id: Some("msg-1".into()),
                source: Some("inbox".into()),
            });
        assert_eq!(input.text, "body");
        assert_eq!(input.subject.as_deref(), Some("Nouveau lead"));
        assert_eq!(input.metadata.email_id.as_deref(), Some("msg-1"));
    }

    #[test]
    fn empty_subscriber_detected() {
        assert!(Subscriber::default().is_empty());
        let s = Subscriber {
            nom: Some("DUPONT".into()),
            ..Default::default()
        };
        assert!(!s.is_empty());
    }

    #[test]
    fn need_scores_empty() {
        assert!(NeedScores::default().is_empty());
        let n = NeedScores {
            optique: Some(2),
            ..Default::default()
        };
        assert!(!n.is_empty());
    }

    #[test]
    fn unknown_detection_has_no_signals() {
        let r = ProviderDetectionResult::unknown();
        assert_eq!(r.provider, Provider::Unknown);
        assert!(r.signals.is_empty());
    }

    #[test]
    fn lead_input_deserializes_without_metadata() {
        let input: LeadInput =
            serde_json::from_str(r#"{"text":"hello","subject":null}"#).unwrap();
        assert_eq!(input.metadata, LeadMetadata::default());
    }
}
