//! Wire record returned by the text-understanding service and its adapter.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::enums::Section;
use crate::models::lead::ExtractedLead;
use crate::pipeline::extraction::fields::{FieldKey, FieldMap, FieldTarget};
use crate::pipeline::extraction::field_map_to_extracted_lead;

use super::FallbackError;

/// Accept strings, numbers and booleans alike; models are loose with types.
fn lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(if b { "oui" } else { "non" }.to_string()),
        _ => None,
    })
}

/// Ordinal as a number or a numeric string; anything else is dropped.
fn lenient_ordinal<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackContact {
    #[serde(deserialize_with = "lenient")]
    pub civilite: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub nom: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub prenom: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub adresse: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub code_postal: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub ville: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub telephone: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPerson {
    #[serde(deserialize_with = "lenient")]
    pub civilite: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub nom: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub prenom: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub date_naissance: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub profession: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub regime_social: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub nombre_enfants: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackChild {
    #[serde(deserialize_with = "lenient")]
    pub date_naissance: Option<String>,
    #[serde(deserialize_with = "lenient_ordinal")]
    pub ordre: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackBesoin {
    #[serde(deserialize_with = "lenient")]
    pub date_effet: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub actuellement_assure: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub soins_medicaux: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub hospitalisation: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub optique: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub dentaire: Option<String>,
}

/// Same logical fields as `ExtractedLead`, all optional, all loosely typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackRecord {
    pub contact: Option<FallbackContact>,
    pub souscripteur: Option<FallbackPerson>,
    pub conjoint: Option<FallbackPerson>,
    pub enfants: Option<Vec<FallbackChild>>,
    pub besoin: Option<FallbackBesoin>,
}

/// Find the JSON payload in a model response (fenced or bare).
pub fn extract_json_block(response: &str) -> Result<&str, FallbackError> {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return Ok(after_fence[..end].trim());
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            let block = after_fence[..end].trim();
            if block.starts_with('{') || block == "null" {
                return Ok(block);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return Ok(&trimmed[start..=end]);
        }
    }

    if trimmed == "null" {
        return Ok(trimmed);
    }

    Err(FallbackError::NoJson)
}

/// Parse a raw model response. `null` means "no lead".
pub fn parse_fallback_response(response: &str) -> Result<Option<FallbackRecord>, FallbackError> {
    let block = extract_json_block(response)?;
    Ok(serde_json::from_str::<Option<FallbackRecord>>(block)?)
}

/// Adapt a record to `ExtractedLead`. Empty and null fields are dropped, and
/// surviving values go through the same normalization as parsed fields.
pub fn record_to_extracted_lead(record: &FallbackRecord, warnings: &mut Vec<String>) -> ExtractedLead {
    let mut fields = FieldMap::new();
    let mut put = |section: Section, key: FieldKey, value: &Option<String>| {
        if let Some(v) = value {
            fields.insert(
                FieldTarget {
                    section: Some(section),
                    key,
                    ordinal: None,
                },
                None,
                v,
            );
        }
    };

    if let Some(c) = &record.contact {
        put(Section::Contact, FieldKey::Civilite, &c.civilite);
        put(Section::Contact, FieldKey::Nom, &c.nom);
        put(Section::Contact, FieldKey::Prenom, &c.prenom);
        put(Section::Contact, FieldKey::Adresse, &c.adresse);
        put(Section::Contact, FieldKey::CodePostal, &c.code_postal);
        put(Section::Contact, FieldKey::Ville, &c.ville);
        put(Section::Contact, FieldKey::Telephone, &c.telephone);
        put(Section::Contact, FieldKey::Email, &c.email);
    }

    for (section, person) in [
        (Section::Souscripteur, &record.souscripteur),
        (Section::Conjoint, &record.conjoint),
    ] {
        if let Some(p) = person {
            put(section, FieldKey::Civilite, &p.civilite);
            put(section, FieldKey::Nom, &p.nom);
            put(section, FieldKey::Prenom, &p.prenom);
            put(section, FieldKey::DateNaissance, &p.date_naissance);
            put(section, FieldKey::Profession, &p.profession);
            put(section, FieldKey::RegimeSocial, &p.regime_social);
            put(section, FieldKey::NombreEnfants, &p.nombre_enfants);
        }
    }

    if let Some(b) = &record.besoin {
        put(Section::Besoin, FieldKey::DateEffet, &b.date_effet);
        put(Section::Besoin, FieldKey::ActuellementAssure, &b.actuellement_assure);
        put(Section::Besoin, FieldKey::SoinsMedicaux, &b.soins_medicaux);
        put(Section::Besoin, FieldKey::Hospitalisation, &b.hospitalisation);
        put(Section::Besoin, FieldKey::Optique, &b.optique);
        put(Section::Besoin, FieldKey::Dentaire, &b.dentaire);
    }

    for child in record.enfants.iter().flatten() {
        if let Some(date) = &child.date_naissance {
            fields.insert(
                FieldTarget {
                    section: Some(Section::Enfants),
                    key: FieldKey::ChildBirthDate,
                    ordinal: child.ordre,
                },
                None,
                date,
            );
        }
    }

    field_map_to_extracted_lead(&fields, warnings)
}
