pub mod assurlead;
pub mod assurprospect;
pub mod fields;
pub mod sections;

use serde::{Deserialize, Serialize};

use crate::models::enums::{MessageFormat, Provider, Section};
use crate::models::lead::ExtractedLead;
use crate::pipeline::builders::{
    build_besoin, build_children, build_contact, build_person, synthesize_children_from_bounds,
};

use self::fields::{FieldKey, FieldMap};

/// Result of one extractor run. Extractors never return `Err`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub success: bool,
    pub data: Option<ExtractedLead>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ExtractionOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            errors: vec![reason.into()],
            warnings: Vec::new(),
        }
    }

    pub fn succeeded(data: ExtractedLead, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: Vec::new(),
            warnings,
        }
    }
}

/// One provider grammar (text or HTML). Selected by `can_parse` sniffing.
pub trait LeadExtractor: Send + Sync {
    /// Partner whose layout this extractor understands.
    fn provider(&self) -> Provider;

    fn format(&self) -> MessageFormat;

    /// Cheap structural check; no field extraction.
    fn can_parse(&self, text: &str) -> bool;

    /// Full extraction. Degrades to `success: false` rather than failing.
    fn parse(&self, text: &str) -> ExtractionOutcome;
}

/// AssurProspect before Assurlead, HTML before text within a partner.
pub fn default_extractors() -> Vec<Box<dyn LeadExtractor>> {
    vec![
        Box::new(assurprospect::HtmlExtractor),
        Box::new(assurprospect::TextExtractor),
        Box::new(assurlead::HtmlExtractor),
        Box::new(assurlead::TabExtractor),
    ]
}

/// Turn a populated field map into an outcome, checking `required` keys.
///
/// Missing required keys are warnings; a map with neither contact nor
/// subscriber identity is a failure.
pub fn finish_extraction(
    provider: Provider,
    fields: &FieldMap,
    required: &[FieldKey],
) -> ExtractionOutcome {
    if fields.is_empty() {
        return ExtractionOutcome::failed("No recognizable fields");
    }

    let mut warnings = Vec::new();
    for key in fields.missing(required) {
        warnings.push(format!("Missing field: {key}"));
    }

    let lead = field_map_to_extracted_lead(fields, &mut warnings);
    if lead.contact.is_none() && lead.souscripteur.is_none() {
        return ExtractionOutcome {
            warnings,
            ..ExtractionOutcome::failed("No subscriber or contact data")
        };
    }

    tracing::debug!(
        provider = %provider,
        warnings = warnings.len(),
        children = lead.enfants.as_ref().map_or(0, Vec::len),
        "Extraction complete"
    );
    ExtractionOutcome::succeeded(lead, warnings)
}

/// Build every sub-object from the field map.
pub fn field_map_to_extracted_lead(fields: &FieldMap, warnings: &mut Vec<String>) -> ExtractedLead {
    let contact = build_contact(fields, Section::Contact, warnings);
    let souscripteur = build_person(fields, Section::Souscripteur, warnings);
    let conjoint = build_person(fields, Section::Conjoint, warnings);
    let besoin = build_besoin(fields, warnings);

    let enfants = if fields.children.is_empty() {
        synthesize_children_from_bounds(
            fields.get(Section::Enfants, FieldKey::ChildBirthDateMin),
            fields.get(Section::Enfants, FieldKey::ChildBirthDateMax),
            warnings,
        )
    } else {
        build_children(&fields.children, warnings)
    };

    // Declared count and extracted children are not reconciled; the list wins.
    if let Some(declared) = souscripteur.as_ref().and_then(|s| s.nombre_enfants) {
        let found = enfants.as_ref().map_or(0, Vec::len);
        if declared as usize != found {
            tracing::warn!(declared, found, "Declared child count differs from extracted children");
            warnings.push(format!(
                "Declared {declared} children but extracted {found}"
            ));
        }
    }

    ExtractedLead {
        contact,
        souscripteur,
        conjoint,
        enfants,
        besoin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_fails() {
        let outcome = finish_extraction(Provider::Assurlead, &FieldMap::new(), &[]);
        assert!(!outcome.success);
        assert!(outcome.data.is_none());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn besoin_only_fails() {
        let mut map = FieldMap::new();
        map.insert_labelled("Date d'effet", None, "01/01/2026");
        let outcome = finish_extraction(Provider::AssurProspect, &map, &[]);
        assert!(!outcome.success);
    }

    #[test]
    fn missing_required_are_warnings() {
        let mut map = FieldMap::new();
        map.insert_labelled("Nom", None, "DUPONT");
        let outcome = finish_extraction(Provider::Assurlead, &map, &[FieldKey::Nom, FieldKey::Email]);
        assert!(outcome.success);
        assert!(outcome.warnings.iter().any(|w| w == "Missing field: email"));
    }

    #[test]
    fn child_count_mismatch_keeps_extracted_children() {
        let mut map = FieldMap::new();
        map.insert_labelled("Nom", None, "DUPONT");
        map.insert_labelled("Nombre d'enfants", None, "3");
        map.insert_labelled("Date de naissance du 1er enfant", None, "01/09/2010");
        let mut warnings = Vec::new();
        let lead = field_map_to_extracted_lead(&map, &mut warnings);
        assert_eq!(lead.enfants.unwrap().len(), 1);
        assert!(warnings.iter().any(|w| w.contains("Declared 3 children")));
    }

    #[test]
    fn bounds_used_only_without_explicit_children() {
        let mut map = FieldMap::new();
        map.insert_labelled("Date de naissance enfant min", None, "01/09/2010");
        map.insert_labelled("Date de naissance enfant max", None, "15/04/2015");
        let mut warnings = Vec::new();
        let lead = field_map_to_extracted_lead(&map, &mut warnings);
        assert_eq!(lead.enfants.unwrap().len(), 2);
    }

    #[test]
    fn default_order_is_stable() {
        let order: Vec<_> = default_extractors()
            .iter()
            .map(|e| (e.provider(), e.format()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Provider::AssurProspect, MessageFormat::Html),
                (Provider::AssurProspect, MessageFormat::Text),
                (Provider::Assurlead, MessageFormat::Html),
                (Provider::Assurlead, MessageFormat::Text),
            ]
        );
    }
}
