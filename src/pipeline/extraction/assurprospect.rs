//! AssurProspect grammars.
//!
//! Text: a transmission marker, then header-delimited sections of
//! `Label : value` lines, then a footer.
//! HTML: the same content as `<hN>` section headers and `<b>Label :</b> value`
//! pairs.

use crate::models::enums::{MessageFormat, Provider, Section};
use crate::pipeline::normalize::{clean_html_cell, html_to_text, normalize_text};
use crate::pipeline::patterns::{
    is_html, ASSURPROSPECT_FOOTER, ASSURPROSPECT_HTML_TOKEN, ASSURPROSPECT_REQUIRED,
    ASSURPROSPECT_TRANSMISSION,
};

use super::fields::FieldMap;
use super::sections::{header_section, label_value_pairs, split_sections};
use super::{finish_extraction, ExtractionOutcome, LeadExtractor};

pub struct TextExtractor;
pub struct HtmlExtractor;

impl LeadExtractor for TextExtractor {
    fn provider(&self) -> Provider {
        Provider::AssurProspect
    }

    fn format(&self) -> MessageFormat {
        MessageFormat::Text
    }

    fn can_parse(&self, text: &str) -> bool {
        !is_html(text) && ASSURPROSPECT_TRANSMISSION.is_match(text)
    }

    fn parse(&self, text: &str) -> ExtractionOutcome {
        match collect_text_fields(text) {
            Some(fields) => finish_extraction(self.provider(), &fields, ASSURPROSPECT_REQUIRED),
            None => ExtractionOutcome::failed("Transmission marker not found"),
        }
    }
}

impl LeadExtractor for HtmlExtractor {
    fn provider(&self) -> Provider {
        Provider::AssurProspect
    }

    fn format(&self) -> MessageFormat {
        MessageFormat::Html
    }

    fn can_parse(&self, text: &str) -> bool {
        is_html(text) && ASSURPROSPECT_TRANSMISSION.is_match(&html_to_text(text))
    }

    fn parse(&self, text: &str) -> ExtractionOutcome {
        match collect_html_fields(text) {
            Some(fields) => finish_extraction(self.provider(), &fields, ASSURPROSPECT_REQUIRED),
            None => ExtractionOutcome::failed("Transmission marker not found"),
        }
    }
}

/// Admissibility: marker, the contact/subscriber/need sections and all
/// eight required fields.
pub fn detect(text: &str) -> bool {
    let fields = if is_html(text) {
        collect_html_fields(text)
    } else {
        collect_text_fields(text)
    };
    fields.is_some_and(|f| has_triple_section(&f) && f.missing(ASSURPROSPECT_REQUIRED).is_empty())
}

fn has_triple_section(fields: &FieldMap) -> bool {
    [Section::Contact, Section::Souscripteur, Section::Besoin]
        .into_iter()
        .all(|s| fields.has_section(s))
}

/// Field map of a text message, from the start marker to the footer.
/// `None` when there is no start marker.
pub fn collect_text_fields(raw: &str) -> Option<FieldMap> {
    let text = normalize_text(raw);
    let start = ASSURPROSPECT_TRANSMISSION.find(&text)?.start();
    let body = &text[start..];
    let body = match ASSURPROSPECT_FOOTER.find(body) {
        Some(footer) => &body[..footer.start()],
        None => body,
    };

    let mut fields = FieldMap::new();
    for block in split_sections(body) {
        if let Some(section) = block.section {
            fields.mark_section(section);
        }
        for (label, value) in label_value_pairs(&block.lines) {
            if !fields.insert_labelled(&label, block.section, &value) {
                tracing::trace!(label = %label, "Unmapped label");
            }
        }
    }
    Some(fields)
}

/// Field map of an HTML message. `None` when there is no start marker.
pub fn collect_html_fields(raw: &str) -> Option<FieldMap> {
    if !ASSURPROSPECT_TRANSMISSION.is_match(&html_to_text(raw)) {
        return None;
    }

    let mut fields = FieldMap::new();
    let mut current: Option<Section> = None;

    for caps in ASSURPROSPECT_HTML_TOKEN.captures_iter(raw) {
        if let Some(header) = caps.name("header") {
            current = header_section(&clean_html_cell(header.as_str()));
            if let Some(section) = current {
                fields.mark_section(section);
            }
            continue;
        }

        let label = caps.name("label").map_or(String::new(), |m| clean_html_cell(m.as_str()));
        let value = caps.name("value").map_or(String::new(), |m| clean_html_cell(m.as_str()));
        let value = value.trim_start_matches(':').trim();

        // A bold line with no value may itself be a section header.
        if value.is_empty() && !label.trim_end().ends_with(':') {
            if let Some(section) = header_section(&label) {
                current = Some(section);
                fields.mark_section(section);
                continue;
            }
        }

        if !fields.insert_labelled(&label, current, value) {
            tracing::trace!(label = %label, "Unmapped label");
        }
    }
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Civilite;
    use crate::pipeline::extraction::fields::FieldKey;
    use crate::pipeline::fixtures::{ASSURLEAD_TAB, ASSURPROSPECT_HTML, ASSURPROSPECT_TEXT};

    #[test]
    fn text_extractor_sniffing() {
        assert!(TextExtractor.can_parse(ASSURPROSPECT_TEXT));
        assert!(!TextExtractor.can_parse(ASSURPROSPECT_HTML));
        assert!(!TextExtractor.can_parse(ASSURLEAD_TAB));
        assert!(HtmlExtractor.can_parse(ASSURPROSPECT_HTML));
        assert!(!HtmlExtractor.can_parse(ASSURPROSPECT_TEXT));
    }

    #[test]
    fn text_extraction_reads_every_section() {
        let outcome = TextExtractor.parse(ASSURPROSPECT_TEXT);
        assert!(outcome.success, "{:?}", outcome.errors);
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        let lead = outcome.data.unwrap();

        let contact = lead.contact.unwrap();
        assert_eq!(contact.civilite, Some(Civilite::Monsieur));
        assert_eq!(contact.nom.as_deref(), Some("DUPONT"));
        assert_eq!(contact.prenom.as_deref(), Some("Jean"));
        assert_eq!(contact.code_postal.as_deref(), Some("75001"));
        assert_eq!(contact.telephone.as_deref(), Some("0612345678"));

        let sous = lead.souscripteur.unwrap();
        assert_eq!(sous.date_naissance.as_deref(), Some("15/03/1980"));
        assert_eq!(sous.regime_social.as_deref(), Some("TNS"));
        assert_eq!(sous.nombre_enfants, Some(2));

        let conjoint = lead.conjoint.unwrap();
        assert_eq!(conjoint.prenom.as_deref(), Some("Marie"));
        assert_eq!(conjoint.date_naissance.as_deref(), Some("22/07/1982"));

        let enfants = lead.enfants.unwrap();
        assert_eq!(enfants.len(), 2);
        assert_eq!(enfants[1].date_naissance, "15/04/2015");

        let besoin = lead.besoin.unwrap();
        assert_eq!(besoin.date_effet.as_deref(), Some("01/03/2026"));
        assert_eq!(besoin.actuellement_assure, Some(true));
        assert_eq!(besoin.besoins.hospitalisation, Some(4));
    }

    #[test]
    fn footer_stops_extraction() {
        let text = ASSURPROSPECT_TEXT.replace(
            "Cordialement,",
            "Cordialement,\nEnfants\nDate de naissance du 3ème enfant : 01/01/2020",
        );
        let fields = collect_text_fields(&text).unwrap();
        assert_eq!(fields.children.len(), 2);
    }

    #[test]
    fn html_extraction() {
        let outcome = HtmlExtractor.parse(ASSURPROSPECT_HTML);
        assert!(outcome.success, "{:?}", outcome.errors);
        let lead = outcome.data.unwrap();
        let contact = lead.contact.unwrap();
        assert_eq!(contact.civilite, Some(Civilite::Madame));
        assert_eq!(contact.prenom.as_deref(), Some("Sophie"));
        assert_eq!(contact.telephone.as_deref(), Some("0798765432"));
        let sous = lead.souscripteur.unwrap();
        assert_eq!(sous.profession.as_deref(), Some("Commerçant"));
        assert_eq!(sous.regime_social.as_deref(), Some("TNS"));
        assert_eq!(lead.besoin.unwrap().actuellement_assure, Some(false));
        assert!(lead.enfants.is_none());
    }

    #[test]
    fn html_values_wrapped_in_inline_tags() {
        let html = ASSURPROSPECT_HTML
            .replace("<b>Nom :</b> MARTIN", "<b>Nom :</b> <span style=\"color:#333\">MARTIN</span>")
            .replace(
                "<b>Email :</b> sophie.martin@example.fr",
                "<strong>Email :</strong> <a href=\"mailto:sophie.martin@example.fr\">sophie.martin@example.fr</a>",
            );
        let fields = collect_html_fields(&html).unwrap();
        assert_eq!(fields.get(Section::Contact, FieldKey::Nom), Some("MARTIN"));
        assert_eq!(
            fields.get(Section::Contact, FieldKey::Email),
            Some("sophie.martin@example.fr")
        );
        assert!(detect(&html));
    }

    #[test]
    fn unnumbered_child_labels_in_text() {
        let text = ASSURPROSPECT_TEXT
            .replace("Date de naissance du 1er enfant", "Date de naissance enfant")
            .replace("Date de naissance du 2ème enfant", "Date de naissance enfant");
        let outcome = TextExtractor.parse(&text);
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        let enfants = outcome.data.unwrap().enfants.unwrap();
        let dates: Vec<_> = enfants.iter().map(|c| c.date_naissance.as_str()).collect();
        assert_eq!(dates, ["01/09/2010", "15/04/2015"]);
    }

    #[test]
    fn bold_headers_without_value_switch_section() {
        let html = "<p>Transmission d'une fiche prospect</p>\
            <p><b>Conjoint</b></p><p><b>Date de naissance :</b> 22/07/1982</p>";
        let fields = collect_html_fields(html).unwrap();
        assert!(fields.has_section(Section::Conjoint));
        assert_eq!(
            fields.get(Section::Conjoint, FieldKey::DateNaissance),
            Some("22/07/1982")
        );
    }

    #[test]
    fn detection_requires_triple_section_and_fields() {
        assert!(detect(ASSURPROSPECT_TEXT));
        assert!(detect(ASSURPROSPECT_HTML));

        let no_besoin = ASSURPROSPECT_TEXT.replace("Besoin\n", "");
        assert!(!detect(&no_besoin));

        let no_email = ASSURPROSPECT_TEXT.replace("Email : jean.dupont@example.com\n", "");
        assert!(!detect(&no_email));

        assert!(!detect(ASSURLEAD_TAB));
    }

    #[test]
    fn missing_marker_fails_without_panic() {
        let outcome = TextExtractor.parse("Nom : DUPONT");
        assert!(!outcome.success);
        assert_eq!(outcome.errors, vec!["Transmission marker not found".to_string()]);
    }

    #[test]
    fn missing_optional_field_is_a_warning() {
        let text = ASSURPROSPECT_TEXT.replace("Email : jean.dupont@example.com\n", "");
        let outcome = TextExtractor.parse(&text);
        assert!(outcome.success);
        assert!(outcome.warnings.iter().any(|w| w == "Missing field: email"));
    }
}
