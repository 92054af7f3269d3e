//! Assurlead grammars.
//!
//! HTML: a two-column `<table>` of label/value rows plus the partner signature.
//! Text: one `Field<TAB>Value` line per field.
//! Neither layout has per-child blocks; children come from a min/max
//! birth-date pair (see `builders::synthesize_children_from_bounds`).

use crate::models::enums::{MessageFormat, Provider, Section};
use crate::pipeline::normalize::{clean_html_cell, normalize_text};
use crate::pipeline::patterns::{
    is_html, ASSURLEAD_REQUIRED, ASSURLEAD_SIGNATURE, ASSURLEAD_TABLE_MARKER, ASSURLEAD_TABLE_ROW,
    TAB_FIELD_LINE,
};

use super::fields::FieldMap;
use super::sections::header_section;
use super::{finish_extraction, ExtractionOutcome, LeadExtractor};

/// Tab lines needed before a text body counts as the tab grammar.
const MIN_TAB_LINES: usize = 3;

pub struct HtmlExtractor;
pub struct TabExtractor;

impl LeadExtractor for HtmlExtractor {
    fn provider(&self) -> Provider {
        Provider::Assurlead
    }

    fn format(&self) -> MessageFormat {
        MessageFormat::Html
    }

    fn can_parse(&self, text: &str) -> bool {
        is_html(text) && ASSURLEAD_TABLE_MARKER.is_match(text) && ASSURLEAD_SIGNATURE.is_match(text)
    }

    fn parse(&self, text: &str) -> ExtractionOutcome {
        if !ASSURLEAD_TABLE_MARKER.is_match(text) {
            return ExtractionOutcome::failed("No lead table found");
        }
        let fields = collect_table_fields(text);
        finish_extraction(self.provider(), &fields, ASSURLEAD_REQUIRED)
    }
}

impl LeadExtractor for TabExtractor {
    fn provider(&self) -> Provider {
        Provider::Assurlead
    }

    fn format(&self) -> MessageFormat {
        MessageFormat::Text
    }

    fn can_parse(&self, text: &str) -> bool {
        !is_html(text) && count_tab_lines(text) >= MIN_TAB_LINES
    }

    fn parse(&self, text: &str) -> ExtractionOutcome {
        let fields = collect_tab_fields(text);
        finish_extraction(self.provider(), &fields, ASSURLEAD_REQUIRED)
    }
}

/// Admissibility: table grammar (marker + signature + seven fields) or tab
/// grammar (seven fields).
pub fn detect(text: &str) -> bool {
    if is_html(text) {
        ASSURLEAD_TABLE_MARKER.is_match(text)
            && ASSURLEAD_SIGNATURE.is_match(text)
            && collect_table_fields(text).missing(ASSURLEAD_REQUIRED).is_empty()
    } else {
        collect_tab_fields(text).missing(ASSURLEAD_REQUIRED).is_empty()
    }
}

fn count_tab_lines(text: &str) -> usize {
    text.lines().filter(|l| TAB_FIELD_LINE.is_match(l)).count()
}

/// Field map from `<tr><td>label</td><td>value</td></tr>` rows.
pub fn collect_table_fields(raw: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    for caps in ASSURLEAD_TABLE_ROW.captures_iter(raw) {
        let label = clean_html_cell(&caps["label"]);
        let value = clean_html_cell(&caps["value"]);
        if !fields.insert_labelled(&label, None, &value) {
            tracing::trace!(label = %label, "Unmapped label");
        }
    }
    fields
}

/// Field map from `Field<TAB>Value` lines. A bare header line
/// ("Conjoint") scopes the lines that follow it.
pub fn collect_tab_fields(raw: &str) -> FieldMap {
    let text = normalize_text(raw);
    let mut fields = FieldMap::new();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        if let Some(caps) = TAB_FIELD_LINE.captures(line) {
            if !fields.insert_labelled(&caps[1], current, &caps[2]) {
                tracing::trace!(label = %&caps[1], "Unmapped label");
            }
        } else if let Some(section) = header_section(line) {
            current = Some(section);
            fields.mark_section(section);
        }
    }
    fields
}
