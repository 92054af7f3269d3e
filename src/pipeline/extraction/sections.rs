//! Section splitter for the text grammar.
//!
//! A text lead is a sequence of header lines ("Contact", "Souscripteur",
//! "Conjoint", "Enfants", "Besoin") each followed by `Label : value` lines.
//! The same label ("Date de naissance") means different things per section,
//! so fields are always read with their enclosing section.

use crate::models::enums::Section;
use crate::pipeline::normalize::fold_label;
use crate::pipeline::patterns::LABEL_VALUE_LINE;

const SECTION_HEADERS: &[(&str, Section)] = &[
    ("contact", Section::Contact),
    ("coordonnees", Section::Contact),
    ("vos coordonnees", Section::Contact),
    ("informations de contact", Section::Contact),
    ("souscripteur", Section::Souscripteur),
    ("informations souscripteur", Section::Souscripteur),
    ("assure principal", Section::Souscripteur),
    ("assure", Section::Souscripteur),
    ("adherent", Section::Souscripteur),
    ("conjoint", Section::Conjoint),
    ("informations conjoint", Section::Conjoint),
    ("enfants", Section::Enfants),
    ("enfant", Section::Enfants),
    ("enfant(s)", Section::Enfants),
    ("les enfants", Section::Enfants),
    ("besoin", Section::Besoin),
    ("besoins", Section::Besoin),
    ("votre besoin", Section::Besoin),
    ("projet", Section::Besoin),
];

/// A run of lines under one header. `section` is `None` before the first header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlock {
    pub section: Option<Section>,
    pub lines: Vec<String>,
}

/// Recognize a header line, tolerating decorations like `=== Contact ===`.
pub fn header_section(line: &str) -> Option<Section> {
    let stripped = line.trim().trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '=' | '*' | '#' | '-' | '_' | '[' | ']' | ':' | '|')
    });
    if stripped.is_empty() {
        return None;
    }
    let folded = fold_label(stripped);
    SECTION_HEADERS
        .iter()
        .find(|(name, _)| *name == folded)
        .map(|(_, section)| *section)
}

/// Partition text into header-delimited blocks, preserving order.
pub fn split_sections(text: &str) -> Vec<SectionBlock> {
    let mut blocks = vec![SectionBlock {
        section: None,
        lines: Vec::new(),
    }];

    for line in text.lines() {
        if let Some(section) = header_section(line) {
            blocks.push(SectionBlock {
                section: Some(section),
                lines: Vec::new(),
            });
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        if let Some(current) = blocks.last_mut() {
            current.lines.push(line.to_string());
        }
    }

    blocks.retain(|b| b.section.is_some() || !b.lines.is_empty());
    blocks
}

/// `Label : value` pairs of a block; lines without a colon are skipped.
pub fn label_value_pairs(lines: &[String]) -> Vec<(String, String)> {
    lines
        .iter()
        .filter_map(|line| {
            let caps = LABEL_VALUE_LINE.captures(line)?;
            Some((caps[1].trim().to_string(), caps[2].trim().to_string()))
        })
        .collect()
}
