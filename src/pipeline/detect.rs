//! Lead admissibility and format detection.
//!
//! Separate from classification: a message can get a weak provider guess
//! and still fail admissibility.

use crate::models::enums::MessageFormat;

use super::extraction::{assurlead, assurprospect};
use super::gate;
use super::patterns::is_html;

/// True only when the gate passes and one provider grammar fully matches.
pub fn is_lead(text: &str, subject: Option<&str>) -> bool {
    if !gate::passes(text, subject) {
        return false;
    }
    let matched = assurprospect::detect(text) || assurlead::detect(text);
    if !matched {
        tracing::debug!("No provider grammar matched");
    }
    matched
}

/// HTML when any structural tag is present, text otherwise.
pub fn detect_format(text: &str) -> MessageFormat {
    if is_html(text) {
        MessageFormat::Html
    } else {
        MessageFormat::Text
    }
}
