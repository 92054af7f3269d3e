//! Lead Gate: cheap admissibility filter run before any parsing.
//!
//! Not being a lead is a normal outcome, so the gate answers with a bool
//! and logs the reason at debug level.

use crate::config::MIN_LEAD_BODY_CHARS;

use super::patterns::{FORWARD_HEADER_LINE, FORWARD_SUBJECT};

/// Why a message was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    EmptyBody,
    EmptyForward,
    TooShort { chars: usize },
}

/// Decide whether a body is worth parsing at all.
pub fn check(text: &str, subject: Option<&str>) -> Result<(), GateRejection> {
    if text.trim().is_empty() {
        return Err(GateRejection::EmptyBody);
    }

    let is_forward = subject.is_some_and(|s| FORWARD_SUBJECT.is_match(s));
    if is_forward && forwarded_body_is_empty(text) {
        return Err(GateRejection::EmptyForward);
    }

    let chars = text.chars().count();
    if chars < MIN_LEAD_BODY_CHARS {
        return Err(GateRejection::TooShort { chars });
    }

    Ok(())
}

/// Boolean form of [`check`].
pub fn passes(text: &str, subject: Option<&str>) -> bool {
    match check(text, subject) {
        Ok(()) => true,
        Err(reason) => {
            tracing::debug!(?reason, "Lead gate rejected message");
            false
        }
    }
}

/// True when nothing but client-inserted forward headers remains.
fn forwarded_body_is_empty(text: &str) -> bool {
    text.lines()
        .map(|l| l.trim().trim_start_matches('>').trim())
        .filter(|l| !l.is_empty())
        .all(|l| FORWARD_HEADER_LINE.is_match(l))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::ASSURPROSPECT_TEXT;

    #[test]
    fn empty_and_whitespace_rejected() {
        assert_eq!(check("", None), Err(GateRejection::EmptyBody));
        assert_eq!(check("  \n\t ", Some("Nouveau lead")), Err(GateRejection::EmptyBody));
    }

    #[test]
    fn short_body_rejected() {
        let body = "x".repeat(499);
        assert_eq!(check(&body, None), Err(GateRejection::TooShort { chars: 499 }));
        assert!(passes(&"x".repeat(500), None));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 250 two-byte characters = 500 bytes but only 250 chars.
        assert!(!passes(&"é".repeat(250), None));
    }

    #[test]
    fn forward_with_only_headers_rejected() {
        let body = "---------- Forwarded message ---------\nDe : a@b.fr\nDate : lundi\nObjet : lead\n";
        assert_eq!(check(body, Some("TR: lead")), Err(GateRejection::EmptyForward));
    }

    #[test]
    fn forward_with_content_passes() {
        let body = format!("---------- Forwarded message ---------\n{ASSURPROSPECT_TEXT}");
        assert!(passes(&body, Some("Fwd: Nouvelle fiche")));
    }

    #[test]
    fn full_lead_passes() {
        assert!(passes(ASSURPROSPECT_TEXT, None));
    }
}
