//! Provider classification by signal counting.
//!
//! Each provider has an independent family of signal patterns. Every firing
//! signal is recorded; the provider and confidence follow from the counts
//! alone, so the result is a pure function of the input.

use crate::models::enums::{Confidence, Provider};
use crate::models::lead::ProviderDetectionResult;

use super::normalize::{fold_case_and_accents, html_to_text};
use super::patterns::{is_html, SignalPattern, SignalTarget, ASSURLEAD_SIGNALS, ASSURPROSPECT_SIGNALS};

/// Classify a message by partner.
///
/// AssurProspect: ≥3 signals high, 2 medium, 1 low.
/// Assurlead: ≥2 signals high, 1 medium.
/// AssurProspect takes priority when both families fire.
pub fn classify_provider(text: &str, subject: Option<&str>) -> ProviderDetectionResult {
    let body = if is_html(text) {
        fold_case_and_accents(&html_to_text(text))
    } else {
        fold_case_and_accents(text)
    };
    let subject = subject.map(fold_case_and_accents).unwrap_or_default();

    let a_signals = collect_signals(&ASSURPROSPECT_SIGNALS, &body, &subject);
    let b_signals = collect_signals(&ASSURLEAD_SIGNALS, &body, &subject);

    let result = if let Some(confidence) = assurprospect_confidence(a_signals.len()) {
        ProviderDetectionResult {
            provider: Provider::AssurProspect,
            confidence,
            signals: a_signals,
        }
    } else if let Some(confidence) = assurlead_confidence(b_signals.len()) {
        ProviderDetectionResult {
            provider: Provider::Assurlead,
            confidence,
            signals: b_signals,
        }
    } else {
        ProviderDetectionResult::unknown()
    };

    tracing::debug!(
        provider = %result.provider,
        confidence = %result.confidence,
        signals = result.signals.len(),
        "Provider classified"
    );
    result
}

fn collect_signals(patterns: &[SignalPattern], body: &str, subject: &str) -> Vec<String> {
    patterns
        .iter()
        .filter(|p| match p.target {
            SignalTarget::Body => p.regex.is_match(body),
            SignalTarget::Subject => p.regex.is_match(subject),
        })
        .map(|p| p.name.to_string())
        .collect()
}

fn assurprospect_confidence(count: usize) -> Option<Confidence> {
    match count {
        0 => None,
        1 => Some(Confidence::Low),
        2 => Some(Confidence::Medium),
        _ => Some(Confidence::High),
    }
}

fn assurlead_confidence(count: usize) -> Option<Confidence> {
    match count {
        0 => None,
        1 => Some(Confidence::Medium),
        _ => Some(Confidence::High),
    }
}
