//! Batch Orchestrator: blocks → single parse → text-understanding fallback.
//!
//! Every tier is isolated: a failing block, message or fallback call yields
//! "no lead" for that unit and never affects the others. Messages are
//! processed sequentially, so results follow input order.

use std::sync::Arc;

use crate::config::FallbackConfig;
use crate::models::enums::{Confidence, ExtractionMethod, Provider};
use crate::models::lead::{Lead, LeadInput, LeadMetadata, ProviderDetectionResult};

use super::assemble::{assemble_lead, AssemblyContext};
use super::classify::classify_provider;
use super::extraction::{default_extractors, LeadExtractor};
use super::fallback::{record_to_extracted_lead, FallbackError, OllamaLeadClient, TextUnderstanding};
use super::gate;
use super::patterns::ASSURPROSPECT_TRANSMISSION;

pub struct LeadPipeline {
    extractors: Vec<Box<dyn LeadExtractor>>,
    fallback: Option<Arc<dyn TextUnderstanding>>,
}

impl Default for LeadPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadPipeline {
    /// Deterministic extractors only.
    pub fn new() -> Self {
        Self {
            extractors: default_extractors(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn TextUnderstanding>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Pipeline with the HTTP fallback when `config` is set.
    pub fn from_config(config: Option<&FallbackConfig>) -> Result<Self, FallbackError> {
        let pipeline = Self::new();
        match config {
            Some(config) => {
                tracing::info!(url = %config.base_url, model = %config.model, "Text-understanding fallback enabled");
                Ok(pipeline.with_fallback(Arc::new(OllamaLeadClient::new(config)?)))
            }
            None => Ok(pipeline),
        }
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// All leads of one message, through the three tiers.
    pub fn parse_message(&self, input: &LeadInput) -> Vec<Lead> {
        if !gate::passes(&input.text, input.subject.as_deref()) {
            return Vec::new();
        }

        if let Some(results) = self.parse_blocks(input) {
            return results.into_iter().flatten().collect();
        }

        if let Some(lead) = self.parse_single(input) {
            return vec![lead];
        }

        self.parse_with_fallback(input).into_iter().collect()
    }

    /// Independent messages; failures are dropped, order is preserved.
    pub fn parse_messages(&self, inputs: &[LeadInput]) -> Vec<Lead> {
        let leads: Vec<Lead> = inputs.iter().flat_map(|input| self.parse_message(input)).collect();
        tracing::info!(messages = inputs.len(), leads = leads.len(), "Batch parsed");
        leads
    }

    /// Per-block results when the message bundles two or more transmission
    /// blocks; `None` when it does not.
    pub fn parse_blocks(&self, input: &LeadInput) -> Option<Vec<Option<Lead>>> {
        let blocks = split_blocks(&input.text)?;
        tracing::debug!(blocks = blocks.len(), "Message bundles several leads");

        let results = blocks
            .into_iter()
            .enumerate()
            .map(|(index, block)| {
                let lead = self.extract(block, input.subject.as_deref(), &input.metadata);
                if lead.is_none() {
                    tracing::debug!(block = index, "Block produced no lead");
                }
                lead
            })
            .collect();
        Some(results)
    }

    /// Deterministic single-lead parse of the whole message.
    pub fn parse_single(&self, input: &LeadInput) -> Option<Lead> {
        self.extract(&input.text, input.subject.as_deref(), &input.metadata)
    }

    /// Last tier. `None` when no fallback is configured or it fails.
    pub fn parse_with_fallback(&self, input: &LeadInput) -> Option<Lead> {
        let fallback = self.fallback.as_ref()?;

        let record = match fallback.understand(&input.text) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!("Fallback found no lead");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Text-understanding fallback failed");
                return None;
            }
        };

        let mut warnings = Vec::new();
        let extracted = record_to_extracted_lead(&record, &mut warnings);
        let detection = classify_provider(&input.text, input.subject.as_deref());
        let ctx = AssemblyContext {
            provider: detection.provider,
            confidence: detection.confidence,
            method: ExtractionMethod::Fallback,
            metadata: &input.metadata,
        };
        match assemble_lead(extracted, &ctx) {
            Ok(lead) => Some(lead),
            Err(e) => {
                tracing::warn!(error = %e, "Fallback record unusable");
                None
            }
        }
    }

    /// Try every applicable extractor, classified provider first.
    fn extract(&self, text: &str, subject: Option<&str>, metadata: &LeadMetadata) -> Option<Lead> {
        let detection = classify_provider(text, subject);

        let preferred = self.extractors.iter().filter(|e| e.provider() == detection.provider);
        let others = self.extractors.iter().filter(|e| e.provider() != detection.provider);

        for extractor in preferred.chain(others) {
            if !extractor.can_parse(text) {
                continue;
            }

            let outcome = extractor.parse(text);
            if !outcome.success {
                tracing::debug!(
                    provider = %extractor.provider(),
                    format = %extractor.format(),
                    errors = ?outcome.errors,
                    "Extractor failed"
                );
                continue;
            }
            for warning in &outcome.warnings {
                tracing::debug!(provider = %extractor.provider(), warning = %warning, "Extraction warning");
            }

            let Some(extracted) = outcome.data else {
                continue;
            };
            let ctx = AssemblyContext {
                provider: extractor.provider(),
                confidence: provenance_confidence(&detection, extractor.provider()),
                method: ExtractionMethod::Deterministic,
                metadata,
            };
            match assemble_lead(extracted, &ctx) {
                Ok(lead) => return Some(lead),
                Err(e) => tracing::debug!(error = %e, "Assembly failed"),
            }
        }
        None
    }
}

/// Classification confidence when it agrees with the extractor, low otherwise.
fn provenance_confidence(detection: &ProviderDetectionResult, provider: Provider) -> Confidence {
    if detection.provider == provider {
        detection.confidence
    } else {
        Confidence::Low
    }
}

/// Slices starting at each transmission marker; `None` below two markers.
fn split_blocks(text: &str) -> Option<Vec<&str>> {
    let starts: Vec<usize> = ASSURPROSPECT_TRANSMISSION
        .find_iter(text)
        .map(|m| m.start())
        .collect();
    if starts.len() < 2 {
        return None;
    }

    let blocks = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect();
    Some(blocks)
}
