//! Insurance-lead email intake.
//!
//! Classifies partner notification emails, extracts the prospect record
//! deterministically (with an optional text-understanding fallback), builds a
//! canonical [`Lead`] and maps it to insurer quote-form schemas.

pub mod config;
pub mod models;
pub mod pipeline;
pub mod platforms;

use std::path::Path;

use tracing_subscriber::EnvFilter;

pub use models::{Lead, LeadInput, LeadMetadata, Provider};
pub use pipeline::{classify_provider, is_lead, LeadPipeline};
pub use platforms::{AlptisTransformer, PlatformTransformer, SwissLifeTransformer, TransformResult};

/// Install the fmt subscriber. `RUST_LOG` wins over the default filter.
/// A second call is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read a message body from disk. The file name becomes the input's
/// `email_id`; a leading `Subject:`/`Objet :` line becomes its subject.
pub fn load_message_file(path: &Path) -> std::io::Result<LeadInput> {
    let raw = std::fs::read_to_string(path)?;
    let (subject, text) = split_subject_line(&raw);

    let mut input = LeadInput::new(text).with_metadata(LeadMetadata {
        email_id: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        source: Some(path.display().to_string()),
    });
    if let Some(subject) = subject {
        input = input.with_subject(subject);
    }
    tracing::debug!(path = %path.display(), chars = input.text.chars().count(), "Message loaded");
    Ok(input)
}

fn split_subject_line(raw: &str) -> (Option<String>, String) {
    let (first, rest) = raw.split_once('\n').unwrap_or((raw, ""));
    let first = first.trim();
    for prefix in ["Subject:", "Objet :", "Objet:"] {
        if let Some(subject) = first.strip_prefix(prefix) {
            return (Some(subject.trim().to_string()), rest.to_string());
        }
    }
    (None, raw.to_string())
}
