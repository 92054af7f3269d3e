pub mod assemble;
pub mod batch;
pub mod builders;
pub mod classify;
pub mod dates;
pub mod detect;
pub mod extraction;
pub mod fallback;
pub mod gate;
pub mod identity;
pub mod normalize;
pub mod patterns;

#[cfg(test)]
pub(crate) mod fixtures;

pub use assemble::{assemble_lead, AssemblyContext, LeadError};
pub use batch::LeadPipeline;
pub use classify::classify_provider;
pub use detect::{detect_format, is_lead};
pub use extraction::{ExtractionOutcome, LeadExtractor};
pub use fallback::{FallbackError, MockTextUnderstanding, OllamaLeadClient, TextUnderstanding};
