//! Text-generation plumbing: an OpenAI-compatible chat client, the credential
//! precondition, JSON extraction from free text, and the remote-then-local
//! fallback chain shared by narratives, forecasts, and email drafts.

pub mod client;
pub mod credential;
pub mod error;
pub mod extract;
pub mod fallback;

pub use client::{CompletionRequest, OpenAiClient, TextGenerator};
pub use credential::credential_looks_valid;
pub use error::GenerationError;
pub use extract::{extract_json_object, parse_embedded_json};
pub use fallback::{Attempt, FallbackChain, Terminal};
