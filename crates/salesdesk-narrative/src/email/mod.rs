//! Outbound customer email drafts: a model-written draft when available,
//! otherwise a fixed per-scenario HTML template.

mod composer;
mod facts;
mod scenario;
mod templates;

pub use composer::{EmailDraftComposer, EmailRequest, DEFAULT_SENDER};
pub use facts::EmailFacts;
pub use scenario::EmailScenario;
