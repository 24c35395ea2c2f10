//! Text generation over analytics results: table narratives and customer
//! email drafts. Both always produce output; the model is optional.

pub mod email;
pub mod engine;
pub mod patterns;
pub mod stats;

pub use email::{EmailDraftComposer, EmailFacts, EmailScenario};
pub use engine::NarrativeEngine;
pub use patterns::{analyze_patterns, render_insight};
pub use stats::ColumnStats;
