//! Short written analysis of a metrics table.
//!
//! The model path is tried once per call when a generator is configured; any
//! failure falls through to [`crate::patterns`], which always answers.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use salesdesk_core::{AppConfig, DataTable, GenerationSource, NarrativeResult};
use salesdesk_llm::{
    Attempt, CompletionRequest, FallbackChain, GenerationError, OpenAiClient, Terminal,
    TextGenerator,
};

use crate::patterns::{analyze_patterns, render_insight, NO_DATA};
use crate::stats::describe;

/// Rows of the table embedded in the prompt.
const PROMPT_SAMPLE_ROWS: usize = 12;
const NARRATIVE_MAX_TOKENS: u32 = 400;
const MAX_INSIGHT_CHARS: usize = 2_000;

/// One narrative request as seen by each strategy.
pub struct NarrativeInput {
    pub table: DataTable,
    pub question: String,
    pub context: Option<String>,
}

pub struct NarrativeEngine {
    chain: FallbackChain<NarrativeInput, NarrativeResult>,
}

impl NarrativeEngine {
    #[must_use]
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        let chain = FallbackChain::new(PatternAnalysis).with_optional_attempt(
            generator.map(|generator| ModelNarrative { generator, timeout }),
        );
        Self { chain }
    }

    /// Engine that only uses local pattern analysis.
    #[must_use]
    pub fn local_only() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// # Errors
    ///
    /// Returns [`GenerationError`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerationError> {
        let generator = OpenAiClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
        Ok(Self::new(
            generator,
            Duration::from_secs(config.llm_timeout_secs),
        ))
    }

    /// Answer `question` about `table`. Never fails.
    ///
    /// An empty table short-circuits without consulting the model.
    pub async fn summarize(
        &self,
        table: &DataTable,
        question: &str,
        context: Option<&str>,
    ) -> NarrativeResult {
        if table.is_empty() {
            return NarrativeResult {
                insight: NO_DATA.to_string(),
                highlights: Vec::new(),
                generated_by: GenerationSource::Fallback,
            };
        }

        let input = NarrativeInput {
            table: table.clone(),
            question: question.to_string(),
            context: context.map(str::to_string),
        };
        self.chain.run(&input).await
    }
}

struct PatternAnalysis;

impl Terminal<NarrativeInput, NarrativeResult> for PatternAnalysis {
    fn produce(&self, input: &NarrativeInput) -> NarrativeResult {
        let fragments = analyze_patterns(&input.table, input.context.as_deref());
        NarrativeResult {
            insight: render_insight(&fragments),
            highlights: fragments
                .into_iter()
                .map(|f| f.trim_end_matches('.').to_string())
                .collect(),
            generated_by: GenerationSource::Fallback,
        }
    }
}

struct ModelNarrative {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl ModelNarrative {
    async fn run(&self, input: &NarrativeInput) -> Result<NarrativeResult, GenerationError> {
        let request = CompletionRequest::new(
            narrative_prompt(input),
            NARRATIVE_MAX_TOKENS,
            self.timeout,
        );
        let text = self.generator.complete(&request).await?;
        let insight = truncate_chars(text.trim(), MAX_INSIGHT_CHARS);
        if insight.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(NarrativeResult {
            highlights: bullet_lines(&insight),
            insight,
            generated_by: GenerationSource::Llm,
        })
    }
}

impl Attempt<NarrativeInput, NarrativeResult> for ModelNarrative {
    fn name(&self) -> &'static str {
        "model_narrative"
    }

    fn attempt<'a>(
        &'a self,
        input: &'a NarrativeInput,
    ) -> BoxFuture<'a, Result<NarrativeResult, GenerationError>> {
        self.run(input).boxed()
    }
}

fn narrative_prompt(input: &NarrativeInput) -> String {
    let context_block = input
        .context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!("\nAdditional business context:\n{c}\n"))
        .unwrap_or_default();

    format!(
        "You are a sales analyst. Analyze this data and answer the question.\n\n\
         Dataset (first {PROMPT_SAMPLE_ROWS} rows):\n{sample}\n\
         Summary statistics:\n{stats}\n\
         Question: {question}\n{context_block}\n\
         Provide a concise analysis (4-6 sentences) including:\n\
         - Key trends or patterns\n\
         - Notable changes or anomalies\n\
         - Business implications\n\
         - Specific numbers where relevant",
        sample = input.table.to_csv(PROMPT_SAMPLE_ROWS),
        stats = describe(&input.table),
        question = input.question.trim(),
    )
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Lines written as `-` or `•` bullets, without the marker.
fn bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix('-')
                .or_else(|| line.strip_prefix('•'))
                .map(str::trim)
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(context: Option<&str>) -> NarrativeInput {
        NarrativeInput {
            table: DataTable::new()
                .with_text("month", vec![Some("2024-01".into()), Some("2024-02".into())])
                .with_numeric("revenue", vec![Some(100.0), Some(200.0)]),
            question: " How is revenue trending? ".to_string(),
            context: context.map(str::to_string),
        }
    }

    #[test]
    fn prompt_embeds_csv_stats_question_and_context() {
        let prompt = narrative_prompt(&sample_input(Some("Price rise in February")));
        assert!(prompt.contains("month,revenue\n2024-01,100"));
        assert!(prompt.contains("revenue: count=2"));
        assert!(prompt.contains("Question: How is revenue trending?"));
        assert!(prompt.contains("Additional business context:\nPrice rise in February"));
    }

    #[test]
    fn prompt_omits_blank_context() {
        let prompt = narrative_prompt(&sample_input(Some("   ")));
        assert!(!prompt.contains("Additional business context"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn bullets_are_extracted() {
        let text = "Revenue rose.\n- Up 20% in Q2\n• Margin steady\n-   \nplain line";
        assert_eq!(bullet_lines(text), vec!["Up 20% in Q2", "Margin steady"]);
    }

    #[test]
    fn fallback_highlights_mirror_fragments() {
        let result = PatternAnalysis.produce(&sample_input(None));
        assert_eq!(result.generated_by, GenerationSource::Fallback);
        assert_eq!(
            result.highlights,
            vec!["Revenue: Increasing trend (+100.0%) from 100 to 200"]
        );
        assert_eq!(
            result.insight,
            "Revenue: Increasing trend (+100.0%) from 100 to 200."
        );
    }
}
