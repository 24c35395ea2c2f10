use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use salesdesk_core::{AppConfig, EmailDraft, GenerationSource};
use salesdesk_llm::{
    parse_embedded_json, Attempt, CompletionRequest, FallbackChain, GenerationError,
    OpenAiClient, Terminal, TextGenerator,
};
use serde::Deserialize;

use super::facts::EmailFacts;
use super::scenario::EmailScenario;
use super::templates::{render, TemplateInput};

const EMAIL_MAX_TOKENS: u32 = 900;
pub const DEFAULT_SENDER: &str = "The Sales Team";

pub struct EmailRequest {
    pub scenario: EmailScenario,
    pub recipient: String,
    pub facts: EmailFacts,
    pub context: Option<String>,
    pub sender: String,
}

pub struct EmailDraftComposer {
    chain: FallbackChain<EmailRequest, EmailDraft>,
    sender: String,
}

impl EmailDraftComposer {
    #[must_use]
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        timeout: Duration,
        sender: impl Into<String>,
    ) -> Self {
        let chain = FallbackChain::new(ScenarioTemplate)
            .with_optional_attempt(generator.map(|generator| ModelEmail { generator, timeout }));
        Self {
            chain,
            sender: sender.into(),
        }
    }

    /// Composer that only fills templates.
    #[must_use]
    pub fn templates_only() -> Self {
        Self::new(None, Duration::ZERO, DEFAULT_SENDER)
    }

    /// Uses the long generation timeout and the configured sender name.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerationError> {
        let generator = OpenAiClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
        Ok(Self::new(
            generator,
            Duration::from_secs(config.llm_long_timeout_secs),
            config.sender_name.clone(),
        ))
    }

    /// Draft an email for `recipient`. Never fails.
    pub async fn compose(
        &self,
        scenario: EmailScenario,
        recipient: &str,
        facts: &EmailFacts,
        context: Option<&str>,
    ) -> EmailDraft {
        let request = EmailRequest {
            scenario,
            recipient: recipient.trim().to_string(),
            facts: facts.clone(),
            context: context.map(str::to_string),
            sender: self.sender.clone(),
        };
        let draft = self.chain.run(&request).await;
        tracing::debug!(
            scenario = %scenario,
            generated_by = draft.generated_by.as_str(),
            "email drafted"
        );
        draft
    }

    /// [`Self::compose`] keyed by scenario tag; unknown tags draft an
    /// appreciation email.
    pub async fn compose_tagged(
        &self,
        tag: &str,
        recipient: &str,
        facts: &EmailFacts,
        context: Option<&str>,
    ) -> EmailDraft {
        self.compose(EmailScenario::from_tag_or_default(tag), recipient, facts, context)
            .await
    }
}

struct ScenarioTemplate;

impl Terminal<EmailRequest, EmailDraft> for ScenarioTemplate {
    fn produce(&self, input: &EmailRequest) -> EmailDraft {
        render(
            input.scenario,
            &TemplateInput {
                recipient: &input.recipient,
                facts: &input.facts,
                context: input.context.as_deref(),
                sender: &input.sender,
            },
        )
    }
}

struct ModelEmail {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ModelEmailBody {
    #[serde(default)]
    subject: String,
    #[serde(default)]
    preview_text: String,
    #[serde(default)]
    body: String,
}

impl ModelEmail {
    async fn run(&self, input: &EmailRequest) -> Result<EmailDraft, GenerationError> {
        let request = CompletionRequest::new(email_brief(input), EMAIL_MAX_TOKENS, self.timeout);
        let text = self.generator.complete(&request).await?;
        parse_model_email(&text)
    }
}

impl Attempt<EmailRequest, EmailDraft> for ModelEmail {
    fn name(&self) -> &'static str {
        "model_email"
    }

    fn attempt<'a>(
        &'a self,
        input: &'a EmailRequest,
    ) -> BoxFuture<'a, Result<EmailDraft, GenerationError>> {
        self.run(input).boxed()
    }
}

fn email_brief(input: &EmailRequest) -> String {
    let recipient = if input.recipient.is_empty() {
        "Valued Customer"
    } else {
        input.recipient.as_str()
    };
    let context = input
        .context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("None");

    format!(
        "You are an account manager writing a {scenario} email to a business customer.\n\n\
         Tone: {tone}\n\
         Goal: {goal}\n\
         Recipient: {recipient}\n\
         Sign off as: {sender}\n\n\
         Facts:\n{facts}\n\n\
         Additional context: {context}\n\n\
         Only use the facts given; do not invent figures. Return strictly JSON:\n\
         {{\"subject\": \"...\", \"preview_text\": \"one sentence inbox preview\", \
         \"body\": \"complete HTML email body\"}}",
        scenario = input.scenario.tag().replace('_', " "),
        tone = input.scenario.tone(),
        goal = input.scenario.goal(),
        sender = input.sender,
        facts = input.facts.brief_lines().join("\n"),
    )
}

fn parse_model_email(text: &str) -> Result<EmailDraft, GenerationError> {
    let parsed: ModelEmailBody = parse_embedded_json(text, "model email")?;
    let subject = parsed.subject.trim();
    let body = parsed.body.trim();
    if subject.is_empty() || body.is_empty() {
        return Err(GenerationError::MalformedResponse(
            "email is missing a subject or body".to_string(),
        ));
    }
    Ok(EmailDraft {
        subject: subject.to_string(),
        preview_text: parsed.preview_text.trim().to_string(),
        body: body.to_string(),
        generated_by: GenerationSource::Llm,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn request(scenario: EmailScenario) -> EmailRequest {
        EmailRequest {
            scenario,
            recipient: "Ana Souza".to_string(),
            facts: EmailFacts {
                invoice_number: Some("INV-42".into()),
                amount_due: Some(Decimal::new(9_900, 2)),
                ..EmailFacts::default()
            },
            context: Some("Prefers phone follow-up".to_string()),
            sender: "Northwind Sales".to_string(),
        }
    }

    #[test]
    fn brief_carries_tone_goal_and_facts() {
        let brief = email_brief(&request(EmailScenario::PaymentReminder));
        assert!(brief.contains("writing a payment reminder email"));
        assert!(brief.contains("Tone: polite, firm, and professional"));
        assert!(brief.contains("Invoice number: INV-42"));
        assert!(brief.contains("Amount due: $99.00"));
        assert!(brief.contains("Additional context: Prefers phone follow-up"));
        assert!(brief.contains("Sign off as: Northwind Sales"));
    }

    #[test]
    fn parses_wrapped_json() {
        let draft = parse_model_email(
            "Here is the email:\n{\"subject\": \"Hi\", \"preview_text\": \"p\", \"body\": \"<p>x</p>\"}",
        )
        .unwrap();
        assert_eq!(draft.subject, "Hi");
        assert_eq!(draft.generated_by, GenerationSource::Llm);
    }

    #[test]
    fn missing_body_is_rejected() {
        let err = parse_model_email("{\"subject\": \"Hi\"}").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn templates_only_composer_never_fails() {
        let composer = EmailDraftComposer::templates_only();
        for scenario in EmailScenario::ALL {
            let draft = composer
                .compose(scenario, "", &EmailFacts::default(), None)
                .await;
            assert_eq!(draft.generated_by, GenerationSource::Fallback);
            assert!(draft.body.contains(DEFAULT_SENDER));
        }
    }

    #[tokio::test]
    async fn unknown_tag_drafts_appreciation() {
        let composer = EmailDraftComposer::templates_only();
        let draft = composer
            .compose_tagged("anniversary", "Ana", &EmailFacts::default(), None)
            .await;
        assert_eq!(draft.subject, "Thank you for your business");
    }
}
