//! Ordered strategy chain ending in an infallible local strategy.
//!
//! Every call walks the attempts in order and returns the first success. A
//! failed attempt is logged and never surfaced; when all attempts fail (or
//! none were configured) the terminal strategy produces the result.

use futures::future::BoxFuture;

use crate::error::GenerationError;

/// A strategy that may fail, typically a remote model call.
pub trait Attempt<I, O>: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    fn attempt<'a>(&'a self, input: &'a I) -> BoxFuture<'a, Result<O, GenerationError>>;
}

/// The last strategy in a chain. Must always succeed.
pub trait Terminal<I, O>: Send + Sync {
    fn produce(&self, input: &I) -> O;
}

pub struct FallbackChain<I, O> {
    attempts: Vec<Box<dyn Attempt<I, O>>>,
    terminal: Box<dyn Terminal<I, O>>,
}

impl<I, O> FallbackChain<I, O>
where
    I: Sync,
{
    /// Chain with only the terminal strategy.
    pub fn new(terminal: impl Terminal<I, O> + 'static) -> Self {
        Self {
            attempts: Vec::new(),
            terminal: Box::new(terminal),
        }
    }

    /// Append an attempt, tried after any previously added ones.
    #[must_use]
    pub fn with_attempt(mut self, attempt: impl Attempt<I, O> + 'static) -> Self {
        self.attempts.push(Box::new(attempt));
        self
    }

    /// Append an attempt only when one is available.
    #[must_use]
    pub fn with_optional_attempt(self, attempt: Option<impl Attempt<I, O> + 'static>) -> Self {
        match attempt {
            Some(a) => self.with_attempt(a),
            None => self,
        }
    }

    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    /// Run the chain. Never fails.
    pub async fn run(&self, input: &I) -> O {
        for attempt in &self.attempts {
            match attempt.attempt(input).await {
                Ok(output) => {
                    tracing::debug!(strategy = attempt.name(), "strategy succeeded");
                    return output;
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = attempt.name(),
                        error = %e,
                        "strategy failed; falling back"
                    );
                }
            }
        }
        self.terminal.produce(input)
    }
}
