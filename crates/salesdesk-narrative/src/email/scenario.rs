use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of outbound customer email the composer can draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailScenario {
    PaymentReminder,
    ProductRecommendation,
    #[default]
    Appreciation,
    FollowUp,
    SeasonalPromotion,
    OrderConfirmation,
    Welcome,
    WinBack,
}

impl EmailScenario {
    pub const ALL: [EmailScenario; 8] = [
        EmailScenario::PaymentReminder,
        EmailScenario::ProductRecommendation,
        EmailScenario::Appreciation,
        EmailScenario::FollowUp,
        EmailScenario::SeasonalPromotion,
        EmailScenario::OrderConfirmation,
        EmailScenario::Welcome,
        EmailScenario::WinBack,
    ];

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            EmailScenario::PaymentReminder => "payment_reminder",
            EmailScenario::ProductRecommendation => "product_recommendation",
            EmailScenario::Appreciation => "appreciation",
            EmailScenario::FollowUp => "follow_up",
            EmailScenario::SeasonalPromotion => "seasonal_promotion",
            EmailScenario::OrderConfirmation => "order_confirmation",
            EmailScenario::Welcome => "welcome",
            EmailScenario::WinBack => "win_back",
        }
    }

    /// Case-insensitive tag lookup; accepts `-` in place of `_`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|s| s.tag() == normalized)
    }

    /// Unknown tags map to [`EmailScenario::Appreciation`].
    #[must_use]
    pub fn from_tag_or_default(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or_else(|| {
            tracing::debug!(tag, "unknown email scenario; using appreciation");
            Self::default()
        })
    }

    pub(crate) fn tone(self) -> &'static str {
        match self {
            EmailScenario::PaymentReminder => "polite, firm, and professional",
            EmailScenario::ProductRecommendation => "helpful and consultative",
            EmailScenario::Appreciation => "warm and sincere",
            EmailScenario::FollowUp => "friendly and attentive",
            EmailScenario::SeasonalPromotion => "upbeat and energetic",
            EmailScenario::OrderConfirmation => "clear and reassuring",
            EmailScenario::Welcome => "welcoming and enthusiastic",
            EmailScenario::WinBack => "personal and inviting",
        }
    }

    pub(crate) fn goal(self) -> &'static str {
        match self {
            EmailScenario::PaymentReminder => {
                "Remind the customer about an outstanding invoice and make paying easy"
            }
            EmailScenario::ProductRecommendation => {
                "Suggest products that fit the customer's purchase history"
            }
            EmailScenario::Appreciation => "Thank the customer for their continued business",
            EmailScenario::FollowUp => {
                "Check in after a recent purchase and invite feedback or questions"
            }
            EmailScenario::SeasonalPromotion => "Announce a time-limited seasonal offer",
            EmailScenario::OrderConfirmation => {
                "Confirm the order details and set delivery expectations"
            }
            EmailScenario::Welcome => "Welcome a new customer and point them to next steps",
            EmailScenario::WinBack => {
                "Re-engage a customer who has not ordered recently with a reason to return"
            }
        }
    }
}

impl fmt::Display for EmailScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
