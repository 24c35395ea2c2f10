//! Fixed HTML drafts, one per scenario.

use std::fmt::Write as _;

use html_escape::encode_text;
use salesdesk_core::{EmailDraft, GenerationSource};

use super::facts::EmailFacts;
use super::scenario::EmailScenario;

pub(crate) struct TemplateInput<'a> {
    pub recipient: &'a str,
    pub facts: &'a EmailFacts,
    pub context: Option<&'a str>,
    pub sender: &'a str,
}

struct Parts {
    subject: String,
    preview_text: String,
    heading: String,
    paragraphs: Vec<String>,
}

/// Render the fallback draft for `scenario`. Every text node is HTML-escaped.
pub(crate) fn render(scenario: EmailScenario, input: &TemplateInput<'_>) -> EmailDraft {
    let parts = match scenario {
        EmailScenario::PaymentReminder => payment_reminder(input.facts),
        EmailScenario::ProductRecommendation => product_recommendation(input.facts),
        EmailScenario::Appreciation => appreciation(input.facts),
        EmailScenario::FollowUp => follow_up(input.facts),
        EmailScenario::SeasonalPromotion => seasonal_promotion(input.facts),
        EmailScenario::OrderConfirmation => order_confirmation(input.facts),
        EmailScenario::Welcome => welcome(input.facts),
        EmailScenario::WinBack => win_back(input.facts),
    };
    EmailDraft {
        body: layout(&parts, input),
        subject: parts.subject,
        preview_text: parts.preview_text,
        generated_by: GenerationSource::Fallback,
    }
}

fn layout(parts: &Parts, input: &TemplateInput<'_>) -> String {
    let recipient = match input.recipient.trim() {
        "" => "Valued Customer",
        name => name,
    };

    let mut body = String::new();
    body.push_str("<!DOCTYPE html>\n<html>\n<body style=\"font-family: Arial, sans-serif; color: #333333; line-height: 1.5;\">\n");
    body.push_str("<div style=\"max-width: 600px; margin: 0 auto; padding: 24px;\">\n");
    let _ = writeln!(
        body,
        "<h2 style=\"color: #1f4e79;\">{}</h2>",
        encode_text(&parts.heading)
    );
    let _ = writeln!(body, "<p>Dear {},</p>", encode_text(recipient));
    for paragraph in &parts.paragraphs {
        let _ = writeln!(body, "<p>{}</p>", encode_text(paragraph));
    }
    if let Some(context) = input.context.map(str::trim).filter(|c| !c.is_empty()) {
        let _ = writeln!(body, "<p>{}</p>", encode_text(context));
    }
    let _ = writeln!(
        body,
        "<p>Best regards,<br>{}</p>",
        encode_text(input.sender)
    );
    body.push_str("</div>\n</body>\n</html>\n");
    body
}

fn payment_reminder(facts: &EmailFacts) -> Parts {
    let invoice = facts.invoice();
    let amount = facts.amount_due();
    Parts {
        subject: format!("Payment reminder: invoice {invoice}"),
        preview_text: format!("A balance of {amount} is due on invoice {invoice}."),
        heading: "Payment Reminder".to_string(),
        paragraphs: vec![
            format!(
                "This is a friendly reminder that invoice {invoice} for {amount} was due on {}. \
                 Our records show it is now {} days past due.",
                facts.due_date(),
                facts.days_overdue()
            ),
            "If you have already sent payment, please disregard this message. Otherwise we \
             would appreciate settlement at your earliest convenience."
                .to_string(),
            "If you have any questions about this invoice, just reply to this email and we \
             will be glad to help."
                .to_string(),
        ],
    }
}

fn product_recommendation(facts: &EmailFacts) -> Parts {
    let products = facts.products();
    Parts {
        subject: "Picked for you: products we think you'll like".to_string(),
        preview_text: format!("Based on your recent orders, take a look at {products}."),
        heading: "Recommended For You".to_string(),
        paragraphs: vec![
            format!(
                "Thank you for your continued business with us. Based on your purchase \
                 history, we think you would benefit from {products}."
            ),
            "These items are popular with customers like you and are ready to ship today."
                .to_string(),
            "Reply to this email and we will put together a quote tailored to your needs."
                .to_string(),
        ],
    }
}

fn appreciation(facts: &EmailFacts) -> Parts {
    Parts {
        subject: "Thank you for your business".to_string(),
        preview_text: "We truly appreciate your partnership.".to_string(),
        heading: "Thank You".to_string(),
        paragraphs: vec![
            format!(
                "We wanted to take a moment to thank you for your loyalty. Across {} orders \
                 totalling {}, you have been a valued partner.",
                facts.order_count(),
                facts.total_spent()
            ),
            "Customers like you make what we do possible, and we look forward to serving \
             you for many years to come."
                .to_string(),
        ],
    }
}

fn follow_up(facts: &EmailFacts) -> Parts {
    Parts {
        subject: "How is everything with your recent order?".to_string(),
        preview_text: "We'd love to hear how your recent purchase is working out.".to_string(),
        heading: "Just Checking In".to_string(),
        paragraphs: vec![
            format!(
                "We hope everything arrived in good order since your last purchase on {}.",
                facts.last_purchase()
            ),
            "If you have any feedback, questions, or need help with anything at all, we are \
             only an email away."
                .to_string(),
        ],
    }
}

fn seasonal_promotion(facts: &EmailFacts) -> Parts {
    let season = facts.season();
    let code = facts.discount_code();
    Parts {
        subject: format!("Special offers for {season}"),
        preview_text: format!("Save on {} this {season}.", facts.products()),
        heading: "Seasonal Savings".to_string(),
        paragraphs: vec![
            format!(
                "To celebrate {season}, we are offering special pricing on {}.",
                facts.products()
            ),
            format!("Use promotion code {code} when you place your next order."),
            "Offers are available for a limited time, so don't miss out.".to_string(),
        ],
    }
}

fn order_confirmation(facts: &EmailFacts) -> Parts {
    let order = facts.order();
    Parts {
        subject: format!("Order {order} confirmed"),
        preview_text: format!("Thanks for your order of {}.", facts.order_total()),
        heading: "Order Confirmation".to_string(),
        paragraphs: vec![
            format!(
                "Thank you for your order {order} placed on {}. We have received {} items \
                 totalling {}.",
                facts.order_date(),
                facts.item_count(),
                facts.order_total()
            ),
            "We will send you another email as soon as your order ships.".to_string(),
        ],
    }
}

fn welcome(facts: &EmailFacts) -> Parts {
    Parts {
        subject: "Welcome aboard!".to_string(),
        preview_text: "We're delighted to have you as a customer.".to_string(),
        heading: "Welcome".to_string(),
        paragraphs: vec![
            "Thank you for choosing us. We are excited to start working with you.".to_string(),
            format!(
                "To get started, take a look at {}. Your account team is ready to help with \
                 anything you need.",
                facts.products()
            ),
        ],
    }
}

fn win_back(facts: &EmailFacts) -> Parts {
    Parts {
        subject: "We miss you".to_string(),
        preview_text: "It's been a while. Here's what's new.".to_string(),
        heading: "It's Been a While".to_string(),
        paragraphs: vec![
            format!(
                "We noticed your last order with us was on {}, and we would love to welcome \
                 you back.",
                facts.last_purchase()
            ),
            format!(
                "Since then we have added new items, including {}. Use code {} on your next \
                 order.",
                facts.products(),
                facts.discount_code()
            ),
        ],
    }
}
