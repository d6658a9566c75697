// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword heuristics for inbound messages.
//!
//! Every check is a substring test against the lower-cased text, so "no"
//! also fires inside "know" and "ok" inside "book". The rule tables are
//! ordered; the first intent or service with a hit wins.

use riley_core::{Analysis, Intent, Sentiment, Service, Urgency};

/// Intent rules in priority order. Anything unmatched is `General`.
pub const INTENT_RULES: &[(Intent, &[&str])] = &[
    (
        Intent::Appointment,
        &[
            "appointment",
            "schedule",
            "book",
            "inspection",
            "estimate",
            "confirm",
            "reschedule",
        ],
    ),
    (
        Intent::ServiceInquiry,
        &["roof", "siding", "window", "gutter", "repair", "replace", "fix"],
    ),
    (
        Intent::Pricing,
        &["price", "cost", "quote", "estimate", "how much", "afford", "payment"],
    ),
    (
        Intent::Emergency,
        &["urgent", "emergency", "leak", "damage", "asap", "immediately", "today"],
    ),
    (
        Intent::Followup,
        &["status", "update", "when", "follow up", "check", "progress"],
    ),
    (
        Intent::Complaint,
        &["unhappy", "problem", "issue", "wrong", "mistake", "bad"],
    ),
    (
        Intent::Confirmation,
        &["yes", "confirm", "agree", "ok", "sure", "sounds good"],
    ),
    (
        Intent::Cancellation,
        &["cancel", "stop", "no", "not interested", "remove"],
    ),
];

/// Service rules in priority order. Anything unmatched has no service.
pub const SERVICE_RULES: &[(Service, &[&str])] = &[
    (
        Service::Roofing,
        &["roof", "shingle", "tile", "flat roof", "metal roof"],
    ),
    (
        Service::Siding,
        &["siding", "vinyl", "hardie", "wood siding", "fiber cement"],
    ),
    (
        Service::Windows,
        &["window", "glass", "double pane", "replacement window"],
    ),
    (
        Service::Gutters,
        &["gutter", "downspout", "drainage", "leaf guard"],
    ),
];

const URGENT_WORDS: &[&str] = &[
    "urgent",
    "emergency",
    "asap",
    "immediately",
    "today",
    "leak",
    "damage",
    "storm",
];

const POSITIVE_WORDS: &[&str] = &[
    "yes",
    "great",
    "good",
    "perfect",
    "excellent",
    "thanks",
    "appreciate",
    "happy",
];

const NEGATIVE_WORDS: &[&str] = &[
    "no",
    "bad",
    "terrible",
    "angry",
    "upset",
    "disappointed",
    "unhappy",
    "problem",
];

const QUESTION_WORDS: &[&str] = &[
    "how", "what", "when", "where", "why", "can", "could", "would", "should",
];

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "and", "a", "an", "as", "are", "was", "were",
];

/// Stateless keyword analyzer. Total over all inputs, including empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageAnalyzer;

impl MessageAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one message.
    pub fn analyze(&self, text: &str) -> Analysis {
        let lower = text.to_lowercase();
        Analysis {
            intent: Self::intent(&lower),
            sentiment: Self::sentiment(&lower),
            urgency: Self::urgency(&lower),
            service: Self::service(&lower),
            keywords: Self::keywords(&lower),
            has_question: Self::has_question(&lower),
        }
    }

    fn intent(lower: &str) -> Intent {
        first_hit(lower, INTENT_RULES).unwrap_or(Intent::General)
    }

    fn service(lower: &str) -> Option<Service> {
        first_hit(lower, SERVICE_RULES)
    }

    fn urgency(lower: &str) -> Urgency {
        match count_hits(lower, URGENT_WORDS) {
            0 => Urgency::Low,
            1 => Urgency::Medium,
            _ => Urgency::High,
        }
    }

    fn sentiment(lower: &str) -> Sentiment {
        let positive = count_hits(lower, POSITIVE_WORDS);
        let negative = count_hits(lower, NEGATIVE_WORDS);
        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }

    fn has_question(lower: &str) -> bool {
        lower.contains('?')
            || QUESTION_WORDS
                .iter()
                .any(|w| lower.starts_with(w) || lower.contains(&format!(" {w} ")))
    }

    fn keywords(lower: &str) -> Vec<String> {
        lower
            .split_whitespace()
            .filter(|word| word.chars().count() > 2 && !STOP_WORDS.contains(word))
            .map(str::to_string)
            .collect()
    }
}

fn first_hit<T: Copy>(lower: &str, rules: &[(T, &[&str])]) -> Option<T> {
    rules
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(outcome, _)| *outcome)
}

/// Number of distinct list entries present in the text.
fn count_hits(lower: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| lower.contains(*w)).count()
}
