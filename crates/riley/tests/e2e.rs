// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete Riley pipeline.
//!
//! Each test creates an isolated TestHarness with temp SQLite and mock
//! collaborators. Tests are independent and order-insensitive.

use std::time::Duration;

use riley_config::RileyConfig;
use riley_core::{Channel, ConversationStatus, Intent, Role, Sentiment, Urgency};
use riley_test_utils::{MockGenerator, TestHarness};
use riley_triage::selector::{CONFIRMATION_REPLY, DEFAULT_REPLY};

// ---- Scripted triage ----

#[tokio::test]
async fn greeting_gets_default_reply() {
    let harness = TestHarness::builder().build().await.unwrap();
    let reply = harness.send("+15550160001", Channel::Sms, "Hi there").await.unwrap();

    assert_eq!(reply.analysis.intent, Intent::General);
    assert_eq!(reply.analysis.urgency, Urgency::Low);
    assert_eq!(reply.analysis.sentiment, Sentiment::Neutral);
    assert!(!reply.analysis.has_question);
    assert_eq!(reply.reply_text, DEFAULT_REPLY);
}

#[tokio::test]
async fn urgent_leak_gets_storm_script_and_escalates() {
    let harness = TestHarness::builder().build().await.unwrap();
    let reply = harness
        .send(
            "+15550160002",
            Channel::Sms,
            "I have an urgent leak, need emergency help today",
        )
        .await
        .unwrap();

    assert_eq!(reply.analysis.urgency, Urgency::High);
    let conversation = harness.conversation(&reply.conversation_id).await.unwrap();
    assert_eq!(
        conversation.metadata["last_template"],
        "special_situations.storm_response"
    );
    assert_eq!(conversation.metadata["escalated"], true);
    assert!(reply.reply_text.contains("30 minutes"));
}

#[tokio::test]
async fn roof_pricing_question_gets_roofing_script() {
    let harness = TestHarness::builder().build().await.unwrap();
    let reply = harness
        .send("+15550160003", Channel::Web, "How much does a new roof cost?")
        .await
        .unwrap();

    // "roof" is a service keyword, and service inquiries outrank pricing.
    assert_eq!(reply.analysis.intent, Intent::ServiceInquiry);
    assert!(reply.analysis.has_question);
    let conversation = harness.conversation(&reply.conversation_id).await.unwrap();
    assert_eq!(conversation.metadata["last_template"], "service_specific.roofing");
}

#[tokio::test]
async fn bare_yes_gets_literal_confirmation() {
    let harness = TestHarness::builder().build().await.unwrap();
    let reply = harness.send("+15550160004", Channel::Sms, "yes").await.unwrap();
    assert_eq!(reply.analysis.intent, Intent::Confirmation);
    assert_eq!(reply.reply_text, CONFIRMATION_REPLY);
}

// ---- Generative replies ----

#[tokio::test]
async fn failing_generator_falls_back_to_scripts() {
    let harness = TestHarness::builder()
        .with_generator(MockGenerator::failing("broken"))
        .build()
        .await
        .unwrap();
    let reply = harness.send("+15550160005", Channel::Sms, "yes").await.unwrap();
    assert_eq!(reply.reply_text, CONFIRMATION_REPLY);
    assert_eq!(harness.generators[0].prompts().await, ["yes"]);
}

#[tokio::test]
async fn second_generator_answers_when_first_fails() {
    let harness = TestHarness::builder()
        .with_generator(MockGenerator::failing("primary"))
        .with_generator(MockGenerator::with_responses(
            "backup",
            vec!["Happy to help with your gutters!".into()],
        ))
        .build()
        .await
        .unwrap();
    let reply = harness
        .send("+15550160006", Channel::Web, "Do you clean gutters?")
        .await
        .unwrap();
    assert_eq!(reply.reply_text, "Happy to help with your gutters!");
    let conversation = harness.conversation(&reply.conversation_id).await.unwrap();
    assert_eq!(conversation.metadata["last_template"], "generated:backup");
}

#[tokio::test]
async fn hanging_generator_times_out_to_scripts() {
    let mut config = RileyConfig::default();
    config.generative.timeout_secs = 1;
    let harness = TestHarness::builder()
        .with_config(config)
        .with_generator(MockGenerator::hanging("slow", Duration::from_secs(600)))
        .build()
        .await
        .unwrap();
    let reply = harness.send("+15550160007", Channel::Sms, "Hi there").await.unwrap();
    assert_eq!(reply.reply_text, DEFAULT_REPLY);
}

// ---- Conversation lifecycle ----

#[tokio::test]
async fn follow_up_messages_share_history() {
    let harness = TestHarness::builder().build().await.unwrap();
    let first = harness.send("+15550160008", Channel::Sms, "Hi there").await.unwrap();
    let second = harness
        .send("+15550160008", Channel::Sms, "Can I book an inspection?")
        .await
        .unwrap();
    assert_eq!(first.conversation_id, second.conversation_id);

    let conversation = harness.conversation(&first.conversation_id).await.unwrap();
    assert_eq!(conversation.messages.len(), 4);
    assert_eq!(conversation.metadata["message_count"], 4);
    assert_eq!(conversation.metadata["last_intent"], "appointment");
}

#[tokio::test]
async fn operator_reply_is_delivered_to_participant() {
    let harness = TestHarness::builder().build().await.unwrap();
    let reply = harness.send("+15550160009", Channel::Sms, "Hi there").await.unwrap();

    let conversation = harness
        .orchestrator
        .post_message(
            &reply.conversation_id,
            "Jordan here, I'll call you at 3pm.",
            Role::Assistant,
        )
        .await
        .unwrap();
    assert_eq!(conversation.messages.len(), 3);

    let sent = harness.delivery.wait_for_sent(1).await;
    assert_eq!(sent[0].destination, "+15550160009");
    assert_eq!(sent[0].body, "Jordan here, I'll call you at 3pm.");
}

#[tokio::test]
async fn resolved_conversation_is_not_reused() {
    let harness = TestHarness::builder().build().await.unwrap();
    let first = harness.send("+15550160010", Channel::Sms, "Hi there").await.unwrap();
    harness
        .orchestrator
        .update_status(&first.conversation_id, ConversationStatus::Resolved)
        .await
        .unwrap();

    let second = harness.send("+15550160010", Channel::Sms, "Hi again").await.unwrap();
    assert_ne!(first.conversation_id, second.conversation_id);
}
