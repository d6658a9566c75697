// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `riley analyze <text>`: show how a message would be triaged.

use std::path::Path;
use std::sync::Arc;

use riley_config::RileyConfig;
use riley_core::{Analysis, CallerContext, RileyError};
use riley_triage::{MessageAnalyzer, ResponseSelector, TemplateTable};
use serde::Serialize;

/// What the scripted pipeline makes of one message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Triage {
    pub analysis: Analysis,
    pub template: String,
    pub reply: String,
}

/// Analyze `text` as the first message of a conversation.
pub fn triage(config: &RileyConfig, text: &str) -> Result<Triage, RileyError> {
    let templates = match &config.templates.file {
        Some(path) => TemplateTable::load(Path::new(path))?,
        None => TemplateTable::builtin(),
    };
    let selector = ResponseSelector::new(Arc::new(templates));
    let analysis = MessageAnalyzer::new().analyze(text);
    let (choice, reply) = selector.respond(&analysis, &CallerContext::default());
    Ok(Triage {
        analysis,
        template: choice.label(),
        reply,
    })
}

pub fn run_analyze(config: &RileyConfig, text: &str) -> Result<(), RileyError> {
    let triage = triage(config, text)?;
    let json = serde_json::to_string_pretty(&triage)
        .map_err(|e| RileyError::Internal(format!("cannot render analysis: {e}")))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use riley_core::{Intent, Urgency};

    #[test]
    fn urgent_leak_gets_storm_script() {
        let result = triage(
            &RileyConfig::default(),
            "I have an urgent leak, need emergency help today",
        )
        .unwrap();
        assert_eq!(result.analysis.urgency, Urgency::High);
        assert_eq!(result.template, "special_situations.storm_response");
        assert!(result.reply.contains("30 minutes"));
    }

    #[test]
    fn greeting_gets_a_reply() {
        let result = triage(&RileyConfig::default(), "Hi there").unwrap();
        assert_eq!(result.analysis.intent, Intent::General);
        assert!(!result.reply.is_empty());
    }

    #[test]
    fn missing_template_file_is_an_error() {
        let mut config = RileyConfig::default();
        config.templates.file = Some("/nonexistent/riley/templates.toml".into());
        assert!(triage(&config, "hello").is_err());
    }
}
