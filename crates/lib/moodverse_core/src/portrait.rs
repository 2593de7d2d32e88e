//! Portrait generation pipeline: prompt → upstream → normalise.

use crate::error::PortraitResult;
use crate::normalize::normalize;
use crate::prompt::build_prompt;
use crate::upstream::CompletionClient;
use crate::validation::SanitizedPortrait;

/// Parsed reading returned by the model.
///
/// The prompt asks for `portrait_title`, three `soul_color_*` hex colours,
/// `mood_summary`, `inner_weather`, `energy_description`, `insight`,
/// `affirmation`, `mood_chips` and `canvas_style`, but whatever JSON the
/// model produced is relayed unchanged.
pub type PortraitReading = serde_json::Value;

/// Generate a reading for an already validated submission.
pub async fn generate_portrait(
    client: &dyn CompletionClient,
    portrait: &SanitizedPortrait,
) -> PortraitResult<PortraitReading> {
    let prompt = build_prompt(portrait);
    let response = client.complete(&prompt).await?;
    normalize(&response)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::PortraitError;
    use crate::upstream::UpstreamResponse;
    use crate::upstream::anthropic::{ContentBlock, MessagesResponse};

    struct Recording {
        reply: &'static str,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionClient for Recording {
        async fn complete(&self, prompt: &str) -> PortraitResult<UpstreamResponse> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(UpstreamResponse::Messages(MessagesResponse {
                content: vec![ContentBlock::text(self.reply)],
            }))
        }
    }

    struct Failing;

    #[async_trait]
    impl CompletionClient for Failing {
        async fn complete(&self, _prompt: &str) -> PortraitResult<UpstreamResponse> {
            Err(PortraitError::Upstream {
                status: Some(529),
                detail: "Overloaded".into(),
            })
        }
    }

    fn portrait() -> SanitizedPortrait {
        SanitizedPortrait {
            mood: "restless".into(),
            energy: 4,
            tags: String::new(),
            journal: "hi".into(),
        }
    }

    #[tokio::test]
    async fn sends_rendered_prompt_and_parses_reply() {
        let client = Recording {
            reply: "```json{\"portrait_title\":\"Quiet Ember\"}```",
            prompts: Mutex::new(Vec::new()),
        };
        let reading = generate_portrait(&client, &portrait()).await.unwrap();
        assert_eq!(reading, json!({"portrait_title": "Quiet Ember"}));

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], build_prompt(&portrait()));
    }

    #[tokio::test]
    async fn upstream_failure_is_propagated() {
        let err = generate_portrait(&Failing, &portrait()).await.unwrap_err();
        assert!(matches!(err, PortraitError::Upstream { status: Some(529), .. }));
    }
}
