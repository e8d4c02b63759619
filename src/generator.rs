//! Actor response generation.
//!
//! Builds one role-specific prompt per exchange: the role's fixed system
//! prompt, its few-shot exemplars, then a user message carrying the persona
//! directive, the case context, and the closing question. A `None` return
//! means both completion attempts failed (or came back empty) and the caller
//! should substitute its canned line instead.

use std::time::Duration;

use crate::config::{MAX_TOKENS, RETRY_DELAY};
use crate::engine::{Phase, Role, Turn};
use crate::llm::{complete_with_retry, ChatMessage, CompletionClient};
use crate::prompts::{
    format_case_context, DEFENDANT_COUNSEL_FEW_SHOT, DEFENDANT_COUNSEL_SYSTEM_PROMPT,
    JUDGE_FEW_SHOT, JUDGE_SYSTEM_PROMPT, PLAINTIFF_COUNSEL_FEW_SHOT,
    PLAINTIFF_COUNSEL_SYSTEM_PROMPT,
};
use crate::scenario::Scenario;

/// Slightly elevated for dialogue variety.
const DIALOGUE_TEMPERATURE: f32 = 0.7;

pub struct ActorResponseGenerator<C> {
    client: C,
    retry_delay: Duration,
}

impl<C: CompletionClient> ActorResponseGenerator<C> {
    pub fn new(client: C) -> Self {
        ActorResponseGenerator {
            client,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Overrides the backoff between the two completion attempts.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub async fn generate(
        &self,
        role: Role,
        scenario: &Scenario,
        phase: Phase,
        transcript: &[Turn],
    ) -> Option<String> {
        let messages = build_messages(role, scenario, phase, transcript)?;
        complete_with_retry(
            &self.client,
            &messages,
            MAX_TOKENS,
            DIALOGUE_TEMPERATURE,
            self.retry_delay,
        )
        .await
    }
}

fn build_messages(
    role: Role,
    scenario: &Scenario,
    phase: Phase,
    transcript: &[Turn],
) -> Option<Vec<ChatMessage>> {
    let (system, examples, directive, question) = match role {
        Role::Judge => (
            JUDGE_SYSTEM_PROMPT,
            JUDGE_FEW_SHOT,
            scenario.judge_personality.directive(),
            "How would you respond as the judge at this point in the proceedings?",
        ),
        Role::PlaintiffCounsel => (
            PLAINTIFF_COUNSEL_SYSTEM_PROMPT,
            PLAINTIFF_COUNSEL_FEW_SHOT,
            scenario.plaintiff_counsel_strategy.directive(),
            "How would you respond as plaintiff's counsel at this point in the proceedings?",
        ),
        Role::DefendantCounsel => (
            DEFENDANT_COUNSEL_SYSTEM_PROMPT,
            DEFENDANT_COUNSEL_FEW_SHOT,
            scenario.defendant_counsel_strategy.directive(),
            "How would you respond as defendant's counsel at this point in the proceedings?",
        ),
        // The system voice is never generated.
        Role::System => return None,
    };

    let context = format_case_context(scenario, phase, transcript);
    let user_prompt = format!("{directive}\n\n{context}\n{question}");

    let mut messages = Vec::with_capacity(examples.len() + 2);
    messages.push(ChatMessage::system(system));
    for (example_role, content) in examples {
        messages.push(ChatMessage {
            role: example_role.to_string(),
            content: content.to_string(),
        });
    }
    messages.push(ChatMessage::user(user_prompt));
    Some(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};

    struct ScriptedClient {
        reply: String,
    }

    impl CompletionClient for ScriptedClient {
        async fn complete(&self, _: &[ChatMessage], _: u32, _: f32) -> Result<String> {
            Ok(self.reply.clone())
        }
    }

    struct FailingClient;

    impl CompletionClient for FailingClient {
        async fn complete(&self, _: &[ChatMessage], _: u32, _: f32) -> Result<String> {
            Err(anyhow!("transport down"))
        }
    }

    fn scenario() -> Scenario {
        serde_json::from_str(
            r#"{
                "id": "contract-001",
                "title": "Breach of Contract Dispute",
                "case_type": "contract",
                "facts": "Late delivery of components.",
                "judge_personality": "stern",
                "plaintiff_counsel_strategy": "emotional",
                "defendant_counsel_strategy": "technical"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn message_order_is_system_examples_user() {
        let messages =
            build_messages(Role::Judge, &scenario(), Phase::JudgeQuestioning, &[]).unwrap();
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages.last().unwrap().role, "user");
    }

    #[test]
    fn user_prompt_carries_persona_directive() {
        let scenario = scenario();
        let judge = build_messages(Role::Judge, &scenario, Phase::Ruling, &[]).unwrap();
        assert!(judge
            .last()
            .unwrap()
            .content
            .contains("stern, no-nonsense judge"));

        let defendant =
            build_messages(Role::DefendantCounsel, &scenario, Phase::DefendantOpening, &[])
                .unwrap();
        let content = &defendant.last().unwrap().content;
        assert!(content.contains("technically precise"));
        assert!(content.contains("How would you respond as defendant's counsel"));
    }

    #[test]
    fn system_role_is_never_generated() {
        assert!(build_messages(Role::System, &scenario(), Phase::Introduction, &[]).is_none());
    }

    #[tokio::test]
    async fn scripted_reply_passes_through() {
        let generator = ActorResponseGenerator::new(ScriptedClient {
            reply: "<think>posture</think>Objection overruled.".to_string(),
        });
        let out = generator
            .generate(Role::Judge, &scenario(), Phase::JudgeQuestioning, &[])
            .await;
        assert_eq!(out.as_deref(), Some("Objection overruled."));
    }

    #[tokio::test]
    async fn transport_failure_yields_none() {
        let generator =
            ActorResponseGenerator::new(FailingClient).with_retry_delay(Duration::ZERO);
        let out = generator
            .generate(Role::PlaintiffCounsel, &scenario(), Phase::PlaintiffOpening, &[])
            .await;
        assert!(out.is_none());
    }
}
