//! Sequential phase execution with forward context accumulation.
//!
//! `ChainRunner` walks a scenario's phases in order. Each phase's
//! outbound message carries the full text of every previously completed
//! phase, so phase i+1 never starts before phase i's response has been
//! stored. A failed completion call aborts the chain with the failing
//! phase attached; there are no retries and no partial continuation.

use tracing::{debug, info};

use crate::client::{ChatMessage, CompletionBackend, CompletionRequest};
use crate::config::Settings;
use crate::errors::{CompletionError, WorkflowError};
use crate::scenario::{Phase, Scenario};
use crate::transcript::RunReport;
use crate::ui::RunUi;
use crate::workflow::RunContext;

pub struct ChainRunner<'a, B> {
    backend: &'a B,
    settings: &'a Settings,
}

impl<'a, B: CompletionBackend> ChainRunner<'a, B> {
    pub fn new(backend: &'a B, settings: &'a Settings) -> Self {
        Self { backend, settings }
    }

    /// Execute the whole chain and assemble the run report.
    pub async fn run(
        &self,
        scenario: &Scenario,
        topic: Option<&str>,
        ui: Option<&RunUi>,
    ) -> Result<RunReport, WorkflowError> {
        let mut ctx = RunContext::new(topic);
        self.run_chain(scenario, &mut ctx, ui).await?;
        Ok(RunReport::new(scenario, &self.settings.model, &ctx))
    }

    /// Execute the chain against a caller-owned context. Outputs of
    /// phases completed before a failure stay in the context.
    pub async fn run_chain(
        &self,
        scenario: &Scenario,
        ctx: &mut RunContext,
        ui: Option<&RunUi>,
    ) -> Result<(), WorkflowError> {
        let total = scenario.phases.len();
        for (i, phase) in scenario.phases.iter().enumerate() {
            let index = i + 1;
            info!(index, phase = %phase.name, agent = %phase.agent, "executing phase");
            if let Some(ui) = ui {
                ui.start_phase(index, total, phase);
            }

            self.execute_phase(index, phase, scenario, ctx)
                .await
                .map_err(|source| WorkflowError::PhaseFailed {
                    index,
                    phase: phase.name.clone(),
                    source,
                })?;

            if let Some(ui) = ui {
                if let Some(text) = ctx.output(&phase.key()) {
                    ui.phase_output(phase, text);
                }
            }
        }
        Ok(())
    }

    async fn execute_phase(
        &self,
        index: usize,
        phase: &Phase,
        scenario: &Scenario,
        ctx: &mut RunContext,
    ) -> Result<(), CompletionError> {
        let user_message = build_user_message(index, phase, scenario, ctx);
        debug!(index, chars = user_message.len(), "built outbound message");

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            messages: vec![
                ChatMessage::system(format!("You are {}. {}", phase.agent, phase.prompt)),
                ChatMessage::user(user_message),
            ],
        };

        let text = self.backend.complete(&request).await?;
        ctx.store(phase.key(), text);
        Ok(())
    }
}

/// Build the user-role message for one phase.
///
/// Starts from the phase prompt; for phases after the first, a
/// `Previous Phase Results:` block with every prior phase's display name
/// and stored output (in scenario order) is prepended; a non-empty topic
/// is prepended before everything else as `Topic/Product: <topic>`.
pub fn build_user_message(
    index: usize,
    phase: &Phase,
    scenario: &Scenario,
    ctx: &RunContext,
) -> String {
    let mut message = phase.prompt.clone();

    if index > 1 {
        let mut context = String::from("\n\nPrevious Phase Results:\n");
        for prev in &scenario.phases[..index - 1] {
            if let Some(output) = ctx.output(&prev.key()) {
                context.push_str(&format!("\n{}:\n{}\n", prev.name, output));
            }
        }
        message = format!("{context}\n{message}");
    }

    if let Some(topic) = ctx.topic() {
        message = format!("Topic/Product: {topic}\n\n{message}");
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ScenarioKind, builtin_scenario};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Test double: replays a fixed script of results and records every
    /// request it receives.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, CompletionError>>>,
        calls: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        fn calls(&self) -> Vec<CompletionRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.calls.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(CompletionError::EmptyResponse))
        }
    }

    fn test_settings() -> Settings {
        Settings {
            api_key: "sk-test".into(),
            api_base: "http://localhost/v1".into(),
            model: "test-model".into(),
            temperature: 0.7,
            max_tokens: 512,
        }
    }

    fn user_content(request: &CompletionRequest) -> &str {
        &request.messages[1].content
    }

    #[tokio::test]
    async fn chain_produces_one_output_per_phase_in_order() {
        let scenario = builtin_scenario(ScenarioKind::Marketing);
        let backend = ScriptedBackend::ok(&["out 1", "out 2", "out 3", "out 4"]);
        let settings = test_settings();
        let runner = ChainRunner::new(&backend, &settings);

        let report = runner.run(&scenario, None, None).await.unwrap();

        assert_eq!(report.entries.len(), 4);
        let keys: Vec<&str> = report.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "market_analysis",
                "strategy_development",
                "tactical_planning",
                "success_metrics",
            ]
        );
        assert_eq!(report.entries[0].output, "out 1");
        assert_eq!(report.entries[3].output, "out 4");
        assert_eq!(backend.calls().len(), 4);
    }

    #[tokio::test]
    async fn first_phase_with_topic_has_exact_message_and_no_prior_context() {
        let scenario = builtin_scenario(ScenarioKind::Marketing);
        let backend = ScriptedBackend::ok(&["a", "b", "c", "d"]);
        let settings = test_settings();
        let runner = ChainRunner::new(&backend, &settings);

        runner
            .run(&scenario, Some("Smart Home Assistant"), None)
            .await
            .unwrap();

        let calls = backend.calls();
        let expected = format!(
            "Topic/Product: Smart Home Assistant\n\n{}",
            scenario.phases[0].prompt
        );
        assert_eq!(user_content(&calls[0]), expected);
        assert!(!user_content(&calls[0]).contains("Previous Phase Results"));
    }

    #[tokio::test]
    async fn later_phases_carry_all_prior_outputs_in_order() {
        let scenario = builtin_scenario(ScenarioKind::Marketing);
        let backend = ScriptedBackend::ok(&["analysis text", "strategy text", "tactics text", "metrics text"]);
        let settings = test_settings();
        let runner = ChainRunner::new(&backend, &settings);

        runner.run(&scenario, Some("Widget"), None).await.unwrap();
        let calls = backend.calls();

        // Phase 2 sees phase 1's output under its display name
        let msg2 = user_content(&calls[1]);
        assert!(msg2.starts_with("Topic/Product: Widget"));
        assert!(msg2.contains("Previous Phase Results:"));
        assert!(msg2.contains("\nMarket Analysis:\nanalysis text\n"));
        assert!(msg2.ends_with(&scenario.phases[1].prompt));

        // Phase 4 sees phases 1..3, in scenario order
        let msg4 = user_content(&calls[3]);
        let p1 = msg4.find("Market Analysis:\nanalysis text").unwrap();
        let p2 = msg4.find("Strategy Development:\nstrategy text").unwrap();
        let p3 = msg4.find("Tactical Planning:\ntactics text").unwrap();
        assert!(p1 < p2 && p2 < p3);
    }

    #[tokio::test]
    async fn without_topic_no_prefix_appears_on_any_message() {
        let scenario = builtin_scenario(ScenarioKind::Research);
        let backend = ScriptedBackend::ok(&["a", "b", "c", "d"]);
        let settings = test_settings();
        let runner = ChainRunner::new(&backend, &settings);

        runner.run(&scenario, None, None).await.unwrap();
        for call in backend.calls() {
            assert!(!user_content(&call).contains("Topic/Product:"));
        }
    }

    #[tokio::test]
    async fn system_message_combines_persona_and_prompt() {
        let scenario = builtin_scenario(ScenarioKind::Conference);
        let backend = ScriptedBackend::ok(&["a", "b", "c", "d"]);
        let settings = test_settings();
        let runner = ChainRunner::new(&backend, &settings);

        runner.run(&scenario, None, None).await.unwrap();
        let calls = backend.calls();
        let system = &calls[0].messages[0].content;
        assert_eq!(
            *system,
            format!(
                "You are {}. {}",
                scenario.phases[0].agent, scenario.phases[0].prompt
            )
        );
    }

    #[tokio::test]
    async fn request_carries_configured_model_and_limits() {
        let scenario = builtin_scenario(ScenarioKind::Architecture);
        let backend = ScriptedBackend::ok(&["a", "b", "c", "d"]);
        let settings = test_settings();
        let runner = ChainRunner::new(&backend, &settings);

        runner.run(&scenario, None, None).await.unwrap();
        for call in backend.calls() {
            assert_eq!(call.model, "test-model");
            assert_eq!(call.max_tokens, 512);
            assert_eq!(call.messages.len(), 2);
        }
    }

    #[tokio::test]
    async fn failure_aborts_the_chain_and_attributes_the_phase() {
        let scenario = builtin_scenario(ScenarioKind::Marketing);
        let backend = ScriptedBackend::new(vec![
            Ok("analysis text".to_string()),
            Err(CompletionError::Status {
                status: 500,
                body: "server error".into(),
            }),
        ]);
        let settings = test_settings();
        let runner = ChainRunner::new(&backend, &settings);

        let mut ctx = RunContext::new(None);
        let err = runner
            .run_chain(&scenario, &mut ctx, None)
            .await
            .unwrap_err();

        let WorkflowError::PhaseFailed { index, phase, .. } = &err;
        assert_eq!(*index, 2);
        assert_eq!(phase, "Strategy Development");

        // Exactly two calls were made; phases 3 and 4 never ran
        assert_eq!(backend.calls().len(), 2);

        // Phase 1's output survives, later keys were never written
        assert_eq!(ctx.output("market_analysis"), Some("analysis text"));
        assert!(!ctx.contains("strategy_development"));
        assert!(!ctx.contains("tactical_planning"));
        assert!(!ctx.contains("success_metrics"));
    }

    #[test]
    fn build_user_message_skips_phases_without_stored_output() {
        // Only phase 1 has completed; building phase 3's message must not
        // invent a block for phase 2.
        let scenario = builtin_scenario(ScenarioKind::Marketing);
        let mut ctx = RunContext::new(None);
        ctx.store("market_analysis", "analysis text");

        let msg = build_user_message(3, &scenario.phases[2], &scenario, &ctx);
        assert!(msg.contains("Market Analysis:\nanalysis text"));
        assert!(!msg.contains("Strategy Development:"));
    }
}
