//! The `run` command: scenario resolution, interactive selection, and
//! the chain execution itself.
//!
//! A scenario id given as an argument must be valid — an unknown id is
//! fatal before any completion call. The interactive menu instead falls
//! back to the default scenario on unrecognized input, mirroring how
//! the tool has always behaved when driven by a human at the prompt.

use anyhow::Result;
use console::style;
use dialoguer::Input;
use std::path::Path;
use tracing::info;

use planchain::client::OpenAiClient;
use planchain::config::Settings;
use planchain::scenario::{ScenarioKind, load_scenario};
use planchain::transcript::TranscriptWriter;
use planchain::ui::RunUi;
use planchain::workflow::ChainRunner;

pub async fn cmd_run(
    scenario: Option<&str>,
    topic_words: &[String],
    model: Option<&str>,
    output_dir: &Path,
    definitions: Option<&Path>,
) -> Result<()> {
    // Resolve the scenario before anything else so an unknown id fails
    // with zero completion calls, credentials present or not.
    let (kind, topic) = match scenario {
        Some(id) => (id.parse::<ScenarioKind>()?, topic_words.join(" ")),
        None => interactive_selection()?,
    };
    let scenario = load_scenario(kind, definitions)?;

    let settings = Settings::from_env()?.with_model_override(model);
    info!(scenario = %kind, model = %settings.model, "starting workflow");

    let client = OpenAiClient::new(&settings);
    let runner = ChainRunner::new(&client, &settings);
    let ui = RunUi::new();

    let topic = topic.trim();
    let topic = (!topic.is_empty()).then_some(topic);
    ui.banner(&scenario, topic, &settings.model);

    let report = match runner.run(&scenario, topic, Some(&ui)).await {
        Ok(report) => report,
        Err(err) => {
            ui.abort();
            return Err(err.into());
        }
    };

    let writer = TranscriptWriter::new(output_dir);
    let path = writer.write(kind, &report)?;
    ui.finish(&report, &path);

    Ok(())
}

/// Numbered menu over the four scenarios, then a topic prompt.
///
/// Unrecognized input selects the default scenario with no topic rather
/// than erroring.
fn interactive_selection() -> Result<(ScenarioKind, String)> {
    println!("\n{}", style("Available Scenarios:").bold());
    for (i, kind) in ScenarioKind::ALL.iter().enumerate() {
        println!(
            "{}. {:<13} - {}",
            i + 1,
            style(kind.id()).cyan(),
            kind.blurb()
        );
    }
    println!();

    let choice: String = Input::new()
        .with_prompt("Select scenario (1-4 or name)")
        .allow_empty(true)
        .interact_text()?;

    let Some(kind) = parse_menu_choice(&choice) else {
        println!(
            "{}",
            style(format!(
                "Invalid choice. Using default: {}",
                ScenarioKind::DEFAULT
            ))
            .yellow()
        );
        return Ok((ScenarioKind::DEFAULT, String::new()));
    };

    let topic: String = Input::new()
        .with_prompt(format!("Enter topic (e.g. '{}')", kind.topic_hint()))
        .allow_empty(true)
        .interact_text()?;

    Ok((kind, topic.trim().to_string()))
}

/// Map menu input to a scenario: a digit 1-4 or a scenario name, in any
/// case. `None` means the input was unrecognized.
fn parse_menu_choice(raw: &str) -> Option<ScenarioKind> {
    let trimmed = raw.trim();
    match trimmed {
        "1" => Some(ScenarioKind::Conference),
        "2" => Some(ScenarioKind::Marketing),
        "3" => Some(ScenarioKind::Research),
        "4" => Some(ScenarioKind::Architecture),
        other => other.parse().ok(),
    }
}
