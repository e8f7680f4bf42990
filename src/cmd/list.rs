//! The `list` command: print the scenario catalog. Touches neither
//! configuration nor the network.

use anyhow::Result;
use console::style;
use std::path::Path;

use planchain::scenario::{ScenarioKind, load_scenario};

pub fn cmd_list(definitions: Option<&Path>) -> Result<()> {
    for kind in ScenarioKind::ALL {
        let scenario = load_scenario(kind, definitions)?;
        println!(
            "{:<13} {}",
            style(kind.id()).cyan().bold(),
            scenario.name
        );
        for (i, phase) in scenario.phases.iter().enumerate() {
            println!(
                "    {}. {:<24} {}",
                i + 1,
                phase.name,
                style(&phase.agent).dim()
            );
        }
        println!();
    }
    Ok(())
}
