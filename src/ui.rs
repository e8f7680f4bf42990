//! Terminal presentation for a run, rendered via `indicatif`.
//!
//! One spinner tracks the phase currently waiting on the model; banners
//! and phase outputs are printed above it. Everything here is
//! observational — the chain never reads back anything the UI shows.

use chrono::Local;
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::scenario::{Phase, Scenario};
use crate::transcript::RunReport;

const BANNER_WIDTH: usize = 80;

pub struct RunUi {
    multi: MultiProgress,
    spinner: ProgressBar,
}

impl RunUi {
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let spinner_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");

        let spinner = multi.add(ProgressBar::new_spinner());
        spinner.set_style(spinner_style);
        spinner.set_prefix("Phase");

        Self { multi, spinner }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if
    /// the rich UI fails, so output is never silently lost.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    fn rule(&self) {
        self.print_line("=".repeat(BANNER_WIDTH));
    }

    /// Opening banner: scenario, topic, model, start time.
    pub fn banner(&self, scenario: &Scenario, topic: Option<&str>, model: &str) {
        self.rule();
        self.print_line(format!(
            "{}",
            style(format!("{} WORKFLOW", scenario.name.to_uppercase())).bold()
        ));
        self.rule();
        if let Some(topic) = topic {
            self.print_line(format!("Topic: {topic}"));
        }
        self.print_line(format!(
            "Start Time: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        self.print_line(format!("Model: {model}"));
        self.print_line("");
    }

    /// Announce a phase and start the spinner while the request is in
    /// flight.
    pub fn start_phase(&self, index: usize, total: usize, phase: &Phase) {
        self.spinner.set_message(format!(
            "{}/{} {} {}",
            style(index).cyan(),
            total,
            style(&phase.name).yellow(),
            style(format!("[{} is working...]", phase.agent)).dim()
        ));
        self.spinner.enable_steady_tick(Duration::from_millis(100));
    }

    /// Surface a completed phase's output immediately.
    pub fn phase_output(&self, phase: &Phase, text: &str) {
        self.spinner.disable_steady_tick();
        self.print_line("");
        self.print_line(format!(
            "{}",
            style(format!("[{} Output]", phase.agent)).green().bold()
        ));
        self.print_line(text);
    }

    /// Closing summary: agents in order plus where the transcript went.
    pub fn finish(&self, report: &RunReport, transcript: &Path) {
        self.spinner.finish_and_clear();
        self.print_line("");
        self.rule();
        self.print_line(format!("{}", style("FINAL SUMMARY").bold()));
        self.rule();
        self.print_line(format!(
            "{} phases completed for {}:",
            report.phase_count(),
            report.scenario_name
        ));
        for (i, (agent, phase)) in report.summary().iter().enumerate() {
            self.print_line(format!("{}. {agent} - {phase}", i + 1));
        }
        self.print_line("");
        self.print_line(format!(
            "Full results saved to: {}",
            style(transcript.display()).cyan()
        ));
    }

    /// Stop the spinner after a failed run. Outputs of phases that
    /// completed before the failure stay on screen.
    pub fn abort(&self) {
        self.spinner.finish_and_clear();
        self.print_line(format!(
            "{}",
            style("Workflow aborted before completion.").red().bold()
        ));
    }
}

impl Default for RunUi {
    fn default() -> Self {
        Self::new()
    }
}
