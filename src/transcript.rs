//! Run report assembly and transcript persistence.
//!
//! The report is the runner's final product: scenario name, model,
//! topic, and every phase's output in scenario order. The writer turns
//! it into a human-readable text file with a per-run unique name; the
//! file is an output sink only and is never read back.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scenario::{Scenario, ScenarioKind};
use crate::workflow::RunContext;

const RULE_HEAVY: &str =
    "================================================================================";
const RULE_LIGHT: &str =
    "--------------------------------------------------------------------------------";

/// One phase's contribution to the report, in scenario order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub phase: String,
    pub agent: String,
    pub key: String,
    pub output: String,
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub scenario_name: String,
    pub model: String,
    pub topic: Option<String>,
    pub generated_at: DateTime<Local>,
    pub entries: Vec<ReportEntry>,
}

impl RunReport {
    pub fn new(scenario: &Scenario, model: &str, ctx: &RunContext) -> Self {
        let entries = scenario
            .phases
            .iter()
            .map(|phase| ReportEntry {
                phase: phase.name.clone(),
                agent: phase.agent.clone(),
                key: phase.key(),
                output: ctx.output(&phase.key()).unwrap_or_default().to_string(),
            })
            .collect();

        Self {
            scenario_name: scenario.name.clone(),
            model: model.to_string(),
            topic: ctx.topic().map(str::to_string),
            generated_at: Local::now(),
            entries,
        }
    }

    pub fn phase_count(&self) -> usize {
        self.entries.len()
    }

    /// Ordered (agent, phase) pairs — the run summary.
    pub fn summary(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.agent.as_str(), e.phase.as_str()))
            .collect()
    }

    /// The output mapping, keyed by normalized phase key.
    pub fn outputs(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.output.as_str()))
            .collect()
    }

    /// Render the full human-readable transcript.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(RULE_HEAVY);
        out.push('\n');
        out.push_str(&format!(
            "{} - FULL RESULTS\n",
            self.scenario_name.to_uppercase()
        ));
        out.push_str(RULE_HEAVY);
        out.push('\n');
        out.push_str(&format!(
            "Generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("Model: {}\n", self.model));
        if let Some(topic) = &self.topic {
            out.push_str(&format!("Topic: {topic}\n"));
        }
        out.push('\n');

        for (i, entry) in self.entries.iter().enumerate() {
            out.push('\n');
            out.push_str(RULE_LIGHT);
            out.push('\n');
            out.push_str(&format!("PHASE {}: {}\n", i + 1, entry.phase.to_uppercase()));
            out.push_str(RULE_LIGHT);
            out.push('\n');
            out.push_str(&entry.output);
            out.push('\n');
        }

        out
    }
}

/// Writes transcripts into a target directory, one uniquely named file
/// per run. Existing files are never overwritten.
#[derive(Debug, Clone)]
pub struct TranscriptWriter {
    dir: PathBuf,
}

impl TranscriptWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write(&self, kind: ScenarioKind, report: &RunReport) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create output directory: {}", self.dir.display())
        })?;

        let path = self.unique_path(kind, report);
        std::fs::write(&path, report.render())
            .with_context(|| format!("Failed to write transcript: {}", path.display()))?;
        Ok(path)
    }

    fn unique_path(&self, kind: ScenarioKind, report: &RunReport) -> PathBuf {
        let stamp = report.generated_at.format("%Y%m%d_%H%M%S");
        let base = format!("planchain_{}_{stamp}", kind.id());
        let mut path = self.dir.join(format!("{base}.txt"));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{base}_{n}.txt"));
            n += 1;
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::builtin_scenario;
    use tempfile::tempdir;

    fn sample_report(topic: Option<&str>) -> RunReport {
        let scenario = builtin_scenario(ScenarioKind::Marketing);
        let mut ctx = RunContext::new(topic);
        for (i, phase) in scenario.phases.iter().enumerate() {
            ctx.store(phase.key(), format!("output {}", i + 1));
        }
        RunReport::new(&scenario, "test-model", &ctx)
    }

    #[test]
    fn report_keeps_entries_in_scenario_order() {
        let report = sample_report(None);
        assert_eq!(report.phase_count(), 4);
        assert_eq!(
            report.summary(),
            vec![
                ("Market Analyst", "Market Analysis"),
                ("Marketing Strategist", "Strategy Development"),
                ("Marketing Tactician", "Tactical Planning"),
                ("Marketing Analyst", "Success Metrics"),
            ]
        );
        assert_eq!(
            report.outputs().get("market_analysis").copied(),
            Some("output 1")
        );
    }

    #[test]
    fn render_includes_header_phases_and_outputs_in_order() {
        let report = sample_report(Some("Smart Home Assistant"));
        let text = report.render();

        assert!(text.contains("MARKETING STRATEGY DESIGN - FULL RESULTS"));
        assert!(text.contains("Model: test-model"));
        assert!(text.contains("Topic: Smart Home Assistant"));
        assert!(text.contains("PHASE 1: MARKET ANALYSIS"));
        assert!(text.contains("PHASE 4: SUCCESS METRICS"));

        let p1 = text.find("PHASE 1").unwrap();
        let p4 = text.find("PHASE 4").unwrap();
        assert!(p1 < p4);
        assert!(text.find("output 1").unwrap() < text.find("output 4").unwrap());
    }

    #[test]
    fn render_omits_topic_line_when_absent() {
        let report = sample_report(None);
        assert!(!report.render().contains("Topic:"));
    }

    #[test]
    fn write_names_file_by_scenario_and_timestamp() {
        let dir = tempdir().unwrap();
        let writer = TranscriptWriter::new(dir.path());
        let report = sample_report(None);

        let path = writer.write(ScenarioKind::Marketing, &report).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("planchain_marketing_"));
        assert!(name.ends_with(".txt"));
        assert!(path.exists());
        assert!(path.starts_with(dir.path()));
    }

    #[test]
    fn write_never_overwrites_an_existing_transcript() {
        let dir = tempdir().unwrap();
        let writer = TranscriptWriter::new(dir.path());
        let report = sample_report(None);

        // Same report twice means identical timestamps; the second file
        // must land at a different path.
        let first = writer.write(ScenarioKind::Marketing, &report).unwrap();
        let second = writer.write(ScenarioKind::Marketing, &report).unwrap();
        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }

    #[test]
    fn write_creates_the_output_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("runs/august");
        let writer = TranscriptWriter::new(&nested);
        let report = sample_report(None);

        let path = writer.write(ScenarioKind::Research, &report).unwrap();
        assert!(path.exists());
        assert!(nested.exists());
    }
}
