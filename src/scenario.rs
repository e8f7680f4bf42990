//! Scenario and phase definitions.
//!
//! This module provides:
//! - `ScenarioKind` — the closed set of scenario identifiers
//! - `Phase` / `Scenario` — one chain step and its ordered container
//! - The built-in scenario table (pure data, fixed at compile time)
//! - `ScenariosFile` — optional JSON override with identical semantics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::errors::ScenarioError;

/// The closed set of scenario identifiers. Parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    Conference,
    Marketing,
    Research,
    Architecture,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Conference,
        ScenarioKind::Marketing,
        ScenarioKind::Research,
        ScenarioKind::Architecture,
    ];

    /// The scenario run when an interactive selection is unrecognized.
    pub const DEFAULT: ScenarioKind = ScenarioKind::Conference;

    pub fn id(&self) -> &'static str {
        match self {
            ScenarioKind::Conference => "conference",
            ScenarioKind::Marketing => "marketing",
            ScenarioKind::Research => "research",
            ScenarioKind::Architecture => "architecture",
        }
    }

    /// One-line description shown in menus and `planchain list`.
    pub fn blurb(&self) -> &'static str {
        match self {
            ScenarioKind::Conference => "Plan a 3-day conference agenda",
            ScenarioKind::Marketing => "Design a marketing strategy for a product",
            ScenarioKind::Research => "Create a research paper outline",
            ScenarioKind::Architecture => "Plan a software architecture",
        }
    }

    /// Example topic shown when prompting interactively.
    pub fn topic_hint(&self) -> &'static str {
        match self {
            ScenarioKind::Conference => "AI & Machine Learning",
            ScenarioKind::Marketing => "Smart Home Assistant",
            ScenarioKind::Research => "Climate Change Impact",
            ScenarioKind::Architecture => "E-commerce Platform",
        }
    }

    fn available() -> String {
        Self::ALL
            .iter()
            .map(|k| k.id())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ScenarioKind {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conference" => Ok(ScenarioKind::Conference),
            "marketing" => Ok(ScenarioKind::Marketing),
            "research" => Ok(ScenarioKind::Research),
            "architecture" => Ok(ScenarioKind::Architecture),
            _ => Err(ScenarioError::Unknown {
                id: s.to_string(),
                available: Self::available(),
            }),
        }
    }
}

/// One step of a scenario: a persona and its fixed instruction prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    /// Display name of the phase (e.g. "Market Analysis")
    pub name: String,
    /// Agent/persona label (e.g. "Market Analyst")
    pub agent: String,
    /// Fixed instruction prompt sent for this phase
    pub prompt: String,
}

impl Phase {
    pub fn new(name: &str, agent: &str, prompt: &str) -> Self {
        Self {
            name: name.to_string(),
            agent: agent.to_string(),
            prompt: prompt.to_string(),
        }
    }

    /// Storage key for this phase's output: lowercase name, spaces
    /// replaced by underscores. Used consistently for writes and reads.
    pub fn key(&self) -> String {
        normalize_key(&self.name)
    }
}

/// A named, fixed sequence of phases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Display name (e.g. "Marketing Strategy Design")
    pub name: String,
    /// Ordered phases; execution never reorders or skips these
    pub phases: Vec<Phase>,
}

/// Normalize a phase name to its storage key. Deterministic and
/// idempotent: lowercase with every space replaced by an underscore.
pub fn normalize_key(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// The built-in definition for one scenario kind.
pub fn builtin_scenario(kind: ScenarioKind) -> Scenario {
    match kind {
        ScenarioKind::Conference => Scenario {
            name: "3-Day Conference Agenda Planning".to_string(),
            phases: vec![
                Phase::new(
                    "Research & Requirements",
                    "Conference Researcher",
                    "You are a conference planning expert. Research and identify key requirements for a 3-day conference including: target audience, main themes, session types, networking opportunities, and logistical needs. Provide a comprehensive overview in 150 words.",
                ),
                Phase::new(
                    "Agenda Structure",
                    "Agenda Designer",
                    "You are an agenda design specialist. Based on the research, create a structured 3-day conference agenda structure including: daily themes, session timing, breaks, keynote slots, and parallel tracks. Provide a day-by-day framework in 150 words.",
                ),
                Phase::new(
                    "Content Planning",
                    "Content Strategist",
                    "You are a content strategist. Based on the agenda structure, plan specific session topics, speaker recommendations, workshop ideas, and interactive activities for each day. Make it engaging and valuable in 150 words.",
                ),
                Phase::new(
                    "Final Review",
                    "Conference Reviewer",
                    "You are a conference quality reviewer. Review the complete conference plan and provide 3 key recommendations for success, potential improvements, and critical success factors. Be concise in 150 words.",
                ),
            ],
        },
        ScenarioKind::Marketing => Scenario {
            name: "Marketing Strategy Design".to_string(),
            phases: vec![
                Phase::new(
                    "Market Analysis",
                    "Market Analyst",
                    "You are a market analyst. Analyze the target market for the product including: customer segments, competitive landscape, market trends, and opportunities. Provide insights in 150 words.",
                ),
                Phase::new(
                    "Strategy Development",
                    "Marketing Strategist",
                    "You are a marketing strategist. Based on the market analysis, develop a comprehensive marketing strategy including: positioning, key messages, target channels, and campaign approach. Be strategic in 150 words.",
                ),
                Phase::new(
                    "Tactical Planning",
                    "Marketing Tactician",
                    "You are a marketing tactician. Based on the strategy, create specific tactical plans including: content types, social media approach, advertising channels, and promotional activities. Be actionable in 150 words.",
                ),
                Phase::new(
                    "Success Metrics",
                    "Marketing Analyst",
                    "You are a marketing analyst. Define success metrics and KPIs for the marketing strategy including: measurement methods, target goals, and evaluation criteria. Be specific in 150 words.",
                ),
            ],
        },
        ScenarioKind::Research => Scenario {
            name: "Research Paper Outline".to_string(),
            phases: vec![
                Phase::new(
                    "Topic Research",
                    "Research Specialist",
                    "You are a research specialist. Research and identify the research topic scope, key questions, existing literature gaps, and significance of the research area. Provide a comprehensive overview in 150 words.",
                ),
                Phase::new(
                    "Outline Structure",
                    "Academic Writer",
                    "You are an academic writer. Based on the research, create a structured research paper outline including: abstract, introduction, literature review, methodology, results, discussion, and conclusion sections. Provide a detailed framework in 150 words.",
                ),
                Phase::new(
                    "Content Planning",
                    "Content Planner",
                    "You are a content planner. Based on the outline, plan specific content for each section including: key points, data requirements, analysis methods, and expected contributions. Be detailed in 150 words.",
                ),
                Phase::new(
                    "Review & Refinement",
                    "Academic Reviewer",
                    "You are an academic reviewer. Review the research paper outline and provide 3 key recommendations for improvement, potential gaps, and academic rigor enhancements. Be constructive in 150 words.",
                ),
            ],
        },
        ScenarioKind::Architecture => Scenario {
            name: "Software Architecture Planning".to_string(),
            phases: vec![
                Phase::new(
                    "Requirements Analysis",
                    "Systems Analyst",
                    "You are a systems analyst. Analyze the software requirements including: functional requirements, non-functional requirements, scalability needs, and technical constraints. Provide a comprehensive analysis in 150 words.",
                ),
                Phase::new(
                    "Architecture Design",
                    "Software Architect",
                    "You are a software architect. Based on the requirements, design the software architecture including: system components, technology stack, architectural patterns, and system interactions. Provide a high-level design in 150 words.",
                ),
                Phase::new(
                    "Technical Planning",
                    "Technical Lead",
                    "You are a technical lead. Based on the architecture, plan technical implementation details including: database design, API structure, security measures, and deployment strategy. Be technical in 150 words.",
                ),
                Phase::new(
                    "Architecture Review",
                    "Architecture Reviewer",
                    "You are an architecture reviewer. Review the software architecture plan and provide 3 key recommendations for improvement, potential risks, and best practices. Be critical in 150 words.",
                ),
            ],
        },
    }
}

/// Optional on-disk scenario definitions. The file maps scenario ids to
/// full scenario definitions; a loaded scenario behaves exactly like the
/// built-in one it replaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenariosFile {
    pub scenarios: BTreeMap<String, Scenario>,
}

impl ScenariosFile {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ScenarioError::DefinitionsRead {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| ScenarioError::DefinitionsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn scenario_for(&self, kind: ScenarioKind, path: &Path) -> Result<Scenario, ScenarioError> {
        self.scenarios
            .get(kind.id())
            .cloned()
            .ok_or_else(|| ScenarioError::NotDefined {
                id: kind.id().to_string(),
                path: path.to_path_buf(),
            })
    }
}

/// Resolve the scenario to run: from a definitions file when one is
/// given, otherwise from the built-in table.
pub fn load_scenario(
    kind: ScenarioKind,
    definitions: Option<&Path>,
) -> Result<Scenario, ScenarioError> {
    match definitions {
        Some(path) => ScenariosFile::load(path)?.scenario_for(kind, path),
        None => Ok(builtin_scenario(kind)),
    }
}
