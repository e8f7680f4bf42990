//! Per-run accumulation state.

use std::collections::HashMap;

/// State owned by exactly one run of the chain: the optional topic and
/// the outputs of completed phases, keyed by normalized phase key.
///
/// The map is append-only while the run is in progress. An output is
/// stored in one step after the full response has arrived, never
/// incrementally, so a cancelled run leaves no half-written phase.
#[derive(Debug, Default)]
pub struct RunContext {
    topic: Option<String>,
    outputs: HashMap<String, String>,
}

impl RunContext {
    /// An empty or whitespace-only topic is treated as absent.
    pub fn new(topic: Option<&str>) -> Self {
        Self {
            topic: topic
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            outputs: HashMap::new(),
        }
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn store(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.outputs.insert(key.into(), text.into());
    }

    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.outputs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}
