//! Agent registry
//!
//! Explicit mapping from category to agent, constructed once at startup and
//! passed by reference — no global state, so tests can substitute ports
//! freely. `create` is a pure lookup with no I/O.

use super::variants::{CreativeAgent, GeneralAgent, HistoryAgent, MathAgent, ScienceAgent};
use super::{AgentPorts, RevisingAgent};
use crate::ports::memory_store::MemoryStore;
use crate::ports::model_client::ModelProfile;
use redraft_domain::Category;
use std::sync::Arc;

/// Maps every category to its specialized agent
pub struct AgentRegistry {
    math: Arc<MathAgent>,
    history: Arc<HistoryAgent>,
    science: Arc<ScienceAgent>,
    creative: Arc<CreativeAgent>,
    general: Arc<GeneralAgent>,
}

impl AgentRegistry {
    /// Build the registry with shared ports and a base model profile
    ///
    /// Retrieval-augmented variants share the one memory handle; the
    /// creative variant derives a hotter profile from the base.
    pub fn new(ports: AgentPorts, memory: Arc<dyn MemoryStore>, base: ModelProfile) -> Self {
        Self {
            math: Arc::new(MathAgent::new(ports.clone(), base.clone())),
            history: Arc::new(HistoryAgent::new(
                ports.clone(),
                memory.clone(),
                base.clone(),
            )),
            science: Arc::new(ScienceAgent::new(ports.clone(), memory, base.clone())),
            creative: Arc::new(CreativeAgent::new(ports.clone(), base.clone())),
            general: Arc::new(GeneralAgent::new(ports, base)),
        }
    }

    /// Return the agent for a category
    ///
    /// `Unknown` maps to the general-purpose default; the caller is expected
    /// to log that fallback so a missing specialist stays observable. The
    /// match is exhaustive over [`Category`] so adding a variant without
    /// registering an agent fails to compile.
    pub fn create(&self, category: Category) -> Arc<dyn RevisingAgent> {
        match category {
            Category::Math => self.math.clone(),
            Category::History => self.history.clone(),
            Category::Science => self.science.clone(),
            Category::Creative => self.creative.clone(),
            Category::General => self.general.clone(),
            Category::Unknown => self.general.clone(),
        }
    }

    /// Whether `create(category)` falls back to the default agent
    pub fn is_fallback(&self, category: Category) -> bool {
        matches!(category, Category::Unknown)
    }
}
