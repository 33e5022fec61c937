//! Optimization run configuration supplied by the UI layer.

use serde::{Deserialize, Serialize};
use validator::Validate;

use placement_core::config::WeightingFactors;
use placement_core::types::{DocumentId, LocationId};

use crate::recommendation::OptimizationType;

/// How thoroughly each document is analysed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    /// Best candidate only.
    Quick,
    /// Best candidate plus three alternatives.
    #[default]
    Standard,
    /// Best candidate plus ten alternatives.
    Deep,
}

impl AnalysisDepth {
    /// Number of runner-up candidates attached to each recommendation.
    pub fn alternatives(&self) -> usize {
        match self {
            Self::Quick => 0,
            Self::Standard => 3,
            Self::Deep => 10,
        }
    }
}

/// Which documents and locations a run covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationScope {
    /// Only consider locations in this subtree, and only documents stored in it
    /// (unless `document_ids` names them explicitly).
    #[serde(default)]
    pub subtree_root: Option<LocationId>,
    /// Explicit documents to analyse; all registered documents when absent.
    #[serde(default)]
    pub document_ids: Option<Vec<DocumentId>>,
}

/// Parameters of one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OptimizationConfig {
    /// Run name shown on the dashboard.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Only emit recommendations of this type.
    #[serde(rename = "type", default)]
    pub focus: Option<OptimizationType>,
    /// Documents and locations covered.
    #[serde(default)]
    pub scope: OptimizationScope,
    /// Window, in days, used for the minimum access threshold.
    #[serde(default = "default_time_frame")]
    #[validate(range(min = 1, max = 365))]
    pub time_frame_days: u32,
    /// Number of runner-up candidates reported.
    #[serde(default)]
    pub analysis_depth: AnalysisDepth,
    /// Documents with fewer accesses inside the time frame are skipped.
    #[serde(default)]
    pub min_access_threshold: u64,
    /// Factor weights; the engine's configured defaults apply when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub weighting_factors: Option<WeightingFactors>,
}

impl OptimizationConfig {
    /// A run over everything with the engine's default weights.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            focus: None,
            scope: OptimizationScope::default(),
            time_frame_days: default_time_frame(),
            analysis_depth: AnalysisDepth::default(),
            min_access_threshold: 0,
            weighting_factors: None,
        }
    }

    /// Replace the weighting vector.
    pub fn with_weights(mut self, weights: WeightingFactors) -> Self {
        self.weighting_factors = Some(weights);
        self
    }

    /// Weights for this run, falling back to `defaults` when none were given.
    pub fn weights_or<'a>(&'a self, defaults: &'a WeightingFactors) -> &'a WeightingFactors {
        self.weighting_factors.as_ref().unwrap_or(defaults)
    }

    /// Replace the scope.
    pub fn with_scope(mut self, scope: OptimizationScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the analysis depth.
    pub fn with_depth(mut self, depth: AnalysisDepth) -> Self {
        self.analysis_depth = depth;
        self
    }
}

fn default_time_frame() -> u32 {
    30
}
