//! RiskMatrix Core: risk scoring and classification engine.
//!
//! Turns per-cause frequency and impact ratings plus control evaluations into
//! quantified inherent and residual risk:
//!
//! - **Scoring:** inherent score (frequency x impact with the pinned `2x2`
//!   cell), impact aggregation across dimensions, residual score after
//!   mitigation, and the worst-cause aggregation per risk
//! - **Controls:** five weighted criteria, effectiveness tiers, deviation
//!   adjustment, and the tier to mitigation table
//! - **Classification:** `Bajo` / `Medio` / `Alto` / `Crítico` / `Sin Calificar`
//! - **Grid:** placing a scalar score on the 5x5 matrix, tolerance boundaries,
//!   and per-cell level assignments
//! - **Reporting:** inherent vs residual comparison and prioritization scores
//!
//! Every calculation is synchronous and pure; configuration is loaded once
//! with [`load_config`] and passed into [`RiskScoringEngine`].

pub mod classification;
pub mod comparison;
pub mod config;
pub mod control;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod grid;
pub mod impact;
pub mod inherent;
pub mod level_map;
pub mod prioritization;
pub mod residual;
pub mod tolerance;
pub mod types;

// Re-exports for convenience
pub use classification::{RiskClassification, RiskLevel};
pub use comparison::{ComparisonSummary, Direction, HeatMap, RiskComparison, RiskPoint};
pub use config::{EngineConfig, load_config, load_workspace_config};
pub use control::{
    ControlAssessment, ControlEvaluator, ControlInput, DeviationLevel, DeviationRule,
    EffectivenessTier,
};
pub use criteria::{
    Applicability, ControlCriteria, Coverage, CriterionScores, EaseOfUse, Nature, Segregation,
};
pub use engine::{
    CauseEvaluation, CauseInput, CellView, RiskEvaluation, RiskInput, RiskScoringEngine,
};
pub use error::{ConfigError, Result, RiskMatrixError, ScoringError};
pub use grid::{GridCoordinateResolver, Resolution};
pub use impact::{AggregationMode, ImpactAggregator, ImpactDimension, ImpactRatings};
pub use level_map::{LevelDef, MatrixKind, RiskLevelMapConfig};
pub use prioritization::{PrioritizationInput, PrioritizationWeights};
pub use residual::{MitigationMode, ResidualRisk, ResidualRiskCalculator, ResidualRounding};
pub use tolerance::{BoundaryEdges, ToleranceSet};
pub use types::{GRID_SIZE, GridCell, Rating};
