//! Metrics computation over the Entity Store
//!
//! Implements the deterministic scoring formula that turns accumulated
//! evidence into two scores on a 0 to 100 scale:
//!
//! 1. **Uncertainty level**: how much of the framing is unconfirmed and how
//!    many blocking gaps remain open (0 = fully evidenced, 100 = maximally
//!    uncertain)
//! 2. **Reasoning quality**: how many analytical stages hold solid evidence,
//!    discounted by uncertainty
//!
//! Both are pure functions of the store and the configuration.

use crate::entity::EntityKind;
use crate::evidence::EntityStore;
use serde::{Deserialize, Serialize};

/// Number of analytical stages that accumulate evidence
pub const ANALYTICAL_STAGES: usize = 6;

/// Default weight of context uncertainty in the uncertainty level
pub const CONTEXT_WEIGHT: f64 = 0.6;

/// Default weight of open missing elements in the uncertainty level
pub const MISSING_WEIGHT: f64 = 0.4;

/// Default half-saturation point for open missing elements
pub const MISSING_SATURATION: f64 = 3.0;

/// Default share of the uncertainty level subtracted from quality
pub const UNCERTAINTY_PENALTY: f64 = 0.5;

/// Tunable constants for metrics computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the context component in the uncertainty level
    pub context_weight: f64,
    /// Weight of the missing-element component in the uncertainty level
    pub missing_weight: f64,
    /// Number of open missing elements at which their component reaches 0.5
    pub missing_saturation: f64,
    /// Fraction of the uncertainty level that discounts reasoning quality [0.0, 1.0]
    pub uncertainty_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            context_weight: CONTEXT_WEIGHT,
            missing_weight: MISSING_WEIGHT,
            missing_saturation: MISSING_SATURATION,
            uncertainty_penalty: UNCERTAINTY_PENALTY,
        }
    }
}

impl ScoringConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("context_weight", self.context_weight),
            ("missing_weight", self.missing_weight),
            ("missing_saturation", self.missing_saturation),
            ("uncertainty_penalty", self.uncertainty_penalty),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(format!("{} must be a finite number", name));
        }
        if self.context_weight < 0.0 || self.missing_weight < 0.0 {
            return Err("uncertainty weights must be non-negative".to_string());
        }
        if self.context_weight + self.missing_weight <= 0.0 {
            return Err("uncertainty weights must not both be zero".to_string());
        }
        if self.missing_saturation <= 0.0 {
            return Err("missing_saturation must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.uncertainty_penalty) {
            return Err("uncertainty_penalty must be within [0.0, 1.0]".to_string());
        }
        Ok(())
    }
}

/// Scores computed from a workspace's evidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceMetrics {
    /// 0 means fully evidenced, 100 maximally uncertain
    pub uncertainty_level: f64,
    /// 0 means nothing evidenced, 100 every stage solidly evidenced with no uncertainty
    pub reasoning_quality: f64,
}

/// Per-stage view of the evidence used by the quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageCoverage {
    /// Stages with any entity or marker
    pub attempted: usize,
    /// Stages with solid evidence
    pub evidenced: usize,
}

/// Compute workspace metrics from the evidence
///
/// # Arguments
/// * `evidence` - The workspace's Entity Store
/// * `config` - Scoring weights
pub fn compute_metrics(evidence: &EntityStore, config: &ScoringConfig) -> WorkspaceMetrics {
    let uncertainty_level = compute_uncertainty(evidence, config);

    let coverage = stage_coverage(evidence);
    let coverage_score = coverage_score(coverage);
    let discount = 1.0 - config.uncertainty_penalty * (uncertainty_level / 100.0);
    let reasoning_quality = (100.0 * coverage_score * discount).clamp(0.0, 100.0);

    WorkspaceMetrics {
        uncertainty_level,
        reasoning_quality,
    }
}

/// Uncertainty level on a 0 to 100 scale
fn compute_uncertainty(evidence: &EntityStore, config: &ScoringConfig) -> f64 {
    let total_weight = config.context_weight + config.missing_weight;
    if total_weight <= 0.0 {
        return 0.0;
    }

    let context = context_uncertainty(evidence);
    let missing = missing_uncertainty(evidence, config.missing_saturation);

    let weighted =
        (config.context_weight * context + config.missing_weight * missing) / total_weight;
    (100.0 * weighted).clamp(0.0, 100.0)
}

/// Mean certainty weight of the hypotheses; 1.0 while no framing exists
fn context_uncertainty(evidence: &EntityStore) -> f64 {
    let contexts = evidence.contexts();
    if contexts.is_empty() {
        return 1.0;
    }

    let sum: f64 = contexts.iter().map(|c| c.certainty.uncertainty_weight()).sum();
    sum / contexts.len() as f64
}

/// Saturating share of open missing elements: u / (u + k)
fn missing_uncertainty(evidence: &EntityStore, saturation: f64) -> f64 {
    let open = evidence.unresolved_missing().count() as f64;
    if open == 0.0 || saturation <= 0.0 {
        return 0.0;
    }
    open / (open + saturation)
}

/// Count attempted and evidenced analytical stages
pub fn stage_coverage(evidence: &EntityStore) -> StageCoverage {
    let stages = [
        // Facts: any fact is solid evidence
        (evidence.count(EntityKind::Fact) > 0, evidence.count(EntityKind::Fact) > 0),
        // Context: only a confirmed framing counts as evidence
        (
            evidence.count(EntityKind::Context) > 0,
            evidence.confirmed_contexts().next().is_some(),
        ),
        (evidence.obligations_settled(), evidence.obligations_settled()),
        (evidence.missing_evaluated(), evidence.missing_evaluated()),
        (evidence.risks_settled(), evidence.risks_settled()),
        (
            evidence.count(EntityKind::ProposedAction) > 0,
            evidence.count(EntityKind::ProposedAction) > 0,
        ),
    ];

    stages
        .iter()
        .fold(StageCoverage::default(), |mut acc, (attempted, evidenced)| {
            if *attempted {
                acc.attempted += 1;
            }
            if *evidenced {
                acc.evidenced += 1;
            }
            acc
        })
}

/// Blend of precision (evidenced / attempted) and breadth (evidenced / all stages)
fn coverage_score(coverage: StageCoverage) -> f64 {
    if coverage.attempted == 0 {
        return 0.0;
    }
    let precision = coverage.evidenced as f64 / coverage.attempted as f64;
    let breadth = coverage.evidenced as f64 / ANALYTICAL_STAGES as f64;
    0.5 * precision + 0.5 * breadth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{
        CertaintyLevel, ContextHypothesis, ContextType, Fact, FactSource, MissingElement,
        Obligation, Origin, ProposedAction, Risk, RiskSeverity,
    };
    use crate::evidence::EvidenceMarker;

    fn hypothesis(certainty: CertaintyLevel) -> ContextHypothesis {
        ContextHypothesis::new(
            ContextType::Legal,
            certainty,
            "Unfair dismissal claim",
            "Employee contests termination",
            Origin::Ai,
        )
    }

    fn fact() -> Fact {
        Fact::new("employer", "ACME SAS", FactSource::ExplicitMessage, Origin::Ai)
    }

    #[test]
    fn test_empty_store() {
        let metrics = compute_metrics(&EntityStore::new(), &ScoringConfig::default());

        // No framing yet: context component is 1.0, no missing elements
        assert!((metrics.uncertainty_level - 60.0).abs() < 1e-9);
        assert_eq!(metrics.reasoning_quality, 0.0);
    }

    #[test]
    fn test_confirmed_context_lowers_uncertainty() {
        let config = ScoringConfig::default();

        let mut possible = EntityStore::new();
        possible.add(fact().into());
        possible.add(hypothesis(CertaintyLevel::Possible).into());

        let mut confirmed = EntityStore::new();
        confirmed.add(fact().into());
        confirmed.add(hypothesis(CertaintyLevel::Confirmed).into());

        let m_possible = compute_metrics(&possible, &config);
        let m_confirmed = compute_metrics(&confirmed, &config);

        assert!(m_confirmed.uncertainty_level < m_possible.uncertainty_level);
        assert!(m_confirmed.reasoning_quality > m_possible.reasoning_quality);
        assert_eq!(m_confirmed.uncertainty_level, 0.0);
    }

    #[test]
    fn test_missing_elements_raise_uncertainty() {
        let config = ScoringConfig::default();
        let mut store = EntityStore::new();
        store.add(hypothesis(CertaintyLevel::Confirmed).into());
        let base = compute_metrics(&store, &config).uncertainty_level;

        let missing = MissingElement::new("Payslips", "Needed to compute damages", Origin::Ai);
        let missing_id = missing.id;
        store.add(missing.into());
        let with_missing = compute_metrics(&store, &config).uncertainty_level;

        // One open element out of saturation 3: 0.4 * 0.25 = 10 points
        assert!((with_missing - base - 10.0).abs() < 1e-9);

        store.add_marker(EvidenceMarker::MissingElementResolved(missing_id));
        let resolved = compute_metrics(&store, &config).uncertainty_level;
        assert_eq!(resolved, base);
    }

    #[test]
    fn test_stage_coverage_counts() {
        let mut store = EntityStore::new();
        store.add(fact().into());
        store.add(hypothesis(CertaintyLevel::Possible).into());
        store.add_marker(EvidenceMarker::NoObligations);

        let coverage = stage_coverage(&store);
        assert_eq!(coverage.attempted, 3);
        // The unconfirmed framing is attempted but not evidenced
        assert_eq!(coverage.evidenced, 2);
    }

    #[test]
    fn test_full_pipeline_quality() {
        let mut store = EntityStore::new();
        store.add(fact().into());
        store.add(hypothesis(CertaintyLevel::Confirmed).into());
        store.add(Obligation::new("Pay severance", "Labour code L1234-9", Origin::Ai).into());
        store.add_marker(EvidenceMarker::MissingElementsEvaluated);
        store.add(Risk::new("Procedural delay", RiskSeverity::Low, Origin::Ai).into());
        store.add(ProposedAction::new("Draft reply", "Deadline in 15 days", Origin::Ai).into());

        let metrics = compute_metrics(&store, &ScoringConfig::default());
        assert_eq!(metrics.uncertainty_level, 0.0);
        assert!((metrics.reasoning_quality - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_config_validation() {
        assert!(ScoringConfig::default().validate().is_ok());

        let config = ScoringConfig {
            uncertainty_penalty: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ScoringConfig {
            context_weight: 0.0,
            missing_weight: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_non_finite() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let config = ScoringConfig {
                context_weight: value,
                ..Default::default()
            };
            assert!(config.validate().is_err());

            let config = ScoringConfig {
                uncertainty_penalty: value,
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }
}
