//! Solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FacilityError, Result};

/// Correction applied to the "sum of other incoming messages" terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    /// Ordinary min-sum.
    #[default]
    Plain,
    /// Sums scaled by `1/(F − 1)`. Needs as many cities as facilities.
    Attenuated,
    /// [`Variant::Attenuated`] plus per-facility decimation biases.
    DecimatedAttenuated,
    /// Sums reweighted by spanning-tree appearance probabilities.
    TreeReweighted,
}

/// Which city/facility pairs carry messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Layout {
    /// Every pair, infeasible ones included.
    #[default]
    Dense,
    /// Only pairs at finite distance.
    Sparse,
}

/// Where the tree-reweighting probabilities come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RhoSource {
    /// Closed form for the complete bipartite graph.
    #[default]
    Uniform,
    /// Monte-Carlo estimate from uniform spanning trees.
    Sampled,
}

/// Tree-reweighting settings. Ignored by the other variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhoConfig {
    pub source: RhoSource,
    /// Minimum number of spanning trees to draw.
    pub min_tree_count: usize,
    /// Give up after this many trees if some edge was never drawn.
    pub max_tree_count: usize,
    /// Sampler seed.
    pub seed: u64,
}

impl Default for RhoConfig {
    fn default() -> Self {
        Self {
            source: RhoSource::Uniform,
            min_tree_count: 100,
            max_tree_count: 100_000,
            seed: 42,
        }
    }
}

impl RhoConfig {
    pub fn with_source(mut self, source: RhoSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_min_tree_count(mut self, n: usize) -> Self {
        self.min_tree_count = n;
        self
    }

    pub fn with_max_tree_count(mut self, n: usize) -> Self {
        self.max_tree_count = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Configuration for [`BipartiteMinSum`](super::BipartiteMinSum).
///
/// # Examples
///
/// ```
/// use u_facility::minsum::{Layout, MinSumConfig, Variant};
///
/// let config = MinSumConfig::default()
///     .with_variant(Variant::Attenuated)
///     .with_layout(Layout::Sparse)
///     .with_damping(0.5);
/// assert!(config.validate().is_ok());
/// assert!(MinSumConfig::default().with_damping(1.0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinSumConfig {
    pub variant: Variant,
    pub layout: Layout,
    /// Weight of the previous message when blending, in `[0, 1)`.
    pub damping: f64,
    pub rho: RhoConfig,
}

impl Default for MinSumConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Plain,
            layout: Layout::Dense,
            damping: 0.0,
            rho: RhoConfig::default(),
        }
    }
}

impl MinSumConfig {
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_rho(mut self, rho: RhoConfig) -> Self {
        self.rho = rho;
        self
    }

    /// Checks parameter ranges that do not depend on the instance.
    pub fn validate(&self) -> Result<()> {
        validate_damping(self.damping)?;
        if self.variant == Variant::TreeReweighted && self.rho.source == RhoSource::Sampled {
            if self.rho.min_tree_count == 0 {
                return Err(FacilityError::InvalidParameter(
                    "min_tree_count must be at least 1".into(),
                ));
            }
            if self.rho.max_tree_count < self.rho.min_tree_count {
                return Err(FacilityError::InvalidParameter(format!(
                    "max_tree_count ({}) is below min_tree_count ({})",
                    self.rho.max_tree_count, self.rho.min_tree_count
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_damping(damping: f64) -> Result<()> {
    if !(0.0..1.0).contains(&damping) {
        return Err(FacilityError::InvalidParameter(format!(
            "damping must lie in [0, 1), got {}",
            damping
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = MinSumConfig::default();
        assert_eq!(c.variant, Variant::Plain);
        assert_eq!(c.layout, Layout::Dense);
        assert_eq!(c.damping, 0.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_damping() {
        assert!(MinSumConfig::default().with_damping(-0.1).validate().is_err());
        assert!(MinSumConfig::default().with_damping(f64::NAN).validate().is_err());
        assert!(MinSumConfig::default().with_damping(0.99).validate().is_ok());
    }

    #[test]
    fn test_validate_tree_counts() {
        let c = MinSumConfig::default()
            .with_variant(Variant::TreeReweighted)
            .with_rho(RhoConfig::default().with_source(RhoSource::Sampled).with_min_tree_count(0));
        assert!(c.validate().is_err());
        let c = c.with_rho(
            RhoConfig::default()
                .with_source(RhoSource::Sampled)
                .with_min_tree_count(10)
                .with_max_tree_count(5),
        );
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let c = MinSumConfig::default()
            .with_variant(Variant::TreeReweighted)
            .with_rho(RhoConfig::default().with_source(RhoSource::Sampled).with_seed(9));
        let json = serde_json::to_string(&c).unwrap();
        let back: MinSumConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let c: MinSumConfig = serde_json::from_str(r#"{"variant":"Attenuated"}"#).unwrap();
        assert_eq!(c.variant, Variant::Attenuated);
        assert_eq!(c.rho, RhoConfig::default());
    }
}
