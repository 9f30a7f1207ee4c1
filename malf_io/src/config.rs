//! Fusion configuration types.

use malf_core::VoteParams;

use crate::error::{IoError, Result};

/// Default distance-prior sharpness.
pub const DEFAULT_RHO: f64 = 1.0;
/// Default intensity-similarity width.
pub const DEFAULT_SIGMA: f64 = 50.0;
/// Default similarity floor.
pub const DEFAULT_MINIMUM_SIMILARITY: f64 = 1e-4;

/// Voting parameters, constant for a session unless replaced between votes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FusionConfig {
    /// Distance-prior sharpness in 1/mm. Must be positive.
    pub rho: f64,
    /// Width of the Gaussian intensity similarity. Must be positive.
    pub sigma: f64,
    /// Lower bound for the intensity similarity, in (0, 1).
    pub minimum_similarity: f64,
    /// Worker threads for the voxel loops (0 = rayon's global pool).
    pub num_threads: usize,
}

impl FusionConfig {
    /// Create a configuration with the default parameters.
    pub const fn new() -> Self {
        Self {
            rho: DEFAULT_RHO,
            sigma: DEFAULT_SIGMA,
            minimum_similarity: DEFAULT_MINIMUM_SIMILARITY,
            num_threads: 0,
        }
    }

    /// Set the distance-prior sharpness.
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    /// Set the intensity-similarity width.
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the similarity floor.
    pub fn with_minimum_similarity(mut self, minimum_similarity: f64) -> Self {
        self.minimum_similarity = minimum_similarity;
        self
    }

    /// Set the worker thread count (0 = rayon default).
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// The first constraint this configuration violates, if any.
    pub fn violation(&self) -> Option<&'static str> {
        if !(self.rho > 0.0 && self.rho.is_finite()) {
            return Some("rho must be positive and finite");
        }
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return Some("sigma must be positive and finite");
        }
        if !(self.minimum_similarity > 0.0 && self.minimum_similarity < 1.0) {
            return Some("minimum_similarity must lie in (0, 1)");
        }
        None
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        match self.violation() {
            Some(message) => Err(IoError::InvalidConfig { message }),
            None => Ok(()),
        }
    }

    /// The scalar parameters read by each vote.
    #[inline]
    pub fn vote_params(&self) -> VoteParams {
        VoteParams {
            rho: self.rho,
            sigma: self.sigma,
            minimum_similarity: self.minimum_similarity,
        }
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FusionConfig::default();
        assert_eq!(config.rho, 1.0);
        assert_eq!(config.sigma, 50.0);
        assert_eq!(config.minimum_similarity, 1e-4);
        assert_eq!(config.num_threads, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = FusionConfig::new()
            .with_rho(0.5)
            .with_sigma(20.0)
            .with_minimum_similarity(0.01)
            .with_num_threads(2);

        assert_eq!(config.rho, 0.5);
        assert_eq!(config.sigma, 20.0);
        assert_eq!(config.minimum_similarity, 0.01);
        assert_eq!(config.num_threads, 2);

        let params = config.vote_params();
        assert_eq!(params.rho, 0.5);
        assert_eq!(params.sigma, 20.0);
        assert_eq!(params.minimum_similarity, 0.01);
    }

    #[test]
    fn test_validation() {
        let valid = FusionConfig::default();

        assert!(valid.with_rho(0.0).validate().is_err());
        assert!(valid.with_rho(f64::NAN).validate().is_err());
        assert!(valid.with_sigma(-1.0).validate().is_err());
        assert!(valid.with_sigma(f64::INFINITY).validate().is_err());
        assert!(valid.with_minimum_similarity(0.0).validate().is_err());
        assert!(valid.with_minimum_similarity(1.0).validate().is_err());
        assert!(valid.with_minimum_similarity(0.999).validate().is_ok());
    }

    #[test]
    fn test_violation_names_first_broken_constraint() {
        assert_eq!(FusionConfig::default().violation(), None);

        let config = FusionConfig::new().with_rho(-1.0).with_sigma(0.0);
        assert_eq!(config.violation(), Some("rho must be positive and finite"));
        assert_eq!(
            config.validate(),
            Err(IoError::InvalidConfig {
                message: "rho must be positive and finite"
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_partial_config() {
        let config: FusionConfig = serde_json::from_str(r#"{ "sigma": 12.5 }"#).unwrap();
        assert_eq!(config.sigma, 12.5);
        assert_eq!(config.rho, DEFAULT_RHO);

        let json = serde_json::to_string(&config).unwrap();
        let back: FusionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
