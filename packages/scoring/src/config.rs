//! Weight tuning configuration.
//!
//! The embedded default lives in `config/tuning.toml`. A user file may
//! override the objective coefficients, the candidate list, or both; a
//! file without candidates keeps the embedded list.

use std::path::Path;

use realty_grouping::ConfigError;
use realty_listing_models::WeightCandidate;
use serde::{Deserialize, Serialize};

const DEFAULT_TOML: &str = include_str!("../config/tuning.toml");

/// Coefficients of the tuning objective
/// `alpha * ppa + beta * dispersion + gamma * count deviation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Objective {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    /// Desired mean cluster size in the top-K slice.
    pub target_count: f64,
    /// Number of best clusters each candidate is judged on.
    pub top_k: usize,
}

impl Default for Objective {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.3,
            gamma: 0.2,
            target_count: 3.0,
            top_k: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    #[serde(default)]
    pub objective: Objective,
    #[serde(default)]
    pub candidates: Vec<WeightCandidate>,
}

impl TuningConfig {
    /// Returns the configuration embedded from `config/tuning.toml`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (covered by tests).
    #[must_use]
    pub fn embedded() -> Self {
        let config: Self = toml::from_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse tuning.toml: {e}"));
        config
            .validate()
            .unwrap_or_else(|e| panic!("Invalid tuning.toml: {e}"));
        config
    }

    /// Parses and validates a TOML document, falling back to the embedded
    /// candidates when the document lists none.
    ///
    /// # Errors
    ///
    /// * If the document is not valid TOML for this schema
    /// * If a value is out of range
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(toml)?;
        if config.candidates.is_empty() {
            config.candidates = Self::embedded().candidates;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If the contents fail [`Self::from_toml_str`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let toml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded tuning config from {}", path.display());
        Self::from_toml_str(&toml)
    }

    /// Loads `path` when given, otherwise the embedded defaults.
    ///
    /// # Errors
    ///
    /// * If `path` is given and fails [`Self::load`]
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::embedded()), Self::load)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// * If `target_count` is not a positive finite number
    /// * If `top_k` is zero
    /// * If there are no candidates, or a candidate has a non-finite weight
    pub fn validate(&self) -> Result<(), ConfigError> {
        let objective = &self.objective;
        if !(objective.target_count.is_finite() && objective.target_count > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "target_count must be positive, got {}",
                objective.target_count
            )));
        }
        if objective.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be at least 1".to_string()));
        }
        if ![objective.alpha, objective.beta, objective.gamma]
            .iter()
            .all(|c| c.is_finite())
        {
            return Err(ConfigError::Invalid(
                "objective coefficients must be finite".to_string(),
            ));
        }
        if self.candidates.is_empty() {
            return Err(ConfigError::Invalid("no candidate weight vectors".to_string()));
        }
        for candidate in &self.candidates {
            let w = &candidate.weights;
            if ![w.price, w.delta, w.dispersion, w.count]
                .iter()
                .all(|v| v.is_finite())
            {
                return Err(ConfigError::Invalid(format!(
                    "candidate {} has a non-finite weight",
                    candidate.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use realty_listing_models::WeightVector;

    use super::*;

    #[test]
    fn embedded_config_parses() {
        let config = TuningConfig::embedded();
        assert_eq!(config.objective, Objective::default());
        assert_eq!(config.candidates.len(), 5);
    }

    #[test]
    fn embedded_candidates_have_unique_names() {
        let config = TuningConfig::embedded();
        let mut names: Vec<&str> = config.candidates.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), config.candidates.len());
    }

    #[test]
    fn embedded_includes_conservative_and_balanced() {
        let config = TuningConfig::embedded();
        let find = |name: &str| {
            config
                .candidates
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.weights)
        };
        assert_eq!(find("conservative"), Some(WeightVector::new(0.5, 0.3, 0.1, 0.1)));
        assert_eq!(find("balanced"), Some(WeightVector::new(0.45, 0.25, 0.15, 0.15)));
    }

    #[test]
    fn objective_only_file_keeps_embedded_candidates() {
        let config = TuningConfig::from_toml_str("[objective]\ntop_k = 3\n").unwrap();
        assert_eq!(config.objective.top_k, 3);
        assert!((config.objective.alpha - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.candidates, TuningConfig::embedded().candidates);
    }

    #[test]
    fn empty_file_is_the_embedded_config() {
        assert_eq!(TuningConfig::from_toml_str("").unwrap(), TuningConfig::embedded());
    }

    #[test]
    fn candidates_override() {
        let config = TuningConfig::from_toml_str(
            "[[candidates]]\nname = \"flat\"\nweights = { price = 0.25, delta = 0.25, dispersion = 0.25, count = 0.25 }\n",
        )
        .unwrap();
        assert_eq!(config.candidates.len(), 1);
        assert_eq!(config.candidates[0].name, "flat");
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = TuningConfig::from_toml_str("[objective]\ntop_k = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_target() {
        let err = TuningConfig::from_toml_str("[objective]\ntarget_count = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_incomplete_weights() {
        let err = TuningConfig::from_toml_str(
            "[[candidates]]\nname = \"broken\"\nweights = { price = 0.5 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
