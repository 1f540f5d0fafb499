use crate::error::{AsResult, AssignError};
use crate::optimizer::extract::TieBreak;
use crate::problem::Profile;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub model: ModelParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 100)]
    pub pop_size: usize,
    #[arg(long, default_value_t = 50)]
    pub generations: usize,

    // Evaluation pool size
    #[arg(long, default_value_t = 4)]
    pub threads: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    #[arg(long, default_value_t = 0.9)]
    pub crossover_rate: f64,

    // Per-gene probability; defaults to 1 / chromosome length
    #[arg(long)]
    pub mutation_rate: Option<f64>,

    #[arg(long, default_value_t = 10)]
    pub duplicate_retries: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            pop_size: 100,
            generations: 50,
            threads: 4,
            seed: 42,
            crossover_rate: 0.9,
            mutation_rate: None,
            duplicate_retries: 10,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    #[arg(long, default_value_t = 40.0)]
    pub max_distance_km: f64,
    #[arg(long, default_value_t = 30.0)]
    pub target_class_size: f64,
    #[arg(long, value_enum, default_value_t = Profile::Full)]
    pub profile: Profile,
    #[arg(long, value_enum, default_value_t = TieBreak::ReversedLexicographic)]
    pub tie_break: TieBreak,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            max_distance_km: 40.0,
            target_class_size: 30.0,
            profile: Profile::Full,
            tie_break: TieBreak::ReversedLexicographic,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> AsResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overlays only the flags the user actually typed onto `self`.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(search.pop_size);
        update_if_present!(search.generations);
        update_if_present!(search.threads);
        update_if_present!(search.seed);
        update_if_present!(search.crossover_rate);
        update_if_present!(search.mutation_rate);
        update_if_present!(search.duplicate_retries);

        update_if_present!(model.max_distance_km);
        update_if_present!(model.target_class_size);
        update_if_present!(model.profile);
        update_if_present!(model.tie_break);
    }

    pub fn validate(&self) -> AsResult<()> {
        let s = &self.search;
        let m = &self.model;

        if s.pop_size < 2 {
            return Err(AssignError::Config(format!(
                "pop_size must be at least 2 (got {})",
                s.pop_size
            )));
        }
        if s.threads == 0 {
            return Err(AssignError::Config("threads must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&s.crossover_rate) {
            return Err(AssignError::Config(format!(
                "crossover_rate must lie in [0, 1] (got {})",
                s.crossover_rate
            )));
        }
        if let Some(rate) = s.mutation_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(AssignError::Config(format!(
                    "mutation_rate must lie in [0, 1] (got {})",
                    rate
                )));
            }
        }
        if !(m.max_distance_km.is_finite() && m.max_distance_km > 0.0) {
            return Err(AssignError::Config(format!(
                "max_distance_km must be positive (got {})",
                m.max_distance_km
            )));
        }
        if !(m.target_class_size.is_finite() && m.target_class_size > 0.0) {
            return Err(AssignError::Config(format!(
                "target_class_size must be positive (got {})",
                m.target_class_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.search.pop_size, 100);
        assert_eq!(cfg.model.profile, Profile::Full);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{ "search": { "generations": 7 }, "model": { "profile": "reduced" } }"#)
                .unwrap();
        assert_eq!(cfg.search.generations, 7);
        assert_eq!(cfg.search.pop_size, 100);
        assert_eq!(cfg.model.profile, Profile::Reduced);
        assert_eq!(cfg.model.max_distance_km, 40.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.search.pop_size = 1;
        assert!(matches!(cfg.validate(), Err(AssignError::Config(_))));

        let mut cfg = Config::default();
        cfg.search.mutation_rate = Some(1.5);
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.model.max_distance_km = 0.0;
        assert!(cfg.validate().is_err());
    }
}
