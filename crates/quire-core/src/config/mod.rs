//! Session configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QuireError, QuireResult};
use crate::scheduler::{FsrsParameters, SchedulerKind, MAX_INTERVAL_DAYS};
use crate::strategy::StrategyKind;

/// Probability of interleaving a lower-ranked JD1 candidate.
pub const DEFAULT_INTERLEAVE_PROBABILITY: f64 = 0.2;

/// Parameters fixed for the lifetime of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Ranking strategy.
    pub strategy: StrategyKind,
    /// Scheduler applied on grading.
    pub scheduler: SchedulerKind,
    /// Pull due dates forward ahead of this exam.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<DateTime<Utc>>,
    /// Maximum number of new items introduced per session. None (the default) is unlimited.
    pub new_cards_limit: Option<usize>,
    /// Consecutive items from one note before that note is skipped.
    pub clump_limit: usize,
    /// Other items that must be delivered before an Again item returns.
    pub cooldown: usize,
    /// Disable all randomness.
    pub deterministic: bool,
    /// Seed for interleaving. Random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Probability of interleaving a lower-ranked JD1 candidate.
    pub interleave_probability: f64,
    /// FSRS model parameters.
    pub fsrs: FsrsParameters,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Jd1,
            scheduler: SchedulerKind::Fsrs,
            exam_date: None,
            new_cards_limit: None,
            clump_limit: 3,
            cooldown: 5,
            deterministic: false,
            seed: None,
            interleave_probability: DEFAULT_INTERLEAVE_PROBABILITY,
            fsrs: FsrsParameters::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> QuireResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| QuireError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| QuireError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| QuireError::Configuration(e.to_string())),
            _ => Err(QuireError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables over the defaults.
    ///
    /// Unparseable values are reported as configuration errors rather than
    /// silently ignored.
    pub fn from_env() -> QuireResult<Self> {
        let mut config = Self::default();

        if let Ok(strategy) = std::env::var("QUIRE_STRATEGY") {
            config.strategy = parse_env("QUIRE_STRATEGY", &strategy)?;
        }
        if let Ok(scheduler) = std::env::var("QUIRE_SCHEDULER") {
            config.scheduler = parse_env("QUIRE_SCHEDULER", &scheduler)?;
        }
        if let Ok(limit) = std::env::var("QUIRE_CLUMP_LIMIT") {
            config.clump_limit = parse_env("QUIRE_CLUMP_LIMIT", &limit)?;
        }
        if let Ok(cooldown) = std::env::var("QUIRE_COOLDOWN") {
            config.cooldown = parse_env("QUIRE_COOLDOWN", &cooldown)?;
        }
        if let Ok(limit) = std::env::var("QUIRE_NEW_CARDS_LIMIT") {
            config.new_cards_limit = match limit.as_str() {
                "" | "none" | "unlimited" => None,
                value => Some(parse_env("QUIRE_NEW_CARDS_LIMIT", value)?),
            };
        }
        if let Ok(deterministic) = std::env::var("QUIRE_DETERMINISTIC") {
            config.deterministic = matches!(
                deterministic.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Ok(seed) = std::env::var("QUIRE_SEED") {
            config.seed = Some(parse_env("QUIRE_SEED", &seed)?);
        }
        if let Ok(exam) = std::env::var("QUIRE_EXAM_DATE") {
            let date = DateTime::parse_from_rfc3339(&exam)
                .map_err(|e| QuireError::Configuration(format!("QUIRE_EXAM_DATE: {}", e)))?;
            config.exam_date = Some(date.with_timezone(&Utc));
        }

        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> QuireResult<()> {
        if self.clump_limit == 0 {
            return Err(QuireError::invalid_config(
                "clump_limit",
                "clump_limit must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.interleave_probability) {
            return Err(QuireError::invalid_config(
                "interleave_probability",
                format!(
                    "interleave_probability must be within 0..=1, got {}",
                    self.interleave_probability
                ),
            ));
        }
        let retention = self.fsrs.request_retention;
        if !(retention > 0.0 && retention < 1.0) {
            return Err(QuireError::invalid_config(
                "fsrs.request_retention",
                format!("request_retention must be within (0, 1), got {}", retention),
            ));
        }
        let max_interval = self.fsrs.maximum_interval;
        if !(1..=MAX_INTERVAL_DAYS).contains(&max_interval) {
            return Err(QuireError::invalid_config(
                "fsrs.maximum_interval",
                format!(
                    "maximum_interval must be within 1..={} days, got {}",
                    MAX_INTERVAL_DAYS, max_interval
                ),
            ));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> QuireResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| QuireError::Configuration(format!("{}: invalid value '{}'", name, value)))
}

/// Builder for SessionConfig.
#[derive(Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Set the ranking strategy.
    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the scheduler.
    pub fn scheduler(mut self, scheduler: SchedulerKind) -> Self {
        self.config.scheduler = scheduler;
        self
    }

    /// Set the exam date.
    pub fn exam_date(mut self, exam_date: DateTime<Utc>) -> Self {
        self.config.exam_date = Some(exam_date);
        self
    }

    /// Set the new item limit. None disables it.
    pub fn new_cards_limit(mut self, limit: Option<usize>) -> Self {
        self.config.new_cards_limit = limit;
        self
    }

    /// Set the clump limit.
    pub fn clump_limit(mut self, limit: usize) -> Self {
        self.config.clump_limit = limit;
        self
    }

    /// Set the volatile queue cooldown.
    pub fn cooldown(mut self, cooldown: usize) -> Self {
        self.config.cooldown = cooldown;
        self
    }

    /// Disable randomness.
    pub fn deterministic(mut self, deterministic: bool) -> Self {
        self.config.deterministic = deterministic;
        self
    }

    /// Set the RNG seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the interleave probability.
    pub fn interleave_probability(mut self, probability: f64) -> Self {
        self.config.interleave_probability = probability;
        self
    }

    /// Set FSRS parameters.
    pub fn fsrs(mut self, params: FsrsParameters) -> Self {
        self.config.fsrs = params;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SessionConfig {
        self.config
    }
}
