//! Layered configuration: defaults, optional TOML file, `FORMCHECK_*` environment

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

use crate::core::exercise::Exercise;
use crate::error::Result;
use crate::types::ExerciseKind;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FormcheckConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Per-exercise overrides, keyed by exercise identifier
    #[serde(default)]
    pub exercises: BTreeMap<String, ExerciseConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Show on-screen hints
    #[serde(default = "default_hints_enabled")]
    pub hints_enabled: bool,

    /// Hold ticker period in milliseconds
    #[serde(default = "default_hold_tick_ms")]
    pub hold_tick_ms: u64,

    /// Directory for saved result records
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ExerciseConfig {
    /// Repetitions, or seconds for hold-based exercises
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,

    /// Threshold overrides by name
    #[serde(default)]
    pub thresholds: BTreeMap<String, f64>,
}

fn default_hints_enabled() -> bool {
    true
}

fn default_hold_tick_ms() -> u64 {
    crate::HOLD_TICK_MS
}

fn default_results_dir() -> String {
    "./results".to_string()
}

fn default_server_addr() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hints_enabled: default_hints_enabled(),
            hold_tick_ms: default_hold_tick_ms(),
            results_dir: default_results_dir(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

impl FormcheckConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self> {
        Self::load_from_file("formcheck.toml")
    }

    /// Load configuration from a specific file path
    ///
    /// Environment variables use the `FORMCHECK_` prefix and `__` between
    /// levels, e.g. `FORMCHECK_SESSION__HINTS_ENABLED=false`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("session.hints_enabled", default_hints_enabled())?
            .set_default("session.hold_tick_ms", default_hold_tick_ms() as i64)?
            .set_default("session.results_dir", default_results_dir())?
            .set_default("server.addr", default_server_addr())?
            .add_source(File::with_name(&path_str).required(false))
            .add_source(
                Environment::with_prefix("FORMCHECK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: FormcheckConfig = settings.try_deserialize()?;
        config.validate()?;

        info!("Configuration loaded");
        debug!("Final configuration: {:#?}", config);
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.session.hold_tick_ms == 0 {
            return Err(ConfigError::Message("session.hold_tick_ms must be greater than 0".to_string()).into());
        }
        let mut seen: HashMap<ExerciseKind, &str> = HashMap::new();
        for name in self.exercises.keys() {
            let kind: ExerciseKind = name.parse()?;
            if let Some(previous) = seen.insert(kind, name) {
                return Err(ConfigError::Message(format!(
                    "exercises.{} and exercises.{} both configure {}",
                    previous, name, kind
                ))
                .into());
            }
            self.exercise(kind)?;
        }
        Ok(())
    }

    /// Overrides for one exercise; aliases such as `mountain-climber` match
    pub fn exercise_config(&self, kind: ExerciseKind) -> ExerciseConfig {
        self.exercises
            .iter()
            .find(|(name, _)| name.parse::<ExerciseKind>().ok() == Some(kind))
            .map(|(_, cfg)| cfg.clone())
            .unwrap_or_default()
    }

    /// The exercise with this configuration's target and thresholds applied
    pub fn exercise(&self, kind: ExerciseKind) -> Result<Exercise> {
        Exercise::configured(kind, &self.exercise_config(kind))
    }

    /// Default configuration with every exercise spelled out, as TOML
    pub fn default_toml() -> Result<String> {
        let mut config = FormcheckConfig::default();
        for exercise in crate::core::exercise::catalog() {
            config.exercises.insert(
                exercise.meta().name.to_string(),
                ExerciseConfig {
                    target: Some(exercise.meta().target),
                    thresholds: exercise.thresholds().iter().map(|(k, v)| (k.to_string(), v)).collect(),
                },
            );
        }
        toml::to_string_pretty(&config)
            .map_err(|e| ConfigError::Message(format!("cannot render config: {}", e)).into())
    }
}
