use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SECS: f64 = 2.0;
pub const DEFAULT_PARALLELISM: usize = 4;
/// Sample rate expected by the wav2vec2-class emotion model family.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;
pub const ENV_CHUNK_SECS: &str = "EMOTION_CHUNK_SECS";
pub const ENV_PARALLELISM: &str = "EMOTION_PARALLELISM";

/// Fixed-length analysis window duration in seconds. Must be positive.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChunkDuration(f64);

impl ChunkDuration {
    pub fn new(secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ConfigError::NonPositiveChunkDuration(secs));
        }
        Ok(Self(secs))
    }

    pub fn secs(&self) -> f64 {
        self.0
    }

    /// Number of samples one full chunk holds at the given sample rate.
    pub fn samples_at(&self, sample_rate: u32) -> usize {
        (self.0 * f64::from(sample_rate)).round() as usize
    }
}

impl Default for ChunkDuration {
    fn default() -> Self {
        Self(DEFAULT_CHUNK_SECS)
    }
}

/// Upper bound on concurrently in-flight model invocations per request.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parallelism(usize);

impl Parallelism {
    pub fn new(workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        Ok(Self(workers))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Self(DEFAULT_PARALLELISM)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub chunk_duration: ChunkDuration,
    pub parallelism: Parallelism,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("chunk duration must be > 0 seconds, got {0}")]
    NonPositiveChunkDuration(f64),
    #[error("parallelism must be > 0")]
    ZeroParallelism,
    #[error("invalid value for {key}: {value}")]
    InvalidEnvValue { key: String, value: String },
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_chunk_duration(
    cli_value: Option<f64>,
    env: &impl Env,
) -> Result<ChunkDuration, ConfigError> {
    match cli_value {
        Some(v) => ChunkDuration::new(v),
        None => match env.var(ENV_CHUNK_SECS) {
            Some(raw) => {
                let secs = raw.parse::<f64>().map_err(|_| ConfigError::InvalidEnvValue {
                    key: ENV_CHUNK_SECS.to_owned(),
                    value: raw.clone(),
                })?;
                ChunkDuration::new(secs)
            }
            None => Ok(ChunkDuration::default()),
        },
    }
}

pub fn resolve_parallelism(
    cli_value: Option<usize>,
    env: &impl Env,
) -> Result<Parallelism, ConfigError> {
    match cli_value {
        Some(v) => Parallelism::new(v),
        None => match env.var(ENV_PARALLELISM) {
            Some(raw) => {
                let n = raw.parse::<usize>().map_err(|_| ConfigError::InvalidEnvValue {
                    key: ENV_PARALLELISM.to_owned(),
                    value: raw.clone(),
                })?;
                Parallelism::new(n)
            }
            None => Ok(Parallelism::default()),
        },
    }
}
