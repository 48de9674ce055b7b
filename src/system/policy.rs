use crate::config::{GpuConfig, OsConfig};

/// What to do once a metric query has exhausted its attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Use the field's empty value for this tick and keep going.
    #[default]
    Substitute,
    /// Abort the sample.
    Fatal,
}

impl FailurePolicy {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fatal" | "abort" => FailurePolicy::Fatal,
            _ => FailurePolicy::Substitute,
        }
    }
}

/// What to do when a GPU backend cannot be brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitPolicy {
    #[default]
    Fatal,
    /// Continue without GPU metrics.
    Disable,
}

impl InitPolicy {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "disable" | "ignore" => InitPolicy::Disable,
            _ => InitPolicy::Fatal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbePolicy {
    pub on_failure: FailurePolicy,
    pub retries: u32,
}

impl ProbePolicy {
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Runs `query` up to `attempts()` times, returning the first success or
    /// the last error together with the number of attempts made.
    pub fn run<T, E>(&self, mut query: impl FnMut() -> Result<T, E>) -> Result<T, (u32, E)> {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match query() {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= attempts => return Err((attempt, err)),
                Err(_) => attempt += 1,
            }
        }
    }
}

/// Resolved policies for every collaborator the sampler talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplerPolicy {
    pub os: ProbePolicy,
    pub gpu: ProbePolicy,
    pub gpu_malformed: FailurePolicy,
}

impl SamplerPolicy {
    pub fn from_config(os: &OsConfig, gpu: &GpuConfig) -> Self {
        Self {
            os: ProbePolicy {
                on_failure: FailurePolicy::from_config_str(&os.on_failure),
                retries: os.retries,
            },
            gpu: ProbePolicy {
                on_failure: FailurePolicy::from_config_str(&gpu.on_failure),
                retries: gpu.retries,
            },
            gpu_malformed: FailurePolicy::from_config_str(&gpu.malformed_output),
        }
    }
}
