//! Error types for metric collection.

use thiserror::Error;

/// A single OS metric query failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{0} information unavailable")]
    Unavailable(&'static str),
}

/// Failure reported by a GPU metrics source.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("GPU backend initialization failed: {0}")]
    Init(String),

    #[error("GPU query failed: {0}")]
    Query(String),

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("malformed GPU record on line {line_no}: {reason} (`{line}`)")]
    Malformed {
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("GPU backend shutdown failed: {0}")]
    Shutdown(String),
}

impl GpuError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, GpuError::Malformed { .. })
    }
}

#[cfg(feature = "nvml")]
impl From<nvml_wrapper::error::NvmlError> for GpuError {
    fn from(err: nvml_wrapper::error::NvmlError) -> Self {
        GpuError::Query(err.to_string())
    }
}

/// A metric failure escalated by a fatal policy.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("{field} query failed after {attempts} attempt(s): {source}")]
    Os {
        field: &'static str,
        attempts: u32,
        #[source]
        source: ProbeError,
    },

    #[error("GPU query failed after {attempts} attempt(s): {source}")]
    Gpu {
        attempts: u32,
        #[source]
        source: GpuError,
    },
}
