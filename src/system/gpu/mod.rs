//! GPU metrics sources.
//!
//! Every backend implements [`GpuSource`]; the sampler never knows which one it
//! is talking to. Backends are chosen once at startup by [`open`].

#[cfg(feature = "nvml")]
mod nvml;
pub mod smi;

#[cfg(feature = "nvml")]
pub use nvml::NvmlSource;
pub use smi::SmiSource;

use crate::config::GpuConfig;
use crate::error::GpuError;
use crate::system::policy::InitPolicy;
use crate::system::snapshot::GpuStatus;

pub trait GpuSource {
    fn name(&self) -> &'static str;

    /// Lists every device in enumeration order.
    fn query(&mut self) -> Result<Vec<GpuStatus>, GpuError>;

    /// Releases whatever the backend acquired at construction.
    fn shutdown(self: Box<Self>) -> Result<(), GpuError> {
        Ok(())
    }
}

/// Backend used when GPU metrics are disabled or unavailable.
#[derive(Debug, Default)]
pub struct NoGpu;

impl GpuSource for NoGpu {
    fn name(&self) -> &'static str {
        "none"
    }

    fn query(&mut self) -> Result<Vec<GpuStatus>, GpuError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuBackend {
    /// Try NVML, then nvidia-smi, then run without GPU metrics.
    Auto,
    None,
    Nvml,
    NvidiaSmi,
}

impl GpuBackend {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" | "off" => GpuBackend::None,
            "nvml" => GpuBackend::Nvml,
            "nvidia-smi" | "smi" => GpuBackend::NvidiaSmi,
            _ => GpuBackend::Auto,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GpuSettings {
    pub backend: GpuBackend,
    pub smi_command: String,
    pub init_policy: InitPolicy,
}

impl GpuSettings {
    pub fn from_config(gpu: &GpuConfig) -> Self {
        Self {
            backend: GpuBackend::from_config_str(&gpu.backend),
            smi_command: gpu.smi_command.clone(),
            init_policy: InitPolicy::from_config_str(&gpu.init_failure),
        }
    }
}

/// Brings up the configured backend.
///
/// An explicitly selected backend that fails to start is an error unless the
/// init policy is [`InitPolicy::Disable`]. `Auto` never fails.
pub fn open(settings: &GpuSettings) -> Result<Box<dyn GpuSource>, GpuError> {
    let result = match settings.backend {
        GpuBackend::None => return Ok(Box::new(NoGpu)),
        GpuBackend::Auto => return Ok(open_auto(&settings.smi_command)),
        GpuBackend::Nvml => open_nvml(),
        GpuBackend::NvidiaSmi => open_smi(&settings.smi_command),
    };

    match (result, settings.init_policy) {
        (Ok(source), _) => Ok(source),
        (Err(err), InitPolicy::Disable) => {
            tracing::warn!(error = %err, "GPU backend unavailable, continuing without GPU metrics");
            Ok(Box::new(NoGpu))
        }
        (Err(err), InitPolicy::Fatal) => Err(err),
    }
}

fn open_auto(smi_command: &str) -> Box<dyn GpuSource> {
    match open_nvml() {
        Ok(source) => return source,
        Err(err) => tracing::debug!(error = %err, "NVML unavailable"),
    }
    match open_smi(smi_command) {
        Ok(source) => source,
        Err(err) => {
            tracing::info!(error = %err, "no GPU backend available");
            Box::new(NoGpu)
        }
    }
}

#[cfg(feature = "nvml")]
fn open_nvml() -> Result<Box<dyn GpuSource>, GpuError> {
    Ok(Box::new(NvmlSource::new()?))
}

#[cfg(not(feature = "nvml"))]
fn open_nvml() -> Result<Box<dyn GpuSource>, GpuError> {
    Err(GpuError::Init("built without the `nvml` feature".to_string()))
}

fn open_smi(command: &str) -> Result<Box<dyn GpuSource>, GpuError> {
    Ok(Box::new(SmiSource::new(command)?))
}
