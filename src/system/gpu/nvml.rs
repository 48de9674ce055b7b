use nvml_wrapper::Nvml;

use super::GpuSource;
use crate::error::GpuError;
use crate::system::snapshot::GpuStatus;

/// GPU metrics read through the NVIDIA management library.
///
/// The library handle lives exactly as long as this source and is released by
/// [`GpuSource::shutdown`].
pub struct NvmlSource {
    nvml: Nvml,
}

impl NvmlSource {
    pub fn new() -> Result<Self, GpuError> {
        let nvml = Nvml::init().map_err(|e| GpuError::Init(e.to_string()))?;
        let count = nvml
            .device_count()
            .map_err(|e| GpuError::Init(e.to_string()))?;
        tracing::info!(devices = count, "NVML backend ready");
        Ok(NvmlSource { nvml })
    }
}

impl GpuSource for NvmlSource {
    fn name(&self) -> &'static str {
        "nvml"
    }

    fn query(&mut self) -> Result<Vec<GpuStatus>, GpuError> {
        let count = self.nvml.device_count()?;
        let mut devices = Vec::with_capacity(count as usize);
        for index in 0..count {
            let device = self.nvml.device_by_index(index)?;
            let name = device.name()?;
            let utilization = device.utilization_rates()?;
            let memory = device.memory_info()?;
            devices.push(GpuStatus {
                name,
                utilization_percent: utilization.gpu,
                memory_used_bytes: memory.used,
            });
        }
        Ok(devices)
    }

    fn shutdown(self: Box<Self>) -> Result<(), GpuError> {
        self.nvml
            .shutdown()
            .map_err(|e| GpuError::Shutdown(e.to_string()))
    }
}
