use std::collections::BTreeMap;

use sysinfo::{Disks, Networks, System};

use super::gpu::{self, GpuSettings, GpuSource};
use super::policy::{FailurePolicy, ProbePolicy, SamplerPolicy};
use super::snapshot::{DiskUsage, MemoryUsage, NetworkIo, Snapshot};
use crate::config::Config;
use crate::error::{GpuError, ProbeError, SampleError};

/// Host metrics the sampler needs from the operating system.
pub trait OsMetrics {
    fn cpu_per_core(&mut self) -> Result<Vec<f64>, ProbeError>;
    fn memory(&mut self) -> Result<MemoryUsage, ProbeError>;
    fn disks(&mut self) -> Result<BTreeMap<String, DiskUsage>, ProbeError>;
    fn networks(&mut self) -> Result<BTreeMap<String, NetworkIo>, ProbeError>;
    fn uptime(&mut self) -> Result<u64, ProbeError>;
}

/// [`OsMetrics`] backed by `sysinfo`.
///
/// The handles are kept between samples so CPU usage is measured over the
/// interval since the previous refresh.
pub struct SysinfoMetrics {
    sys: System,
    disks: Disks,
    networks: Networks,
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoMetrics {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_usage();
        SysinfoMetrics {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl OsMetrics for SysinfoMetrics {
    fn cpu_per_core(&mut self) -> Result<Vec<f64>, ProbeError> {
        self.sys.refresh_cpu_usage();
        let cpus = self.sys.cpus();
        if cpus.is_empty() {
            return Err(ProbeError::Unavailable("CPU"));
        }
        Ok(cpus.iter().map(|cpu| f64::from(cpu.cpu_usage())).collect())
    }

    fn memory(&mut self) -> Result<MemoryUsage, ProbeError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(ProbeError::Unavailable("memory"));
        }
        Ok(MemoryUsage::from_bytes(total, self.sys.used_memory()))
    }

    fn disks(&mut self) -> Result<BTreeMap<String, DiskUsage>, ProbeError> {
        self.disks.refresh(true);
        Ok(self
            .disks
            .list()
            .iter()
            .map(|disk| {
                let total = disk.total_space();
                let used = total.saturating_sub(disk.available_space());
                (
                    disk.mount_point().to_string_lossy().to_string(),
                    DiskUsage::from_bytes(total, used),
                )
            })
            .collect())
    }

    fn networks(&mut self) -> Result<BTreeMap<String, NetworkIo>, ProbeError> {
        self.networks.refresh(true);
        Ok(self
            .networks
            .iter()
            .map(|(name, data)| {
                (
                    name.clone(),
                    NetworkIo {
                        bytes_sent: data.total_transmitted(),
                        bytes_received: data.total_received(),
                    },
                )
            })
            .collect())
    }

    fn uptime(&mut self) -> Result<u64, ProbeError> {
        Ok(System::uptime())
    }
}

/// Combines the OS provider and GPU source into one [`Snapshot`] per call.
pub struct Sampler {
    os: Box<dyn OsMetrics>,
    gpu: Box<dyn GpuSource>,
    policy: SamplerPolicy,
}

impl Sampler {
    pub fn new(os: Box<dyn OsMetrics>, gpu: Box<dyn GpuSource>, policy: SamplerPolicy) -> Self {
        Sampler { os, gpu, policy }
    }

    /// Opens the configured GPU backend and the sysinfo provider.
    ///
    /// GPU bring-up happens first so a fatal init failure leaves no other
    /// state behind.
    pub fn from_config(config: &Config) -> Result<Self, GpuError> {
        let gpu = gpu::open(&GpuSettings::from_config(&config.gpu))?;
        tracing::info!(backend = gpu.name(), "GPU source selected");
        Ok(Sampler::new(
            Box::new(SysinfoMetrics::new()),
            gpu,
            SamplerPolicy::from_config(&config.os, &config.gpu),
        ))
    }

    pub fn gpu_backend(&self) -> &'static str {
        self.gpu.name()
    }

    pub fn collect(&mut self) -> Result<Snapshot, SampleError> {
        let _span = tracing::debug_span!("sampler.collect").entered();

        let os_policy = self.policy.os;
        let cpu_usage = probe_os(os_policy, "cpu", || self.os.cpu_per_core())?;
        let memory = probe_os(os_policy, "memory", || self.os.memory())?;
        let disks = probe_os(os_policy, "disk", || self.os.disks())?;
        let network = probe_os(os_policy, "network", || self.os.networks())?;
        let uptime_seconds = probe_os(os_policy, "uptime", || self.os.uptime())?;
        let gpus = self.probe_gpu()?;

        Ok(Snapshot {
            cpu_usage,
            memory,
            disks,
            network,
            uptime_seconds,
            gpus,
        })
    }

    /// Releases the GPU backend. Call once, after the last sample.
    pub fn shutdown(self) -> Result<(), GpuError> {
        let backend = self.gpu.name();
        let result = self.gpu.shutdown();
        tracing::info!(backend, ok = result.is_ok(), "GPU source shut down");
        result
    }

    fn probe_gpu(&mut self) -> Result<Vec<super::snapshot::GpuStatus>, SampleError> {
        let policy = self.policy.gpu;
        match policy.run(|| self.gpu.query()) {
            Ok(devices) => Ok(devices),
            Err((attempts, source)) => {
                let on_failure = if source.is_malformed() {
                    self.policy.gpu_malformed
                } else {
                    policy.on_failure
                };
                match on_failure {
                    FailurePolicy::Substitute => {
                        tracing::warn!(
                            attempts,
                            error = %source,
                            "GPU query failed, reporting no devices"
                        );
                        Ok(Vec::new())
                    }
                    FailurePolicy::Fatal => Err(SampleError::Gpu { attempts, source }),
                }
            }
        }
    }
}

fn probe_os<T: Default>(
    policy: ProbePolicy,
    field: &'static str,
    query: impl FnMut() -> Result<T, ProbeError>,
) -> Result<T, SampleError> {
    match policy.run(query) {
        Ok(value) => Ok(value),
        Err((attempts, source)) => match policy.on_failure {
            FailurePolicy::Substitute => {
                tracing::warn!(
                    field,
                    attempts,
                    error = %source,
                    "metric query failed, substituting empty value"
                );
                Ok(T::default())
            }
            FailurePolicy::Fatal => Err(SampleError::Os {
                field,
                attempts,
                source,
            }),
        },
    }
}
