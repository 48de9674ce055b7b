use std::process::Command;

use super::GpuSource;
use crate::error::GpuError;
use crate::system::snapshot::GpuStatus;

const QUERY_ARGS: [&str; 2] = [
    "--query-gpu=name,utilization.gpu,memory.used",
    "--format=csv,noheader,nounits",
];

const FIELDS_PER_RECORD: usize = 3;
const MIB: u64 = 1024 * 1024;

/// GPU metrics read by running `nvidia-smi` once per sample.
#[derive(Debug)]
pub struct SmiSource {
    command: String,
}

impl SmiSource {
    /// Runs the command once so a missing tool or unreadable output is
    /// reported at startup rather than on the first tick.
    pub fn new(command: impl Into<String>) -> Result<Self, GpuError> {
        let source = SmiSource {
            command: command.into(),
        };
        let devices = source.run()?;
        tracing::info!(
            command = %source.command,
            devices = devices.len(),
            "nvidia-smi backend ready"
        );
        Ok(source)
    }

    fn run(&self) -> Result<Vec<GpuStatus>, GpuError> {
        let output = Command::new(&self.command)
            .args(QUERY_ARGS)
            .output()
            .map_err(|source| GpuError::Spawn {
                command: self.command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(GpuError::CommandFailed {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_records(&String::from_utf8_lossy(&output.stdout))
    }
}

impl GpuSource for SmiSource {
    fn name(&self) -> &'static str {
        "nvidia-smi"
    }

    fn query(&mut self) -> Result<Vec<GpuStatus>, GpuError> {
        self.run()
    }
}

/// Decodes `name, utilization %, memory used MiB` records, one per line.
///
/// Blank lines are skipped; any other line that does not match the record
/// shape fails the whole batch.
pub fn parse_records(text: &str) -> Result<Vec<GpuStatus>, GpuError> {
    let mut devices = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        devices.push(parse_record(idx + 1, line)?);
    }
    Ok(devices)
}

fn parse_record(line_no: usize, line: &str) -> Result<GpuStatus, GpuError> {
    let malformed = |reason: String| GpuError::Malformed {
        line_no,
        line: line.to_string(),
        reason,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELDS_PER_RECORD {
        return Err(malformed(format!(
            "expected {FIELDS_PER_RECORD} fields, found {}",
            fields.len()
        )));
    }

    let name = fields[0];
    if name.is_empty() {
        return Err(malformed("empty device name".to_string()));
    }
    let utilization_percent: u32 = fields[1]
        .parse()
        .map_err(|_| malformed(format!("utilization `{}` is not an integer", fields[1])))?;
    let memory_mib: u64 = fields[2]
        .parse()
        .map_err(|_| malformed(format!("memory `{}` is not an integer", fields[2])))?;
    let memory_used_bytes = memory_mib
        .checked_mul(MIB)
        .ok_or_else(|| malformed(format!("memory `{memory_mib}` MiB overflows")))?;

    Ok(GpuStatus {
        name: name.to_string(),
        utilization_percent,
        memory_used_bytes,
    })
}
