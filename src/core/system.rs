// ─── System Memory ───

use serde::Serialize;
use tracing::debug;

const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Share of physical memory the memory slider may reach, in percent.
const SLIDER_CEILING_PERCENT: f64 = 80.0;

/// Figures shown next to the memory slider, in GB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    /// Truncated to one decimal.
    pub total_gb: f64,
    /// Truncated to one decimal.
    pub free_gb: f64,
    /// Highest value the slider offers, whole GB.
    pub slider_max_gb: u32,
}

impl MemoryInfo {
    pub fn from_bytes(total: u64, free: u64) -> Self {
        let total_gb = truncate_tenths(total as f64 / BYTES_PER_GB);
        let free_gb = truncate_tenths(free as f64 / BYTES_PER_GB);
        let slider_max_gb = (SLIDER_CEILING_PERCENT * total_gb / 100.0).trunc() as u32;
        Self {
            total_gb,
            free_gb,
            slider_max_gb,
        }
    }

    pub fn detect() -> Self {
        let mut system = sysinfo::System::new();
        system.refresh_memory();
        let info = Self::from_bytes(system.total_memory(), system.available_memory());
        debug!(
            "Memory: {} GB total, {} GB free, slider up to {} GB",
            info.total_gb, info.free_gb, info.slider_max_gb
        );
        info
    }
}

fn truncate_tenths(value: f64) -> f64 {
    (value * 10.0).trunc() / 10.0
}
