use std::fmt;

use crate::driver::{
    DeviceType, CL_DEVICE_TYPE_ACCELERATOR, CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_CPU,
    CL_DEVICE_TYPE_DEFAULT, CL_DEVICE_TYPE_GPU,
};

/// Bekannte Werte von `CL_DEVICE_TYPE`. Verglichen wird exakt, kombinierte
/// Bits landen wie alles andere bei `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Default,
    Cpu,
    Gpu,
    Accelerator,
    All,
    Unknown,
}

impl DeviceKind {
    pub fn from_bits(bits: DeviceType) -> Self {
        match bits {
            CL_DEVICE_TYPE_DEFAULT => DeviceKind::Default,
            CL_DEVICE_TYPE_CPU => DeviceKind::Cpu,
            CL_DEVICE_TYPE_GPU => DeviceKind::Gpu,
            CL_DEVICE_TYPE_ACCELERATOR => DeviceKind::Accelerator,
            CL_DEVICE_TYPE_ALL => DeviceKind::All,
            _ => DeviceKind::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceKind::Default => "default",
            DeviceKind::Cpu => "cpu",
            DeviceKind::Gpu => "gpu",
            DeviceKind::Accelerator => "accelerator",
            DeviceKind::All => "all",
            DeviceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
