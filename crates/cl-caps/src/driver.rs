//! Schnittstelle zu den vier OpenCL-Einstiegspunkten, die der Report braucht.
//!
//! Die Methoden spiegeln die C-Signaturen wider: ein optionaler Ausgabepuffer
//! und ein optionaler Rückgabewert für die benötigte Größe bzw. Anzahl. Damit
//! bleibt das Zwei-Aufruf-Protokoll (erst Größe, dann Wert) beim Aufrufer.

use crate::status::Status;

/// Undurchsichtiges `cl_platform_id`-Handle.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct PlatformId(pub usize);

/// Undurchsichtiges `cl_device_id`-Handle, gehört immer zu genau einer Plattform.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct DeviceId(pub usize);

pub type PlatformInfo = u32;
pub type DeviceInfo = u32;
pub type DeviceType = u64;

// ─── Plattform-Parameter ─────────────────────────────────────────────
pub const CL_PLATFORM_PROFILE: PlatformInfo = 0x0900;
pub const CL_PLATFORM_VERSION: PlatformInfo = 0x0901;
pub const CL_PLATFORM_NAME: PlatformInfo = 0x0902;
pub const CL_PLATFORM_VENDOR: PlatformInfo = 0x0903;

// ─── Geräte-Parameter ────────────────────────────────────────────────
pub const CL_DEVICE_TYPE: DeviceInfo = 0x1000;
pub const CL_DEVICE_MAX_COMPUTE_UNITS: DeviceInfo = 0x1002;
pub const CL_DEVICE_MAX_CLOCK_FREQUENCY: DeviceInfo = 0x100C;
pub const CL_DEVICE_ADDRESS_BITS: DeviceInfo = 0x100D;
pub const CL_DEVICE_GLOBAL_MEM_SIZE: DeviceInfo = 0x101F;
pub const CL_DEVICE_LOCAL_MEM_SIZE: DeviceInfo = 0x1023;
pub const CL_DEVICE_AVAILABLE: DeviceInfo = 0x1027;
pub const CL_DEVICE_NAME: DeviceInfo = 0x102B;
pub const CL_DEVICE_VENDOR: DeviceInfo = 0x102C;
pub const CL_DEVICE_VERSION: DeviceInfo = 0x102F;
pub const CL_DEVICE_OPENCL_C_VERSION: DeviceInfo = 0x103D;

// ─── Gerätetypen (Bitmaske) ──────────────────────────────────────────
pub const CL_DEVICE_TYPE_DEFAULT: DeviceType = 1 << 0;
pub const CL_DEVICE_TYPE_CPU: DeviceType = 1 << 1;
pub const CL_DEVICE_TYPE_GPU: DeviceType = 1 << 2;
pub const CL_DEVICE_TYPE_ACCELERATOR: DeviceType = 1 << 3;
pub const CL_DEVICE_TYPE_CUSTOM: DeviceType = 1 << 4;
pub const CL_DEVICE_TYPE_ALL: DeviceType = 0xFFFF_FFFF;

/// Die rohen Abfragefunktionen einer OpenCL-Implementierung.
///
/// `None` als Puffer entspricht einem `NULL`-Zeiger, die Länge des Slices
/// ist `num_entries` bzw. `param_value_size`.
pub trait Driver {
    fn get_platform_ids(
        &self,
        platforms: Option<&mut [PlatformId]>,
        num_platforms: Option<&mut u32>,
    ) -> Status;

    fn get_platform_info(
        &self,
        platform: PlatformId,
        param: PlatformInfo,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status;

    fn get_device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
        devices: Option<&mut [DeviceId]>,
        num_devices: Option<&mut u32>,
    ) -> Status;

    fn get_device_info(
        &self,
        device: DeviceId,
        param: DeviceInfo,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status;
}
