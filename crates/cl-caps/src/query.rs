//! Das Zwei-Aufruf-Protokoll gegen einen [`Driver`].
//!
//! Zeichenketten und Handle-Listen: erst mit leerem Puffer die Größe bzw.
//! Anzahl erfragen, dann mit einem Puffer genau dieser Größe den Wert holen.
//! Zahlen: ein Aufruf mit der deklarierten Breite des Parameters.

use bytemuck::Pod;

use crate::{
    cl_try,
    device_type::DeviceKind,
    driver::*,
    status::{Status, CL_DEVICE_NOT_FOUND, CL_PLATFORM_NOT_FOUND_KHR},
    ClError,
};

/// Deklarierter C-Typ eines numerischen Geräteparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// `cl_uint`
    Uint,
    /// `cl_bool`
    Bool,
    /// `cl_ulong`
    Ulong,
    /// `cl_bitfield`, z. B. `cl_device_type`
    Bitfield,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numeric {
    pub param: DeviceInfo,
    pub width: Width,
}

pub const DEVICE_TYPE: Numeric = Numeric { param: CL_DEVICE_TYPE, width: Width::Bitfield };
pub const DEVICE_AVAILABLE: Numeric = Numeric { param: CL_DEVICE_AVAILABLE, width: Width::Bool };
pub const DEVICE_GLOBAL_MEM_SIZE: Numeric =
    Numeric { param: CL_DEVICE_GLOBAL_MEM_SIZE, width: Width::Ulong };
pub const DEVICE_LOCAL_MEM_SIZE: Numeric =
    Numeric { param: CL_DEVICE_LOCAL_MEM_SIZE, width: Width::Ulong };
pub const DEVICE_MAX_COMPUTE_UNITS: Numeric =
    Numeric { param: CL_DEVICE_MAX_COMPUTE_UNITS, width: Width::Uint };
pub const DEVICE_ADDRESS_BITS: Numeric = Numeric { param: CL_DEVICE_ADDRESS_BITS, width: Width::Uint };
pub const DEVICE_MAX_CLOCK_FREQUENCY: Numeric =
    Numeric { param: CL_DEVICE_MAX_CLOCK_FREQUENCY, width: Width::Uint };

// ─── Handle-Listen ────────────────────────────────────────────────────

pub fn platform_ids<D: Driver + ?Sized>(driver: &D) -> Result<Vec<PlatformId>, ClError> {
    let mut count = 0u32;
    let status = driver.get_platform_ids(None, Some(&mut count));
    // der ICD-Loader meldet "keine Plattform" als Fehlercode
    if status == CL_PLATFORM_NOT_FOUND_KHR {
        log::debug!("clGetPlatformIDs: CL_PLATFORM_NOT_FOUND_KHR, no platforms");
        return Ok(Vec::new());
    }
    cl_try!("clGetPlatformIDs", status);
    log::debug!("{count} platform(s)");

    if count == 0 {
        return Ok(Vec::new());
    }
    let mut platforms = vec![PlatformId::default(); count as usize];
    cl_try!("clGetPlatformIDs", driver.get_platform_ids(Some(platforms.as_mut_slice()), None));
    Ok(platforms)
}

pub fn device_ids<D: Driver + ?Sized>(
    driver: &D,
    platform: PlatformId,
    device_type: DeviceType,
) -> Result<Vec<DeviceId>, ClError> {
    let mut count = 0u32;
    let status = driver.get_device_ids(platform, device_type, None, Some(&mut count));
    if status == CL_DEVICE_NOT_FOUND {
        log::debug!("clGetDeviceIDs: CL_DEVICE_NOT_FOUND for {platform:?}, no devices");
        return Ok(Vec::new());
    }
    cl_try!("clGetDeviceIDs", status);
    log::debug!("{count} device(s) on {platform:?}");

    if count == 0 {
        return Ok(Vec::new());
    }
    let mut devices = vec![DeviceId::default(); count as usize];
    cl_try!(
        "clGetDeviceIDs",
        driver.get_device_ids(platform, device_type, Some(devices.as_mut_slice()), None)
    );
    Ok(devices)
}

// ─── Zeichenketten ────────────────────────────────────────────────────

pub fn platform_string<D: Driver + ?Sized>(
    driver: &D,
    platform: PlatformId,
    param: PlatformInfo,
) -> Result<String, ClError> {
    string_info("clGetPlatformInfo", param, |value, size| {
        driver.get_platform_info(platform, param, value, size)
    })
}

pub fn device_string<D: Driver + ?Sized>(
    driver: &D,
    device: DeviceId,
    param: DeviceInfo,
) -> Result<String, ClError> {
    string_info("clGetDeviceInfo", param, |value, size| {
        driver.get_device_info(device, param, value, size)
    })
}

fn string_info<F>(call: &'static str, param: u32, mut info: F) -> Result<String, ClError>
where
    F: FnMut(Option<&mut [u8]>, Option<&mut usize>) -> Status,
{
    let mut size = 0usize;
    cl_try!(call, info(None, Some(&mut size)));
    log::trace!("{call}({param:#06x}): {size} bytes");

    if size == 0 {
        return Ok(String::new());
    }
    let mut value = vec![0u8; size];
    cl_try!(call, info(Some(value.as_mut_slice()), None));
    Ok(decode(&value))
}

/// NUL-terminierten Puffer als Text lesen, alles ab dem ersten NUL fällt weg
fn decode(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

// ─── Zahlen ───────────────────────────────────────────────────────────

/// Liest einen Wert mit genau `size_of::<T>()` Bytes.
pub fn device_value<T: Pod, D: Driver + ?Sized>(
    driver: &D,
    device: DeviceId,
    param: DeviceInfo,
) -> Result<T, ClError> {
    let mut value: T = bytemuck::Zeroable::zeroed();
    cl_try!(
        "clGetDeviceInfo",
        driver.get_device_info(device, param, Some(bytemuck::bytes_of_mut(&mut value)), None)
    );
    log::trace!("clGetDeviceInfo({param:#06x}): {} bytes", std::mem::size_of::<T>());
    Ok(value)
}

/// Numerischer Parameter, auf `u64` erweitert.
pub fn device_numeric<D: Driver + ?Sized>(
    driver: &D,
    device: DeviceId,
    numeric: Numeric,
) -> Result<u64, ClError> {
    let value = match numeric.width {
        Width::Uint | Width::Bool => u64::from(device_value::<u32, _>(driver, device, numeric.param)?),
        Width::Ulong | Width::Bitfield => device_value::<u64, _>(driver, device, numeric.param)?,
    };
    Ok(value)
}

pub fn device_kind<D: Driver + ?Sized>(driver: &D, device: DeviceId) -> Result<DeviceKind, ClError> {
    let bits = device_numeric(driver, device, DEVICE_TYPE)?;
    Ok(DeviceKind::from_bits(bits))
}
