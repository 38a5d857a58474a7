//! In-Memory-Treiber für Tests und Benchmarks (Feature `test-utils`).
//!
//! Verhält sich wie eine strenge OpenCL-Implementierung: Info-Puffer müssen
//! exakt so groß sein wie der Wert, sonst gibt es `CL_INVALID_VALUE`. Jeder
//! Aufruf landet im Protokoll, damit Tests das Zwei-Aufruf-Protokoll prüfen
//! können.

use std::cell::RefCell;

use crate::{
    driver::*,
    status::{
        Status, CL_DEVICE_NOT_FOUND, CL_INVALID_DEVICE, CL_INVALID_PLATFORM, CL_INVALID_VALUE,
        CL_PLATFORM_NOT_FOUND_KHR, CL_SUCCESS,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    PlatformIds,
    PlatformInfo(PlatformId, PlatformInfo),
    DeviceIds(PlatformId),
    DeviceInfo(DeviceId, DeviceInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub call: Call,
    /// Länge des Ausgabepuffers, `None` = NULL
    pub buffer_len: Option<usize>,
    /// An den Aufrufer gemeldete Größe bzw. Anzahl, falls erfragt
    pub size_ret: Option<usize>,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub opencl_c_version: String,
    pub device_type: DeviceType,
    pub available: bool,
    pub global_mem_size: u64,
    pub local_mem_size: u64,
    pub max_compute_units: u32,
    pub address_bits: u32,
    pub max_clock_frequency: u32,
}

impl FakeDevice {
    pub fn new(name: &str, device_type: DeviceType) -> Self {
        Self {
            name: name.to_owned(),
            vendor: "Example Vendor".to_owned(),
            version: "OpenCL 3.0".to_owned(),
            opencl_c_version: "OpenCL C 1.2".to_owned(),
            device_type,
            available: true,
            global_mem_size: 4 << 30,
            local_mem_size: 64 << 10,
            max_compute_units: 16,
            address_bits: 64,
            max_clock_frequency: 1500,
        }
    }

    pub fn with_global_mem_size(mut self, bytes: u64) -> Self {
        self.global_mem_size = bytes;
        self
    }

    pub fn with_max_compute_units(mut self, units: u32) -> Self {
        self.max_compute_units = units;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    fn info(&self, param: DeviceInfo) -> Option<Vec<u8>> {
        let value = match param {
            CL_DEVICE_NAME => c_string(&self.name),
            CL_DEVICE_VENDOR => c_string(&self.vendor),
            CL_DEVICE_VERSION => c_string(&self.version),
            CL_DEVICE_OPENCL_C_VERSION => c_string(&self.opencl_c_version),
            CL_DEVICE_TYPE => self.device_type.to_ne_bytes().to_vec(),
            CL_DEVICE_AVAILABLE => u32::from(self.available).to_ne_bytes().to_vec(),
            CL_DEVICE_GLOBAL_MEM_SIZE => self.global_mem_size.to_ne_bytes().to_vec(),
            CL_DEVICE_LOCAL_MEM_SIZE => self.local_mem_size.to_ne_bytes().to_vec(),
            CL_DEVICE_MAX_COMPUTE_UNITS => self.max_compute_units.to_ne_bytes().to_vec(),
            CL_DEVICE_ADDRESS_BITS => self.address_bits.to_ne_bytes().to_vec(),
            CL_DEVICE_MAX_CLOCK_FREQUENCY => self.max_clock_frequency.to_ne_bytes().to_vec(),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone)]
pub struct FakePlatform {
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub profile: String,
    pub devices: Vec<FakeDevice>,
}

impl FakePlatform {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            vendor: "Example Vendor".to_owned(),
            version: "OpenCL 3.0 Example".to_owned(),
            profile: "FULL_PROFILE".to_owned(),
            devices: Vec::new(),
        }
    }

    pub fn with_device(mut self, device: FakeDevice) -> Self {
        self.devices.push(device);
        self
    }

    fn info(&self, param: PlatformInfo) -> Option<Vec<u8>> {
        let value = match param {
            CL_PLATFORM_NAME => c_string(&self.name),
            CL_PLATFORM_VENDOR => c_string(&self.vendor),
            CL_PLATFORM_VERSION => c_string(&self.version),
            CL_PLATFORM_PROFILE => c_string(&self.profile),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Default)]
pub struct FakeDriver {
    platforms: Vec<FakePlatform>,
    faults: Vec<(Call, Status)>,
    empty_as_success: bool,
    calls: RefCell<Vec<CallRecord>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: FakePlatform) -> Self {
        self.platforms.push(platform);
        self
    }

    /// Lässt jeden Aufruf `call` mit `status` scheitern.
    pub fn fail_on(mut self, call: Call, status: Status) -> Self {
        self.faults.push((call, status));
        self
    }

    /// Leere Listen mit `CL_SUCCESS` und Anzahl 0 beantworten statt mit
    /// `CL_PLATFORM_NOT_FOUND_KHR` bzw. `CL_DEVICE_NOT_FOUND`.
    pub fn empty_as_success(mut self) -> Self {
        self.empty_as_success = true;
        self
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.borrow().clone()
    }

    pub fn platform_id(platform: usize) -> PlatformId {
        PlatformId(platform + 1)
    }

    pub fn device_id(platform: usize, device: usize) -> DeviceId {
        DeviceId(((platform + 1) << 16) | (device + 1))
    }

    fn platform(&self, id: PlatformId) -> Option<&FakePlatform> {
        self.platforms.get(id.0.checked_sub(1)?)
    }

    fn device(&self, id: DeviceId) -> Option<&FakeDevice> {
        let platform = (id.0 >> 16).checked_sub(1)?;
        let device = (id.0 & 0xFFFF).checked_sub(1)?;
        self.platforms.get(platform)?.devices.get(device)
    }

    fn fault(&self, call: Call) -> Option<Status> {
        self.faults.iter().find(|(c, _)| *c == call).map(|&(_, status)| status)
    }

    fn log(&self, call: Call, buffer_len: Option<usize>, size_ret: Option<usize>, status: Status) -> Status {
        self.calls.borrow_mut().push(CallRecord { call, buffer_len, size_ret, status });
        status
    }

    fn list<T: Copy>(
        &self,
        call: Call,
        ids: &[T],
        not_found: Status,
        out: Option<&mut [T]>,
        count: Option<&mut u32>,
    ) -> Status {
        let buffer_len = out.as_ref().map(|b| b.len());
        if let Some(status) = self.fault(call) {
            return self.log(call, buffer_len, None, status);
        }
        if ids.is_empty() && !self.empty_as_success {
            return self.log(call, buffer_len, None, not_found);
        }
        if (out.is_none() && count.is_none()) || buffer_len == Some(0) {
            return self.log(call, buffer_len, None, CL_INVALID_VALUE);
        }
        if let Some(out) = out {
            let n = out.len().min(ids.len());
            out[..n].copy_from_slice(&ids[..n]);
        }
        let size_ret = count.map(|c| {
            *c = ids.len() as u32;
            ids.len()
        });
        self.log(call, buffer_len, size_ret, CL_SUCCESS)
    }

    fn info(
        &self,
        call: Call,
        value: Option<Vec<u8>>,
        invalid_handle: Status,
        handle_ok: bool,
        out: Option<&mut [u8]>,
        size: Option<&mut usize>,
    ) -> Status {
        let buffer_len = out.as_ref().map(|b| b.len());
        if let Some(status) = self.fault(call) {
            return self.log(call, buffer_len, None, status);
        }
        if !handle_ok {
            return self.log(call, buffer_len, None, invalid_handle);
        }
        let Some(value) = value else {
            return self.log(call, buffer_len, None, CL_INVALID_VALUE);
        };
        if let Some(out) = out {
            if out.len() != value.len() {
                return self.log(call, buffer_len, None, CL_INVALID_VALUE);
            }
            out.copy_from_slice(&value);
        }
        let size_ret = size.map(|s| {
            *s = value.len();
            value.len()
        });
        self.log(call, buffer_len, size_ret, CL_SUCCESS)
    }
}

fn c_string(s: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(s.len() + 1);
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(0);
    bytes
}

impl Driver for FakeDriver {
    fn get_platform_ids(
        &self,
        platforms: Option<&mut [PlatformId]>,
        num_platforms: Option<&mut u32>,
    ) -> Status {
        let ids: Vec<_> = (0..self.platforms.len()).map(Self::platform_id).collect();
        self.list(Call::PlatformIds, &ids, CL_PLATFORM_NOT_FOUND_KHR, platforms, num_platforms)
    }

    fn get_platform_info(
        &self,
        platform: PlatformId,
        param: PlatformInfo,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status {
        let found = self.platform(platform);
        let bytes = found.and_then(|p| p.info(param));
        let call = Call::PlatformInfo(platform, param);
        self.info(call, bytes, CL_INVALID_PLATFORM, found.is_some(), value, size_ret)
    }

    fn get_device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
        devices: Option<&mut [DeviceId]>,
        num_devices: Option<&mut u32>,
    ) -> Status {
        let call = Call::DeviceIds(platform);
        let Some(p) = self.platform(platform) else {
            let buffer_len = devices.as_ref().map(|b| b.len());
            let status = self.fault(call).unwrap_or(CL_INVALID_PLATFORM);
            return self.log(call, buffer_len, None, status);
        };
        let index = platform.0 - 1;
        let ids: Vec<_> = p
            .devices
            .iter()
            .enumerate()
            .filter(|(_, d)| device_type == CL_DEVICE_TYPE_ALL || d.device_type & device_type != 0)
            .map(|(i, _)| Self::device_id(index, i))
            .collect();
        self.list(call, &ids, CL_DEVICE_NOT_FOUND, devices, num_devices)
    }

    fn get_device_info(
        &self,
        device: DeviceId,
        param: DeviceInfo,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status {
        let found = self.device(device);
        let bytes = found.and_then(|d| d.info(param));
        let call = Call::DeviceInfo(device, param);
        self.info(call, bytes, CL_INVALID_DEVICE, found.is_some(), value, size_ret)
    }
}
