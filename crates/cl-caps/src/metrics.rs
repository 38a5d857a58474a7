#![cfg(feature = "metrics")]

use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};

use crate::{
    driver::{DeviceId, DeviceInfo, DeviceType, Driver, PlatformId, PlatformInfo},
    status::{Status, CL_SUCCESS},
};

/* ───────────── Roh‑Latenzen ─────────────────────────── */

static TIMES: Lazy<Mutex<Vec<(&'static str, u128)>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

/// Im Wrapper aufrufen: `record("clGetDeviceInfo", Instant::now(), status);`
pub fn record(name: &'static str, start: Instant, status: Status) {
    let dur = start.elapsed().as_micros();
    TIMES.lock().unwrap_or_else(PoisonError::into_inner).push((name, dur));
    CALLS.fetch_add(1, Ordering::Relaxed);
    if status != CL_SUCCESS {
        FAILED.fetch_add(1, Ordering::Relaxed);
    }
}

/* ───────────── Zähler ───────────────────────────────── */

pub static CALLS:  AtomicUsize = AtomicUsize::new(0);
pub static FAILED: AtomicUsize = AtomicUsize::new(0);

/* ───────────── Treiber‑Wrapper ──────────────────────── */

/// Misst jeden Aufruf des inneren Treibers.
pub struct Timed<'a, D: ?Sized> {
    inner: &'a D,
}

impl<'a, D: Driver + ?Sized> Timed<'a, D> {
    pub fn new(inner: &'a D) -> Self {
        Self { inner }
    }
}

impl<D: Driver + ?Sized> Driver for Timed<'_, D> {
    fn get_platform_ids(
        &self,
        platforms: Option<&mut [PlatformId]>,
        num_platforms: Option<&mut u32>,
    ) -> Status {
        let t = Instant::now();
        let status = self.inner.get_platform_ids(platforms, num_platforms);
        record("clGetPlatformIDs", t, status);
        status
    }

    fn get_platform_info(
        &self,
        platform: PlatformId,
        param: PlatformInfo,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status {
        let t = Instant::now();
        let status = self.inner.get_platform_info(platform, param, value, size_ret);
        record("clGetPlatformInfo", t, status);
        status
    }

    fn get_device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
        devices: Option<&mut [DeviceId]>,
        num_devices: Option<&mut u32>,
    ) -> Status {
        let t = Instant::now();
        let status = self.inner.get_device_ids(platform, device_type, devices, num_devices);
        record("clGetDeviceIDs", t, status);
        status
    }

    fn get_device_info(
        &self,
        device: DeviceId,
        param: DeviceInfo,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status {
        let t = Instant::now();
        let status = self.inner.get_device_info(device, param, value, size_ret);
        record("clGetDeviceInfo", t, status);
        status
    }
}

/* ───────────── Zusammenfassung ausgeben ─────────────── */

/// Am Programmende aufrufen, geht nach stderr damit stdout nur den Bericht enthält
pub fn summary() {
    let mut map: HashMap<&str, Vec<u128>> = HashMap::new();
    {
        let mut times = TIMES.lock().unwrap_or_else(PoisonError::into_inner);
        for (name, us) in times.drain(..) {
            map.entry(name).or_default().push(us);
        }
    }

    let mut names: Vec<_> = map.keys().copied().collect();
    names.sort_unstable();

    eprintln!("── metrics summary ──");
    for name in names {
        let mut v = map.remove(name).unwrap_or_default();
        v.sort_unstable();
        let mean = v.iter().sum::<u128>() / v.len().max(1) as u128;
        let p95  = v.get(((v.len() * 95) / 100).saturating_sub(1)).copied().unwrap_or(0);

        eprintln!("{:<18} n={:>4}  mean={:>5} µs   p95={:>5} µs", name, v.len(), mean, p95);
    }

    let calls  = CALLS.load(Ordering::Relaxed);
    let failed = FAILED.load(Ordering::Relaxed);
    eprintln!("driver calls: {}   ({} failed)", calls, failed);
}
