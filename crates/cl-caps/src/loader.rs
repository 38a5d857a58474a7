//! Bindet die OpenCL-Einstiegspunkte zur Laufzeit aus der ICD-Loader-Bibliothek.
//!
//! Es wird nichts gegen `libOpenCL` gelinkt, das Programm startet also auch
//! ohne installiertes SDK und meldet erst beim Laden einen Fehler.

use std::{
    ffi::{c_void, OsString},
    ptr,
};

use libloading::Library;
use once_cell::sync::OnceCell;

use crate::{
    config::LoaderConfig,
    driver::{DeviceId, DeviceInfo, DeviceType, Driver, PlatformId, PlatformInfo},
    status::Status,
};

// ─── C-Signaturen (CL_API_CALL = stdcall unter Win32) ────────────────
type ClGetPlatformIDs = unsafe extern "system" fn(u32, *mut PlatformId, *mut u32) -> Status;
type ClGetPlatformInfo =
    unsafe extern "system" fn(PlatformId, PlatformInfo, usize, *mut c_void, *mut usize) -> Status;
type ClGetDeviceIDs =
    unsafe extern "system" fn(PlatformId, DeviceType, u32, *mut DeviceId, *mut u32) -> Status;
type ClGetDeviceInfo =
    unsafe extern "system" fn(DeviceId, DeviceInfo, usize, *mut c_void, *mut usize) -> Status;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("no OpenCL library candidates configured")]
    NoCandidates,
    /// Kein Kandidat ladbar, `source` ist der Fehler des ersten
    #[error("failed to load OpenCL library (tried {})", .tried.join(", "))]
    Library {
        tried: Vec<String>,
        #[source]
        source: libloading::Error,
    },
    #[error("symbol {symbol} not found in {name}")]
    Symbol {
        symbol: &'static str,
        name: String,
        #[source]
        source: libloading::Error,
    },
}

/// Aufgelöste Funktionszeiger, die Bibliothek bleibt so lange geladen.
pub struct OpenCl {
    get_platform_ids: ClGetPlatformIDs,
    get_platform_info: ClGetPlatformInfo,
    get_device_ids: ClGetDeviceIDs,
    get_device_info: ClGetDeviceInfo,
    name: String,
    _lib: Library,
}

static OPENCL: OnceCell<OpenCl> = OnceCell::new();

/// Prozessweite Bindung, wird beim ersten Aufruf geladen.
pub fn init() -> Result<&'static OpenCl, LoadError> {
    OPENCL.get_or_try_init(|| {
        let cl = OpenCl::load(&LoaderConfig::from_env())?;
        log::info!("loaded OpenCL library {}", cl.library_name());
        Ok(cl)
    })
}

impl OpenCl {
    /// Probiert die Kandidaten der Reihe nach, der erste ladbare gewinnt.
    pub fn load(config: &LoaderConfig) -> Result<Self, LoadError> {
        Self::load_from(&config.candidates())
    }

    fn load_from(candidates: &[OsString]) -> Result<Self, LoadError> {
        let mut tried = Vec::with_capacity(candidates.len());
        let mut first_err = None;
        for candidate in candidates {
            let name = candidate.to_string_lossy().into_owned();
            // SAFETY: die Initialisierer des ICD-Loaders haben keine Vorbedingungen
            match unsafe { Library::new(candidate) } {
                Ok(lib) => return Self::bind(lib, name),
                Err(source) => {
                    log::debug!("cannot load {name}: {source}");
                    tried.push(name);
                    first_err.get_or_insert(source);
                }
            }
        }
        match first_err {
            Some(source) => Err(LoadError::Library { tried, source }),
            None => Err(LoadError::NoCandidates),
        }
    }

    fn bind(lib: Library, name: String) -> Result<Self, LoadError> {
        // SAFETY: die Typ-Aliase entsprechen den Prototypen aus cl.h
        unsafe {
            Ok(Self {
                get_platform_ids: symbol(&lib, &name, "clGetPlatformIDs")?,
                get_platform_info: symbol(&lib, &name, "clGetPlatformInfo")?,
                get_device_ids: symbol(&lib, &name, "clGetDeviceIDs")?,
                get_device_info: symbol(&lib, &name, "clGetDeviceInfo")?,
                name,
                _lib: lib,
            })
        }
    }

    pub fn library_name(&self) -> &str {
        &self.name
    }
}

unsafe fn symbol<T: Copy>(lib: &Library, name: &str, symbol: &'static str) -> Result<T, LoadError> {
    match unsafe { lib.get::<T>(symbol.as_bytes()) } {
        Ok(sym) => Ok(*sym),
        Err(source) => Err(LoadError::Symbol { symbol, name: name.to_owned(), source }),
    }
}

/// Slice → (Länge, Zeiger), `None` → (0, NULL).
fn raw_parts<T>(buf: Option<&mut [T]>) -> (usize, *mut T) {
    match buf {
        Some(buf) => (buf.len(), buf.as_mut_ptr()),
        None => (0, ptr::null_mut()),
    }
}

fn out_ptr<T>(out: Option<&mut T>) -> *mut T {
    out.map_or(ptr::null_mut(), |r| r as *mut T)
}

impl Driver for OpenCl {
    fn get_platform_ids(
        &self,
        platforms: Option<&mut [PlatformId]>,
        num_platforms: Option<&mut u32>,
    ) -> Status {
        let (len, buf) = raw_parts(platforms);
        let entries = u32::try_from(len).unwrap_or(u32::MAX);
        // SAFETY: `buf` zeigt auf `entries` gültige Elemente oder ist NULL
        unsafe { (self.get_platform_ids)(entries, buf, out_ptr(num_platforms)) }
    }

    fn get_platform_info(
        &self,
        platform: PlatformId,
        param: PlatformInfo,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status {
        let (len, buf) = raw_parts(value);
        // SAFETY: `buf` ist `len` Bytes groß oder NULL
        unsafe { (self.get_platform_info)(platform, param, len, buf.cast(), out_ptr(size_ret)) }
    }

    fn get_device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
        devices: Option<&mut [DeviceId]>,
        num_devices: Option<&mut u32>,
    ) -> Status {
        let (len, buf) = raw_parts(devices);
        let entries = u32::try_from(len).unwrap_or(u32::MAX);
        // SAFETY: wie bei get_platform_ids
        unsafe { (self.get_device_ids)(platform, device_type, entries, buf, out_ptr(num_devices)) }
    }

    fn get_device_info(
        &self,
        device: DeviceId,
        param: DeviceInfo,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status {
        let (len, buf) = raw_parts(value);
        // SAFETY: `buf` ist `len` Bytes groß oder NULL
        unsafe { (self.get_device_info)(device, param, len, buf.cast(), out_ptr(size_ret)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_reported() {
        let cfg = LoaderConfig { library: Some("/nonexistent/cl-caps/libOpenCL.so".into()) };
        match OpenCl::load(&cfg) {
            Err(LoadError::Library { tried, .. }) => {
                assert_eq!(tried, vec!["/nonexistent/cl-caps/libOpenCL.so".to_owned()]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loading a nonexistent library succeeded"),
        }
    }

    #[test]
    fn every_failed_candidate_is_listed() {
        let candidates = [
            OsString::from("/nonexistent/cl-caps/first.so"),
            OsString::from("/nonexistent/cl-caps/second.so"),
        ];
        let err = match OpenCl::load_from(&candidates) {
            Err(err) => err,
            Ok(_) => panic!("loading nonexistent libraries succeeded"),
        };
        assert_eq!(
            err.to_string(),
            "failed to load OpenCL library (tried /nonexistent/cl-caps/first.so, /nonexistent/cl-caps/second.so)"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn no_candidates() {
        assert!(matches!(OpenCl::load_from(&[]), Err(LoadError::NoCandidates)));
    }

    #[test]
    fn raw_parts_maps_none_to_null() {
        let (len, ptr) = raw_parts::<u8>(None);
        assert_eq!(len, 0);
        assert!(ptr.is_null());

        let mut buf = [0u8; 4];
        let (len, ptr) = raw_parts(Some(&mut buf[..]));
        assert_eq!(len, 4);
        assert!(!ptr.is_null());
    }
}
