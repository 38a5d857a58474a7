//! Konfiguration aus der Umgebung. Kommandozeilenargumente gibt es keine.

use std::{env, ffi::OsString};

/// Überschreibt die Suche nach der OpenCL-Bibliothek mit einem festen Pfad.
pub const LIBRARY_ENV: &str = "CL_CAPS_OPENCL_LIB";

#[cfg(target_os = "windows")]
const DEFAULT_LIBRARIES: &[&str] = &["OpenCL.dll"];

#[cfg(target_os = "macos")]
const DEFAULT_LIBRARIES: &[&str] = &[
    "/System/Library/Frameworks/OpenCL.framework/OpenCL",
    "libOpenCL.dylib",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const DEFAULT_LIBRARIES: &[&str] = &["libOpenCL.so.1", "libOpenCL.so"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Explizite Bibliothek, `None` = Standardnamen der Plattform
    pub library: Option<OsString>,
}

impl LoaderConfig {
    pub fn from_env() -> Self {
        Self::from_var(env::var_os(LIBRARY_ENV))
    }

    fn from_var(value: Option<OsString>) -> Self {
        Self { library: value.filter(|v| !v.is_empty()) }
    }

    /// Bibliotheksnamen in der Reihenfolge, in der sie probiert werden.
    pub fn candidates(&self) -> Vec<OsString> {
        match &self.library {
            Some(lib) => vec![lib.clone()],
            None => DEFAULT_LIBRARIES.iter().map(OsString::from).collect(),
        }
    }
}
