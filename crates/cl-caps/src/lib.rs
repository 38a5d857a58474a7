// ─── Feature‑Module ───────────────────────────────────────────────────
#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

// ─── Kern ─────────────────────────────────────────────────────────────
pub mod config;
pub mod device_type;
pub mod driver;
pub mod loader;
pub mod query;
pub mod report;
pub mod status;

pub use config::LoaderConfig;
pub use device_type::DeviceKind;
pub use driver::{DeviceId, Driver, PlatformId};
pub use loader::{init, LoadError, OpenCl};
pub use report::report;
pub use status::Status;

// ─── Fehler‑Typ & cl_try! ─────────────────────────────────────────────
#[derive(thiserror::Error, Debug)]
pub enum ClError {
    #[error("OpenCL error code {code} ({name}) encountered at {file}:{line} in {call}")]
    Api {
        code: Status,
        name: &'static str,
        call: &'static str,
        file: &'static str,
        line: u32,
    },
    #[error("Can't init OpenCL driver")]
    Load(#[from] LoadError),
    #[error("failed to write report")]
    Io(#[from] std::io::Error),
}

impl ClError {
    pub fn api(code: Status, call: &'static str, file: &'static str, line: u32) -> Self {
        let name = status::name(code).unwrap_or("UNKNOWN");
        ClError::Api { code, name, call, file, line }
    }

    /// Statuscode, falls der Fehler von einem Treiberaufruf stammt
    pub fn code(&self) -> Option<Status> {
        match self {
            ClError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Makro: wandelt den Status eines Treiberaufrufs in `Err(ClError::Api)`,
/// mit Datei und Zeile der Aufrufstelle
macro_rules! cl_try {
    ($call:expr, $expr:expr) => {
        let status = $expr;
        if status != $crate::status::CL_SUCCESS {
            return Err($crate::ClError::api(status, $call, file!(), line!()));
        }
    };
}
pub(crate) use cl_try;
