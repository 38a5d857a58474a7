//! Textbericht: Plattformen, darunter eingerückt ihre Geräte.
//!
//! Jede Zeile wird geschrieben, sobald ihr Wert feststeht. Bricht ein
//! Treiberaufruf ab, fehlen damit genau die Zeilen danach.

use std::io::Write;

use crate::{
    driver::*,
    query::{self, Numeric},
    ClError,
};

const PLATFORM_INDENT: &str = "    ";
const DEVICE_INDENT: &str = "        ";

const PLATFORM_ATTRS: &[(&str, PlatformInfo)] = &[
    ("name", CL_PLATFORM_NAME),
    ("vendor", CL_PLATFORM_VENDOR),
    ("version", CL_PLATFORM_VERSION),
    ("profile", CL_PLATFORM_PROFILE),
];

#[derive(Debug, Clone, Copy)]
enum Attr {
    Text(DeviceInfo),
    Number(Numeric),
    Kind,
}

const DEVICE_ATTRS: &[(&str, Attr)] = &[
    ("name", Attr::Text(CL_DEVICE_NAME)),
    ("type", Attr::Kind),
    ("vendor", Attr::Text(CL_DEVICE_VENDOR)),
    ("version", Attr::Text(CL_DEVICE_VERSION)),
    ("opencl_c_version", Attr::Text(CL_DEVICE_OPENCL_C_VERSION)),
    ("available", Attr::Number(query::DEVICE_AVAILABLE)),
    ("global memory size", Attr::Number(query::DEVICE_GLOBAL_MEM_SIZE)),
    ("local memory size", Attr::Number(query::DEVICE_LOCAL_MEM_SIZE)),
    ("max compute units", Attr::Number(query::DEVICE_MAX_COMPUTE_UNITS)),
    ("address bits", Attr::Number(query::DEVICE_ADDRESS_BITS)),
    ("max clock", Attr::Number(query::DEVICE_MAX_CLOCK_FREQUENCY)),
];

/// Schreibt den vollständigen Bericht nach `out`.
///
/// Der erste fehlgeschlagene Treiberaufruf beendet den Bericht mit
/// [`ClError::Api`], weitere Plattformen oder Geräte werden nicht mehr
/// abgefragt.
pub fn report<D, W>(driver: &D, out: &mut W) -> Result<(), ClError>
where
    D: Driver + ?Sized,
    W: Write + ?Sized,
{
    let platforms = query::platform_ids(driver)?;
    writeln!(out, "Number of OpenCL platforms: {}", platforms.len())?;

    for (index, &platform) in platforms.iter().enumerate() {
        writeln!(out, "Platform #{}/{}", index + 1, platforms.len())?;
        report_platform(driver, platform, out)?;
    }
    out.flush()?;
    Ok(())
}

fn report_platform<D, W>(driver: &D, platform: PlatformId, out: &mut W) -> Result<(), ClError>
where
    D: Driver + ?Sized,
    W: Write + ?Sized,
{
    for &(label, param) in PLATFORM_ATTRS {
        let value = query::platform_string(driver, platform, param)?;
        writeln!(out, "{PLATFORM_INDENT}Platform {label}: {value}")?;
    }

    let devices = query::device_ids(driver, platform, CL_DEVICE_TYPE_ALL)?;
    writeln!(out, "{PLATFORM_INDENT}Number of devices: {}", devices.len())?;

    for (index, &device) in devices.iter().enumerate() {
        writeln!(out, "{PLATFORM_INDENT}Device #{}/{}", index + 1, devices.len())?;
        report_device(driver, device, out)?;
    }
    Ok(())
}

fn report_device<D, W>(driver: &D, device: DeviceId, out: &mut W) -> Result<(), ClError>
where
    D: Driver + ?Sized,
    W: Write + ?Sized,
{
    for &(label, attr) in DEVICE_ATTRS {
        match attr {
            Attr::Text(param) => {
                let value = query::device_string(driver, device, param)?;
                writeln!(out, "{DEVICE_INDENT}Device {label}: {value}")?;
            }
            Attr::Number(numeric) => {
                let value = query::device_numeric(driver, device, numeric)?;
                writeln!(out, "{DEVICE_INDENT}Device {label}: {value}")?;
            }
            Attr::Kind => {
                let kind = query::device_kind(driver, device)?;
                writeln!(out, "{DEVICE_INDENT}Device {label}: {kind}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeDevice, FakeDriver, FakePlatform};

    fn render(driver: &FakeDriver) -> String {
        let mut out = Vec::new();
        report(driver, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn device_block_layout() {
        let driver = FakeDriver::new().with_platform(
            FakePlatform::new("ExampleCL").with_device(FakeDevice::new("TestDevice0", CL_DEVICE_TYPE_GPU)),
        );
        let expected = "\
Number of OpenCL platforms: 1
Platform #1/1
    Platform name: ExampleCL
    Platform vendor: Example Vendor
    Platform version: OpenCL 3.0 Example
    Platform profile: FULL_PROFILE
    Number of devices: 1
    Device #1/1
        Device name: TestDevice0
        Device type: gpu
        Device vendor: Example Vendor
        Device version: OpenCL 3.0
        Device opencl_c_version: OpenCL C 1.2
        Device available: 1
        Device global memory size: 4294967296
        Device local memory size: 65536
        Device max compute units: 16
        Device address bits: 64
        Device max clock: 1500
";
        assert_eq!(render(&driver), expected);
    }

    #[test]
    fn zero_platforms() {
        assert_eq!(render(&FakeDriver::new()), "Number of OpenCL platforms: 0\n");
    }
}
