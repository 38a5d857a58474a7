use cl_caps::{
    driver::{
        CL_DEVICE_AVAILABLE, CL_DEVICE_GLOBAL_MEM_SIZE, CL_DEVICE_NAME, CL_DEVICE_TYPE_ACCELERATOR,
        CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_CUSTOM, CL_DEVICE_TYPE_GPU, CL_PLATFORM_VENDOR,
    },
    fake::{Call, FakeDevice, FakeDriver, FakePlatform},
    report,
    status::{CL_INVALID_VALUE, CL_OUT_OF_RESOURCES},
    ClError,
};

fn run(driver: &FakeDriver) -> (String, Result<(), ClError>) {
    let mut out = Vec::new();
    let result = report(driver, &mut out);
    (String::from_utf8(out).unwrap(), result)
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).collect()
}

fn position(lines: &[&str], wanted: &str) -> usize {
    lines
        .iter()
        .position(|l| *l == wanted)
        .unwrap_or_else(|| panic!("line {wanted:?} missing in {lines:#?}"))
}

#[test]
fn single_gpu_system() {
    let driver = FakeDriver::new().with_platform(
        FakePlatform::new("ExampleCL").with_device(FakeDevice::new("TestDevice0", CL_DEVICE_TYPE_GPU)),
    );
    let (text, result) = run(&driver);
    result.unwrap();

    let lines = lines(&text);
    let count = position(&lines, "Number of OpenCL platforms: 1");
    let platform = position(&lines, "Platform name: ExampleCL");
    let device = position(&lines, "Device name: TestDevice0");
    let kind = position(&lines, "Device type: gpu");
    assert!(count < platform && platform < device && device < kind);
}

#[test]
fn zero_platforms_print_count_only() {
    let driver = FakeDriver::new();
    let (text, result) = run(&driver);
    result.unwrap();
    assert_eq!(text, "Number of OpenCL platforms: 0\n");
}

#[test]
fn zero_counts_reported_as_success() {
    let empty = FakeDriver::new().empty_as_success();
    let (text, result) = run(&empty);
    result.unwrap();
    assert_eq!(text, "Number of OpenCL platforms: 0\n");
    assert_eq!(empty.calls().len(), 1);

    let deviceless = FakeDriver::new().with_platform(FakePlatform::new("Lonely")).empty_as_success();
    let (text, result) = run(&deviceless);
    result.unwrap();
    assert!(text.ends_with("    Number of devices: 0\n"));
    let device_calls = deviceless.calls().into_iter().filter(|c| matches!(c.call, Call::DeviceIds(_))).count();
    assert_eq!(device_calls, 1);
}

#[test]
fn platform_without_devices_prints_no_device_lines() {
    let driver = FakeDriver::new()
        .with_platform(FakePlatform::new("Lonely"))
        .with_platform(FakePlatform::new("Busy").with_device(FakeDevice::new("cpu0", CL_DEVICE_TYPE_CPU)));
    let (text, result) = run(&driver);
    result.unwrap();

    let lines = lines(&text);
    let lonely = position(&lines, "Platform name: Lonely");
    let busy = position(&lines, "Platform #2/2");
    assert!(lines[lonely..busy].iter().all(|l| !l.starts_with("Device")));
    assert!(lines[lonely..busy].contains(&"Number of devices: 0"));
    assert_eq!(lines.iter().filter(|l| l.starts_with("Device name:")).count(), 1);
}

#[test]
fn unknown_device_types_are_labelled_unknown() {
    let driver = FakeDriver::new().with_platform(
        FakePlatform::new("p")
            .with_device(FakeDevice::new("custom", CL_DEVICE_TYPE_CUSTOM))
            .with_device(FakeDevice::new("mixed", CL_DEVICE_TYPE_CPU | CL_DEVICE_TYPE_GPU))
            .with_device(FakeDevice::new("acc", CL_DEVICE_TYPE_ACCELERATOR)),
    );
    let (text, result) = run(&driver);
    result.unwrap();

    let types: Vec<_> = lines(&text).into_iter().filter(|l| l.starts_with("Device type:")).collect();
    assert_eq!(types, vec!["Device type: unknown", "Device type: unknown", "Device type: accelerator"]);
}

#[test]
fn numeric_values_are_printed() {
    let driver = FakeDriver::new().with_platform(
        FakePlatform::new("p").with_device(
            FakeDevice::new("big", CL_DEVICE_TYPE_GPU)
                .with_global_mem_size(24 << 30)
                .with_max_compute_units(128)
                .unavailable(),
        ),
    );
    let (text, result) = run(&driver);
    result.unwrap();

    let lines = lines(&text);
    position(&lines, "Device global memory size: 25769803776");
    position(&lines, "Device max compute units: 128");
    position(&lines, "Device available: 0");
}

#[test]
fn every_info_buffer_matches_discovered_size() {
    let driver = FakeDriver::new().with_platform(
        FakePlatform::new("ExampleCL")
            .with_device(FakeDevice::new("TestDevice0", CL_DEVICE_TYPE_GPU))
            .with_device(FakeDevice::new("TestDevice1", CL_DEVICE_TYPE_CPU)),
    );
    let (_, result) = run(&driver);
    result.unwrap();

    let calls = driver.calls();
    assert!(calls.iter().all(|c| c.status == 0), "{calls:#?}");

    // jede Größenabfrage wird direkt vom Abruf mit genau dieser Größe gefolgt
    for pair in calls.windows(2) {
        let (query, fetch) = (&pair[0], &pair[1]);
        if query.buffer_len.is_none() && query.size_ret.is_some() {
            assert_eq!(fetch.call, query.call);
            assert_eq!(fetch.buffer_len, query.size_ret);
        }
    }
}

#[test]
fn failure_stops_all_further_output() {
    let driver = FakeDriver::new()
        .with_platform(
            FakePlatform::new("First")
                .with_device(FakeDevice::new("dev0", CL_DEVICE_TYPE_GPU))
                .with_device(FakeDevice::new("dev1", CL_DEVICE_TYPE_GPU)),
        )
        .with_platform(FakePlatform::new("Second").with_device(FakeDevice::new("dev2", CL_DEVICE_TYPE_CPU)))
        .fail_on(Call::DeviceInfo(FakeDriver::device_id(0, 0), CL_DEVICE_GLOBAL_MEM_SIZE), CL_OUT_OF_RESOURCES);

    let (text, result) = run(&driver);
    let err = result.unwrap_err();
    assert_eq!(err.code(), Some(CL_OUT_OF_RESOURCES));
    assert!(err.to_string().contains("CL_OUT_OF_RESOURCES"));
    assert!(err.to_string().contains("clGetDeviceInfo"));

    let lines = lines(&text);
    assert_eq!(lines.last(), Some(&"Device available: 1"));
    assert!(!text.contains("dev1"));
    assert!(!text.contains("Second"));

    // nach dem Fehler wird der Treiber nicht mehr gefragt
    let calls = driver.calls();
    assert_eq!(calls.last().map(|c| c.status), Some(CL_OUT_OF_RESOURCES));
}

#[test]
fn failing_platform_query_is_fatal() {
    let driver = FakeDriver::new()
        .with_platform(FakePlatform::new("p"))
        .fail_on(Call::PlatformInfo(FakeDriver::platform_id(0), CL_PLATFORM_VENDOR), CL_INVALID_VALUE);
    let (text, result) = run(&driver);

    assert_eq!(result.unwrap_err().code(), Some(CL_INVALID_VALUE));
    assert!(text.ends_with("Platform name: p\n"));
}

#[test]
fn failing_device_enumeration_is_fatal() {
    let driver = FakeDriver::new()
        .with_platform(FakePlatform::new("p").with_device(FakeDevice::new("d", CL_DEVICE_TYPE_GPU)))
        .fail_on(Call::DeviceIds(FakeDriver::platform_id(0)), CL_OUT_OF_RESOURCES);
    let (text, result) = run(&driver);

    assert_eq!(result.unwrap_err().code(), Some(CL_OUT_OF_RESOURCES));
    assert!(!text.contains("Device"));
}

#[test]
fn failing_device_name_leaves_no_device_lines() {
    let driver = FakeDriver::new()
        .with_platform(FakePlatform::new("p").with_device(FakeDevice::new("d", CL_DEVICE_TYPE_GPU)))
        .fail_on(Call::DeviceInfo(FakeDriver::device_id(0, 0), CL_DEVICE_NAME), CL_OUT_OF_RESOURCES);
    let (text, result) = run(&driver);

    assert!(result.is_err());
    assert!(text.trim_end().ends_with("Device #1/1"));
}

#[test]
fn available_flag_is_queried_with_four_bytes() {
    let driver = FakeDriver::new()
        .with_platform(FakePlatform::new("p").with_device(FakeDevice::new("d", CL_DEVICE_TYPE_GPU)));
    let (_, result) = run(&driver);
    result.unwrap();

    let available = driver
        .calls()
        .into_iter()
        .find(|c| c.call == Call::DeviceInfo(FakeDriver::device_id(0, 0), CL_DEVICE_AVAILABLE))
        .expect("CL_DEVICE_AVAILABLE not queried");
    assert_eq!(available.buffer_len, Some(4));
}
