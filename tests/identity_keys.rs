use gpu_jobstats::identity::{composite_key, split_label, DeviceCodes, JobIdentity};

#[test]
fn undefined_task_becomes_zero() {
    assert_eq!(composite_key("12345.undefined", "2501"), "12345.0.2501");
}

#[test]
fn task_array_id_is_kept() {
    let id = JobIdentity::resolve("777.12", "2410", 3);
    assert_eq!(id.job_id, "777");
    assert_eq!(id.task_id, "12");
    assert_eq!(id.run_date, "2410");
    assert_eq!(id.composite_key, "777.12.2410");
    assert_eq!(id.device_code, 3);
}

#[test]
fn label_without_task_defaults_to_zero() {
    assert_eq!(split_label("555"), ("555", "0"));
}

#[test]
fn device_codes_follow_first_appearance() {
    let codes = DeviceCodes::factorize(["b", "a", "b", "c", "a"]);
    assert_eq!(codes.codes, vec![0, 1, 0, 2, 1]);
    assert_eq!(codes.uniques, vec!["b", "a", "c"]);
}

#[test]
fn no_devices_no_codes() {
    let codes = DeviceCodes::factorize(std::iter::empty());
    assert!(codes.codes.is_empty());
    assert!(codes.uniques.is_empty());
}
