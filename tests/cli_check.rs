use clap::Parser;
use gpu_jobstats::{
    cli::{check_table, dispatch, Args},
    config::Config,
    scan::Run,
};

const OUT_OF_ORDER: &str = "time,device,util,job,rundate\n\
    0,gpu0,50,1.undefined,2501\n\
    0,gpu1,50,2.undefined,2501\n\
    300,gpu0,50,3.undefined,2501\n\
    600,gpu0,50,4.undefined,2501\n";

fn write_input(dir: &std::path::Path) -> std::path::PathBuf {
    let input = dir.join("samples.csv");
    std::fs::write(&input, OUT_OF_ORDER).expect("write input");
    input
}

#[test]
fn check_reports_runs_and_violations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path());

    let report = check_table(&Config::default(), &input).expect("check");
    assert_eq!(report.samples, 4);
    assert_eq!(
        report.runs,
        vec![Run::new(0, 0), Run::new(1, 1), Run::new(2, 2), Run::new(3, 3)]
    );

    let json = serde_json::to_value(&report).expect("json");
    let violations = json["violations"].as_array().expect("violations array");
    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0]["violation"]["kind"], "non_contiguous_device");
    assert_eq!(violations[0]["violation"]["device"], "gpu0");
    assert_eq!(violations[1]["run"]["lo"], 3);
}

#[test]
fn strict_check_fails_on_violations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path());
    let config = dir.path().join("cfg.toml");
    std::fs::write(&config, "[global]\nprint_summary = false\nstrict = true\n").expect("write cfg");

    let args = Args::parse_from([
        "gpu-jobstats",
        "--config",
        config.to_str().unwrap(),
        "--log-level",
        "error",
        "check",
        "--input",
        input.to_str().unwrap(),
    ]);
    assert!(dispatch(args).is_err());
}
