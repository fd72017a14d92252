use clap::Parser;
use gpu_jobstats::cli::{dispatch, Args};

#[test]
fn reduce_writes_table_and_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("samples.csv");
    std::fs::write(
        &input,
        "time,device,util,job,rundate\n\
         0,gpu0,0,12345.undefined,2501\n\
         300,gpu0,0,12345.undefined,2501\n\
         600,gpu0,0,12345.undefined,2501\n\
         900,gpu0,80,12345.undefined,2501\n\
         1200,gpu0,80,12345.undefined,2501\n\
         1500,gpu0,0,12345.undefined,2501\n\
         1800,gpu0,0,12345.undefined,2501\n",
    )
    .expect("write input");

    let out_dir = dir.path().join("out");
    let config = dir.path().join("cfg.toml");
    std::fs::write(&config, "[global]\nprint_summary = false\nstrict = true\n").expect("write cfg");

    let args = Args::parse_from([
        "gpu-jobstats",
        "--config",
        config.to_str().unwrap(),
        "--log-level",
        "warn",
        "reduce",
        "--input",
        input.to_str().unwrap(),
        "--out-dir",
        out_dir.to_str().unwrap(),
    ]);
    dispatch(args).expect("reduce");

    let table = std::fs::read_to_string(out_dir.join("job_stats.csv")).expect("read table");
    let mut lines = table.lines();
    assert!(lines.next().unwrap().starts_with("job,device,"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("12345.0.2501,0,gpu0,12345,0,2501,15.0,10.0,0.0,"));
    assert!(lines.next().is_none());

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("summary.json")).unwrap())
            .expect("summary json");
    assert_eq!(summary["runs"], 1);
    assert_eq!(summary["records"], 1);
    assert_eq!(summary["violations"].as_array().unwrap().len(), 0);
}
