use gpu_jobstats::{
    reduce::reduce_run,
    scan::Run,
    segment::{segment, IdleWindow},
    Sample, SampleTable, Settings,
};

fn run_of(utils: &[f64]) -> (SampleTable, Run) {
    let t: SampleTable = utils
        .iter()
        .enumerate()
        .map(|(i, &u)| Sample::new(i as i64 * 300, "0000:3B:00.0", u, "42.1", "2501"))
        .collect::<Vec<_>>()
        .into();
    let run = Run::new(0, utils.len() - 1);
    (t, run)
}

#[test]
fn idle_lead_and_tail_around_compute() {
    let (t, run) = run_of(&[0.0, 0.0, 0.0, 80.0, 80.0, 0.0, 0.0]);
    let (w, stats) = reduce_run(&t, run, &Settings::default());
    assert_eq!(w.idle_lead, 15.0);
    assert_eq!(w.idle_tail, 10.0);
    assert_eq!(w.idle_mid, 0.0);
    assert_eq!((w.compute_lo, w.compute_hi), (3, 4));
    assert_eq!(stats.comp_time, 10.0);
    assert_eq!(stats.tot_time, 35.0);
}

#[test]
fn all_idle_run_spans_whole_window() {
    for len in 1..6 {
        let utils = vec![2.0; len];
        let under = vec![true; len];
        let run = Run::new(10, 10 + len - 1);
        let w = segment(run, &under, 5.0);
        assert_eq!(
            w,
            IdleWindow {
                idle_lead: 0.0,
                idle_tail: 0.0,
                idle_mid: 0.0,
                compute_lo: 10,
                compute_hi: 10 + len - 1,
            }
        );
        assert_eq!(w.sample_count(), utils.len());
    }
}

#[test]
fn never_idle_run_has_no_idle() {
    let (t, run) = run_of(&[50.0, 60.0, 70.0, 90.0]);
    let (w, stats) = reduce_run(&t, run, &Settings::default());
    assert_eq!((w.idle_lead, w.idle_tail, w.idle_mid), (0.0, 0.0, 0.0));
    assert_eq!(stats.comp_time, 20.0);
    assert_eq!(stats.comp_time, stats.tot_time);
}

#[test]
fn single_active_sample_is_its_own_window() {
    let w = segment(Run::new(4, 4), &[false], 5.0);
    assert_eq!((w.compute_lo, w.compute_hi), (4, 4));
    assert_eq!((w.idle_lead, w.idle_tail, w.idle_mid), (0.0, 0.0, 0.0));
}

#[test]
fn first_flip_before_last_sample() {
    let w = segment(Run::new(0, 2), &[true, true, false], 5.0);
    assert_eq!(w.idle_lead, 10.0);
    assert_eq!(w.idle_tail, 0.0);
    assert_eq!((w.compute_lo, w.compute_hi), (2, 2));
}

#[test]
fn idle_gaps_inside_window_count_as_mid() {
    let under = [true, false, true, true, false, true, false, true];
    let w = segment(Run::new(100, 107), &under, 5.0);
    assert_eq!(w.idle_lead, 5.0);
    assert_eq!(w.idle_tail, 5.0);
    assert_eq!((w.compute_lo, w.compute_hi), (101, 106));
    assert_eq!(w.idle_mid, 15.0);
}

#[test]
fn threshold_is_inclusive() {
    let (t, run) = run_of(&[5.0, 5.1, 5.0]);
    let (w, _) = reduce_run(&t, run, &Settings::default());
    assert_eq!((w.compute_lo, w.compute_hi), (1, 1));
    assert_eq!(w.idle_lead, 5.0);
    assert_eq!(w.idle_tail, 5.0);
}

#[test]
fn interval_scales_durations() {
    let (t, run) = run_of(&[0.0, 40.0, 0.0, 0.0]);
    let settings = Settings {
        interval_minutes: 1.0,
        ..Settings::default()
    };
    let (w, stats) = reduce_run(&t, run, &settings);
    assert_eq!(w.idle_lead, 1.0);
    assert_eq!(w.idle_tail, 2.0);
    assert_eq!(stats.comp_time, 1.0);
    assert!((stats.comp_tot - 0.4).abs() < 1e-12);
}
