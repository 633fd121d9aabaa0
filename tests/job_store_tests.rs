//! Integration tests for the line-oriented job record.

use sequential_design::storage::{JobStore, MemoryStorage, TextJobStore};
use sequential_design::{Error, Job, JobStatus, ParameterSpace, Variable};

fn temp_path() -> std::path::PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut path = std::env::temp_dir();
    path.push(format!(
        "sequential_design_jobs_test_{}_{}.txt",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    path
}

fn space() -> ParameterSpace {
    ParameterSpace::new(vec![
        Variable::float("x", 0.0, 1.0).unwrap(),
        Variable::int("y", 0, 10).unwrap(),
        Variable::categorical("kernel", ["rbf", "matern"]).unwrap(),
    ])
    .unwrap()
}

fn job(space: &ParameterSpace, v: [f64; 3], value: Option<f64>) -> Job {
    let params = space.paramify(&v).unwrap();
    value.map_or_else(|| Job::pending(params.clone()), |x| Job::completed(params.clone(), x))
}

#[test]
fn missing_file_returns_empty() {
    let store = TextJobStore::new(temp_path());
    let log = store.load(&space()).unwrap();
    assert!(log.jobs.is_empty());
    assert!(log.skipped.is_empty());
}

#[test]
fn save_then_load_preserves_every_job() {
    let path = temp_path();
    let space = space();
    let store = TextJobStore::new(&path);
    let jobs = vec![
        job(&space, [0.1, 2.0, 0.0], Some(3.2)),
        job(&space, [0.123_456_789_012_345_67, 10.0, 1.0], Some(-1e-12)),
        job(&space, [0.9, 9.0, 1.0], None),
        job(&space, [1.0 / 3.0, 0.0, 0.0], Some(1e300)),
    ];

    store.save(&space, &jobs).unwrap();
    let loaded = store.load(&space).unwrap();
    assert_eq!(loaded.jobs, jobs);
    assert!(loaded.skipped.is_empty());

    std::fs::remove_file(&path).ok();
}

#[test]
fn record_format_is_one_line_per_job() {
    let path = temp_path();
    let space = space();
    let store = TextJobStore::new(&path);
    let jobs = vec![
        job(&space, [0.1, 2.0, 1.0], Some(3.2)),
        job(&space, [0.9, 9.0, 0.0], None),
    ];
    store.save(&space, &jobs).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "3.2 1 0.1 2.0 1.0\nP P 0.9 9.0 0.0\n");

    std::fs::remove_file(&path).ok();
}

#[test]
fn first_token_discriminates_pending_from_complete() {
    let path = temp_path();
    std::fs::write(
        &path,
        "P P 0.5 1.0 0.0\n4 1 0.5 1.0 0.0\nnan 1 0.5 1.0 0.0\nX Y 0.5 1.0 0.0\n",
    )
    .unwrap();

    let log = TextJobStore::new(&path).load(&space()).unwrap();
    let statuses: Vec<JobStatus> = log.jobs.iter().map(Job::status).collect();
    assert_eq!(statuses.len(), 4);
    assert_eq!(statuses[0], JobStatus::Pending);
    assert_eq!(statuses[1], JobStatus::Complete { value: 4.0 });
    assert!(log.jobs[2].value().is_some_and(f64::is_nan));
    assert_eq!(statuses[3], JobStatus::Pending);

    std::fs::remove_file(&path).ok();
}

#[test]
fn malformed_lines_are_skipped_and_reading_continues() {
    let path = temp_path();
    std::fs::write(
        &path,
        "3.2 1 0.1 2.0 0.0\nP\n\nP P 0.5\n1 1 0.2 twelve 0.0\nP P 0.9 9.0 1.0\n",
    )
    .unwrap();

    let log = TextJobStore::new(&path).load(&space()).unwrap();
    assert_eq!(log.jobs.len(), 2);
    assert_eq!(log.jobs[0].value(), Some(3.2));
    assert!(log.jobs[1].is_pending());

    let skipped: Vec<usize> = log.skipped.iter().map(|m| m.line_number).collect();
    assert_eq!(skipped, [2, 4, 5]);

    std::fs::remove_file(&path).ok();
}

#[test]
fn save_replaces_previous_record() {
    let path = temp_path();
    let space = space();
    let store = TextJobStore::new(&path);

    let first = vec![job(&space, [0.1, 1.0, 0.0], None); 3];
    store.save(&space, &first).unwrap();
    let second = vec![job(&space, [0.2, 2.0, 1.0], Some(1.0))];
    store.save(&space, &second).unwrap();

    assert_eq!(store.load(&space).unwrap().jobs, second);

    // No temp file is left next to the record.
    let tmp = path.with_file_name(format!(
        ".{}.tmp",
        path.file_name().unwrap().to_string_lossy()
    ));
    assert!(!tmp.exists());

    std::fs::remove_file(&path).ok();
}

#[test]
fn invalid_job_is_not_written() {
    let path = temp_path();
    let space = space();
    let store = TextJobStore::new(&path);
    let good = vec![job(&space, [0.1, 1.0, 0.0], Some(2.0))];
    store.save(&space, &good).unwrap();

    let mut bad = job(&space, [0.1, 1.0, 0.0], None);
    bad.params.remove("kernel");
    let err = store.save(&space, &[good[0].clone(), bad]).unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
    assert_eq!(store.load(&space).unwrap().jobs, good);

    std::fs::remove_file(&path).ok();
}

#[test]
fn unreadable_record_is_a_storage_error() {
    let dir = temp_path();
    std::fs::create_dir_all(&dir).unwrap();
    let err = TextJobStore::new(&dir).load(&space()).unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn memory_storage_validates_on_save() {
    let space = space();
    let store = MemoryStorage::new();
    let jobs = vec![job(&space, [0.3, 3.0, 1.0], None)];
    store.save(&space, &jobs).unwrap();
    assert_eq!(store.load(&space).unwrap().jobs, jobs);

    let mut bad = jobs[0].clone();
    bad.params.insert("x".into(), 2.0.into());
    assert!(store.save(&space, &[bad]).is_err());
    assert_eq!(store.jobs(), jobs);
}

#[test]
fn save_log_writes_skipped_lines_back_in_place() {
    let path = temp_path();
    let space = space();
    std::fs::write(
        &path,
        "bogus header\n3.2 1 0.1 2.0 0.0\n4.0 1 1.5 3.0 0.0\nP P 0.9 9.0 1.0\nP\n",
    )
    .unwrap();
    let store = TextJobStore::new(&path);

    let mut log = store.load(&space).unwrap();
    assert_eq!(log.jobs.len(), 2);
    assert_eq!(log.skipped[1].raw, "4.0 1 1.5 3.0 0.0");
    assert_eq!(log.skipped[1].job_position, 1);

    log.jobs[1].complete(0.5).unwrap();
    log.jobs.push(job(&space, [0.4, 4.0, 0.0], None));
    store.save_log(&space, &log).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "bogus header\n3.2 1 0.1 2.0 0.0\n4.0 1 1.5 3.0 0.0\n0.5 1 0.9 9.0 1.0\nP\nP P 0.4 4.0 0.0\n"
    );

    // Job positions are unchanged on the next load.
    let reloaded = store.load(&space).unwrap();
    assert_eq!(reloaded.jobs, log.jobs);
    assert_eq!(reloaded.skipped.len(), 3);

    std::fs::remove_file(&path).ok();
}
