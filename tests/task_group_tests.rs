use sequential_design::{
    Error, Job, NAN_TASK, ParameterSpace, Task, TaskGroup, TaskKind, TaskOptions, Variable,
};

fn group() -> TaskGroup {
    let space = ParameterSpace::new(vec![
        Variable::float("x", 0.0, 1.0).unwrap(),
        Variable::int("y", 0, 10).unwrap(),
    ])
    .unwrap();
    let tasks = TaskOptions::from([("main".to_string(), Task::objective("main"))]);
    TaskGroup::new(&tasks, space).unwrap()
}

fn completed(group: &TaskGroup, x: f64, y: f64, value: f64) -> Job {
    Job::completed(group.paramify(&[x, y]).unwrap(), value)
}

fn row(matrix: &nalgebra::DMatrix<f64>, i: usize) -> Vec<f64> {
    matrix.row(i).iter().copied().collect()
}

#[test]
fn populate_partitions_complete_and_pending() {
    let mut group = group();
    let jobs = vec![
        completed(&group, 0.1, 2.0, 3.2),
        Job::pending(group.paramify(&[0.9, 9.0]).unwrap()),
        completed(&group, 0.4, 7.0, -1.0),
    ];
    group.populate(&jobs).unwrap();

    assert_eq!(group.inputs().shape(), (2, 2));
    assert_eq!(row(group.inputs(), 0), [0.1, 2.0]);
    assert_eq!(row(group.inputs(), 1), [0.4, 7.0]);
    assert_eq!(group.pending().shape(), (1, 2));
    assert_eq!(row(group.pending(), 0), [0.9, 9.0]);
    assert_eq!(group.values("main").unwrap().as_slice(), &[3.2, -1.0]);
    assert_eq!(group.task_inputs("main").unwrap(), group.inputs());
}

#[test]
fn nan_outcomes_move_to_validity_task() {
    let mut group = group();
    let jobs = vec![
        completed(&group, 0.1, 1.0, 1.0),
        completed(&group, 0.2, 2.0, f64::NAN),
        completed(&group, 0.3, 3.0, 3.0),
        completed(&group, 0.4, 4.0, f64::INFINITY),
    ];
    group.populate(&jobs).unwrap();
    assert!(group.add_nan_task_if_nans());

    // Primary task keeps only finite outcomes, with aligned inputs.
    assert_eq!(group.values("main").unwrap().as_slice(), &[1.0, 3.0]);
    let main_inputs = group.task_inputs("main").unwrap();
    assert_eq!(main_inputs.shape(), (2, 2));
    assert_eq!(row(main_inputs, 0), [0.1, 1.0]);
    assert_eq!(row(main_inputs, 1), [0.3, 3.0]);

    // Validity task covers every completed trial.
    let nan_task = group.task(NAN_TASK).unwrap();
    assert_eq!(nan_task.kind(), TaskKind::Constraint);
    assert_eq!(
        group.values(NAN_TASK).unwrap().as_slice(),
        &[1.0, 0.0, 1.0, 0.0]
    );
    assert_eq!(group.task_inputs(NAN_TASK).unwrap(), group.inputs());

    // The group-level matrix still holds every completed trial.
    assert_eq!(group.num_complete(), 4);
}

#[test]
fn all_failed_history_leaves_empty_primary_task() {
    let mut group = group();
    let jobs = vec![completed(&group, 0.1, 1.0, f64::NAN)];
    group.populate(&jobs).unwrap();
    assert!(group.add_nan_task_if_nans());
    assert_eq!(group.values("main").unwrap().len(), 0);
    assert_eq!(group.task_inputs("main").unwrap().shape(), (0, 2));
    assert_eq!(group.values(NAN_TASK).unwrap().as_slice(), &[0.0]);
}

#[test]
fn unknown_task_names_fail() {
    let group = group();
    assert!(matches!(group.values("cost"), Err(Error::UnknownTask(ref t)) if t == "cost"));
    assert!(matches!(group.task_inputs("cost"), Err(Error::UnknownTask(_))));
}
