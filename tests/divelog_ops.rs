use chrono::NaiveDateTime;

use divelog::{
    core::log::{DiveLog, StoreError},
    dive::Dive,
    record::DiveRecord,
    types::DATE_TIME_LAYOUT,
};

fn datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATE_TIME_LAYOUT).expect("datetime")
}

fn dive(s: &str) -> Dive {
    Dive::new(datetime(s))
}

fn order(log: &DiveLog) -> Vec<String> {
    log.all()
        .iter()
        .map(|d| d.record().date_time.clone())
        .collect()
}

fn assert_positions(log: &DiveLog) {
    for (ix, d) in log.all().iter().enumerate() {
        assert_eq!(d.position(), Some(ix), "position of {}", d.id());
    }
}

#[test]
fn out_of_order_insert_sorts_and_renumbers_once() {
    let mut log = DiveLog::new();

    log.insert(dive("2023-04-03T10:30")).expect("insert a");
    assert!(!log.is_renumbered());
    log.insert(dive("2023-04-04T10:00")).expect("insert b");
    assert!(!log.is_renumbered());
    log.insert(dive("2023-04-03T13:05")).expect("insert c");

    assert_eq!(
        order(&log),
        vec!["2023-04-03T10:30", "2023-04-03T13:05", "2023-04-04T10:00"]
    );
    assert_positions(&log);
    assert!(log.is_renumbered());
    assert!(!log.is_renumbered());

    let c = log.find("20230403T1305").expect("find c");
    assert_eq!(c.num(), Some(2));
    assert_eq!(log.find("20230404T1000").and_then(Dive::num), Some(3));
}

#[test]
fn insert_at_front_moves_every_dive() {
    let mut log = DiveLog::new();
    log.insert(dive("2024-02-02T09:00")).expect("insert");
    log.insert(dive("2024-02-03T09:00")).expect("insert");
    log.insert(dive("2024-02-01T09:00")).expect("insert");

    assert_eq!(log.all()[0].id(), "20240201T0900");
    assert_positions(&log);
    assert!(log.is_renumbered());
}

#[test]
fn rejects_duplicate_and_unidentified_dives() {
    let mut log = DiveLog::new();
    log.insert(dive("2024-02-01T09:00")).expect("insert");

    assert_eq!(
        log.insert(dive("2024-02-01T09:00")),
        Err(StoreError::AlreadyExists("20240201T0900".to_string()))
    );
    assert_eq!(log.insert(Dive::empty()), Err(StoreError::Unidentified));
    assert_eq!(log.len(), 1);
    assert!(!log.is_renumbered());
}

#[test]
fn delete_tail_does_not_renumber() {
    let mut log = DiveLog::new();
    log.insert(dive("2024-02-01T09:00")).expect("insert");
    log.insert(dive("2024-02-02T09:00")).expect("insert");

    assert!(log.delete("20240202T0900"));
    assert_eq!(log.len(), 1);
    assert!(!log.is_renumbered());
}

#[test]
fn delete_middle_shifts_later_dives() {
    let mut log = DiveLog::new();
    for s in ["2024-02-01T09:00", "2024-02-02T09:00", "2024-02-03T09:00"] {
        log.insert(dive(s)).expect("insert");
    }

    assert!(log.delete("20240202T0900"));
    assert_eq!(order(&log), vec!["2024-02-01T09:00", "2024-02-03T09:00"]);
    assert_positions(&log);
    assert_eq!(log.find("20240203T0900").and_then(Dive::num), Some(2));
    assert!(log.is_renumbered());
    assert!(log.find("20240202T0900").is_none());
}

#[test]
fn delete_absent_changes_nothing() {
    let mut log = DiveLog::new();
    log.insert(dive("2024-02-01T09:00")).expect("insert");
    log.insert(dive("2024-02-02T09:00")).expect("insert");
    let before = order(&log);

    assert!(!log.delete("20990101T0000"));
    assert_eq!(order(&log), before);
    assert!(!log.is_renumbered());
}

#[test]
fn replace_keeps_identity_and_reorders_by_new_time() {
    let mut log = DiveLog::new();
    for s in ["2024-02-01T09:00", "2024-02-02T09:00", "2024-02-03T09:00"] {
        log.insert(dive(s)).expect("insert");
    }

    let mut updated = dive("2024-02-04T09:00");
    updated.record_mut().site = "Vrmac".to_string();
    log.replace("20240201T0900", updated).expect("replace");

    let all = log.all();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].id(), "20240201T0900");
    assert_eq!(all[2].record().site, "Vrmac");
    assert_eq!(all[2].record().date_time, "2024-02-04T09:00");
    assert_positions(&log);
    assert!(log.is_renumbered());
}

#[test]
fn replace_onto_taken_start_time_is_rejected() {
    let mut log = DiveLog::new();
    log.insert(dive("2024-02-01T09:00")).expect("insert");
    log.insert(dive("2024-02-02T09:00")).expect("insert");

    assert_eq!(
        log.replace("20240201T0900", dive("2024-02-02T09:00")),
        Err(StoreError::AlreadyExists("20240202T0900".to_string()))
    );
    assert_eq!(order(&log), vec!["2024-02-01T09:00", "2024-02-02T09:00"]);
    assert_positions(&log);
    assert!(!log.is_renumbered());

    // Same start time as the dive being replaced is fine.
    let mut edited = dive("2024-02-01T09:00");
    edited.record_mut().site = "Ada".to_string();
    log.replace("20240201T0900", edited).expect("replace in place");
    assert_eq!(log.all()[0].record().site, "Ada");
}

#[test]
fn insert_at_time_moved_to_by_replace_is_rejected() {
    let mut log = DiveLog::new();
    log.insert(dive("2024-02-01T09:00")).expect("insert");
    log.replace("20240201T0900", dive("2024-02-05T09:00"))
        .expect("replace");

    // The moved dive still answers to its old id but owns the new start time.
    assert_eq!(
        log.insert(dive("2024-02-05T09:00")),
        Err(StoreError::AlreadyExists("20240201T0900".to_string()))
    );
    assert_eq!(log.len(), 1);
}

#[test]
fn insert_rewrites_edited_date_time_from_start_time() {
    let mut d = dive("2024-02-01T09:00");
    d.record_mut().date_time = "not a time".to_string();

    let mut log = DiveLog::new();
    log.insert(d).expect("insert");
    assert_eq!(log.all()[0].record().date_time, "2024-02-01T09:00");
}

#[test]
fn replace_missing_dive_fails() {
    let mut log = DiveLog::new();
    assert_eq!(
        log.replace("20240201T0900", dive("2024-02-01T09:00")),
        Err(StoreError::MissingDive("20240201T0900".to_string()))
    );
}

#[test]
fn identity_is_assigned_once() {
    let mut d = dive("2024-02-01T09:00");
    d.set_date_time_and_assign_id(datetime("2025-01-01T00:00"));
    assert_eq!(d.id(), "20240201T0900");
    assert_eq!(d.date_time_in(), Some(datetime("2024-02-01T09:00")));
    assert_eq!(d.position(), None);
}

#[test]
fn reconstruct_all_sorts_loaded_records_and_clears_flag() {
    let mut log = DiveLog::new();
    log.insert(dive("2024-01-02T00:00")).expect("insert");
    log.insert(dive("2024-01-01T00:00")).expect("insert");

    let records = ["2023-05-02T08:00", "2023-05-01T08:00", "2023-05-03T08:00"]
        .into_iter()
        .map(|s| DiveRecord {
            date_time: s.to_string(),
            ..DiveRecord::default()
        })
        .collect();
    log.reconstruct_all(records).expect("reconstruct");

    assert_eq!(
        order(&log),
        vec!["2023-05-01T08:00", "2023-05-02T08:00", "2023-05-03T08:00"]
    );
    assert_positions(&log);
    assert!(!log.is_renumbered());
}

#[test]
fn reconstruct_all_failure_leaves_log_untouched() {
    let mut log = DiveLog::new();
    log.insert(dive("2024-01-01T00:00")).expect("insert");

    let records = vec![
        DiveRecord {
            date_time: "2023-05-01T08:00".to_string(),
            ..DiveRecord::default()
        },
        DiveRecord {
            date_time: "yesterday".to_string(),
            ..DiveRecord::default()
        },
    ];
    let err = log.reconstruct_all(records).expect_err("bad record");

    assert!(matches!(err, StoreError::Reconstruct { index: 1, .. }));
    assert_eq!(order(&log), vec!["2024-01-01T00:00"]);
}

#[test]
fn time_out_adds_duration() {
    let mut d = dive("2024-02-01T09:00");
    d.record_mut().duration = divelog::duration::Duration::from_minutes(75);
    assert_eq!(d.time_out(), Some(datetime("2024-02-01T10:15")));
}
