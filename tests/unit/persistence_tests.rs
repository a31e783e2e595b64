#[cfg(test)]
mod tests_persistence {
    use chrono::NaiveDate;
    use isbn_scheduler::{
        AssignmentStatus, FileStore, IsbnScheduler, MemoryStore, ScheduleError, ScheduleRequest,
        SchedulerConfig, SchedulerSnapshot, SnapshotStore,
    };
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory store whose saves fail while `failing` is set.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl SnapshotStore for FlakyStore {
        fn load(&self) -> Result<Option<SchedulerSnapshot>, ScheduleError> {
            self.inner.load()
        }

        fn save(&self, snapshot: &SchedulerSnapshot) -> Result<(), ScheduleError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ScheduleError::Io {
                    message: "disk full".to_string(),
                    path: None,
                });
            }
            self.inner.save(snapshot)
        }

        fn location(&self) -> String {
            "flaky".to_string()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn populate(scheduler: &mut IsbnScheduler) -> String {
        scheduler
            .add_block("978", 0, 49, "123456", Some("Main".to_string()))
            .expect("add block");
        let id = scheduler
            .schedule(ScheduleRequest::new("Persisted", "p1", date(2025, 6, 1)))
            .expect("schedule");
        scheduler
            .schedule(ScheduleRequest::new("Reserved", "p2", date(2025, 7, 1)))
            .expect("schedule");
        assert!(scheduler.assign_specific(
            "9780306406157",
            ScheduleRequest::new("Manual", "p3", date(2025, 8, 1))
        ));
        assert!(scheduler.assign_now(&id));
        id
    }

    #[test]
    fn second_instance_sees_identical_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");

        let mut writer = IsbnScheduler::open(&path);
        let assigned = populate(&mut writer);
        let reserved = writer
            .get_by_book_ref("p2")
            .map(|a| a.identifier.clone())
            .expect("p2");
        assert!(writer.reserve(&reserved, "legal review"));

        let reader = IsbnScheduler::open(&path);
        assert!(writer.snapshot().same_state(&reader.snapshot()));
        assert_eq!(reader.blocks()[0].used, 2);
        assert_eq!(
            reader.get(&assigned).map(|a| a.status),
            Some(AssignmentStatus::Assigned)
        );
        assert_eq!(
            reader.get(&reserved).map(|a| a.notes.as_str()),
            Some("legal review")
        );
        assert_eq!(
            reader.get_by_book_ref("p3").map(|a| a.identifier.as_str()),
            Some("9780306406157")
        );
    }

    #[test]
    fn reopened_scheduler_continues_drawing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");

        let first = {
            let mut scheduler = IsbnScheduler::open(&path);
            scheduler
                .add_block("978", 0, 9, "123456", None)
                .expect("add block");
            scheduler
                .schedule(ScheduleRequest::new("One", "b1", date(2025, 1, 1)))
                .expect("schedule")
        };

        let mut scheduler = IsbnScheduler::open(&path);
        let second = scheduler
            .schedule(ScheduleRequest::new("Two", "b2", date(2025, 1, 1)))
            .expect("schedule");
        assert_ne!(first, second);
        assert_eq!(scheduler.availability_report().used, 2);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json at all").expect("write");

        let mut scheduler = IsbnScheduler::open(&path);
        assert!(scheduler.blocks().is_empty());
        assert_eq!(scheduler.assignments().count(), 0);

        scheduler
            .add_block("978", 0, 9, "123456", None)
            .expect("add block");
        let reopened = IsbnScheduler::open(&path);
        assert_eq!(reopened.blocks().len(), 1);
    }

    #[test]
    fn bare_document_is_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("legacy.json");
        fs::write(
            &path,
            r#"{
                "blocks": [
                    {"prefix": "978", "registrant_code": "123456", "start": 0, "end": 9, "used": 1, "imprint": null}
                ],
                "assignments": [
                    {"identifier": "9781234560003", "book_ref": "old", "title": "Legacy",
                     "scheduled_date": "2024-05-01", "assigned_date": null, "status": "SCHEDULED",
                     "imprint": null, "publisher": null, "format": null, "priority": 1, "notes": ""}
                ]
            }"#,
        )
        .expect("write");

        let scheduler = IsbnScheduler::open(&path);
        assert_eq!(scheduler.blocks()[0].used, 1);
        assert_eq!(
            scheduler.get_by_book_ref("old").map(|a| a.scheduled_date),
            Some(date(2024, 5, 1))
        );
    }

    #[test]
    fn full_range_block_in_saved_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("overflow.json");
        fs::write(
            &path,
            r#"{
                "blocks": [
                    {"prefix": "978", "registrant_code": "1", "start": 0, "end": 18446744073709551615, "used": 0, "imprint": null}
                ],
                "assignments": []
            }"#,
        )
        .expect("write");

        let scheduler = IsbnScheduler::open(&path);
        assert!(scheduler.blocks().is_empty());
        assert_eq!(scheduler.availability_report().total_capacity, 0);
    }

    #[test]
    fn failed_save_keeps_change_in_memory() {
        let store = Arc::new(FlakyStore::default());
        let mut scheduler =
            IsbnScheduler::with_store(Box::new(Arc::clone(&store)), SchedulerConfig::new());
        scheduler
            .add_block("978", 0, 9, "123456", None)
            .expect("add block");

        store.failing.store(true, Ordering::SeqCst);
        let err = scheduler
            .try_schedule(ScheduleRequest::new("Unsaved", "u1", date(2025, 1, 1)))
            .expect_err("save fails");
        assert!(matches!(err, ScheduleError::Io { .. }));

        let held = scheduler.get_by_book_ref("u1").expect("kept in memory");
        assert_eq!(held.status, AssignmentStatus::Scheduled);
        assert_eq!(scheduler.availability_report().used, 1);
        let saved = store.load().expect("load").expect("block was saved");
        assert!(saved.assignments.is_empty());

        store.failing.store(false, Ordering::SeqCst);
        scheduler.save().expect("retry");
        let saved = store.load().expect("load").expect("saved snapshot");
        assert_eq!(saved.assignments.len(), 1);
        assert_eq!(saved.assignments[0].book_ref, "u1");
    }

    #[test]
    fn every_mutation_is_saved() {
        let store = Arc::new(MemoryStore::new());
        let mut scheduler =
            IsbnScheduler::with_store(Box::new(Arc::clone(&store)), SchedulerConfig::new());
        populate(&mut scheduler);
        // add_block, two schedules, assign_specific, assign_now
        assert_eq!(store.save_count(), 5);

        let saved = store.load().expect("load").expect("saved snapshot");
        assert!(saved.same_state(&scheduler.snapshot()));

        let twin = IsbnScheduler::with_store(Box::new(Arc::clone(&store)), SchedulerConfig::new());
        assert_eq!(twin.assignments().count(), 3);
    }

    #[test]
    fn persistence_can_be_deferred() {
        let store = Arc::new(MemoryStore::new());
        let config = SchedulerConfig::new().with_persist_on_mutation(false);
        let mut scheduler = IsbnScheduler::with_store(Box::new(Arc::clone(&store)), config);
        populate(&mut scheduler);
        assert_eq!(store.save_count(), 0);

        scheduler.save().expect("explicit save");
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");

        let mut reader = IsbnScheduler::open(&path);
        let mut writer = IsbnScheduler::open(&path);
        writer
            .add_block("978", 0, 9, "123456", None)
            .expect("add block");

        assert!(reader.blocks().is_empty());
        reader.reload().expect("reload");
        assert_eq!(reader.blocks().len(), 1);
    }

    #[test]
    fn config_file_drives_storage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = dir.path().join("state.json");
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            serde_json::json!({
                "storage_path": state,
                "default_publisher": "Configured Press"
            })
            .to_string(),
        )
        .expect("write config");

        let config = SchedulerConfig::from_json_file(&config_path).expect("config");
        let mut scheduler = IsbnScheduler::new(config);
        scheduler
            .add_default_block(0, 9, "123456", None)
            .expect("add block");
        let id = scheduler
            .schedule(ScheduleRequest::new("T", "b", date(2025, 1, 1)))
            .expect("schedule");

        assert!(state.exists());
        assert_eq!(
            scheduler.get(&id).and_then(|a| a.publisher.as_deref()),
            Some("Configured Press")
        );
        let store = FileStore::new(&state);
        assert!(store.load().expect("load").is_some());
    }
}
