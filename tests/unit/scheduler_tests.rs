#[cfg(test)]
mod tests_scheduler {
    use chrono::NaiveDate;
    use isbn_scheduler::{
        AssignmentStatus, IsbnScheduler, ScheduleError, ScheduleRequest, SchedulerConfig,
        hyphenate, is_valid_identifier,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn scheduled_identifier_matches_block_layout() {
        let mut scheduler = IsbnScheduler::in_memory();
        scheduler
            .add_block("978", 1000, 1999, "123456", Some("Main".to_string()))
            .expect("add block");

        let identifier = scheduler
            .schedule(ScheduleRequest::new("Book One", "b1", date(2024, 12, 1)))
            .expect("capacity available");

        assert!(is_valid_identifier(&identifier));
        assert_eq!(
            hyphenate(&identifier, 3, 6).expect("valid identifier"),
            format!("978-123456-{}-{}", &identifier[9..12], &identifier[12..])
        );
        let block = scheduler
            .block_for_identifier(&identifier)
            .expect("identifier belongs to a block");
        assert_eq!(block.imprint.as_deref(), Some("Main"));
    }

    #[test]
    fn add_block_rejects_bad_ranges() {
        let mut scheduler = IsbnScheduler::in_memory();
        assert!(matches!(
            scheduler.add_block("978", 10, 5, "123456", None),
            Err(ScheduleError::InvalidBlock { .. })
        ));
        assert!(matches!(
            scheduler.add_block("97x", 0, 5, "123456", None),
            Err(ScheduleError::InvalidBlock { .. })
        ));

        scheduler
            .add_block("978", 0, 99, "123456", None)
            .expect("first block");
        assert!(matches!(
            scheduler.add_block("978", 50, 150, "123456", None),
            Err(ScheduleError::InvalidBlock { .. })
        ));
        scheduler
            .add_block("978", 50, 150, "654321", None)
            .expect("other registrant may reuse the range");
        assert_eq!(scheduler.blocks().len(), 2);
    }

    #[test]
    fn capacity_exhaustion_is_reported_not_raised() {
        let mut scheduler = IsbnScheduler::in_memory();
        scheduler
            .add_block("978", 0, 1, "123456", None)
            .expect("add block");

        let drawn: Vec<Option<String>> = (0..3)
            .map(|i| scheduler.schedule(ScheduleRequest::new("T", format!("b{i}"), date(2025, 1, 1))))
            .collect();
        assert!(drawn[0].is_some());
        assert!(drawn[1].is_some());
        assert!(drawn[2].is_none());

        let report = scheduler.availability_report();
        assert_eq!(report.used, 2);
        assert_eq!(report.available, 0);

        scheduler
            .add_block("978", 2, 3, "123456", None)
            .expect("provision more inventory");
        assert!(
            scheduler
                .schedule(ScheduleRequest::new("T", "b2", date(2025, 1, 1)))
                .is_some()
        );
    }

    #[test]
    fn rebuild_workflow_reuses_identifiers() {
        let mut scheduler = IsbnScheduler::in_memory();
        scheduler
            .add_block("978", 0, 9, "123456", None)
            .expect("add block");

        let books = ["alpha", "beta", "gamma"];
        let first_run: Vec<String> = books
            .iter()
            .map(|b| {
                scheduler
                    .get_or_assign(ScheduleRequest::new(format!("{b} v1"), *b, date(2025, 1, 1)))
                    .expect("identifier")
            })
            .collect();
        let second_run: Vec<String> = books
            .iter()
            .map(|b| {
                scheduler
                    .get_or_assign(ScheduleRequest::new(format!("{b} v2"), *b, date(2025, 2, 1)))
                    .expect("identifier")
            })
            .collect();

        assert_eq!(first_run, second_run);
        assert_eq!(scheduler.availability_report().used, 3);
        assert_eq!(
            scheduler.get_by_book_ref("beta").map(|a| a.title.as_str()),
            Some("beta v2")
        );
    }

    #[test]
    fn default_block_uses_configured_prefix() {
        let mut scheduler = IsbnScheduler::new(SchedulerConfig::new().with_default_prefix("979"));
        scheduler
            .add_default_block(0, 9, "812345", None)
            .expect("add block");
        let id = scheduler
            .schedule(ScheduleRequest::new("T", "b", date(2025, 1, 1)))
            .expect("identifier");
        assert!(id.starts_with("979812345"));
        assert_eq!(
            scheduler.get(&id).map(|a| a.status),
            Some(AssignmentStatus::Scheduled)
        );
    }
}
