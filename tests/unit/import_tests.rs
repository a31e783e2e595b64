#[cfg(test)]
mod tests_import {
    use isbn_scheduler::{AssignmentStatus, ImportRecord, IsbnScheduler};
    use std::fs;

    fn scheduler() -> IsbnScheduler {
        let mut scheduler = IsbnScheduler::in_memory();
        scheduler
            .add_block("978", 0, 99, "123456", None)
            .expect("add block");
        scheduler
    }

    #[test]
    fn malformed_identifier_row_is_skipped() {
        let mut scheduler = scheduler();
        let csv = "\
title,book_ref,scheduled_date,identifier,imprint,publisher,format,priority,notes
Manual Book,m1,2025-01-10,9781234567897,Main,Press,paperback,1,
Broken Book,x1,2025-01-11,9781234567890,,,,,
Auto Book,a1,2025-01-12,,Main,Press,ebook,2,auto row
";
        let result = scheduler.import_csv(csv.as_bytes()).expect("import");

        assert_eq!(result.processed, 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("row 2:"));
        assert_eq!(result.assigned_manual, 1);
        assert_eq!(result.assigned_auto, 1);
        assert_eq!(result.updated, 0);

        let manual = scheduler.get("9781234567897").expect("manual row stored");
        assert_eq!(manual.status, AssignmentStatus::Assigned);
        let auto = scheduler.get_by_book_ref("a1").expect("auto row stored");
        assert_eq!(auto.status, AssignmentStatus::Scheduled);
        assert_eq!(auto.priority, 2);
        assert!(scheduler.get_by_book_ref("x1").is_none());
    }

    #[test]
    fn batch_collects_every_row_problem() {
        let mut scheduler = scheduler();
        let csv = "\
title,book_ref,scheduled_date,identifier,priority
,no-title,2025-01-01,,
Bad Date,d1,2025-13-40,,
Bad Priority,p1,2025-01-01,,high
First,dup1,2025-01-01,9780306406157,
Second,dup2,2025-01-01,978-0-306-40615-7,
";
        let result = scheduler.import_csv(csv.as_bytes()).expect("import");
        assert_eq!(result.processed, 1);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors[3].contains("duplicate identifier in batch"));
        assert_eq!(scheduler.assignments().count(), 1);
        assert_eq!(scheduler.availability_report().used, 0);
    }

    #[test]
    fn rejected_row_does_not_claim_its_identifier() {
        let mut scheduler = scheduler();
        let csv = "\
title,book_ref,scheduled_date,identifier
,b1,2025-01-01,9780306406157
Fixed,b1,2025-01-01,9780306406157
";
        let result = scheduler.import_csv(csv.as_bytes()).expect("import");
        assert_eq!(result.processed, 1);
        assert_eq!(result.assigned_manual, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("row 1:"));

        let record = scheduler.get("9780306406157").expect("corrected row stored");
        assert_eq!(record.title, "Fixed");
        assert_eq!(record.book_ref, "b1");
    }

    #[test]
    fn existing_book_is_updated_not_duplicated() {
        let mut scheduler = scheduler();
        let first = scheduler
            .import_csv("title,book_ref,scheduled_date\nDraft,b1,2025-01-01\n".as_bytes())
            .expect("import");
        assert_eq!(first.assigned_auto, 1);
        let identifier = scheduler
            .get_by_book_ref("b1")
            .map(|a| a.identifier.clone())
            .expect("scheduled");

        let second = scheduler
            .import_csv("title,book_ref,scheduled_date\nFinal,b1,2025-03-01\n".as_bytes())
            .expect("import");
        assert_eq!(second.updated, 1);
        assert_eq!(second.assigned_auto, 0);

        let manual_refresh = format!(
            "title,book_ref,scheduled_date,identifier\nFinal Final,b1,2025-03-02,{identifier}\n"
        );
        let third = scheduler
            .import_csv(manual_refresh.as_bytes())
            .expect("import");
        assert_eq!(third.updated, 1);

        let record = scheduler.get(&identifier).expect("record");
        assert_eq!(record.title, "Final Final");
        assert_eq!(scheduler.assignments().count(), 1);
    }

    #[test]
    fn json_rows_import() {
        let mut scheduler = scheduler();
        let json = r#"[
            {"title": "Json Manual", "book_ref": "j1", "scheduled_date": "2025-04-01", "identifier": "9780306406157", "priority": 3},
            {"title": "Json Auto", "book_ref": "j2", "scheduled_date": "2025-04-02"},
            {"book_ref": "j3", "scheduled_date": "2025-04-03"}
        ]"#;
        let result = scheduler.import_json(json.as_bytes()).expect("import");
        assert_eq!(result.processed, 2);
        assert_eq!(result.assigned_manual, 1);
        assert_eq!(result.assigned_auto, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(scheduler.get("9780306406157").map(|a| a.priority), Some(3));
    }

    #[test]
    fn import_records_directly() {
        let mut scheduler = scheduler();
        let records = vec![ImportRecord {
            title: "Direct".to_string(),
            book_ref: "d1".to_string(),
            scheduled_date: "2025-05-05".to_string(),
            ..ImportRecord::default()
        }];
        let result = scheduler.import_records(records).expect("import");
        assert!(result.is_clean());
        assert_eq!(result.assigned_auto, 1);
    }

    #[test]
    fn template_round_trips_through_import() {
        let dir = tempfile::tempdir().expect("tempdir");

        for name in ["template.csv", "template.json"] {
            let path = dir.path().join(name);
            let mut scheduler = scheduler();
            scheduler.export_template(&path).expect("write template");

            let result = scheduler.import_schedule(&path).expect("import template");
            assert!(result.is_clean(), "{name}: {:?}", result.errors);
            assert_eq!(result.assigned_manual, 1, "{name}");
            assert_eq!(result.assigned_auto, 1, "{name}");
        }
    }

    #[test]
    fn bulk_schedule_always_draws() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bulk.csv");
        fs::write(
            &path,
            "title,book_ref,scheduled_date,identifier\n\
             One,b1,2025-01-01,9780306406157\n\
             Two,b2,2025-01-02,\n\
             ,b3,2025-01-03,\n",
        )
        .expect("write source");

        let mut scheduler = scheduler();
        assert_eq!(scheduler.bulk_schedule(&path).expect("bulk"), 2);
        assert!(scheduler.get("9780306406157").is_none());
        assert_eq!(scheduler.availability_report().used, 2);
    }

    #[test]
    fn bulk_schedule_stops_when_exhausted() {
        let mut scheduler = IsbnScheduler::in_memory();
        scheduler
            .add_block("978", 0, 1, "123456", None)
            .expect("add block");
        let records = (0..5).map(|i| ImportRecord {
            title: format!("Book {i}"),
            book_ref: format!("b{i}"),
            scheduled_date: "2025-01-01".to_string(),
            ..ImportRecord::default()
        });
        assert_eq!(scheduler.bulk_schedule_records(records).expect("bulk"), 2);
    }

    #[test]
    fn export_assignments_lists_every_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("export.csv");

        let mut scheduler = scheduler();
        scheduler
            .import_csv(
                "title,book_ref,scheduled_date,identifier\n\
                 Manual,m1,2025-01-01,9780306406157\n\
                 Auto,a1,2025-01-02,\n"
                    .as_bytes(),
            )
            .expect("import");

        assert_eq!(scheduler.export_assignments(&path).expect("export"), 2);
        let text = fs::read_to_string(&path).expect("read export");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(",status,assigned_date"));
        assert!(text.contains("9780306406157"));
        assert!(text.contains(",ASSIGNED,"));
        assert!(text.contains(",SCHEDULED,"));
    }
}
