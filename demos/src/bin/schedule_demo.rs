use chrono::{Days, NaiveDate};
use demos::setup_logger;
use isbn_scheduler::prelude::*;
use std::error::Error;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    setup_logger();

    let state = std::env::temp_dir().join("isbn_schedule_demo.json");
    let _ = std::fs::remove_file(&state);

    let config = SchedulerConfig::new()
        .with_storage_path(&state)
        .with_default_publisher("Demo Press");
    let mut scheduler = IsbnScheduler::new(config);

    // Two small blocks: the first fills up, the second takes over
    scheduler.add_block("978", 1000, 1002, "123456", Some("Fiction".to_string()))?;
    scheduler.add_block("978", 0, 99, "654321", Some("Non-fiction".to_string()))?;

    let start = NaiveDate::from_ymd_opt(2025, 1, 6).ok_or("invalid date")?;
    let titles = [
        ("Python Programming", "bk-python"),
        ("Java Development", "bk-java"),
        ("Rust in Practice", "bk-rust"),
        ("Distributed Systems", "bk-dist"),
    ];
    for (week, (title, book_ref)) in titles.iter().enumerate() {
        let date = start
            .checked_add_days(Days::new(7 * week as u64))
            .ok_or("date out of range")?;
        match scheduler.schedule(ScheduleRequest::new(*title, *book_ref, date)) {
            Some(identifier) => info!(
                "{:<22} -> {} ({})",
                title,
                identifier,
                hyphenate(&identifier, 3, 6)?
            ),
            None => info!("{title}: no inventory left"),
        }
    }

    // A rebuild run asks again and gets the same identifier back
    let again = scheduler
        .get_or_assign(
            ScheduleRequest::new("Rust in Practice, 2nd ed.", "bk-rust", start)
                .with_format("hardcover"),
        )
        .ok_or("rust book should keep its identifier")?;
    info!("bk-rust still holds {again}");

    // Activate one, set another aside
    let python = scheduler
        .get_by_book_ref("bk-python")
        .map(|a| a.identifier.clone())
        .ok_or("python book missing")?;
    scheduler.assign_now(&python);
    let java = scheduler
        .get_by_book_ref("bk-java")
        .map(|a| a.identifier.clone())
        .ok_or("java book missing")?;
    scheduler.reserve(&java, "awaiting contract");

    // A hand-registered identifier cannot be taken by another book
    scheduler.assign_specific("9780306406157", ScheduleRequest::new("Legacy", "bk-legacy", start));
    let stolen = scheduler.try_assign_specific(
        "9780306406157",
        ScheduleRequest::new("Someone else", "bk-other", start),
    );
    info!("Second owner rejected: {:?}", stolen.err());

    for record in scheduler.search("python") {
        info!("search hit: {} {}", record.identifier, record.title);
    }
    for record in scheduler.query_upcoming(start, 30) {
        info!("upcoming: {} {} on {}", record.identifier, record.title, record.scheduled_date);
    }

    let report = scheduler.availability_report();
    info!(
        "{} blocks, {} of {} used ({:.1}%)",
        report.total_blocks,
        report.used,
        report.total_capacity,
        report.utilization() * 100.0
    );
    for (status, count) in &report.by_status {
        info!("  {status}: {count}");
    }
    info!("{}", serde_json::to_string_pretty(&report)?);

    let reopened = IsbnScheduler::open(&state);
    info!(
        "Reopened {} with {} assignments",
        state.display(),
        reopened.assignments().count()
    );
    Ok(())
}
