use demos::setup_logger;
use isbn_scheduler::prelude::*;
use std::error::Error;
use std::fs;
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn Error>> {
    setup_logger();

    let workdir = std::env::temp_dir().join("isbn_import_demo");
    fs::create_dir_all(&workdir)?;

    let mut scheduler = IsbnScheduler::new(SchedulerConfig::new().with_storage_path(workdir.join("state.json")));
    if scheduler.blocks().is_empty() {
        scheduler.add_default_block(0, 999, "123456", None)?;
    }

    let template = workdir.join("template.csv");
    scheduler.export_template(&template)?;
    info!("Template written to {}", template.display());

    let batch = workdir.join("batch.csv");
    fs::write(
        &batch,
        "title,book_ref,scheduled_date,identifier,imprint,publisher,format,priority,notes\n\
         Manual Title,man-1,2025-03-01,9781234567897,Main,Demo Press,paperback,1,\n\
         Typo Title,man-2,2025-03-02,9781234567890,Main,Demo Press,paperback,1,\n\
         Auto Title,auto-1,2025-03-03,,Main,Demo Press,ebook,2,drawn from block\n",
    )?;

    let result = scheduler.import_schedule(&batch)?;
    info!(
        "Processed {} rows: {} manual, {} auto, {} updated",
        result.processed, result.assigned_manual, result.assigned_auto, result.updated
    );
    for error in &result.errors {
        warn!("{error}");
    }

    // Importing the same file again refreshes instead of duplicating
    let again = scheduler.import_schedule(&batch)?;
    info!("Second pass: {} updated, {} new", again.updated, again.assigned_manual + again.assigned_auto);

    let export = workdir.join("assignments.csv");
    let rows = scheduler.export_assignments(&export)?;
    info!("Exported {rows} assignments to {}", export.display());
    Ok(())
}
