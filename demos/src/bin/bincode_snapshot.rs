use chrono::NaiveDate;
use demos::setup_logger;
use isbn_scheduler::prelude::*;
use isbn_scheduler::BincodeSnapshotSerializer;
use std::error::Error;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    setup_logger();

    let path = std::env::temp_dir().join("isbn_state.bin");
    let store = FileStore::with_serializer(&path, Arc::new(BincodeSnapshotSerializer::new()));
    let mut scheduler = IsbnScheduler::with_store(Box::new(store), SchedulerConfig::new());

    if scheduler.blocks().is_empty() {
        scheduler.add_block("978", 0, 99, "123456", None)?;
    }
    let date = NaiveDate::from_ymd_opt(2025, 5, 1).ok_or("invalid date")?;
    let identifier = scheduler
        .get_or_assign(ScheduleRequest::new("Binary Book", "bin-1", date))
        .ok_or("no inventory")?;
    info!("bin-1 holds {identifier}");

    let bytes = std::fs::metadata(&path)?.len();
    info!("Binary snapshot at {} is {bytes} bytes", path.display());
    Ok(())
}
