mod import_tests;
mod persistence_tests;
mod property_tests;
mod scheduler_tests;
