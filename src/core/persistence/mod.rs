pub mod fetch_status;
pub mod raw_log;
