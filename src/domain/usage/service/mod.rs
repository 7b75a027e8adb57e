pub mod collector_service;
pub mod fetch_status_service;
pub mod rollup_service;
pub mod window_walker;
