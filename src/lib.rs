pub mod app_state;
pub mod core;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod tasks;

#[cfg(test)]
pub mod test_utils;
