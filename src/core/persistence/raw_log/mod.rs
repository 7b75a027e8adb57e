pub mod raw_log_fs_adapter;
pub mod raw_log_fs_adapter_trait;
pub mod usage_record_entity;
