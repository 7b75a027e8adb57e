pub mod fetch_status_entity;
pub mod fetch_status_fs_adapter;
