pub mod dto;
pub mod usage_api_client;
pub mod usage_endpoint;
