pub mod usage_page_dto;
pub mod usage_page_query;
