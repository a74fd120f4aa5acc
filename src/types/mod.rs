pub mod aqi_category;
pub mod artifact;
pub mod coordinate;
pub mod dataset_kind;
pub mod rows;
