pub mod error;
pub mod measure_group;
pub mod normalizer;
pub mod table;
