pub mod bounding_box;
pub mod credentials;
pub mod raw_response;
pub mod token;
