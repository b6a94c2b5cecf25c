pub mod content_disposition;
pub mod ids;
pub mod upload;
