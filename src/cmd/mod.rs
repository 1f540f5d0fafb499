pub mod optimize;
pub mod report;
pub mod validate;
