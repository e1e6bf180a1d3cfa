pub mod memory;
pub mod s3;
pub mod unconfigured;
