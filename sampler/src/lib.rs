pub mod plan;
pub mod s3_store;
pub mod sampler;
pub mod store;

pub use plan::SamplePlan;
pub use s3_store::S3Store;
pub use sampler::{SampledLog, Sampler};
pub use store::{LocalStore, LogStore};
