pub mod analyzer;
pub mod input;
pub mod platform;
pub mod report;
pub mod user_agent;

pub use analyzer::{AnalysisStats, Analyzer};
pub use platform::Platform;
pub use report::{CountMap, Report};
pub use user_agent::UserAgent;
