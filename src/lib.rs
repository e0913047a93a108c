// Library interface for fitexplore modules
// The CLI, integration tests and benches all go through this crate root

pub mod activity;
pub mod config;
pub mod error;
pub mod export;
pub mod heart_rate;
pub mod import;
pub mod intervals;
pub mod logging;
pub mod models;
pub mod splits;

// Re-export commonly used types for convenience
pub use activity::{Activity, ActivitySummary};
pub use config::{AnalysisConfig, AppConfig, DistanceUnit, OpenPausePolicy, ShortActivityPolicy};
pub use error::{ErrorSeverity, ExportError, FitError, FitExploreError, Result};
pub use heart_rate::{ChartAxis, HeartRateBucketer, StoppedSpan};
pub use import::fit::FitImporter;
pub use intervals::ActiveIntervalBuilder;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use splits::{SplitSegmenter, SplitStatistics};
