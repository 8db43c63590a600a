pub mod analysis;
pub mod core;
pub mod features;
pub mod render;
pub mod report;
pub mod scraping;
pub mod server;

// --- Primary core exports ---
pub use core::types;
pub use core::types::*;
pub use core::AppState;

pub use analysis::{score, ScoringPolicy};
pub use scraping::metrics::extract_metrics;
