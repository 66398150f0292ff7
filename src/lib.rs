pub mod error;
pub mod metrics;
pub mod model;

pub use error::{CovError, Result};
pub use metrics::Metrics;
pub use model::{LineHits, SourceCoverage};
