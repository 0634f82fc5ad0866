pub mod admission;
pub mod error;
pub mod matcher;
pub mod metrics;
pub mod router;
pub mod tags;

pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, RouteOutcome, noop_metrics};

pub mod prelude {
    pub use crate::admission::Admission;
    pub use crate::error::CoreError;
    pub use crate::matcher::{Candidate, eligible, preferred, rank, specificity};
    pub use crate::router::{ProvisionerEntry, ProvisionerRouter};
    pub use crate::tags::{CanonicalTags, Resolution, normalize, normalize_with_resolution};
}
