pub mod collector;
pub mod pacer;
pub mod refresher;
pub mod transform;

pub use collector::{CollectSummary, Collector};
pub use pacer::Pacer;
pub use refresher::{RefreshOutcome, RefreshStats, Refresher};
