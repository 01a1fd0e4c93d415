pub mod records;
pub mod snapshot;
pub mod stats;
pub mod status;

pub use records::{ExecutionLogEntry, PendingItem, StatRecord, StatsSummary};
pub use snapshot::{DocumentSnapshot, NodeId, RawDocument, RawNode};
pub use stats::{Extraction, PlayerStats, StatField};
pub use status::QueueStatus;
