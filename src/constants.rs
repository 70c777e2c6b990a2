// -
// Component names reported in `Error::Closed` / `Error::Cancelled`

pub(crate) const QUEUE_COMPONENT: &str = "queue";
pub(crate) const POOL_COMPONENT: &str = "connection pool";
pub(crate) const READY_TARGET_COMPONENT: &str = "ready target subscription";
pub(crate) const FLUSH_SIGNAL_COMPONENT: &str = "flush signal";

// -
// Prometheus metric names

pub(crate) const METRIC_QUEUE_DEPTH: &str = "sync_queue_depth";
pub(crate) const METRIC_QUEUE_LAST_SEQUENCE: &str = "sync_queue_last_sequence";
pub(crate) const METRIC_POOL_IDLE: &str = "sync_pool_idle_connections";
pub(crate) const METRIC_POOL_OPEN: &str = "sync_pool_open_connections";
pub(crate) const METRIC_POOL_CAPACITY: &str = "sync_pool_max_open_connections";
pub(crate) const METRIC_READY_TARGET_PENDING: &str = "sync_ready_target_pending_subscribers";
