//! Prometheus gauges for queue, pool and barrier state.
//!
//! Primitives expose plain `stats()` snapshots. [`SyncMetrics`] copies them
//! into a registry it owns, so embedding applications decide when to sample
//! and where to export.

use prometheus::core::Collector;
use prometheus::proto::MetricFamily;
use prometheus::Encoder;
use prometheus::IntGaugeVec;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;

use crate::constants::METRIC_POOL_CAPACITY;
use crate::constants::METRIC_POOL_IDLE;
use crate::constants::METRIC_POOL_OPEN;
use crate::constants::METRIC_QUEUE_DEPTH;
use crate::constants::METRIC_QUEUE_LAST_SEQUENCE;
use crate::constants::METRIC_READY_TARGET_PENDING;
use crate::PoolStats;
use crate::QueueStats;
use crate::Result;


const NAME_LABEL: &str = "name";

pub struct SyncMetrics {
    registry: Registry,
    queue_depth: IntGaugeVec,
    queue_last_sequence: IntGaugeVec,
    pool_idle: IntGaugeVec,
    pool_open: IntGaugeVec,
    pool_capacity: IntGaugeVec,
    ready_target_pending: IntGaugeVec,
}

impl SyncMetrics {
    /// Creates the gauges and registers them in a fresh registry.
    /// `prefix` namespaces every metric name.
    pub fn new(prefix: Option<String>) -> Result<Self> {
        let registry = Registry::new_custom(prefix, None)?;

        let metrics = Self {
            queue_depth: gauge(METRIC_QUEUE_DEPTH, "Fragments accepted but not yet merged")?,
            queue_last_sequence: gauge(METRIC_QUEUE_LAST_SEQUENCE, "Last sequence number assigned")?,
            pool_idle: gauge(METRIC_POOL_IDLE, "Idle pooled connections")?,
            pool_open: gauge(METRIC_POOL_OPEN, "Connections handed out or idle")?,
            pool_capacity: gauge(METRIC_POOL_CAPACITY, "Configured pool capacity")?,
            ready_target_pending: gauge(METRIC_READY_TARGET_PENDING, "Subscribers waiting on a target")?,
            registry,
        };

        for collector in [
            &metrics.queue_depth,
            &metrics.queue_last_sequence,
            &metrics.pool_idle,
            &metrics.pool_open,
            &metrics.pool_capacity,
            &metrics.ready_target_pending,
        ] {
            metrics.registry.register(boxed(collector))?;
        }
        Ok(metrics)
    }

    pub fn observe_queue(
        &self,
        name: &str,
        stats: &QueueStats,
    ) {
        self.queue_depth
            .with_label_values(&[name])
            .set(stats.depth as i64);
        self.queue_last_sequence
            .with_label_values(&[name])
            .set(stats.last_sequence as i64);
    }

    pub fn observe_pool(
        &self,
        name: &str,
        stats: &PoolStats,
    ) {
        self.pool_idle.with_label_values(&[name]).set(stats.idle as i64);
        self.pool_open.with_label_values(&[name]).set(stats.open as i64);
        self.pool_capacity
            .with_label_values(&[name])
            .set(stats.max_capacity as i64);
    }

    pub fn observe_ready_target(
        &self,
        name: &str,
        pending: usize,
    ) {
        self.ready_target_pending
            .with_label_values(&[name])
            .set(pending as i64);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn gauge(
    name: &str,
    help: &str,
) -> Result<IntGaugeVec> {
    Ok(IntGaugeVec::new(Opts::new(name, help), &[NAME_LABEL])?)
}

fn boxed(collector: &IntGaugeVec) -> Box<dyn Collector> {
    Box::new(collector.clone())
}
