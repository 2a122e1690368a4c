//! Node wiring
//!
//! Assembles the stores, remote clients, engine, and scheduler into one
//! running sync node.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ebb_core::EbbResult;
use ebb_engine::{DrainOutcome, ReconcileEngine};
use ebb_remote::HttpRemote;
use ebb_store::{DomainStore, MemoryStore, OperationStore, SqliteStore};

use crate::{ConnectivityGauge, LocalActions, SchedulerConfig, SyncScheduler};

/// Sync node configuration
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Base URL of the remote service
    pub base_url: String,
    /// Path for the durable operation store; in-memory when absent
    pub db_path: Option<PathBuf>,
    /// Fixed drain period
    pub tick_interval: Duration,
    /// Initial connectivity assumption
    pub start_online: bool,
}

impl NodeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        NodeConfig {
            base_url: base_url.into(),
            db_path: None,
            tick_interval: Duration::from_secs(10),
            start_online: true,
        }
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_start_online(mut self, online: bool) -> Self {
        self.start_online = online;
        self
    }
}

/// A running sync node
pub struct SyncNode {
    domain: Arc<DomainStore>,
    ops: Arc<dyn OperationStore>,
    engine: Arc<ReconcileEngine>,
    actions: LocalActions,
    gauge: ConnectivityGauge,
    scheduler: SyncScheduler,
}

impl SyncNode {
    /// Wire the stores, engine, and scheduler and start the loop.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(config: NodeConfig) -> EbbResult<Self> {
        let ops: Arc<dyn OperationStore> = match &config.db_path {
            Some(path) => Arc::new(SqliteStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        let domain = Arc::new(DomainStore::new());
        let remote = Arc::new(HttpRemote::new(&config.base_url)?);
        let engine = Arc::new(ReconcileEngine::new(
            Arc::clone(&ops),
            Arc::clone(&domain),
            remote,
        ));
        let gauge = ConnectivityGauge::new(config.start_online);
        let scheduler = SyncScheduler::spawn(
            Arc::clone(&engine),
            SchedulerConfig {
                tick_interval: config.tick_interval,
            },
            gauge.subscribe(),
        );
        let actions = LocalActions::new(Arc::clone(&domain), Arc::clone(&ops));

        Ok(SyncNode {
            domain,
            ops,
            engine,
            actions,
            gauge,
            scheduler,
        })
    }

    pub fn actions(&self) -> &LocalActions {
        &self.actions
    }

    pub fn domain(&self) -> Arc<DomainStore> {
        Arc::clone(&self.domain)
    }

    pub fn ops(&self) -> Arc<dyn OperationStore> {
        Arc::clone(&self.ops)
    }

    pub fn connectivity(&self) -> &ConnectivityGauge {
        &self.gauge
    }

    /// Drain outside the schedule (sign-in, manual refresh)
    pub async fn drain_now(&self) -> EbbResult<DrainOutcome> {
        self.engine.drain().await
    }

    /// Stop the scheduler loop and wait for it to finish
    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use ebb_core::Priority;

    use super::*;

    #[tokio::test]
    async fn test_node_wires_actions_to_stores() {
        let node = SyncNode::start(NodeConfig::new("http://localhost:9")).unwrap();

        let ws_id = node.actions().create_workspace("Personal").unwrap();
        node.actions()
            .add_todo(&ws_id, "task", Priority::Medium)
            .unwrap();

        assert_eq!(node.domain().workspaces().len(), 1);
        assert_eq!(node.ops().list().unwrap().len(), 2);
        assert!(node.connectivity().is_online());

        node.shutdown().await;
    }

    #[tokio::test]
    async fn test_node_reopens_durable_queue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ebb.db");

        {
            let node = SyncNode::start(
                NodeConfig::new("http://localhost:9")
                    .with_db_path(&path)
                    .with_start_online(false),
            )
            .unwrap();
            node.actions().create_workspace("Personal").unwrap();
            node.shutdown().await;
        }

        let node = SyncNode::start(
            NodeConfig::new("http://localhost:9")
                .with_db_path(&path)
                .with_start_online(false),
        )
        .unwrap();
        assert_eq!(node.ops().list().unwrap().len(), 1);
        node.shutdown().await;
    }
}
