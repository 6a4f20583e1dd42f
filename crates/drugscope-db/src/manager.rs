//! Connection manager: the single gate between aggregators and the backend.
//!
//! Tracks whether the backend link is believed live, probes it lazily before
//! the first call and after any connection loss, bounds every call with the
//! configured timeout, and translates [`DbError`] into the query-level
//! [`QueryError`] taxonomy. Backend error text is logged here and never
//! forwarded.

use std::future::Future;
use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use drugscope_common::{QueryError, QueryResult};
use drugscope_config::QueryConfig;
use tracing::{debug, error, info, warn};

use crate::backend::DrugBackend;
use crate::error::DbError;
use crate::schema;

/// Believed state of the backend link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No probe has run yet.
    Unprobed,
    /// The last probe or call succeeded.
    Live,
    /// The last probe failed or a call lost the connection; the next call re-probes.
    Degraded,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Unprobed => "unprobed",
            LinkState::Live     => "live",
            LinkState::Degraded => "degraded",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => LinkState::Live,
            2 => LinkState::Degraded,
            _ => LinkState::Unprobed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            LinkState::Unprobed => 0,
            LinkState::Live     => 1,
            LinkState::Degraded => 2,
        }
    }
}

pub struct ConnectionManager {
    backend: Arc<dyn DrugBackend>,
    query_timeout: Duration,
    probe_timeout: Duration,
    state: AtomicU8,
    /// Unix millis of the last probe; `i64::MIN` when none has run.
    last_probe_ms: AtomicI64,
}

impl ConnectionManager {
    pub fn new(backend: Arc<dyn DrugBackend>, config: &QueryConfig) -> Self {
        Self::with_timeouts(backend, config.timeout(), config.probe_timeout())
    }

    pub fn with_timeouts(
        backend: Arc<dyn DrugBackend>,
        query_timeout: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            query_timeout,
            probe_timeout,
            state: AtomicU8::new(LinkState::Unprobed.as_u8()),
            last_probe_ms: AtomicI64::new(i64::MIN),
        }
    }

    pub fn backend(&self) -> &dyn DrugBackend {
        self.backend.as_ref()
    }

    pub fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn last_probe_at(&self) -> Option<DateTime<Utc>> {
        match self.last_probe_ms.load(Ordering::Acquire) {
            i64::MIN => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    fn set_state(&self, next: LinkState) {
        let prev = LinkState::from_u8(self.state.swap(next.as_u8(), Ordering::AcqRel));
        if prev != next {
            match next {
                LinkState::Live     => info!(from = prev.as_str(), "backend link live"),
                LinkState::Degraded => warn!(from = prev.as_str(), "backend link degraded"),
                LinkState::Unprobed => {}
            }
        }
    }

    /// Run one trivial round trip within the probe timeout. Returns whether the
    /// backend answered and records the outcome in the link state.
    pub async fn probe(&self) -> bool {
        let outcome = tokio::time::timeout(self.probe_timeout, self.backend.ping()).await;
        self.last_probe_ms.store(Utc::now().timestamp_millis(), Ordering::Release);

        match outcome {
            Ok(Ok(())) => {
                self.set_state(LinkState::Live);
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "liveness probe failed");
                self.set_state(LinkState::Degraded);
                false
            }
            Err(_) => {
                warn!(timeout_ms = self.probe_timeout.as_millis() as u64, "liveness probe timed out");
                self.set_state(LinkState::Degraded);
                false
            }
        }
    }

    /// Probe if the link is not known to be live.
    pub async fn ensure_live(&self, operation: &'static str) -> QueryResult<()> {
        if self.state() == LinkState::Live {
            return Ok(());
        }
        if self.probe().await {
            Ok(())
        } else {
            Err(QueryError::unavailable(operation))
        }
    }

    /// Gate, bound and translate one backend call.
    ///
    /// The future is not polled unless the link is live (or a fresh probe
    /// succeeds). Dropping it on timeout drops any pooled connection it holds.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> QueryResult<T>
    where
        F: Future<Output = crate::Result<T>>,
    {
        self.ensure_live(operation).await?;

        match tokio::time::timeout(self.query_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(self.translate(operation, e)),
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.query_timeout.as_millis() as u64,
                    "backend call timed out"
                );
                self.set_state(LinkState::Degraded);
                Err(QueryError::unavailable(operation))
            }
        }
    }

    fn translate(&self, operation: &'static str, err: DbError) -> QueryError {
        match err {
            DbError::SchemaMismatch { object, detail } => {
                error!(operation, %object, %detail, "schema mismatch");
                QueryError::SchemaMismatch { object }
            }
            other => {
                if other.is_connection_loss() {
                    self.set_state(LinkState::Degraded);
                }
                warn!(operation, error = %other, "backend call failed");
                QueryError::unavailable(operation)
            }
        }
    }

    /// Verify every relation and column the queries read is present.
    pub async fn check_schema(&self) -> QueryResult<()> {
        let columns = self
            .run("schema_check", self.backend.schema_columns())
            .await?;

        let missing = schema::missing_objects(
            columns.iter().map(|(t, c)| (t.as_str(), c.as_str())),
        );
        if missing.is_empty() {
            debug!(columns = columns.len(), "schema contract satisfied");
            return Ok(());
        }

        error!(missing = ?missing, "schema contract not satisfied");
        Err(QueryError::SchemaMismatch { object: missing.join(", ") })
    }
}
