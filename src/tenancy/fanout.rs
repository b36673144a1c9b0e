//! Fan-out execution across master and tenant databases.
//!
//! Runs one operation concurrently against every target database and merges
//! the results. A failing or slow tenant contributes zero rows and one log
//! entry; it never fails the sibling branches or the overall call. Ordering
//! across sources only exists after the post-merge sort, so pagination is
//! applied in memory over the merged set and never pushed down per source.
//! That bounds the approach to volumes where an in-memory merge is
//! acceptable, which is the documented ceiling for cross-tenant listings.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use metrics::counter;
use sea_orm::DatabaseConnection;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::warn;
use uuid::Uuid;

use super::registry::TenantConnectionRegistry;
use crate::config::AppConfig;

/// Which database a fan-out branch ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutSource {
    Master,
    Tenant(Uuid),
}

impl std::fmt::Display for FanOutSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FanOutSource::Master => write!(f, "master"),
            FanOutSource::Tenant(dealer_id) => write!(f, "tenant:{dealer_id}"),
        }
    }
}

/// Merged result of a fan-out run.
#[derive(Debug)]
pub struct FanOutOutcome<T> {
    pub rows: Vec<T>,
    pub sources_total: usize,
    pub sources_failed: usize,
}

/// Executes operations against master plus every active tenant.
pub struct FanOutExecutor {
    registry: Arc<TenantConnectionRegistry>,
    config: Arc<AppConfig>,
}

impl FanOutExecutor {
    pub fn new(registry: Arc<TenantConnectionRegistry>, config: Arc<AppConfig>) -> Self {
        Self { registry, config }
    }

    /// Run `op` against the master database and every active tenant
    /// concurrently, collecting whatever rows each branch produces.
    ///
    /// Branch failures (resolution, execution, timeout) are logged and
    /// counted but never propagate; the caller sees fewer rows instead.
    pub async fn run_everywhere<T, F, Fut>(&self, op: F) -> Result<FanOutOutcome<T>>
    where
        T: Send + 'static,
        F: Fn(FanOutSource, DatabaseConnection) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
    {
        let mappings = self
            .registry
            .active_mappings()
            .await
            .context("failed to enumerate active tenants")?;

        let mut sources = vec![FanOutSource::Master];
        sources.extend(mappings.iter().map(|m| FanOutSource::Tenant(m.dealer_id)));
        let sources_total = sources.len();

        let semaphore = Arc::new(Semaphore::new(self.config.fanout.concurrency.max(1)));
        let budget = Duration::from_millis(self.config.fanout.timeout_ms);

        let mut handles = Vec::with_capacity(sources_total);
        for source in sources {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("fan-out semaphore closed")?;
            let op = op.clone();
            let registry = Arc::clone(&self.registry);
            let master = self.registry.master().clone();

            // Each branch is wrapped individually, resolution included, so
            // one slow tenant cannot hold up collection of the others.
            handles.push(tokio::spawn(async move {
                let _permit = permit;

                let branch = async {
                    let conn = match source {
                        FanOutSource::Master => master,
                        FanOutSource::Tenant(dealer_id) => registry
                            .resolve(dealer_id)
                            .await
                            .map_err(|err| err.to_string())?,
                    };
                    op(source, conn).await.map_err(|err| err.to_string())
                };

                match timeout(budget, branch).await {
                    Ok(Ok(rows)) => Some(rows),
                    Ok(Err(message)) => {
                        warn!(%source, %message, "fan-out branch failed");
                        counter!("fanout_branch_failures_total").increment(1);
                        None
                    }
                    Err(_) => {
                        warn!(%source, ?budget, "fan-out branch timed out");
                        counter!("fanout_branch_timeouts_total").increment(1);
                        None
                    }
                }
            }));
        }

        let mut rows = Vec::new();
        let mut sources_failed = 0;
        for handle in handles {
            match handle.await {
                Ok(Some(branch_rows)) => rows.extend(branch_rows),
                Ok(None) => sources_failed += 1,
                Err(join_err) => {
                    warn!(error = %join_err, "fan-out branch task panicked");
                    sources_failed += 1;
                }
            }
        }

        Ok(FanOutOutcome {
            rows,
            sources_total,
            sources_failed,
        })
    }

    /// First-match identity search: probe the master database first and stop
    /// on a hit; otherwise walk tenants in mapping order and stop at the
    /// first one that answers with a value.
    ///
    /// A record is expected to exist in exactly one partition, so the scan
    /// never continues past a hit.
    pub async fn find_first<T, F, Fut>(&self, probe: F) -> Result<Option<(FanOutSource, T)>>
    where
        F: Fn(FanOutSource, DatabaseConnection) -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let budget = Duration::from_millis(self.config.fanout.timeout_ms);

        match timeout(
            budget,
            probe(FanOutSource::Master, self.registry.master().clone()),
        )
        .await
        {
            Ok(Ok(Some(value))) => return Ok(Some((FanOutSource::Master, value))),
            Ok(Ok(None)) => {}
            Ok(Err(err)) => {
                warn!(error = %err, "master probe failed during identity search");
            }
            Err(_) => {
                warn!(?budget, "master probe timed out during identity search");
            }
        }

        for mapping in self
            .registry
            .active_mappings()
            .await
            .context("failed to enumerate active tenants")?
        {
            let source = FanOutSource::Tenant(mapping.dealer_id);
            let conn = match self.registry.resolve(mapping.dealer_id).await {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(%source, error = %err, "skipping unreachable tenant during identity search");
                    continue;
                }
            };

            match timeout(budget, probe(source, conn)).await {
                Ok(Ok(Some(value))) => return Ok(Some((source, value))),
                Ok(Ok(None)) => {}
                Ok(Err(err)) => {
                    warn!(%source, error = %err, "tenant probe failed during identity search");
                }
                Err(_) => {
                    warn!(%source, ?budget, "tenant probe timed out during identity search");
                }
            }
        }

        Ok(None)
    }
}

/// Sort merged rows descending by `key`, then slice out one page.
///
/// `page` is 1-based. Returns the page plus the total row count before
/// pagination.
pub fn sort_and_paginate<T, K, F>(
    mut rows: Vec<T>,
    key: F,
    page: u64,
    per_page: u64,
) -> (Vec<T>, u64)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    rows.sort_by(|a, b| key(b).cmp(&key(a)));

    let total = rows.len() as u64;
    let per_page = per_page.max(1);
    let start = page.saturating_sub(1).saturating_mul(per_page);

    let page_rows = rows
        .into_iter()
        .skip(start as usize)
        .take(per_page as usize)
        .collect();

    (page_rows, total)
}

/// Case-insensitive substring match across a row's searchable fields.
///
/// Applied client-side after the merge: the match may span master and
/// tenant naming, so it cannot always be pushed into per-database queries.
pub fn matches_search(fields: &[&str], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
