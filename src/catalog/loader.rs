use super::{LookupError, LookupService, MovieRecord};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Delay strategy applied between two batches.
pub trait Pacer: Send + Sync {
    fn pause(&self) -> BoxFuture<'_, ()>;
}

/// Sleep for a fixed duration between batches (rate-limit courtesy).
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl Pacer for FixedDelay {
    fn pause(&self) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(self.0))
    }
}

/// Run batches back to back.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Pacer for NoDelay {
    fn pause(&self) -> BoxFuture<'_, ()> {
        Box::pin(std::future::ready(()))
    }
}

/// A failure that escaped per-title handling and ended the load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Batch {batch} failed: {reason}")]
    Batch { batch: usize, reason: String },
}

impl LoadError {
    pub fn user_message(&self) -> String {
        "Error loading movies. Please try again later.".to_string()
    }
}

/// A title that was dropped from the catalog.
#[derive(Debug)]
pub struct LookupFailure {
    pub title: String,
    pub error: LookupError,
}

/// Outcome of a full load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub catalog: Vec<MovieRecord>,
    pub failures: Vec<LookupFailure>,
    /// Batches that were awaited, including a failed one.
    pub batches: usize,
    pub error: Option<LoadError>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Resolves a title list in sequential, fixed-size batches.
pub struct CatalogLoader<L, P> {
    service: Arc<L>,
    pacer: P,
    batch_size: usize,
}

impl<L: LookupService, P: Pacer> CatalogLoader<L, P> {
    pub fn new(service: Arc<L>, pacer: P, batch_size: usize) -> Self {
        Self {
            service,
            pacer,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_count(&self, titles: usize) -> usize {
        titles.div_ceil(self.batch_size)
    }

    /// Look up every title and return the accumulated catalog.
    ///
    /// Lookups of one batch run concurrently and are all awaited before the
    /// next batch starts. Titles whose lookup fails are dropped and reported
    /// in [`LoadReport::failures`]. `on_progress` receives the accumulated
    /// catalog after each batch.
    pub async fn load_catalog<F>(&self, titles: &[String], mut on_progress: F) -> LoadReport
    where
        F: FnMut(&[MovieRecord]),
    {
        let mut report = LoadReport::default();
        let total = self.batch_count(titles.len());

        for (index, batch) in titles.chunks(self.batch_size).enumerate() {
            let batch_number = index + 1;
            log::info!(
                "Fetching batch {}/{} ({} titles)",
                batch_number,
                total,
                batch.len()
            );

            let mut handles = Vec::with_capacity(batch.len());
            for title in batch {
                let service = self.service.clone();
                let title = title.clone();
                handles.push(tokio::spawn(async move { service.lookup(&title).await }));
            }

            // Await every sibling, even after one of them blew up.
            let mut survivors = Vec::with_capacity(batch.len());
            let mut escaped = None;
            for (title, handle) in batch.iter().zip(handles) {
                match handle.await {
                    Ok(Ok(record)) => {
                        log::debug!("Successfully fetched information for movie {}", title);
                        survivors.push(record);
                    }
                    Ok(Err(error)) => {
                        log::warn!(
                            "Could not fetch movie {}. Ignoring it and continuing. Error was: {}",
                            title,
                            error
                        );
                        report.failures.push(LookupFailure {
                            title: title.clone(),
                            error,
                        });
                    }
                    Err(join_error) => {
                        log::error!("Lookup task for {} did not finish: {}", title, join_error);
                        escaped.get_or_insert_with(|| join_error.to_string());
                    }
                }
            }
            report.batches += 1;

            if let Some(reason) = escaped {
                log::error!("Aborting load after batch {}: {}", batch_number, reason);
                report.error = Some(LoadError::Batch {
                    batch: batch_number,
                    reason,
                });
                return report;
            }

            report.catalog.extend(survivors);
            on_progress(&report.catalog);

            if batch_number < total {
                self.pacer.pause().await;
            }
        }

        log::info!(
            "Loaded {} of {} movies ({} failed)",
            report.catalog.len(),
            titles.len(),
            report.failures.len()
        );
        report
    }
}
