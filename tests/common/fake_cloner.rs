//! Cloner that touches only the filesystem and records its concurrency

use async_trait::async_trait;
use gctl::domain::value_objects::Credential;
use gctl::infrastructure::git::{CloneError, CloneRequest, RepositoryCloner, WorkingCopy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Creates `destination/.git` after a delay, tracking how many clones overlap
///
/// A destination that already holds files fails with `DestinationConflict`,
/// like the real cloner.
pub struct InstrumentedCloner {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
}

impl InstrumentedCloner {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Highest number of clones observed in flight at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RepositoryCloner for InstrumentedCloner {
    async fn clone_repository(
        &self,
        request: &CloneRequest,
        _credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<WorkingCopy, CloneError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.urls.lock().unwrap().push(request.url.clone());

        let occupied = std::fs::read_dir(&request.destination)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false);
        if occupied {
            return Err(CloneError::DestinationConflict {
                path: request.destination.clone(),
            });
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(CloneError::Cancelled),
            _ = tokio::time::sleep(self.delay) => {}
        }

        let git_dir = request.destination.join(".git");
        std::fs::create_dir_all(&git_dir).map_err(|source| CloneError::Io {
            path: git_dir.clone(),
            source,
        })?;
        Ok(WorkingCopy {
            path: request.destination.clone(),
            head: None,
        })
    }
}
