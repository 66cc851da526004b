//! Client side of the worker protocol
//!
//! Assigns ids, routes responses back to their callers and enforces the hard
//! stop after `dispose`.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use super::protocol::{Envelope, Request, Response};
use super::service::spawn_worker;
use crate::table::{CacheConfig, DirAssets, FsStore, ParallelEvaluator, PatternTableCache};

/// How the worker and its cache are set up
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub cache: CacheConfig,
    /// Directory holding `<dataset>-<L>.ptab` assets
    pub asset_dir: Option<PathBuf>,
    /// Directory for the durable row store
    pub store_dir: Option<PathBuf>,
    /// Use the parallel row evaluator for short words
    pub accelerate: bool,
    /// Grace period between `dispose` and the forced stop
    pub hard_stop_after: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            asset_dir: None,
            store_dir: None,
            accelerate: true,
            hard_stop_after: Duration::from_secs(2),
        }
    }
}

impl WorkerConfig {
    /// Build the cache this configuration describes
    ///
    /// # Errors
    /// If the store directory cannot be created.
    pub fn build_cache(&self) -> Result<PatternTableCache> {
        let mut cache = PatternTableCache::new(self.cache.clone());
        if let Some(dir) = &self.asset_dir {
            cache = cache.with_assets(DirAssets::new(dir));
        }
        if let Some(dir) = &self.store_dir {
            let store = FsStore::open(dir)
                .with_context(|| format!("opening row store at {}", dir.display()))?;
            cache = cache.with_store(store);
        }
        if self.accelerate {
            cache = cache.with_evaluator(ParallelEvaluator);
        }
        Ok(cache)
    }
}

type ProgressFn = Arc<Mutex<Box<dyn FnMut(f64) + Send>>>;

struct PendingCall {
    progress: Option<ProgressFn>,
    done: Sender<Response>,
}

type PendingMap = Arc<Mutex<FxHashMap<u64, PendingCall>>>;

/// An outstanding request
#[derive(Debug)]
pub struct Call {
    id: u64,
    done: Receiver<Response>,
}

impl Call {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Block until the final response
    #[must_use]
    pub fn wait(self) -> Response {
        self.done
            .recv()
            .unwrap_or_else(|_| Response::error("worker terminated"))
    }

    /// Block for at most `timeout`
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Response> {
        match self.done.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Response::error("worker terminated")),
        }
    }
}

/// Handle to a running worker
pub struct WorkerClient {
    requests: Sender<Envelope<Request>>,
    next_id: AtomicU64,
    pending: PendingMap,
    terminate: Arc<AtomicBool>,
    hard_stop_after: Duration,
}

impl std::fmt::Debug for WorkerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerClient")
            .field("next_id", &self.next_id)
            .field("pending", &self.pending.lock().len())
            .field("terminated", &self.terminate.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl WorkerClient {
    /// Start a worker configured by `config`
    ///
    /// # Errors
    /// If the cache cannot be built or a thread cannot be spawned.
    pub fn start(config: &WorkerConfig) -> Result<Self> {
        Self::with_cache(config.build_cache()?, config.hard_stop_after)
    }

    /// Start a worker around an existing cache
    ///
    /// # Errors
    /// If a thread cannot be spawned.
    pub fn with_cache(cache: PatternTableCache, hard_stop_after: Duration) -> Result<Self> {
        let (requests, inbox) = unbounded();
        let (outbox, responses) = unbounded();
        let terminate = Arc::new(AtomicBool::new(false));
        let pending: PendingMap = Arc::default();

        spawn_worker(cache, inbox, outbox, Arc::clone(&terminate))
            .context("spawning worker thread")?;
        let router_pending = Arc::clone(&pending);
        thread::Builder::new()
            .name("wordle-assist-router".into())
            .spawn(move || {
                for envelope in responses {
                    route(&router_pending, envelope);
                }
                fail_all(&router_pending, "worker terminated");
            })
            .context("spawning response router")?;

        Ok(Self {
            requests,
            next_id: AtomicU64::new(1),
            pending,
            terminate,
            hard_stop_after,
        })
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Send `request` and return a handle to its final response
    #[must_use]
    pub fn call(&self, request: Request) -> Call {
        self.submit(request, None)
    }

    /// Like [`call`](Self::call), with progress events forwarded to `on_progress`
    #[must_use]
    pub fn call_with_progress(
        &self,
        request: Request,
        on_progress: impl FnMut(f64) + Send + 'static,
    ) -> Call {
        let callback: Box<dyn FnMut(f64) + Send> = Box::new(on_progress);
        self.submit(request, Some(Arc::new(Mutex::new(callback))))
    }

    fn submit(&self, request: Request, progress: Option<ProgressFn>) -> Call {
        let id = self.next_id();
        let (done, rx) = bounded(1);
        if self.terminate.load(Ordering::Acquire) {
            let _ = done.send(Response::error("worker terminated"));
            return Call { id, done: rx };
        }

        trace!(id, request = request.name(), "call");
        self.pending
            .lock()
            .insert(id, PendingCall { progress, done });
        if self.requests.send(Envelope { id, body: request }).is_err()
            && let Some(call) = self.pending.lock().remove(&id)
        {
            let _ = call.done.send(Response::error("worker terminated"));
        }
        Call { id, done: rx }
    }

    /// Cancel the running score job; idempotent and never answered
    pub fn cancel(&self) {
        let id = self.next_id();
        trace!(id, "cancel");
        let _ = self.requests.send(Envelope {
            id,
            body: Request::Cancel,
        });
    }

    /// Ask the worker to stop, forcing it after the grace period
    #[must_use]
    pub fn dispose(&self) -> Call {
        let call = self.call(Request::Dispose);

        let pending = Arc::clone(&self.pending);
        let terminate = Arc::clone(&self.terminate);
        let grace = self.hard_stop_after;
        let spawned = thread::Builder::new()
            .name("wordle-assist-hard-stop".into())
            .spawn(move || {
                thread::sleep(grace);
                hard_stop(&pending, &terminate);
            });
        if let Err(e) = spawned {
            warn!(error = %e, "no hard-stop timer, stopping now");
            hard_stop(&self.pending, &self.terminate);
        }
        call
    }

    /// Whether the client has been forcibly stopped
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }
}

impl Drop for WorkerClient {
    fn drop(&mut self) {
        self.terminate.store(true, Ordering::Release);
    }
}

fn hard_stop(pending: &PendingMap, terminate: &AtomicBool) {
    if !terminate.swap(true, Ordering::AcqRel) {
        debug!("hard stop");
    }
    fail_all(pending, "worker terminated");
}

fn fail_all(pending: &PendingMap, message: &str) {
    for (id, call) in pending.lock().drain() {
        trace!(id, "failing pending call");
        let _ = call.done.send(Response::error(message));
    }
}

/// Deliver one response; unknown ids are dropped
fn route(pending: &PendingMap, envelope: Envelope<Response>) {
    let Envelope { id, body } = envelope;
    if let Response::Progress { p } = body {
        let progress = pending.lock().get(&id).map(|call| call.progress.clone());
        match progress {
            Some(Some(callback)) => (*callback.lock())(p),
            Some(None) => {}
            None => trace!(id, "dropping progress for unknown call"),
        }
        return;
    }

    match pending.lock().remove(&id) {
        Some(call) => {
            let _ = call.done.send(body);
        }
        None => trace!(id, response = body.name(), "dropping response for unknown call"),
    }
}
