//! Request lifecycle engine shared by every domain slice.
//!
//! Each operation goes `Pending -> Fulfilled | Rejected | Cancelled`. The
//! outcome is recorded twice:
//!
//! - in the shared [`SliceFlags`] (`is_loading`, `error`, `success`), where
//!   concurrent operations of one domain overwrite each other and the last
//!   one to settle wins;
//! - in the [`OperationTracker`], which keeps the status of every pending
//!   request and of the latest request of each operation, so consumers that
//!   need per-operation granularity are not affected by that race.
//!
//! Starting a supersedable operation cancels the older pending request of
//! the same operation. Settlements of requests the tracker no longer
//! considers current are dropped, and their callers get `Cancelled`.

use crate::core::domain::error::{ConsoleError, ConsoleResult, NormalizedError};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Identifier of one dispatched request, unique within a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(&self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn for_tests(id: u64) -> Self {
        RequestId(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle status of a request or an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
    Cancelled,
}

/// An operation kind of a domain.
pub trait Operation: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Whether a newer request of this operation cancels an older pending one.
    ///
    /// Only reads that fill a single slot qualify. A superseded mutation
    /// may already have been applied by the server.
    fn is_supersedable(&self) -> bool;
}

/// Flags shared by every operation of a domain.
///
/// `is_loading && success` and `error.is_some() && success` never hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceFlags {
    pub is_loading: bool,
    pub error: Option<NormalizedError>,
    pub success: bool,
}

impl SliceFlags {
    fn start(&mut self) {
        self.is_loading = true;
        self.error = None;
        self.success = false;
    }

    fn fulfil(&mut self, success: bool) {
        self.is_loading = false;
        if success {
            self.success = true;
            self.error = None;
        }
    }

    fn reject(&mut self, error: NormalizedError) {
        self.is_loading = false;
        self.success = false;
        self.error = Some(error);
    }
}

/// Status bookkeeping for every pending request and the latest request of
/// each operation. Settled requests that are no longer the latest of their
/// operation are forgotten.
#[derive(Debug, Clone)]
pub struct OperationTracker<O: Operation> {
    pending: HashMap<RequestId, O>,
    latest: HashMap<O, (RequestId, OperationStatus)>,
}

impl<O: Operation> Default for OperationTracker<O> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            latest: HashMap::new(),
        }
    }
}

impl<O: Operation> PartialEq for OperationTracker<O> {
    fn eq(&self, other: &Self) -> bool {
        self.pending == other.pending && self.latest == other.latest
    }
}

impl<O: Operation> OperationTracker<O> {
    /// Registers a new pending request and returns the requests it supersedes.
    fn begin(&mut self, request: RequestId, operation: O) -> Vec<RequestId> {
        let superseded: Vec<RequestId> = if operation.is_supersedable() {
            self.pending
                .iter()
                .filter(|(_, pending_op)| **pending_op == operation)
                .map(|(id, _)| *id)
                .collect()
        } else {
            Vec::new()
        };
        for id in &superseded {
            self.pending.remove(id);
        }

        self.pending.insert(request, operation);
        self.latest
            .insert(operation, (request, OperationStatus::Pending));
        superseded
    }

    /// Marks a pending request as settled. Returns the operation when the
    /// request was still current, `None` when it had been superseded.
    fn settle(&mut self, request: RequestId, status: OperationStatus) -> Option<O> {
        let operation = self.pending.remove(&request)?;
        if let Some((latest, latest_status)) = self.latest.get_mut(&operation) {
            if *latest == request {
                *latest_status = status;
            }
        }
        Some(operation)
    }

    /// Status of one request. Forgotten requests report `Idle`.
    pub fn request_status(&self, request: RequestId) -> OperationStatus {
        if self.pending.contains_key(&request) {
            return OperationStatus::Pending;
        }
        self.latest
            .values()
            .find(|(id, _)| *id == request)
            .map(|(_, status)| *status)
            .unwrap_or_default()
    }

    /// Status of the latest request of an operation.
    pub fn operation_status(&self, operation: O) -> OperationStatus {
        self.latest
            .get(&operation)
            .map(|(_, status)| *status)
            .unwrap_or_default()
    }

    pub fn is_pending(&self, operation: O) -> bool {
        self.pending.values().any(|pending| *pending == operation)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_requests(&self) -> impl Iterator<Item = (RequestId, O)> + '_ {
        self.pending.iter().map(|(id, op)| (*id, *op))
    }
}

/// State of one domain slice and its merge policy.
pub trait SliceReducer: Default + Clone + Send + Sync + 'static {
    type Operation: Operation;
    type Payload: Send + 'static;

    fn flags(&self) -> &SliceFlags;
    fn flags_mut(&mut self) -> &mut SliceFlags;
    fn tracker(&self) -> &OperationTracker<Self::Operation>;
    fn tracker_mut(&mut self) -> &mut OperationTracker<Self::Operation>;

    /// Merges a fulfilled payload into the state. Returns whether the
    /// operation reports `success` (create, delete and lifecycle actions).
    fn merge(&mut self, payload: Self::Payload) -> bool;
}

/// A state transition of a slice.
#[derive(Debug, Clone)]
pub enum SliceAction<O, P> {
    Pending { request: RequestId, operation: O },
    Fulfilled { request: RequestId, payload: P },
    Rejected { request: RequestId, error: NormalizedError },
    Cancelled { request: RequestId },
    ClearError,
    ClearSuccess,
}

/// Applies one action to the state.
///
/// Returns `false` when the action was dropped because its request had
/// been superseded. Entity lists are only ever touched by `merge`, so a
/// rejected request leaves previously loaded data in place.
pub fn reduce<S: SliceReducer>(
    state: &mut S,
    action: SliceAction<S::Operation, S::Payload>,
) -> bool {
    match action {
        SliceAction::Pending { request, operation } => {
            state.tracker_mut().begin(request, operation);
            state.flags_mut().start();
            true
        }
        SliceAction::Fulfilled { request, payload } => {
            if state
                .tracker_mut()
                .settle(request, OperationStatus::Fulfilled)
                .is_none()
            {
                return false;
            }
            let success = state.merge(payload);
            state.flags_mut().fulfil(success);
            true
        }
        SliceAction::Rejected { request, error } => {
            if state
                .tracker_mut()
                .settle(request, OperationStatus::Rejected)
                .is_none()
            {
                return false;
            }
            state.flags_mut().reject(error);
            true
        }
        SliceAction::Cancelled { request } => {
            if state
                .tracker_mut()
                .settle(request, OperationStatus::Cancelled)
                .is_none()
            {
                return false;
            }
            let still_loading = state.tracker().has_pending();
            let flags = state.flags_mut();
            flags.is_loading = still_loading;
            if still_loading {
                flags.success = false;
            }
            true
        }
        SliceAction::ClearError => {
            state.flags_mut().error = None;
            true
        }
        SliceAction::ClearSuccess => {
            state.flags_mut().success = false;
            true
        }
    }
}

/// Owner of one domain's state. Runs API futures through the lifecycle and
/// is the only writer of the state it holds.
pub struct Slice<S: SliceReducer> {
    name: &'static str,
    state: Arc<RwLock<S>>,
    inflight: Mutex<HashMap<RequestId, CancellationToken>>,
    next_request: AtomicU64,
    lifetime: CancellationToken,
}

impl<S: SliceReducer> fmt::Debug for Slice<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slice")
            .field("name", &self.name)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl<S: SliceReducer> Slice<S> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(RwLock::new(S::default())),
            inflight: Mutex::new(HashMap::new()),
            next_request: AtomicU64::new(0),
            lifetime: CancellationToken::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns a copy of the current state, or `None` once disposed.
    pub async fn snapshot(&self) -> Option<S> {
        if self.is_disposed() {
            return None;
        }
        Some(self.state.read().await.clone())
    }

    /// Applies an action and reports whether it took effect.
    pub async fn dispatch(&self, action: SliceAction<S::Operation, S::Payload>) -> bool {
        let mut state = self.state.write().await;
        reduce(&mut *state, action)
    }

    /// Applies a consumer-side mutation that does not involve the network.
    pub(crate) async fn mutate<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut *state)
    }

    /// Runs `call` as one request of `operation`.
    ///
    /// The call is raced against the request's cancellation token; the
    /// settlement (fulfilled, rejected or cancelled) is applied once the
    /// race ends. `into_payload` converts the typed result for `merge`.
    ///
    /// # Errors
    /// Returns `ConsoleError::Disposed` once the slice is disposed,
    /// `ConsoleError::Cancelled` when the request was cancelled or
    /// superseded, and otherwise the API call's own error. A call that
    /// succeeded after its request was superseded or reset also reports
    /// `ConsoleError::Cancelled`, since its result was not merged.
    pub async fn run<T, Fut, F>(
        &self,
        operation: S::Operation,
        call: Fut,
        into_payload: F,
    ) -> ConsoleResult<T>
    where
        T: Clone,
        Fut: Future<Output = ConsoleResult<T>>,
        F: FnOnce(T) -> S::Payload,
    {
        let (request, token) = self.begin(operation).await?;

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ConsoleError::Cancelled),
            result = call => result,
        };

        self.inflight.lock().await.remove(&request);

        let action = match &outcome {
            Ok(value) => SliceAction::Fulfilled {
                request,
                payload: into_payload(value.clone()),
            },
            Err(ConsoleError::Cancelled) => SliceAction::Cancelled { request },
            Err(error) => {
                warn!(slice = self.name, %request, ?operation, %error, "operation rejected");
                SliceAction::Rejected {
                    request,
                    error: error.normalize(),
                }
            }
        };

        if self.dispatch(action).await {
            debug!(slice = self.name, %request, ?operation, "operation settled");
            return outcome;
        }

        debug!(slice = self.name, %request, ?operation, "dropped stale settlement");
        match outcome {
            Ok(_) => Err(ConsoleError::Cancelled),
            Err(error) => Err(error),
        }
    }

    async fn begin(
        &self,
        operation: S::Operation,
    ) -> ConsoleResult<(RequestId, CancellationToken)> {
        if self.is_disposed() {
            return Err(ConsoleError::Disposed);
        }

        let request = RequestId(self.next_request.fetch_add(1, Ordering::Relaxed) + 1);
        let token = self.lifetime.child_token();

        let superseded = {
            let mut state = self.state.write().await;
            let superseded = state.tracker_mut().begin(request, operation);
            state.flags_mut().start();
            superseded
        };

        let mut inflight = self.inflight.lock().await;
        for old in superseded {
            if let Some(old_token) = inflight.remove(&old) {
                debug!(slice = self.name, superseded = %old, by = %request, "superseding request");
                old_token.cancel();
            }
        }
        inflight.insert(request, token.clone());

        debug!(slice = self.name, %request, ?operation, "operation pending");
        Ok((request, token))
    }

    /// Cancels every pending request of `operation`.
    pub async fn cancel(&self, operation: S::Operation) {
        let targets: Vec<RequestId> = {
            let state = self.state.read().await;
            state
                .tracker()
                .pending_requests()
                .filter(|(_, op)| *op == operation)
                .map(|(id, _)| id)
                .collect()
        };

        let inflight = self.inflight.lock().await;
        for request in targets {
            if let Some(token) = inflight.get(&request) {
                token.cancel();
            }
        }
    }

    /// Cancels every pending request of the slice.
    pub async fn cancel_all(&self) {
        let inflight = self.inflight.lock().await;
        for token in inflight.values() {
            token.cancel();
        }
    }

    /// Cancels everything and refuses further operations.
    pub fn dispose(&self) {
        self.lifetime.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.lifetime.is_cancelled()
    }

    pub async fn clear_error(&self) {
        self.dispatch(SliceAction::ClearError).await;
    }

    pub async fn clear_success(&self) {
        self.dispatch(SliceAction::ClearSuccess).await;
    }

    /// Restores the initial state. Pending requests are cancelled first.
    pub async fn reset(&self) {
        self.cancel_all().await;
        *self.state.write().await = S::default();
    }
}
