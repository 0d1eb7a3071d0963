use crate::hosts::{aggregate_hosts, HostCounts};
use crate::view_model::{AppViewModel, ResultsView};

pub type RequestId = u64;
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Usage counter shown before the first successful count fetch.
pub const INITIAL_USAGE_COUNT: u64 = 100;
/// Usage counter applied when the count response carries no `count`.
pub const DEFAULT_USAGE_COUNT: u64 = 1000;
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again later";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

/// Decoded body of a successful processing call. Both fields are optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RipPayload {
    pub links: Option<Vec<String>>,
    pub hostnames: Option<HostCounts>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// No response was received.
    Transport,
    /// The service answered with a failure status.
    Service,
    /// The body could not be decoded.
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub category: FailureCategory,
    /// Service message or status text, when the response provided one.
    pub message: Option<String>,
}

impl RequestFailure {
    pub fn new(category: FailureCategory, message: Option<String>) -> Self {
        Self { category, message }
    }

    /// Text shown in the error panel; never empty.
    pub fn user_message(&self) -> String {
        match (self.category, self.message.as_deref()) {
            (FailureCategory::Service, Some(message)) if !message.trim().is_empty() => {
                message.to_string()
            }
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRequest {
    id: RequestId,
    target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    target: String,
    links: Vec<String>,
    hosts: HostCounts,
    status: Status,
    error_message: String,
    started_at: Option<Timestamp>,
    elapsed_ms: u64,
    usage_count: u64,
    pending: Option<PendingRequest>,
    last_request_id: RequestId,
    started: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            target: String::new(),
            links: Vec::new(),
            hosts: HostCounts::new(),
            status: Status::Idle,
            error_message: String::new(),
            started_at: None,
            elapsed_ms: 0,
            usage_count: INITIAL_USAGE_COUNT,
            pending: None,
            last_request_id: 0,
            started: false,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Immutable snapshot for renderers. Result tables are only present on success.
    pub fn view(&self) -> AppViewModel {
        let results = (self.status == Status::Success).then(|| ResultsView {
            target: self.target.clone(),
            links: self.links.clone(),
            elapsed_ms: self.elapsed_ms,
            hosts: aggregate_hosts(&self.hosts),
            host_count: self.hosts.len(),
        });
        let error_message =
            (self.status == Status::Error).then(|| self.error_message.clone());
        AppViewModel {
            status: self.status,
            error_message,
            results,
            usage_count: self.usage_count,
            dirty: self.dirty,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn hosts(&self) -> &HostCounts {
        &self.hosts
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    /// Id of the processing call whose completion is currently awaited.
    pub fn in_flight(&self) -> Option<RequestId> {
        self.pending.as_ref().map(|pending| pending.id)
    }

    /// Returns whether state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Returns `true` the first time only.
    pub(crate) fn mark_started(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    pub(crate) fn begin_request(&mut self, target: String, at: Timestamp) -> RequestId {
        self.last_request_id += 1;
        let id = self.last_request_id;
        self.started_at = Some(at);
        self.error_message.clear();
        self.status = Status::Submitting;
        self.pending = Some(PendingRequest { id, target });
        self.dirty = true;
        id
    }

    /// Takes the pending request if `request_id` is the one in flight.
    fn resolve(&mut self, request_id: RequestId) -> Option<PendingRequest> {
        match &self.pending {
            Some(pending) if pending.id == request_id => self.pending.take(),
            _ => None,
        }
    }

    pub(crate) fn is_in_flight(&self, request_id: RequestId) -> bool {
        self.in_flight() == Some(request_id)
    }

    /// Applies a successful processing response. Returns `true` when links were stored.
    pub(crate) fn apply_rip_success(
        &mut self,
        request_id: RequestId,
        payload: RipPayload,
        at: Timestamp,
    ) -> bool {
        let Some(pending) = self.resolve(request_id) else {
            return false;
        };
        self.elapsed_ms = self.elapsed_since_start(at);
        self.dirty = true;

        // A response without `hostnames` keeps the previous hosts.
        if let Some(hostnames) = payload.hostnames {
            self.hosts = hostnames;
        }

        match payload.links {
            Some(links) => {
                self.links = links;
                self.target = pending.target;
                self.status = Status::Success;
                true
            }
            None => {
                self.status = Status::Idle;
                false
            }
        }
    }

    pub(crate) fn apply_rip_failure(&mut self, request_id: RequestId, failure: &RequestFailure) {
        if self.resolve(request_id).is_none() {
            return;
        }
        self.status = Status::Error;
        self.error_message = failure.user_message();
        self.dirty = true;
    }

    pub(crate) fn dismiss_error(&mut self) {
        if self.status == Status::Error {
            self.status = Status::Idle;
            self.error_message.clear();
            self.dirty = true;
        }
    }

    pub(crate) fn set_usage_count(&mut self, count: u64) {
        if self.usage_count != count {
            self.usage_count = count;
            self.dirty = true;
        }
    }

    fn elapsed_since_start(&self, now: Timestamp) -> u64 {
        self.started_at
            .map(|started| (now - started).num_milliseconds().unsigned_abs())
            .unwrap_or(0)
    }
}
