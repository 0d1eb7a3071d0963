//! Page ripper core: pure request lifecycle state machine and view-model helpers.
mod effect;
mod hosts;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use hosts::{aggregate_hosts, HostCounts, HostRow, RELATIVE_HOST_LABEL};
pub use msg::Msg;
pub use state::{
    AppState, FailureCategory, RequestFailure, RequestId, RipPayload, Status, Timestamp,
    DEFAULT_USAGE_COUNT, GENERIC_ERROR_MESSAGE, INITIAL_USAGE_COUNT,
};
pub use update::{is_submittable, update};
pub use view_model::{AppViewModel, ResultsView};
