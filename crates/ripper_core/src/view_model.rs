use crate::{HostRow, Status};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub status: Status,
    /// Present only while `status` is `Error`.
    pub error_message: Option<String>,
    /// Present only while `status` is `Success`.
    pub results: Option<ResultsView>,
    pub usage_count: u64,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub target: String,
    pub links: Vec<String>,
    pub elapsed_ms: u64,
    pub hosts: Vec<HostRow>,
    pub host_count: usize,
}
