use crate::RequestId;

/// Side effects requested by [`crate::update`]; executed outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `POST /api/v1/rip` with `{ "target": target }`.
    Rip { request_id: RequestId, target: String },
    /// `GET /api/v1/count`.
    FetchUsageCount,
    /// Serialize the links of the current result and deliver them as a CSV file.
    ExportLinks { target: String, links: Vec<String> },
}
