//! Page ripper engine: remote API calls, effect execution and file delivery.
mod api;
mod delivery;
mod engine;
mod export;
mod filename;
mod types;

pub use api::{ApiClient, ApiSettings, ReqwestApiClient, COUNT_PATH, RIP_PATH};
pub use delivery::{
    detect_delivery, ensure_output_dir, DeliveryError, DirectSave, FileDelivery, StagedSave,
};
pub use engine::{ChannelEventSink, EngineError, EngineHandle, EventSink};
pub use export::{build_link_export, export_links, ExportOptions, ExportSummary, LinkExport};
pub use filename::download_safe_name;
pub use types::{ApiError, CountResponse, EngineEvent, FailureKind, RequestId, RipResponse};
