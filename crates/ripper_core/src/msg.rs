use crate::{RequestFailure, RequestId, RipPayload, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Front-end finished initializing.
    Started,
    /// User submitted a target address. `None` when the input was never filled in.
    TargetSubmitted { raw: Option<String>, at: Timestamp },
    /// The processing call resolved.
    RipCompleted {
        request_id: RequestId,
        result: Result<RipPayload, RequestFailure>,
        at: Timestamp,
    },
    /// The usage counter call resolved. `Ok(None)` means the body had no `count`.
    UsageCountLoaded(Result<Option<u64>, RequestFailure>),
    /// User acknowledged the error panel.
    DismissErrorClicked,
    /// User asked for the CSV download of the current links.
    DownloadClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}
