use crate::{AppState, Effect, Msg, Status, DEFAULT_USAGE_COUNT};

/// Shortest accepted target, in characters. Well-formedness is left to the service.
const MIN_TARGET_CHARS: usize = 4;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            if state.mark_started() {
                vec![Effect::FetchUsageCount]
            } else {
                Vec::new()
            }
        }
        Msg::TargetSubmitted { raw, at } => match raw {
            Some(raw) if is_submittable(&raw) => {
                let request_id = state.begin_request(raw.clone(), at);
                vec![Effect::Rip {
                    request_id,
                    target: raw,
                }]
            }
            _ => Vec::new(),
        },
        Msg::RipCompleted {
            request_id,
            result,
            at,
        } => {
            // Completions of superseded submissions are dropped.
            if !state.is_in_flight(request_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(payload) => {
                    if state.apply_rip_success(request_id, payload, at) {
                        vec![Effect::FetchUsageCount]
                    } else {
                        Vec::new()
                    }
                }
                Err(failure) => {
                    state.apply_rip_failure(request_id, &failure);
                    Vec::new()
                }
            }
        }
        Msg::UsageCountLoaded(result) => {
            // The counter is decorative; failures leave it as it was.
            if let Ok(count) = result {
                state.set_usage_count(count.unwrap_or(DEFAULT_USAGE_COUNT));
            }
            Vec::new()
        }
        Msg::DismissErrorClicked => {
            state.dismiss_error();
            Vec::new()
        }
        Msg::DownloadClicked => {
            if state.status() == Status::Success {
                vec![Effect::ExportLinks {
                    target: state.target().to_string(),
                    links: state.links().to_vec(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Coarse client-side guard: anything longer than three characters is sent.
///
/// Characters are Unicode scalar values, so `"😀😀"` is two characters even
/// though its UTF-16 length is four.
pub fn is_submittable(raw: &str) -> bool {
    raw.chars().count() >= MIN_TARGET_CHARS
}
