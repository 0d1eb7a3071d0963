use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use chrono::Utc;
use ripper_core::{Effect, FailureCategory, Msg, RequestFailure, RipPayload, Timestamp};
use ripper_engine::{
    detect_delivery, export_links, ApiError, EngineError, EngineEvent, EngineHandle, EventSink,
    ExportOptions, FailureKind, FileDelivery,
};
use ripper_logging::{ripper_error, ripper_info, ripper_warn};

use super::config::AppConfig;
use super::ui::input::AppEvent;

/// One-line outcome reported to the user outside the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Exported { path: PathBuf, link_count: usize },
    ExportFailed { reason: String },
}

pub struct EffectRunner {
    engine: EngineHandle,
    delivery: Box<dyn FileDelivery>,
    export_options: ExportOptions,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, events: mpsc::Sender<AppEvent>) -> Result<Self, EngineError> {
        let sink = Arc::new(MsgSink { tx: events });
        let engine = EngineHandle::new(config.api_settings(), sink)?;
        let delivery = detect_delivery(config.download_dir.as_deref());
        Ok(Self {
            engine,
            delivery,
            export_options: config.export_options(),
        })
    }

    pub fn run(&self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::Rip { request_id, target } => {
                    ripper_info!(
                        "Rip request_id={} target_len={} target={}",
                        request_id,
                        target.len(),
                        target
                    );
                    self.engine.rip(request_id, target);
                }
                Effect::FetchUsageCount => {
                    self.engine.fetch_count();
                }
                Effect::ExportLinks { target, links } => {
                    let notice = match export_links(
                        &target,
                        &links,
                        &self.export_options,
                        self.delivery.as_ref(),
                    ) {
                        Ok(summary) => Notice::Exported {
                            path: summary.path,
                            link_count: summary.link_count,
                        },
                        Err(err) => {
                            ripper_error!("Export of {} links failed: {}", links.len(), err);
                            Notice::ExportFailed {
                                reason: err.to_string(),
                            }
                        }
                    };
                    notices.push(notice);
                }
            }
        }
        notices
    }
}

/// Stamps engine completions with the current time and queues them as messages.
struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Msg(map_event(event, Utc::now())));
    }
}

pub(crate) fn map_event(event: EngineEvent, at: Timestamp) -> Msg {
    match event {
        EngineEvent::RipCompleted { request_id, result } => Msg::RipCompleted {
            request_id,
            result: result
                .map(|response| {
                    ripper_info!(
                        "Rip request {} completed links={} hosts={}",
                        request_id,
                        response.links.as_ref().map_or(0, Vec::len),
                        response.hostnames.as_ref().map_or(0, |hosts| hosts.len())
                    );
                    RipPayload {
                        links: response.links,
                        hostnames: response.hostnames,
                    }
                })
                .map_err(|err| {
                    ripper_warn!("Rip request {} failed: {}", request_id, err);
                    map_failure(err)
                }),
            at,
        },
        EngineEvent::CountCompleted { result } => Msg::UsageCountLoaded(
            result.map(|response| response.count).map_err(|err| {
                // Decorative counter: log only.
                ripper_warn!("Usage counter refresh failed: {}", err);
                map_failure(err)
            }),
        ),
    }
}

fn map_failure(err: ApiError) -> RequestFailure {
    let category = match &err.kind {
        kind if kind.is_transport() => FailureCategory::Transport,
        FailureKind::HttpStatus(_) => FailureCategory::Service,
        _ => FailureCategory::MalformedResponse,
    };
    RequestFailure::new(category, err.message)
}
