use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use chrono::Utc;
use ripper_core::{update, AppState, Msg};
use ripper_logging::{ripper_debug, ripper_info};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui::input::{parse_line, AppEvent, COMMAND_DISMISS, COMMAND_DOWNLOAD, COMMAND_QUIT};
use super::ui::render;

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    logging::initialize(config.log_destination, config.log_level());
    ripper_info!("Page ripper starting against {}", config.api_base_url);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner =
        EffectRunner::new(&config, event_tx.clone()).context("starting request engine")?;
    spawn_input_reader(event_tx.clone());
    let _ = event_tx.send(AppEvent::Msg(Msg::Started));
    drop(event_tx);

    // Unlocked: terminal logging from engine threads writes to stdout too.
    let mut app = App::new(runner, io::stdout());
    app.print_help()?;
    app.render()?;

    let mut input_closed = false;
    while let Ok(event) = event_rx.recv() {
        // Drain whatever else is queued so one render covers the batch.
        let mut inbox = vec![event];
        inbox.extend(event_rx.try_iter());
        for event in inbox {
            match event {
                AppEvent::Msg(msg) => app.dispatch_msg(msg)?,
                AppEvent::Quit => {
                    ripper_info!("Quit requested");
                    return Ok(());
                }
                AppEvent::InputClosed => input_closed = true,
            }
        }
        if app.consume_dirty() {
            app.render()?;
        }
        if input_closed && ready_to_exit(&app.state) {
            ripper_info!("Input closed; exiting");
            return Ok(());
        }
    }
    Ok(())
}

/// After end of input the loop keeps running until the pending rip settles.
fn ready_to_exit(state: &AppState) -> bool {
    state.in_flight().is_none()
}

/// True when `update` will drop this message as a superseded completion.
fn is_stale_completion(state: &AppState, msg: &Msg) -> bool {
    match msg {
        Msg::RipCompleted { request_id, .. } => state.in_flight() != Some(*request_id),
        _ => false,
    }
}

/// Reads stdin line by line on its own thread.
fn spawn_input_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(parse_line(&line, Utc::now())).is_err() {
                return;
            }
        }
        ripper_debug!("stdin closed");
        let _ = tx.send(AppEvent::InputClosed);
    });
}

struct App<W: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
}

impl<W: Write> App<W> {
    fn new(runner: EffectRunner, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            out,
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) -> io::Result<()> {
        if let Msg::RipCompleted { request_id, .. } = &msg {
            if is_stale_completion(&self.state, &msg) {
                ripper_debug!(
                    "Discarding stale rip completion {} (in flight: {:?})",
                    request_id,
                    self.state.in_flight()
                );
            }
        }
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        for notice in self.runner.run(effects) {
            writeln!(self.out, "{}", render::render_notice(&notice))?;
        }
        Ok(())
    }

    fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    fn render(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        for line in render::render(&self.state.view()) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }

    fn print_help(&mut self) -> io::Result<()> {
        writeln!(self.out, "PAGE RIPPER: get all URLs from a page in CSV format.")?;
        writeln!(
            self.out,
            "Enter a URL to rip. Commands: {COMMAND_DOWNLOAD}, {COMMAND_DISMISS}, {COMMAND_QUIT}"
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn end_of_input_waits_for_the_pending_rip() {
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
        let state = AppState::new();
        assert!(ready_to_exit(&state));

        let (state, _) = update(
            state,
            Msg::TargetSubmitted {
                raw: Some("http://example.com".to_string()),
                at,
            },
        );
        let Some(request_id) = state.in_flight() else {
            panic!("submission should be in flight");
        };
        assert!(!ready_to_exit(&state));

        let (state, _) = update(
            state,
            Msg::RipCompleted {
                request_id,
                result: Ok(ripper_core::RipPayload {
                    links: Some(vec!["http://example.com/a".to_string()]),
                    hostnames: None,
                }),
                at,
            },
        );
        assert!(ready_to_exit(&state));
    }

    #[test]
    fn superseded_completions_are_recognised() {
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
        let completion = |request_id| Msg::RipCompleted {
            request_id,
            result: Ok(ripper_core::RipPayload::default()),
            at,
        };

        let idle = AppState::new();
        assert!(is_stale_completion(&idle, &completion(1)));
        assert!(!is_stale_completion(&idle, &Msg::DownloadClicked));

        let (state, _) = update(
            idle,
            Msg::TargetSubmitted {
                raw: Some("http://example.com".to_string()),
                at,
            },
        );
        let current = state.in_flight().unwrap();
        assert!(!is_stale_completion(&state, &completion(current)));
        assert!(is_stale_completion(&state, &completion(current + 1)));
    }
}
