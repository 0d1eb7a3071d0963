use ripper_core::{AppViewModel, ResultsView, Status};

use super::input::{COMMAND_DISMISS, COMMAND_DOWNLOAD};
use crate::platform::effects::Notice;

const HOST_COLUMN_WIDTH: usize = 40;

/// Renders a view snapshot as terminal lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!(
        "[{}] This app has ripped {} pages",
        status_label(view.status),
        view.usage_count
    )];

    if let Some(message) = &view.error_message {
        lines.push("Oops, something went wrong!".to_string());
        lines.push(format!("  {message}"));
        lines.push(format!("  (type {COMMAND_DISMISS} to continue)"));
    }

    if let Some(results) = &view.results {
        render_results(results, &mut lines);
    }

    lines
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Exported { path, link_count } => {
            format!("Saved {link_count} links to {}", path.display())
        }
        Notice::ExportFailed { reason } => format!("Could not save the links: {reason}"),
    }
}

fn render_results(results: &ResultsView, lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push(results.target.clone());
    lines.push(format!(
        "Found {} links in {} milliseconds",
        results.links.len(),
        results.elapsed_ms
    ));
    lines.extend(results.links.iter().map(|link| format!("  {link}")));

    lines.push(String::new());
    lines.push(format!(
        "{} points to {} hosts",
        results.target, results.host_count
    ));
    lines.extend(results.hosts.iter().map(|row| {
        format!(
            "  {:<width$} {} times",
            row.host,
            row.count,
            width = HOST_COLUMN_WIDTH
        )
    }));

    lines.push(String::new());
    lines.push(format!("(type {COMMAND_DOWNLOAD} to save the links as CSV)"));
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Idle => "Ready",
        Status::Submitting => "Ripping...",
        Status::Success => "Done",
        Status::Error => "Error",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{Duration, TimeZone, Utc};
    use ripper_core::{
        update, AppState, FailureCategory, HostCounts, Msg, RequestFailure, RipPayload,
    };

    use super::*;

    fn ripped_then(result: Option<Result<RipPayload, RequestFailure>>) -> AppViewModel {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let (state, _) = update(
            AppState::new(),
            Msg::TargetSubmitted {
                raw: Some("http://example.com".to_string()),
                at,
            },
        );
        let mut hostnames = HostCounts::new();
        hostnames.insert("example.com".to_string(), 2);
        hostnames.insert(String::new(), 1);
        let (state, _) = update(
            state,
            Msg::RipCompleted {
                request_id: 1,
                result: Ok(RipPayload {
                    links: Some(vec![
                        "http://example.com/a".to_string(),
                        "http://example.com/b".to_string(),
                        "/about".to_string(),
                    ]),
                    hostnames: Some(hostnames),
                }),
                at: at + Duration::milliseconds(12),
            },
        );
        match result {
            None => state.view(),
            Some(result) => {
                let (state, _) = update(
                    state,
                    Msg::TargetSubmitted {
                        raw: Some("http://broken.example".to_string()),
                        at,
                    },
                );
                let (state, _) = update(
                    state,
                    Msg::RipCompleted {
                        request_id: 2,
                        result,
                        at,
                    },
                );
                state.view()
            }
        }
    }

    #[test]
    fn idle_view_shows_only_the_counter() {
        let lines = render(&AppState::new().view());
        assert_eq!(lines, vec!["[Ready] This app has ripped 100 pages"]);
    }

    #[test]
    fn success_view_lists_links_and_hosts() {
        let lines = render(&ripped_then(None));

        assert!(lines.contains(&"Found 3 links in 12 milliseconds".to_string()));
        assert!(lines.contains(&"  http://example.com/b".to_string()));
        assert!(lines.contains(&"http://example.com points to 2 hosts".to_string()));
        let host_rows: Vec<_> = lines
            .iter()
            .filter(|line| line.ends_with(" times"))
            .collect();
        assert_eq!(host_rows.len(), 2);
        assert!(host_rows[0].trim_start().starts_with("example.com"));
        assert!(host_rows[1].trim_start().starts_with("relative (self)"));
    }

    #[test]
    fn error_view_hides_stale_results() {
        let failure = RequestFailure::new(
            FailureCategory::Service,
            Some("Relative URLs are not supported".to_string()),
        );
        let lines = render(&ripped_then(Some(Err(failure))));

        assert_eq!(lines[0], "[Error] This app has ripped 100 pages");
        assert!(lines.contains(&"Oops, something went wrong!".to_string()));
        assert!(lines.contains(&"  Relative URLs are not supported".to_string()));
        assert!(!lines.iter().any(|line| line.contains("http://example.com/a")));
        assert!(!lines.iter().any(|line| line.contains(" times")));
    }

    #[test]
    fn notices_name_the_file() {
        let line = render_notice(&Notice::Exported {
            path: PathBuf::from("/tmp/pageripperx.csv"),
            link_count: 2,
        });
        assert_eq!(line, "Saved 2 links to /tmp/pageripperx.csv");
    }
}
