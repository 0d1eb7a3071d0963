use ripper_core::{Msg, Timestamp};

pub const COMMAND_DISMISS: &str = ":ok";
pub const COMMAND_DOWNLOAD: &str = ":download";
pub const COMMAND_QUIT: &str = ":quit";

/// Events delivered to the front-end loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Msg(Msg),
    /// Explicit quit command: leave at once.
    Quit,
    /// End of input: leave once nothing is in flight.
    InputClosed,
}

/// Maps one line typed by the user. Anything that is not a command is a target.
pub fn parse_line(line: &str, now: Timestamp) -> AppEvent {
    match line.trim() {
        COMMAND_QUIT => AppEvent::Quit,
        COMMAND_DISMISS => AppEvent::Msg(Msg::DismissErrorClicked),
        COMMAND_DOWNLOAD => AppEvent::Msg(Msg::DownloadClicked),
        _ => AppEvent::Msg(Msg::TargetSubmitted {
            raw: Some(line.to_string()),
            at: now,
        }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn commands_and_targets_are_told_apart() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();

        assert_eq!(parse_line(":quit", now), AppEvent::Quit);
        assert_eq!(
            parse_line("  :ok ", now),
            AppEvent::Msg(Msg::DismissErrorClicked)
        );
        assert_eq!(
            parse_line(":download", now),
            AppEvent::Msg(Msg::DownloadClicked)
        );
        assert_eq!(
            parse_line(" https://example.com", now),
            AppEvent::Msg(Msg::TargetSubmitted {
                raw: Some(" https://example.com".to_string()),
                at: now,
            })
        );
    }
}
