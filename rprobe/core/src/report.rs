use std::time::Duration;

use bytes::Bytes;

use crate::error::{ProbeError, Stage};

/// Everything observable about one finished attempt.
#[derive(Debug, Default)]
pub struct ProbeReport {
    /// Exact bytes transmitted, recorded only once the whole payload went out.
    pub sent: Option<Bytes>,
    /// Reply bytes, recorded only by the reply variant. An empty reply means
    /// the server closed or had nothing to say, which is a success.
    pub reply: Option<Vec<u8>>,
    /// How long the attempt lingered before closing (one-way variant).
    pub paused: Option<Duration>,
    /// First stage failure, if any.
    pub error: Option<ProbeError>,
    /// Release failure, kept apart so it cannot mask an earlier error.
    pub close_error: Option<ProbeError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(Stage),
}

impl ProbeReport {
    /// A close failure alone does not fail the attempt; it is reported in
    /// its own line and suppressed.
    pub fn outcome(&self) -> Outcome {
        match &self.error {
            None => Outcome::Succeeded,
            Some(error) => Outcome::Failed(error.stage()),
        }
    }

    /// Diagnostic lines in stage order, ready for stdout. Byte buffers are
    /// rendered as literal sequences, not as strings.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(sent) = &self.sent {
            lines.push(format!("sent: {:?}", sent.as_ref()));
        }
        if let Some(reply) = &self.reply {
            lines.push(format!("received: {:?}", reply.as_slice()));
        }
        if let Some(error) = &self.error {
            lines.push(error.to_string());
        }
        match &self.close_error {
            Some(error) => lines.push(error.to_string()),
            None => lines.push("socket closed".to_string()),
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, ProbeReport};
    use crate::error::{ProbeError, Stage};
    use bytes::Bytes;
    use std::io;

    #[test]
    fn successful_exchange_lines_follow_stage_order() {
        let report = ProbeReport {
            sent: Some(Bytes::from_static(&[1, 2, 3])),
            reply: Some(vec![4, 5]),
            ..ProbeReport::default()
        };

        assert_eq!(
            vec![
                "sent: [1, 2, 3]".to_string(),
                "received: [4, 5]".to_string(),
                "socket closed".to_string(),
            ],
            report.lines()
        );
        assert_eq!(Outcome::Succeeded, report.outcome());
    }

    #[test]
    fn empty_reply_is_distinguishable_from_no_reply() {
        let with_empty_reply = ProbeReport {
            sent: Some(Bytes::from_static(&[1])),
            reply: Some(Vec::new()),
            ..ProbeReport::default()
        };
        let without_read = ProbeReport {
            sent: Some(Bytes::from_static(&[1])),
            ..ProbeReport::default()
        };

        assert!(with_empty_reply.lines().contains(&"received: []".to_string()));
        assert!(!without_read.lines().iter().any(|line| line.starts_with("received")));
    }

    #[test]
    fn connect_failure_renders_one_error_then_the_close_line() {
        let report = ProbeReport {
            error: Some(ProbeError::Connection {
                authority: "localhost:8080".to_string(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }),
            ..ProbeReport::default()
        };

        let lines = report.lines();
        assert_eq!(2, lines.len());
        assert!(lines[0].starts_with("connection to localhost:8080 failed"));
        assert_eq!("socket closed", lines[1]);
        assert_eq!(Outcome::Failed(Stage::Connect), report.outcome());
    }

    #[test]
    fn close_failure_is_reported_without_failing_the_attempt() {
        let report = ProbeReport {
            sent: Some(Bytes::from_static(&[9])),
            reply: Some(vec![9]),
            close_error: Some(ProbeError::Close {
                source: io::Error::from(io::ErrorKind::BrokenPipe),
            }),
            ..ProbeReport::default()
        };

        assert_eq!(Outcome::Succeeded, report.outcome());
        let lines = report.lines();
        assert!(lines.last().unwrap().starts_with("closing socket failed"));
    }

    #[test]
    fn send_failure_keeps_the_stage_in_the_outcome() {
        let report = ProbeReport {
            error: Some(ProbeError::Send {
                sent: 0,
                expected: 16,
                source: io::Error::from(io::ErrorKind::BrokenPipe),
            }),
            ..ProbeReport::default()
        };

        assert_eq!(Outcome::Failed(Stage::Send), report.outcome());
    }
}
