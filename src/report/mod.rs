//! Structured progress reporting.
//!
//! The installer never prints. It emits [`Event`]s to a [`Reporter`], and the
//! reporter decides how (or whether) to present them.
//!
//! # Implementations
//!
//! - [`ConsoleReporter`] - styled, human-readable terminal output
//! - [`JsonReporter`] - one JSON object per line, for scripts and CI logs

mod json;
mod terminal;

pub use self::json::JsonReporter;
pub use self::terminal::ConsoleReporter;

use serde::Serialize;

/// Something worth telling the user about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    RunHeader {
        version: String,
        os: String,
        arch: String,
        package_manager: Option<String>,
        profile: Option<String>,
    },
    ToolStarted {
        index: usize,
        total: usize,
        name: String,
        description: Option<String>,
    },
    Success {
        subject: Option<String>,
        message: String,
    },
    Warning {
        subject: Option<String>,
        message: String,
    },
    Error {
        subject: String,
        message: String,
    },
    Info {
        message: String,
    },
    RunComplete {
        installed: usize,
        failed: usize,
        needs_reboot: bool,
    },
}

impl Event {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    pub fn success(subject: Option<&str>, message: impl Into<String>) -> Self {
        Self::Success {
            subject: subject.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn warning(subject: Option<&str>, message: impl Into<String>) -> Self {
        Self::Warning {
            subject: subject.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn error(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// One-way sink for [`Event`]s.
///
/// Implementations must not block the pipeline or fail it; errors writing
/// output are swallowed.
pub trait Reporter: Send + Sync {
    fn report(&self, event: Event);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{Event, Reporter};

    /// Keeps every event for later assertions.
    #[derive(Default)]
    pub struct RecordingReporter {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        pub fn warnings(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Warning { message, .. } => Some(message),
                    _ => None,
                })
                .collect()
        }

        pub fn infos(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Info { message } => Some(message),
                    _ => None,
                })
                .collect()
        }

        pub fn errors(&self) -> Vec<(String, String)> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Error { subject, message } => Some((subject, message)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Reporter for RecordingReporter {
        fn report(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }
}
