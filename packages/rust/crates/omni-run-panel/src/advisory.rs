//! Non-fatal, user-visible notifications.

use std::fmt;

use log::Level;

use crate::host::{Host, HostError};

/// An advisory raised by the panel or session.
///
/// Advisories never abort the caller; they are shown through
/// [`Host::notify`] and mirrored to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// `setup` called without overrides; defaults stay in place.
    ConfigSkipped,
    /// `run` called while a job is in flight; the command was dropped.
    Busy {
        /// The rejected command.
        command: String,
    },
    /// `open` called before anything was ever run.
    NoOutputYet,
    /// The host refused to create or rebind the panel window.
    WindowFailed(HostError),
}

impl Advisory {
    /// Severity used for notification and logging.
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            Self::ConfigSkipped => Level::Info,
            Self::Busy { .. } | Self::NoOutputYet => Level::Warn,
            Self::WindowFailed(_) => Level::Error,
        }
    }

    /// Log the advisory and show it to the user.
    pub fn emit<H: Host + ?Sized>(&self, host: &mut H) {
        log::log!(self.level(), "{self}");
        host.notify(self.level(), &self.to_string());
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigSkipped => write!(f, "setup() called without options; using defaults"),
            Self::Busy { command } => {
                write!(f, "a command is already running; ignored `{command}`")
            }
            Self::NoOutputYet => write!(f, "no output to display yet"),
            Self::WindowFailed(err) => write!(f, "could not show the output panel: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisory_levels() {
        assert_eq!(Advisory::ConfigSkipped.level(), Level::Info);
        assert_eq!(Advisory::NoOutputYet.level(), Level::Warn);
        assert_eq!(
            Advisory::Busy {
                command: "ls".to_string()
            }
            .level(),
            Level::Warn
        );
    }

    #[test]
    fn test_busy_message_names_command() {
        let advisory = Advisory::Busy {
            command: "echo x".to_string(),
        };
        assert!(advisory.to_string().contains("echo x"));
    }
}
