//! CalendarView collaborator interface
//!
//! The pollers treat the remote booking page purely as a set of
//! addressable, clickable labeled elements behind this trait. The
//! production implementation lives in [`crate::webdriver`]; tests script
//! fakes against the same seam.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// How an element is addressed on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Exact visible text of a link (day numbers, slot times).
    LinkText(String),
    /// A named form control (the booking submit button).
    Control(String),
}

impl Locator {
    pub fn link<S: Into<String>>(text: S) -> Self {
        Locator::LinkText(text.into())
    }

    pub fn control<S: Into<String>>(name: S) -> Self {
        Locator::Control(name.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::LinkText(text) => write!(f, "link '{}'", text),
            Locator::Control(name) => write!(f, "control '{}'", name),
        }
    }
}

/// A nested addressing context on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The top-level page content.
    Top,
    /// An embedded frame, by index.
    Frame(u16),
}

/// Opaque handle to an element currently on the page. Handles go stale
/// when the view re-renders; clicking a stale handle is retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub id: String,
}

/// Result of a bounded wait: a timeout is expected data, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Found,
    TimedOut,
}

impl Presence {
    pub fn is_found(&self) -> bool {
        matches!(self, Presence::Found)
    }
}

/// Collaborator failures, split by how the pollers must react.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// Element went away between find and click. Retryable.
    #[error("element is stale or detached")]
    Stale,

    /// Browser session is gone. Fatal for the attempt.
    #[error("browser session lost: {0}")]
    SessionLost(String),

    /// Credentials were not accepted. Fatal, never retried.
    #[error("authentication rejected for this account")]
    AuthRejected,

    /// The driver answered with something we cannot interpret.
    #[error("webdriver protocol error: {0}")]
    Protocol(String),

    /// HTTP-level failure talking to the driver.
    #[error("webdriver transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl CalendarError {
    /// Retryable errors count against the owning budget; everything else
    /// propagates to the orchestrator immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CalendarError::Stale)
    }
}

/// Capability set the pollers consume.
#[async_trait]
pub trait CalendarView: Send + Sync {
    /// Reload the current view. Callers must re-wait for landmarks after.
    async fn refresh(&self) -> Result<(), CalendarError>;

    /// Block up to `timeout` for an element to exist in the view.
    async fn wait_for_presence(
        &self,
        target: &Locator,
        timeout: Duration,
    ) -> Result<Presence, CalendarError>;

    /// Stronger guarantee: element exists and accepts interaction.
    async fn wait_for_clickable(
        &self,
        target: &Locator,
        timeout: Duration,
    ) -> Result<Presence, CalendarError>;

    /// All elements currently matching `target` (possibly empty).
    async fn find_all(&self, target: &Locator) -> Result<Vec<ElementHandle>, CalendarError>;

    /// Click an element; staleness surfaces as [`CalendarError::Stale`].
    async fn click(&self, element: &ElementHandle) -> Result<(), CalendarError>;

    /// Switch addressing context to a nested surface for subsequent calls.
    async fn enter_scope(&self, scope: &Scope) -> Result<(), CalendarError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_is_the_only_retryable_error() {
        assert!(CalendarError::Stale.is_retryable());
        assert!(!CalendarError::SessionLost("gone".into()).is_retryable());
        assert!(!CalendarError::AuthRejected.is_retryable());
        assert!(!CalendarError::Protocol("bad json".into()).is_retryable());
    }

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::link("31").to_string(), "link '31'");
        assert_eq!(Locator::control("submit_frm_nopay").to_string(), "control 'submit_frm_nopay'");
    }

    #[test]
    fn test_presence_is_found() {
        assert!(Presence::Found.is_found());
        assert!(!Presence::TimedOut.is_found());
    }
}
