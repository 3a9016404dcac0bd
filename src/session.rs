//! View state for one minimize-and-render session.
//!
//! DESIGN
//! ======
//! Presentation state (submit control, log visibility, the two diagram panes,
//! the current notice) is a plain value. Each [`Event`] consumes the old
//! state and returns the next one plus an optional [`Effect`] for the caller
//! to perform, so nothing here touches the network or the terminal.

use diagram::{AutomatonDescription, compile};
use serde_json::Value;

use crate::minimizer::{MinimizeResponse, MinimizerError};

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

pub const SUBMIT_LABEL: &str = "Minimize";
pub const SUBMITTING_LABEL: &str = "Minimizing...";

/// Which of the two diagrams a pane shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaneId {
    Original,
    Minimized,
}

impl PaneId {
    pub const ALL: [PaneId; 2] = [PaneId::Original, PaneId::Minimized];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Minimized => "minimized",
        }
    }
}

/// Content of one diagram pane.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Empty,
    /// Mermaid text ready for the renderer.
    Diagram(String),
    /// The description could not be read or the renderer rejected the
    /// diagram; the message replaces it.
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: &'static str,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self { enabled: true, label: SUBMIT_LABEL }
    }
}

/// User-facing message for the outcome of the last action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Submission refused locally because the source was blank.
    EmptyInput,
    /// The service could not be reached or answered with garbage. `url` is
    /// known when the request itself failed.
    Unreachable { url: Option<String>, reason: String },
    /// The service reported an error; shown verbatim.
    Service(String),
}

impl Notice {
    /// Build the unreachable notice from a connectivity error.
    #[must_use]
    pub fn unreachable(error: MinimizerError) -> Self {
        match error {
            MinimizerError::Unreachable { url, reason } => Self::Unreachable { url: Some(url), reason },
            MinimizerError::MalformedResponse(detail) => {
                Self::Unreachable { url: None, reason: format!("malformed response: {detail}") }
            }
            other => Self::Unreachable { url: None, reason: other.to_string() },
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::EmptyInput => "please provide the automaton definition".to_owned(),
            Self::Unreachable { url: Some(url), reason } => {
                format!("could not reach the minimization service at {url}; check that it is running ({reason})")
            }
            Self::Unreachable { url: None, reason } => {
                format!("could not reach the minimization service; check that it is running ({reason})")
            }
            Self::Service(message) => format!("service error: {message}"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub submit: SubmitControl,
    /// Service log; `Some` means the log panel is visible.
    pub log: Option<String>,
    pub original: Pane,
    pub minimized: Pane,
    pub notice: Option<Notice>,
}

#[derive(Debug)]
pub enum Event {
    SubmitRequested { source: String },
    ResponseReceived(Result<MinimizeResponse, MinimizerError>),
    RenderFailed { pane: PaneId, message: String },
}

/// Work the caller must perform after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Submit(String),
}

impl ViewState {
    #[must_use]
    pub fn pane(&self, id: PaneId) -> &Pane {
        match id {
            PaneId::Original => &self.original,
            PaneId::Minimized => &self.minimized,
        }
    }

    fn pane_mut(&mut self, id: PaneId) -> &mut Pane {
        match id {
            PaneId::Original => &mut self.original,
            PaneId::Minimized => &mut self.minimized,
        }
    }

    /// Apply one event.
    ///
    /// A submission while another is pending is accepted and produces a second
    /// independent [`Effect::Submit`].
    #[must_use]
    pub fn handle(mut self, event: Event) -> (Self, Option<Effect>) {
        match event {
            Event::SubmitRequested { source } => {
                self.log = None;
                if source.trim().is_empty() {
                    self.notice = Some(Notice::EmptyInput);
                    return (self, None);
                }
                self.notice = None;
                self.submit = SubmitControl { enabled: false, label: SUBMITTING_LABEL };
                (self, Some(Effect::Submit(source)))
            }
            Event::ResponseReceived(result) => {
                self.submit = SubmitControl::default();
                match result {
                    Ok(response) => {
                        self.notice = None;
                        self.log = response.log;
                        self.original = compile_pane(PaneId::Original, response.original);
                        self.minimized = compile_pane(PaneId::Minimized, response.minimized);
                    }
                    Err(e) if e.is_connectivity() => {
                        self.notice = Some(Notice::unreachable(e));
                    }
                    Err(MinimizerError::Service { status, message }) => {
                        tracing::debug!(status, "service rejected automaton");
                        self.notice = Some(Notice::Service(message));
                    }
                    Err(e) => {
                        self.notice = Some(Notice::Service(e.to_string()));
                    }
                }
                (self, None)
            }
            Event::RenderFailed { pane, message } => {
                *self.pane_mut(pane) = Pane::Failed(message);
                (self, None)
            }
        }
    }
}

/// Compile one raw description. A description that cannot be read fails its
/// own pane only.
fn compile_pane(pane: PaneId, description: Value) -> Pane {
    match AutomatonDescription::from_value(description) {
        Ok(afd) => Pane::Diagram(compile(&afd)),
        Err(e) => {
            tracing::warn!(pane = pane.name(), error = %e, "description rejected");
            Pane::Failed(e.to_string())
        }
    }
}
