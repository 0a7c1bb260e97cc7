//! Application state machine.
//!
//! ```text
//! idle ──request──> generating ──ok──> ready ──request──┐
//!                     ▲   └────err──> error ──request──┤
//!                     └────────────────────────────────┘
//! ```
//!
//! All state lives in [`Shell`] and only changes through its methods; views
//! are projections of it.

use std::time::{Duration, Instant};

use pysecure_core::{ApplicationStatus, ProjectBundle};
use pysecure_gen::{GenerateError, Generator};

use crate::clipboard::{Clipboard, ClipboardError};

/// How long a "copied" confirmation stays visible.
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Code,
    Docs,
    Map,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Code, Tab::Docs, Tab::Map];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Code => "Código Fonte",
            Tab::Docs => "Documentação",
            Tab::Map => "Mapa Mental",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Tab::Code),
            "docs" => Ok(Tab::Docs),
            "map" => Ok(Tab::Map),
            other => Err(format!("unknown tab: {other} (expected code, docs or map)")),
        }
    }
}

/// What the main area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Title and the start button.
    Welcome,
    /// Spinner while the request is outstanding.
    Generating,
    /// Login preview plus the info and regenerate buttons.
    Preview,
    /// Failure message with a retry button.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyFeedback {
    pub index: usize,
    pub at: Instant,
}

/// Proof that a generation was started; handed back on completion.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Generate,
    SelectTab(Tab),
    OpenInfo,
    CloseInfo,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    StartGeneration(Ticket),
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("a generation is already in progress")]
    GenerationInFlight,

    #[error("no generation is in progress")]
    NotGenerating,

    #[error("completion does not belong to the current generation")]
    StaleTicket,

    #[error("no project has been generated yet")]
    NoBundle,

    #[error("no file at index {0}")]
    FileIndex(usize),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

#[derive(Debug, Default)]
pub struct Shell {
    status: ApplicationStatus,
    bundle: Option<ProjectBundle>,
    tab: Tab,
    info_open: bool,
    last_error: Option<String>,
    copied: Option<CopyFeedback>,
    generation: u64,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn bundle(&self) -> Option<&ProjectBundle> {
        self.bundle.as_ref()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn info_open(&self) -> bool {
        self.info_open
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The regenerate control is disabled while a request is outstanding.
    pub fn can_generate(&self) -> bool {
        self.status != ApplicationStatus::Generating
    }

    pub fn screen(&self) -> Screen {
        match self.status {
            ApplicationStatus::Idle => Screen::Welcome,
            ApplicationStatus::Generating => Screen::Generating,
            ApplicationStatus::Ready => Screen::Preview,
            ApplicationStatus::Error => Screen::Failed(
                self.last_error
                    .clone()
                    .unwrap_or_else(|| "generation failed".to_string()),
            ),
        }
    }

    // --- Transitions ---

    /// `idle | ready | error -> generating`. The previous bundle is dropped.
    pub fn request_generation(&mut self) -> Result<Ticket, ShellError> {
        if !self.can_generate() {
            tracing::debug!("generate ignored: request already in flight");
            return Err(ShellError::GenerationInFlight);
        }
        let from = self.status;
        self.generation += 1;
        self.status = ApplicationStatus::Generating;
        self.bundle = None;
        self.info_open = false;
        self.copied = None;
        self.last_error = None;
        tracing::info!(?from, generation = self.generation, "generation started");
        Ok(Ticket(self.generation))
    }

    /// `generating -> ready | error`.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<ProjectBundle, GenerateError>,
    ) -> Result<ApplicationStatus, ShellError> {
        if self.status != ApplicationStatus::Generating {
            return Err(ShellError::NotGenerating);
        }
        if ticket.0 != self.generation {
            return Err(ShellError::StaleTicket);
        }

        match outcome {
            Ok(bundle) => {
                tracing::info!(files = bundle.files.len(), "generation finished");
                self.bundle = Some(bundle);
                self.status = ApplicationStatus::Ready;
            }
            Err(e) => {
                tracing::error!(error = %e, "generation failed");
                self.bundle = None;
                self.last_error = Some(e.to_string());
                self.status = ApplicationStatus::Error;
            }
        }
        Ok(self.status)
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// The info panel only opens over a generated project.
    pub fn open_info(&mut self) -> Result<(), ShellError> {
        if self.bundle.is_none() {
            return Err(ShellError::NoBundle);
        }
        self.info_open = true;
        Ok(())
    }

    pub fn close_info(&mut self) {
        self.info_open = false;
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Effect, ShellError> {
        match action {
            Action::Generate => return self.request_generation().map(Effect::StartGeneration),
            Action::SelectTab(tab) => self.select_tab(tab),
            Action::OpenInfo => self.open_info()?,
            Action::CloseInfo => self.close_info(),
        }
        Ok(Effect::None)
    }

    // --- Clipboard ---

    /// Copy the full content of file `index` and start the confirmation window.
    pub fn copy_file(
        &mut self,
        index: usize,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<(), ShellError> {
        let bundle = self.bundle.as_ref().ok_or(ShellError::NoBundle)?;
        let file = bundle.file(index).ok_or(ShellError::FileIndex(index))?;
        clipboard.write_text(&file.content)?;
        self.copied = Some(CopyFeedback { index, at: now });
        Ok(())
    }

    pub fn is_copied(&self, index: usize, now: Instant) -> bool {
        self.copied_index(now) == Some(index)
    }

    /// File whose confirmation is still showing at `now`.
    pub fn copied_index(&self, now: Instant) -> Option<usize> {
        self.copied
            .filter(|c| now.saturating_duration_since(c.at) < COPY_FEEDBACK)
            .map(|c| c.index)
    }
}

/// Run one generation end to end against `shell`.
pub async fn run_generation(
    shell: &mut Shell,
    generator: &Generator,
) -> Result<ApplicationStatus, ShellError> {
    let ticket = shell.request_generation()?;
    let outcome = generator.generate().await;
    shell.complete(ticket, outcome)
}
