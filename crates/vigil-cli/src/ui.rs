use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{GlobalFlags, OutputFormat};

/// Narrowest `COLUMNS` value honoured for table fitting.
const MIN_WIDTH: usize = 40;

/// Terminal presentation choices, resolved once per process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiPrefs {
    pub color: bool,
    pub progress: bool,
    pub width: Option<usize>,
}

/// What the process is attached to.
#[derive(Clone, Copy, Debug, Default)]
pub struct Terminal<'a> {
    pub stdout_tty: bool,
    pub stderr_tty: bool,
    pub no_color: bool,
    pub columns: Option<&'a str>,
}

impl UiPrefs {
    pub const PLAIN: Self = Self {
        color: false,
        progress: false,
        width: None,
    };

    #[must_use]
    pub fn detect(flags: &GlobalFlags, terminal: Terminal<'_>) -> Self {
        let table = flags.format == OutputFormat::Table;
        Self {
            color: terminal.stdout_tty && table && !flags.quiet && !terminal.no_color,
            progress: terminal.stderr_tty && table && !flags.quiet,
            width: terminal
                .columns
                .and_then(|value| value.trim().parse::<usize>().ok())
                .filter(|width| *width >= MIN_WIDTH),
        }
    }
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let columns = std::env::var("COLUMNS").ok();
    let terminal = Terminal {
        stdout_tty: std::io::stdout().is_terminal(),
        stderr_tty: std::io::stderr().is_terminal(),
        no_color: std::env::var_os("NO_COLOR").is_some(),
        columns: columns.as_deref(),
    };
    let _ = UI_PREFS.set(UiPrefs::detect(flags, terminal));
}

/// Prefs set by [`init`], or plain output when never initialized.
#[must_use]
pub fn prefs() -> UiPrefs {
    UI_PREFS.get().copied().unwrap_or(UiPrefs::PLAIN)
}
