use anyhow::Context;
use serde::Serialize;
use vigil_core::entities::{Implementation, UnitDescriptor};
use vigil_registry::{ScanIssue, scan};

use crate::cli::{GlobalFlags, root_commands::ListArgs};
use crate::context::AppContext;
use crate::output::{TableRow, output_rows};

#[derive(Debug, Clone, Serialize)]
struct UnitRow {
    unit: String,
    checks: Vec<String>,
    timeout_secs: u64,
    implementation: String,
    description: String,
}

impl UnitRow {
    fn new(unit: &UnitDescriptor, default_timeout_secs: u64) -> Self {
        Self {
            unit: unit.qualified_name.clone(),
            checks: unit.check_names().map(str::to_string).collect(),
            timeout_secs: unit.timeout_secs.unwrap_or(default_timeout_secs),
            implementation: match &unit.implementation {
                Implementation::Rules => "rules".to_string(),
                Implementation::Native(key) => key.clone(),
            },
            description: unit.description.lines().next().unwrap_or_default().to_string(),
        }
    }
}

impl TableRow for UnitRow {
    fn headers() -> &'static [&'static str] {
        &["unit", "checks", "timeout", "implementation", "description"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.unit.clone(),
            self.checks.join(","),
            self.timeout_secs.to_string(),
            self.implementation.clone(),
            self.description.clone(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
struct IssueRow {
    path: String,
    message: String,
}

impl From<&ScanIssue> for IssueRow {
    fn from(issue: &ScanIssue) -> Self {
        Self {
            path: issue.path.display().to_string(),
            message: issue.message.clone(),
        }
    }
}

impl TableRow for IssueRow {
    fn headers() -> &'static [&'static str] {
        &["path", "message"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.path.clone(), self.message.clone()]
    }
}

/// Handle `vigil list`.
pub fn handle(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = ctx.checks_root();
    let catalog = scan(root).with_context(|| format!("failed to scan {}", root.display()))?;

    if args.errors {
        let rows: Vec<IssueRow> = catalog.issues().iter().map(IssueRow::from).collect();
        return output_rows(&rows, flags.format);
    }

    if !catalog.issues().is_empty() && !flags.quiet {
        eprintln!(
            "{} malformed module file(s) skipped; see `vigil list --errors`",
            catalog.issues().len()
        );
    }
    let default_timeout = ctx.config.runner.default_timeout_secs;
    let rows: Vec<UnitRow> = catalog
        .units()
        .iter()
        .map(|unit| UnitRow::new(unit, default_timeout))
        .collect();
    output_rows(&rows, flags.format)
}
