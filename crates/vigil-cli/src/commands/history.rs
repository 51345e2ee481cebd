use crate::cli::{GlobalFlags, OutputFormat, root_commands::HistoryArgs};
use crate::commands::summary::RunSummary;
use crate::context::AppContext;
use crate::output::{output, output_rows};

/// Handle `vigil history`: stored results oldest first.
pub fn handle(args: &HistoryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let history = ctx.store.history(&args.name)?;
    if history.is_empty() && !flags.quiet {
        eprintln!("no history for '{}'", args.name);
    }
    match flags.format {
        OutputFormat::Table => {
            let rows: Vec<RunSummary> = history.iter().map(RunSummary::from).collect();
            output_rows(&rows, flags.format)
        }
        OutputFormat::Json | OutputFormat::Raw => output(&history, flags.format),
    }
}
