use anyhow::bail;
use vigil_core::entities::RunResult;

use crate::cli::{GlobalFlags, OutputFormat, root_commands::ShowArgs};
use crate::commands::summary::{RecordRow, RunSummary};
use crate::context::AppContext;
use crate::output::{output, output_rows};

/// Handle `vigil show`. Returns whether the stored result passed.
pub fn handle(args: &ShowArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<bool> {
    let Some(result) = ctx.store.get(&args.name)? else {
        bail!("no stored result for '{}'", args.name);
    };
    print_result(&result, flags)?;
    Ok(result.outcome.is_passed())
}

fn print_result(result: &RunResult, flags: &GlobalFlags) -> anyhow::Result<()> {
    if flags.format != OutputFormat::Table {
        return output(result, flags.format);
    }
    output_rows(&[RunSummary::from(result)], flags.format)?;
    println!();
    let rows: Vec<RecordRow> = result.records.iter().map(RecordRow::from).collect();
    output_rows(&rows, flags.format)
}

