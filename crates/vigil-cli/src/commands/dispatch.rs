use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to its handler.
///
/// Returns whether every run the command performed passed.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<bool> {
    match command {
        Commands::Run(args) => commands::run::handle(&args, ctx, flags).await,
        Commands::List(args) => commands::list::handle(&args, ctx, flags).map(|()| true),
        Commands::Show(args) => commands::show::handle(&args, ctx, flags),
        Commands::History(args) => commands::history::handle(&args, ctx, flags).map(|()| true),
        Commands::Schedule => commands::schedule::handle(ctx, flags).await.map(|()| true),
        Commands::Schema(_) => unreachable!("schema is pre-dispatched in main"),
    }
}
