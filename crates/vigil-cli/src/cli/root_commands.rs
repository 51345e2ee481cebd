use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Discover and run units from the given modules.
    Run(RunArgs),
    /// List discovered units in display order.
    List(ListArgs),
    /// Show the latest stored result of a unit.
    Show(ShowArgs),
    /// Show stored result history of a unit.
    History(HistoryArgs),
    /// Print the JSON Schema of stored results.
    Schema(SchemaArgs),
    /// Run configured schedules until interrupted.
    Schedule,
}

/// Arguments for `vigil run`.
#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    /// Module (`net.cabling`) or unit (`net.cabling.CablingReport`) names.
    #[arg(required = true)]
    pub targets: Vec<String>,
}

/// Arguments for `vigil list`.
#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    /// List malformed module files instead of units.
    #[arg(long)]
    pub errors: bool,
}

/// Arguments for `vigil show`.
#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    /// Qualified unit name.
    pub name: String,
}

/// Arguments for `vigil history`.
#[derive(Clone, Debug, Args)]
pub struct HistoryArgs {
    /// Qualified unit name.
    pub name: String,
}

/// Types with an exported schema.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    #[default]
    Result,
    Record,
}

/// Arguments for `vigil schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value = "result")]
    pub type_name: SchemaType,
}
