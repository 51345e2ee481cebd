use schemars::schema_for;
use vigil_core::entities::{LogRecord, RunResult};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `vigil schema`. Table format prints pretty JSON.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name {
        SchemaType::Result => schema_for!(RunResult),
        SchemaType::Record => schema_for!(LogRecord),
    };
    output(&schema, flags.format)
}

#[cfg(test)]
mod tests {
    use schemars::schema_for;
    use vigil_core::entities::RunResult;

    #[test]
    fn result_schema_names_outcome_and_records() {
        let schema = serde_json::to_value(schema_for!(RunResult)).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("outcome").is_some());
        assert!(properties.get("records").is_some());
    }
}
