use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use vigil_core::entities::RunResult;
use vigil_core::names;
use vigil_registry::{Catalog, Registry, module_path, scan_modules};

use crate::cli::{GlobalFlags, OutputFormat, root_commands::RunArgs};
use crate::commands::summary::RunSummary;
use crate::context::AppContext;
use crate::output::{output, output_rows};
use crate::progress::RunProgress;

/// A resolved command-line target.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Module(String),
    Unit { module: String, qualified: String },
}

impl Target {
    fn module(&self) -> &str {
        match self {
            Self::Module(module) | Self::Unit { module, .. } => module,
        }
    }
}

/// Handle `vigil run`. Returns whether every run passed.
pub async fn handle(args: &RunArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<bool> {
    let root = ctx.checks_root();
    let targets = resolve_targets(root, &args.targets)?;

    let mut modules: Vec<String> = Vec::new();
    for target in &targets {
        if !modules.iter().any(|m| m == target.module()) {
            modules.push(target.module().to_string());
        }
    }
    let catalog = scan_modules(root, &modules)
        .with_context(|| format!("failed to discover units under {}", root.display()))?;
    for issue in catalog.issues() {
        tracing::warn!(path = %issue.path.display(), message = %issue.message, "malformed module skipped");
    }

    let selected = select_units(&catalog, &targets)?;
    if selected.is_empty() {
        bail!("no units found for {}", args.targets.join(", "));
    }

    let registry = Arc::new(Registry::with_catalog(root, catalog));
    let runner = ctx.runner(registry)?;
    let results = run_sequentially(&runner, &selected).await?;
    runner.close();

    print_results(&results, flags.format)?;
    Ok(results.iter().all(|result| result.outcome.is_passed()))
}

async fn run_sequentially(
    runner: &vigil_runner::JobRunner,
    selected: &[String],
) -> anyhow::Result<Vec<Arc<RunResult>>> {
    let progress = RunProgress::new(selected.len());
    let mut results = Vec::with_capacity(selected.len());
    for name in selected {
        progress.started(name);
        let handle = runner
            .submit(name)
            .with_context(|| format!("failed to submit {name}"))?;
        let result = handle
            .wait()
            .await
            .with_context(|| format!("run of {name} did not finish"))?;
        tracing::info!(unit = %name, outcome = %result.outcome, "run finished");
        progress.finished(&result);
        results.push(result);
    }
    progress.clear();
    Ok(results)
}

fn print_results(results: &[Arc<RunResult>], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<RunSummary> = results.iter().map(|r| RunSummary::from(Arc::as_ref(r))).collect();
            output_rows(&rows, format)
        }
        OutputFormat::Json | OutputFormat::Raw => {
            let full: Vec<&RunResult> = results.iter().map(Arc::as_ref).collect();
            output(&full, format)
        }
    }
}

/// A target naming an existing module file is a module; otherwise it must
/// be `module.Unit` with an existing module file.
fn resolve_targets(root: &Path, raw: &[String]) -> anyhow::Result<Vec<Target>> {
    raw.iter()
        .map(|target| {
            if names::is_module_name(target) && module_path(root, target).is_file() {
                return Ok(Target::Module(target.clone()));
            }
            match names::split(target) {
                Ok((module, _)) if module_path(root, module).is_file() => Ok(Target::Unit {
                    module: module.to_string(),
                    qualified: target.clone(),
                }),
                _ => bail!("'{target}' is neither a module nor a unit under {}", root.display()),
            }
        })
        .collect()
}

/// Qualified names to run, in target order, without duplicates.
fn select_units(catalog: &Catalog, targets: &[Target]) -> anyhow::Result<Vec<String>> {
    let mut selected: Vec<String> = Vec::new();
    let mut push = |name: String| {
        if !selected.contains(&name) {
            selected.push(name);
        }
    };
    for target in targets {
        match target {
            Target::Module(module) => {
                for unit in catalog.units_in(module) {
                    push(unit.qualified_name.clone());
                }
            }
            Target::Unit { qualified, .. } => {
                if catalog.get(qualified).is_none() {
                    bail!("unit '{qualified}' not found");
                }
                push(qualified.clone());
            }
        }
    }
    Ok(selected)
}
