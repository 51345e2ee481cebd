//! Built-in unit that evaluates declarative rules against the data source.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use vigil_core::data::{DataObject, scalar_id};
use vigil_core::entities::UnitDescriptor;
use vigil_core::rules::Rule;

use crate::context::CheckContext;
use crate::fault::Fault;
use crate::loader::ResolveError;
use crate::unit::CheckUnit;

/// Runs each sub-check's [`Rule`]. One record per inspected object.
#[derive(Debug, Clone)]
pub struct RuleUnit {
    rules: BTreeMap<String, Rule>,
}

impl RuleUnit {
    /// Collect the rule of every declared sub-check.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingRule`] if a sub-check carries no rule.
    pub fn from_descriptor(descriptor: &UnitDescriptor) -> Result<Self, ResolveError> {
        let rules = descriptor
            .checks
            .iter()
            .map(|check| {
                check
                    .rule
                    .clone()
                    .map(|rule| (check.name.clone(), rule))
                    .ok_or_else(|| ResolveError::MissingRule {
                        unit: descriptor.qualified_name.clone(),
                        check: check.name.clone(),
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }
}

impl CheckUnit for RuleUnit {
    fn run_check(&self, name: &str, ctx: &CheckContext<'_>) -> Result<(), Fault> {
        let rule = self
            .rules
            .get(name)
            .ok_or_else(|| Fault::new(format!("no rule for sub-check '{name}'")))?;
        evaluate(rule, ctx)
    }
}

/// Evaluate one rule, emitting records through `ctx`.
///
/// # Errors
///
/// Returns a [`Fault`] if the data source fails.
pub fn evaluate(rule: &Rule, ctx: &CheckContext<'_>) -> Result<(), Fault> {
    let objects = ctx.data().objects(rule.object_type())?;
    match rule {
        Rule::RequireField { field, level, .. } => {
            for object in &objects {
                if ctx.should_stop() {
                    break;
                }
                if object.field(field).is_some() {
                    ctx.success(object.to_ref(), None);
                } else {
                    ctx.record(*level, object.to_ref(), Some(&format!("missing {field}")));
                }
            }
        }
        Rule::UniqueField { field, .. } => unique_field(&objects, field, ctx),
        Rule::AllowedValues { field, values, .. } => {
            for object in &objects {
                if ctx.should_stop() {
                    break;
                }
                match object.field(field) {
                    Some(value) if values.contains(value) => {
                        ctx.success(object.to_ref(), None);
                    }
                    Some(value) => {
                        ctx.failure(
                            object.to_ref(),
                            Some(&format!(
                                "{field} is {value}, expected one of {}",
                                render_values(values)
                            )),
                        );
                    }
                    None => {
                        ctx.failure(object.to_ref(), Some(&format!("missing {field}")));
                    }
                }
            }
        }
        Rule::ReferenceExists {
            field, target_type, ..
        } => {
            for object in &objects {
                if ctx.should_stop() {
                    break;
                }
                let Some(id) = object.field(field).and_then(scalar_id) else {
                    ctx.failure(object.to_ref(), Some("missing link"));
                    continue;
                };
                if ctx.data().get(target_type, &id)?.is_some() {
                    ctx.success(object.to_ref(), None);
                } else {
                    ctx.failure(
                        object.to_ref(),
                        Some(&format!("missing link: {target_type} {id} does not exist")),
                    );
                }
            }
        }
        Rule::MinCount { object_type, min } => {
            let found = objects.len();
            if found >= *min {
                ctx.success(None, Some(&format!("{found} {object_type} found")));
            } else {
                ctx.failure(
                    None,
                    Some(&format!("found {found} {object_type}, expected at least {min}")),
                );
            }
        }
    }
    Ok(())
}

fn unique_field(objects: &[DataObject], field: &str, ctx: &CheckContext<'_>) {
    let mut seen: HashMap<String, &DataObject> = HashMap::new();
    for object in objects {
        if ctx.should_stop() {
            break;
        }
        let Some(value) = object.field(field) else {
            ctx.info(object.to_ref(), Some(&format!("no {field} to compare")));
            continue;
        };
        let key = value.to_string();
        match seen.get(&key) {
            Some(first) => {
                ctx.failure(
                    object.to_ref(),
                    Some(&format!(
                        "duplicate {field} {value} (also on {})",
                        first.to_ref().label()
                    )),
                );
            }
            None => {
                ctx.success(object.to_ref(), None);
                seen.insert(key, object);
            }
        }
    }
}

fn render_values(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
