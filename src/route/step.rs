//! Per-node transforms
//!
//! Each route node carries exactly one `Step`, applied to the parent's
//! resolved output during evaluation. Built-in operators are enum variants
//! holding their construction-time configuration; `filter` and `assert`
//! hold boxed async closures. Every variant treats an absent input as a
//! pass-through, never as a failure.

use crate::error::{Result, RouteError};
use crate::path::{FieldPath, Segment};
use crate::shape::{Model, Shape};
use crate::store::Query;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::scratchpad::Scratchpad;

/// Boxed async transform backing `filter`
pub(crate) type FilterFn = Arc<
    dyn Fn(Option<Value>, Scratchpad) -> BoxFuture<'static, Result<Option<Value>>> + Send + Sync,
>;

/// Boxed async predicate backing `assert`
pub(crate) type AssertFn =
    Arc<dyn Fn(Value, Scratchpad) -> BoxFuture<'static, Result<bool>> + Send + Sync>;

/// The transform a single route node applies to its parent's output
#[derive(Clone)]
pub(crate) enum Step {
    /// Root nodes pass their input through untouched
    Identity,
    /// Project a dotted/indexed path out of the current value
    Field(FieldPath),
    /// Query the target collection for records whose `foreign_field`
    /// equals the current value
    LinkedWith { foreign_field: String },
    /// Look the current value up as a primary identifier in the target
    /// collection
    DbRef,
    /// Pass the current value through, saving it in the scratchpad
    SaveAs { name: String },
    /// Custom transform; observes absence and may produce it
    Filter(FilterFn),
    /// Keep the value if the predicate holds, yield absent otherwise
    Assert(AssertFn),
}

impl Step {
    /// Operator name used in diagnostics
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Step::Identity => "root",
            Step::Field(_) => "field",
            Step::LinkedWith { .. } => "linked_with",
            Step::DbRef => "db_ref",
            Step::SaveAs { .. } => "save_as",
            Step::Filter(_) => "filter",
            Step::Assert(_) => "assert",
        }
    }

    /// Applies this step to the parent's resolved output
    ///
    /// `target` is the owning node's declared output shape; relation steps
    /// read their target model out of it.
    ///
    /// # Errors
    ///
    /// Store failures and predicate errors surface unchanged. A relation
    /// step whose target names no model fails with
    /// [`RouteError::UnresolvedTarget`].
    pub(crate) async fn apply(
        &self,
        value: Option<Value>,
        target: &Shape,
        scratchpad: &Scratchpad,
    ) -> Result<Option<Value>> {
        match self {
            Step::Identity => Ok(value),

            Step::Field(path) => Ok(value.and_then(|v| project(&v, path))),

            Step::LinkedWith { foreign_field } => {
                let Some(key) = value else {
                    return Ok(None);
                };
                match target {
                    // Single-record target: first match or absent
                    Shape::Model(model) => {
                        let query = Query::eq(foreign_field.clone(), key);
                        Ok(model.find_one(&query).await?)
                    }
                    // Sequence target: always an array, possibly empty
                    Shape::Sequence(element) => match element.as_model() {
                        Some(model) => {
                            let query = Query::eq(foreign_field.clone(), key);
                            let records = model.find_many(&query).await?;
                            Ok(Some(Value::Array(records)))
                        }
                        None => Err(unresolved_target("linked_with", target)),
                    },
                    _ => Err(unresolved_target("linked_with", target)),
                }
            }

            Step::DbRef => {
                let Some(id) = value else {
                    return Ok(None);
                };
                match target_model(target) {
                    Some(model) => Ok(model.find_by_id(&id).await?),
                    None => Err(unresolved_target("db_ref", target)),
                }
            }

            Step::SaveAs { name } => {
                // Absent values are never written
                if let Some(v) = &value {
                    scratchpad.save(name.clone(), v.clone());
                }
                Ok(value)
            }

            Step::Filter(transform) => transform(value, scratchpad.clone()).await,

            Step::Assert(predicate) => match value {
                Some(v) => {
                    if predicate(v.clone(), scratchpad.clone()).await? {
                        Ok(Some(v))
                    } else {
                        Ok(None)
                    }
                }
                // Absent input skips the predicate entirely
                None => Ok(None),
            },
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Identity => write!(f, "Identity"),
            Step::Field(path) => f.debug_tuple("Field").field(&path.as_str()).finish(),
            Step::LinkedWith { foreign_field } => f
                .debug_struct("LinkedWith")
                .field("foreign_field", foreign_field)
                .finish(),
            Step::DbRef => write!(f, "DbRef"),
            Step::SaveAs { name } => f.debug_struct("SaveAs").field("name", name).finish(),
            Step::Filter(_) => write!(f, "Filter(..)"),
            Step::Assert(_) => write!(f, "Assert(..)"),
        }
    }
}

/// Projects a parsed path out of a value
///
/// Missing members, out-of-range indexes, type mismatches, and JSON nulls
/// all project to absent.
fn project(value: &Value, path: &FieldPath) -> Option<Value> {
    let mut current = value;
    for segment in path.segments() {
        current = match segment {
            Segment::Name(name) => current.get(name.as_str())?,
            Segment::Index(index) => current.get(index)?,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current.clone())
    }
}

/// The model a relation target shape names, unwrapping one sequence level
fn target_model(shape: &Shape) -> Option<&Model> {
    match shape {
        Shape::Model(model) => Some(model),
        Shape::Sequence(element) => element.as_model(),
        _ => None,
    }
}

fn unresolved_target(operation: &'static str, target: &Shape) -> RouteError {
    warn!(operation, target = %target, "relation lookup has no target model");
    RouteError::UnresolvedTarget {
        operation,
        shape: target.to_string(),
    }
}
