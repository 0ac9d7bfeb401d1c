//! Chainable resolution nodes
//!
//! A `Route` is one node in an immutable, singly-linked resolution chain.
//! Chains are built once at wiring time by deriving child nodes from parent
//! nodes, then evaluated any number of times, once per input.

use crate::error::Result;
use crate::path::FieldPath;
use crate::shape::Shape;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::scratchpad::Scratchpad;
use super::step::Step;

/// A node in an immutable resolution chain
///
/// Every derivation operator consumes the receiver and returns a new node
/// holding the old one as its parent, so a chain is frozen the moment a
/// child exists. Chains are `Clone + Send + Sync`; evaluation takes `&self`,
/// so one chain can serve any number of concurrent resolutions.
///
/// The declared output [`Shape`] of a node is used for construction-time
/// introspection (path descent, relation-target lookup) and is never
/// enforced against runtime values.
///
/// # Examples
///
/// ```
/// use auth_route::{Route, Schema, Shape};
///
/// let creds = Shape::record(Schema::new().with_field("user", Shape::Scalar));
/// let route = Route::root(creds).field("user").unwrap().save_as("login");
/// assert_eq!(route.depth(), 3);
/// assert_eq!(route.output(), &Shape::Scalar);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    parent: Option<Arc<Route>>,
    output: Shape,
    step: Step,
}

impl Route {
    /// Creates a root node with an identity step
    ///
    /// # Arguments
    ///
    /// * `output` - Declared shape of the inputs this chain will resolve
    pub fn root(output: Shape) -> Self {
        Self {
            parent: None,
            output,
            step: Step::Identity,
        }
    }

    /// Creates a fresh root whose declared output equals `donor`'s
    ///
    /// Used to fork a pipeline at an intermediate value. The new chain
    /// shares nothing with the donor at evaluation time; values saved by
    /// one chain are visible to the other only when both are resolved
    /// under the same [`Scratchpad`].
    pub fn new_from(donor: &Route) -> Self {
        Self::root(donor.output.clone())
    }

    /// Declared output shape of this node
    pub fn output(&self) -> &Shape {
        &self.output
    }

    /// Number of nodes in this chain, root included
    pub fn depth(&self) -> usize {
        let mut count = 1;
        let mut current = self.parent.as_deref();
        while let Some(node) = current {
            count += 1;
            current = node.parent.as_deref();
        }
        count
    }

    /// Replaces the declared output shape of this node
    ///
    /// Pure annotation; evaluation behavior is unchanged.
    pub fn with_output(mut self, output: Shape) -> Self {
        self.output = output;
        self
    }

    /// Declares what this node produces
    ///
    /// Required after a relation operator whose target cannot be inferred
    /// from the parent: `.linked_with("name").gives(users.shape())` points
    /// the lookup at the `users` collection.
    pub fn gives(self, output: Shape) -> Self {
        self.with_output(output)
    }

    /// Derives a child that projects a dotted/indexed path
    ///
    /// The child's declared output is computed by descending the parent's
    /// declared shape segment by segment; an undeterminable member is
    /// [`Shape::Unknown`]. At evaluation, a missing or null member yields
    /// absent, never an error.
    ///
    /// # Arguments
    ///
    /// * `path` - Field path such as `"user"`, `"roles[0].name"`, or
    ///   `"privs.0"`
    ///
    /// # Errors
    ///
    /// Fails with [`RouteError::Path`](crate::RouteError::Path) when `path`
    /// does not parse; parsing is strict about empty segments and malformed
    /// indexes.
    pub fn field(self, path: &str) -> Result<Route> {
        let path: FieldPath = path.parse()?;
        let output = self.output.at_path(&path);
        Ok(self.derive(Step::Field(path), output))
    }

    /// Derives a relation hop keyed on the current value
    ///
    /// At evaluation the current value is matched against `foreign_field`
    /// in the target collection. A target of `model.shape()` resolves to
    /// the first match or absent; a target of `model.many()` resolves to
    /// the full (possibly empty) array of matches and is never absent.
    ///
    /// The target defaults to the shape inherited from the parent; declare
    /// it with [`gives`](Route::gives) when it cannot be inferred. A node
    /// whose target never names a model fails its first evaluation with
    /// [`RouteError::UnresolvedTarget`](crate::RouteError::UnresolvedTarget).
    pub fn linked_with(self, foreign_field: impl Into<String>) -> Route {
        let output = self.output.clone();
        self.derive(
            Step::LinkedWith {
                foreign_field: foreign_field.into(),
            },
            output,
        )
    }

    /// Derives a primary-identifier lookup against the target model
    ///
    /// At evaluation the current value is treated as a primary identifier
    /// and looked up with `find_by_id`; a miss yields absent. The target
    /// follows the same inheritance and [`gives`](Route::gives) rules as
    /// [`linked_with`](Route::linked_with).
    pub fn db_ref(self) -> Route {
        let output = self.output.clone();
        self.derive(Step::DbRef, output)
    }

    /// Derives a pass-through hop that saves the current value
    ///
    /// The value is written into the resolution's scratchpad under `name`,
    /// overwriting any previous value, and is then passed along unchanged.
    /// Absent values are not written. The write happens at this node's
    /// chain position, so it is visible to every later hop of the same
    /// resolution.
    pub fn save_as(self, name: impl Into<String>) -> Route {
        let output = self.output.clone();
        self.derive(Step::SaveAs { name: name.into() }, output)
    }

    /// Derives a custom async transform hop
    ///
    /// The transform observes the current value (absent included) and the
    /// resolution's scratchpad, and produces the next value, absence, or an
    /// error. Every built-in operator is expressible in terms of `filter`.
    ///
    /// The child inherits the parent's declared output; follow with
    /// [`gives`](Route::gives) when the transform changes the shape and a
    /// later hop depends on it.
    pub fn filter<F, Fut>(self, transform: F) -> Route
    where
        F: Fn(Option<Value>, Scratchpad) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        let output = self.output.clone();
        self.derive(
            Step::Filter(Arc::new(move |value, pad| Box::pin(transform(value, pad)))),
            output,
        )
    }

    /// Derives a predicate hop
    ///
    /// A passing predicate forwards the value unchanged; a failing one
    /// yields absent for this and every downstream hop. Predicate failure
    /// is not an error. An already-absent value skips the predicate
    /// entirely.
    pub fn assert<F, Fut>(self, predicate: F) -> Route
    where
        F: Fn(Value, Scratchpad) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        let output = self.output.clone();
        self.derive(
            Step::Assert(Arc::new(move |value, pad| Box::pin(predicate(value, pad)))),
            output,
        )
    }

    /// Resolves this chain against `input` with a fresh scratchpad
    ///
    /// # Errors
    ///
    /// See [`resolve_with`](Route::resolve_with).
    pub async fn resolve(&self, input: Value) -> Result<Option<Value>> {
        self.resolve_with(input, &Scratchpad::new()).await
    }

    /// Resolves this chain against `input` under a caller-supplied scratchpad
    ///
    /// Hops run sequentially from the root to this node, each step applied
    /// to its parent's output. Absence flows through as `Ok(None)`; it is a
    /// successful no-value outcome, not an error.
    ///
    /// Passing the same scratchpad to several `resolve_with` calls makes
    /// their saved values mutually visible; that is the intended way to
    /// evaluate a forked pipeline (see [`new_from`](Route::new_from)).
    ///
    /// # Errors
    ///
    /// The first failing hop short-circuits the rest: store failures and
    /// predicate errors surface unchanged, and a relation hop without a
    /// target model fails with
    /// [`RouteError::UnresolvedTarget`](crate::RouteError::UnresolvedTarget).
    pub async fn resolve_with(
        &self,
        input: Value,
        scratchpad: &Scratchpad,
    ) -> Result<Option<Value>> {
        let chain = self.chain();
        debug!(depth = chain.len(), "resolving route chain");

        let mut value = Some(input);
        for node in chain {
            value = node.step.apply(value, &node.output, scratchpad).await?;
            debug!(
                step = node.step.name(),
                resolved = value.is_some(),
                "hop complete"
            );
        }
        Ok(value)
    }

    /// Resolves, then tests the outcome against `target`
    ///
    /// A resolved array performs a membership test (`target` is one of its
    /// elements); any other resolved value compares by equality; absence
    /// matches nothing.
    ///
    /// # Errors
    ///
    /// Resolution errors surface unchanged.
    pub async fn resolve_and_compare(&self, input: Value, target: &Value) -> Result<bool> {
        self.resolve_and_compare_with(input, target, &Scratchpad::new())
            .await
    }

    /// [`resolve_and_compare`](Route::resolve_and_compare) under a
    /// caller-supplied scratchpad
    pub async fn resolve_and_compare_with(
        &self,
        input: Value,
        target: &Value,
        scratchpad: &Scratchpad,
    ) -> Result<bool> {
        Ok(match self.resolve_with(input, scratchpad).await? {
            Some(Value::Array(items)) => items.contains(target),
            Some(resolved) => resolved == *target,
            None => false,
        })
    }

    /// Derives a child node, freezing `self` as its parent
    fn derive(self, step: Step, output: Shape) -> Route {
        Route {
            parent: Some(Arc::new(self)),
            output,
            step,
        }
    }

    /// Collects the chain in evaluation order, root first
    fn chain(&self) -> Vec<&Route> {
        let mut nodes = Vec::with_capacity(self.depth());
        let mut current = Some(self);
        while let Some(node) = current {
            nodes.push(node);
            current = node.parent.as_deref();
        }
        nodes.reverse();
        nodes
    }
}
