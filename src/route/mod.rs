//! Declarative field-routing and resolution engine
//!
//! Routes are composable pipelines built at configuration time and evaluated
//! later, once per input: project a field, follow a relation into the store,
//! memoize an intermediate value, assert a predicate. Evaluation walks the
//! chain root to leaf and lands on one of three terminal outcomes, encoded
//! as `Result<Option<Value>>`:
//!
//! - `Ok(Some(value))` - resolved
//! - `Ok(None)` - absent; a successful no-value outcome (missing field,
//!   unmatched relation, failed assertion)
//! - `Err(e)` - failed; store failures and configuration misuse
//!
//! Shared state is confined to the [`Scratchpad`], allocated per top-level
//! resolution and passed explicitly.

mod node;
mod scratchpad;
mod step;

pub use node::Route;
pub use scratchpad::Scratchpad;
