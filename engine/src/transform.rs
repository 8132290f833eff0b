//! The transform pipeline.
//!
//! One invocation runs extraction, merge resolution, expand resolution, and
//! deduplication over a cart snapshot and assembles the operation list the
//! host applies. Merges come first so expand logic sees component
//! consumption already settled.

use crate::cart::Cart;
use crate::definition::extract_parent_definitions;
use crate::error::Result;
use crate::expand::{resolve_expands, ExpandPolicy};
use crate::merge::resolve_merges;
use crate::operation::{dedupe_operations, Operation};
use crate::pool::QuantityPool;
use serde::{Deserialize, Serialize};

/// The host's input envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInput {
    /// The cart snapshot to evaluate
    pub cart: Cart,
}

/// The operation list returned to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    /// Rewrites to apply, merges before expands
    pub operations: Vec<Operation>,
}

impl FunctionResult {
    /// The canonical "make no changes" result.
    pub fn no_changes() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Whether this result leaves the cart untouched.
    pub fn is_no_changes(&self) -> bool {
        self.operations.is_empty()
    }
}

/// The cart transform function.
///
/// Stateless across invocations; holds only the expand policy. The same
/// cart always produces the same result.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartTransform {
    expand_policy: ExpandPolicy,
}

impl CartTransform {
    /// Create a transform with the default expand policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with an explicit expand policy.
    pub fn with_expand_policy(expand_policy: ExpandPolicy) -> Self {
        Self { expand_policy }
    }

    /// Evaluate one cart snapshot.
    ///
    /// Returns the operations to apply, or [`FunctionResult::no_changes`]
    /// when nothing in the cart is bundle-shaped. The only error is the
    /// expand path's structural violation.
    pub fn run(&self, cart: &Cart) -> Result<FunctionResult> {
        let definitions = extract_parent_definitions(&cart.lines);
        let mut pool = QuantityPool::from_lines(&cart.lines);

        let mut operations = resolve_merges(&cart.lines, &definitions, &mut pool);
        operations.extend(resolve_expands(&cart.lines, &pool, self.expand_policy)?);
        let operations = dedupe_operations(operations);

        if operations.is_empty() {
            Ok(FunctionResult::no_changes())
        } else {
            Ok(FunctionResult { operations })
        }
    }
}

/// Evaluate one host input envelope with the default policy.
pub fn run(input: &FunctionInput) -> Result<FunctionResult> {
    CartTransform::new().run(&input.cart)
}
