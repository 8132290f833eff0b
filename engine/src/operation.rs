//! Operation types describing cart rewrites.
//!
//! The engine never mutates the cart itself. Changes are expressed as
//! operations that the host applies after the run: a `Merge` collapses
//! component lines into one parent bundle line, an `Expand` replaces one
//! bundle line with its component items.

use crate::{CartLineId, MerchandiseId, Quantity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A consumed slice of an existing cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Cart line being consumed
    pub cart_line_id: CartLineId,
    /// Units taken from that line
    pub quantity: Quantity,
}

/// One component item produced by an expand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedItem {
    /// Component merchandise id
    pub merchandise_id: MerchandiseId,
    /// Units of the component
    pub quantity: Quantity,
}

/// Percentage-decrease price adjustment attached to an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAdjustment {
    /// Decrease relative to the summed component prices
    pub percentage_decrease: PriceAdjustmentValue,
}

/// Numeric payload of a price adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAdjustmentValue {
    pub value: f64,
}

impl PriceAdjustment {
    /// Create a percentage-decrease adjustment.
    pub fn percentage_decrease(value: f64) -> Self {
        Self {
            percentage_decrease: PriceAdjustmentValue { value },
        }
    }
}

/// A merge operation: component lines become one parent bundle line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOperation {
    /// Variant id of the synthesized parent line
    pub parent_variant_id: MerchandiseId,
    /// Consumed component lines, in definition order
    pub cart_lines: Vec<CartLineInput>,
    /// Optional bundle discount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceAdjustment>,
}

/// An expand operation: one bundle line becomes its component items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandOperation {
    /// Cart line being replaced
    pub cart_line_id: CartLineId,
    /// Replacement items, in reference order
    pub expanded_cart_items: Vec<ExpandedItem>,
    /// Optional bundle discount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceAdjustment>,
}

/// A cart rewrite the host should apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Merge(MergeOperation),
    Expand(ExpandOperation),
}

/// Stable identity of an operation's target entity.
///
/// At most one operation per key survives deduplication: one merge per
/// parent variant, one expand per cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKey {
    Merge(MerchandiseId),
    Expand(CartLineId),
}

impl Operation {
    /// The key this operation targets.
    pub fn key(&self) -> OperationKey {
        match self {
            Operation::Merge(op) => OperationKey::Merge(op.parent_variant_id.clone()),
            Operation::Expand(op) => OperationKey::Expand(op.cart_line_id.clone()),
        }
    }

    /// The price adjustment attached to this operation, if any.
    pub fn price(&self) -> Option<&PriceAdjustment> {
        match self {
            Operation::Merge(op) => op.price.as_ref(),
            Operation::Expand(op) => op.price.as_ref(),
        }
    }
}

/// Drop operations targeting an already-seen entity, keeping the first.
pub fn dedupe_operations(operations: Vec<Operation>) -> Vec<Operation> {
    let mut seen = HashSet::new();
    operations
        .into_iter()
        .filter(|operation| seen.insert(operation.key()))
        .collect()
}
