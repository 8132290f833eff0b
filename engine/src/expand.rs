//! Expand resolution: rewrite bundle lines into their component items.

use crate::cart::{CartLine, ProductVariant};
use crate::error::{Error, Result};
use crate::operation::{ExpandOperation, ExpandedItem, Operation, PriceAdjustment};
use crate::pool::QuantityPool;
use crate::{MerchandiseId, Quantity};
use serde::{Deserialize, Serialize};

/// How component quantities relate to the quantity of the expanded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpandPolicy {
    /// Component quantities describe one unit of the bundle; scaling to the
    /// line quantity is left to the host (default).
    #[default]
    PerParentUnit,
    /// Component quantities are multiplied by the cart line quantity.
    ScaleByLineQuantity,
}

/// Emit one expand operation per expandable bundle line.
///
/// Lines already consumed in full by a merge, gift cards, lines carrying
/// parent definitions, and lines with absent or unparsable component
/// metadata are skipped. Component arrays that parse but disagree
/// structurally abort the run.
pub fn resolve_expands(
    lines: &[CartLine],
    pool: &QuantityPool,
    policy: ExpandPolicy,
) -> Result<Vec<Operation>> {
    let mut operations = Vec::new();

    for line in lines {
        if let Some(operation) = build_expand_operation(line, pool, policy)? {
            operations.push(Operation::Expand(operation));
        }
    }

    Ok(operations)
}

fn build_expand_operation(
    line: &CartLine,
    pool: &QuantityPool,
    policy: ExpandPolicy,
) -> Result<Option<ExpandOperation>> {
    let Some(variant) = line.variant() else {
        return Ok(None);
    };
    if variant.is_gift_card || variant.component_parents.is_some() {
        return Ok(None);
    }
    if pool.remaining(&line.id) == 0 {
        // Consumed in full by a merge, or empty to begin with.
        return Ok(None);
    }

    let (Some(reference_field), Some(quantities_field)) =
        (&variant.component_reference, &variant.component_quantities)
    else {
        return Ok(None);
    };

    let references: Vec<MerchandiseId> = match serde_json::from_str(&reference_field.value) {
        Ok(references) => references,
        Err(error) => {
            tracing::warn!(
                cart_line_id = %line.id,
                %error,
                "unparsable component_reference metafield, skipping line"
            );
            return Ok(None);
        }
    };
    let quantities: Vec<Quantity> = match serde_json::from_str(&quantities_field.value) {
        Ok(quantities) => quantities,
        Err(error) => {
            tracing::warn!(
                cart_line_id = %line.id,
                %error,
                "unparsable component_quantities metafield, skipping line"
            );
            return Ok(None);
        }
    };

    if references.is_empty()
        || references.len() != quantities.len()
        || quantities.iter().any(|&quantity| quantity == 0)
    {
        tracing::error!(
            cart_line_id = %line.id,
            references = references.len(),
            quantities = quantities.len(),
            "inconsistent component arrays on expand-eligible line"
        );
        return Err(Error::InvalidBundleComposition);
    }

    let scale = match policy {
        ExpandPolicy::PerParentUnit => 1,
        ExpandPolicy::ScaleByLineQuantity => line.quantity,
    };

    let expanded_cart_items = references
        .into_iter()
        .zip(quantities)
        .map(|(merchandise_id, quantity)| ExpandedItem {
            merchandise_id,
            quantity: quantity.saturating_mul(scale),
        })
        .collect();

    Ok(Some(ExpandOperation {
        cart_line_id: line.id.clone(),
        expanded_cart_items,
        price: price_adjustment(variant),
    }))
}

/// Parse the variant's price adjustment, if present and usable.
fn price_adjustment(variant: &ProductVariant) -> Option<PriceAdjustment> {
    let field = variant.price_adjustment.as_ref()?;
    let value: f64 = field.value.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then(|| PriceAdjustment::percentage_decrease(value))
}
