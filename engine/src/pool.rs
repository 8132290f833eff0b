//! Scratch quantity bookkeeping for a single run.

use crate::cart::CartLine;
use crate::operation::CartLineInput;
use crate::{CartLineId, Quantity};
use std::collections::HashMap;

/// Remaining cart line quantities during resolution.
///
/// Seeded from the input lines, decremented only when a merge definition is
/// satisfied in full, and discarded at the end of the run. The input cart is
/// never mutated.
#[derive(Debug, Clone)]
pub struct QuantityPool {
    remaining: HashMap<CartLineId, Quantity>,
}

impl QuantityPool {
    /// Seed the pool from the cart lines.
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let remaining = lines
            .iter()
            .map(|line| (line.id.clone(), line.quantity))
            .collect();
        Self { remaining }
    }

    /// Remaining quantity for a cart line; zero for unknown ids.
    pub fn remaining(&self, cart_line_id: &str) -> Quantity {
        self.remaining.get(cart_line_id).copied().unwrap_or(0)
    }

    /// Apply a satisfied definition's claims.
    pub fn commit(&mut self, claims: &[CartLineInput]) {
        for claim in claims {
            if let Some(quantity) = self.remaining.get_mut(&claim.cart_line_id) {
                *quantity = quantity.saturating_sub(claim.quantity);
            }
        }
    }
}
