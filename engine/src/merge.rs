//! Merge resolution: compose separate component lines into parent bundles.
//!
//! Definitions are processed in extraction order and lines are scanned in
//! cart order, so quantity contention between competing bundles resolves the
//! same way on every run. A definition's claims against the pool commit in
//! full or not at all.

use crate::cart::CartLine;
use crate::definition::ParentDefinition;
use crate::operation::{CartLineInput, MergeOperation, Operation, PriceAdjustment};
use crate::pool::QuantityPool;
use crate::Quantity;
use std::collections::{HashMap, HashSet};

/// Emit one merge operation per satisfiable parent definition, consuming
/// component quantities from the pool.
pub fn resolve_merges(
    lines: &[CartLine],
    definitions: &[ParentDefinition],
    pool: &mut QuantityPool,
) -> Vec<Operation> {
    let mut operations = Vec::new();
    let mut satisfied: HashSet<&str> = HashSet::new();

    for definition in definitions {
        if satisfied.contains(definition.id.as_str()) {
            continue;
        }

        let Some(matches) = match_components(lines, definition, pool) else {
            tracing::debug!(
                parent_id = %definition.id,
                "merge definition not satisfiable, cart left untouched"
            );
            continue;
        };

        pool.commit(&matches);
        satisfied.insert(definition.id.as_str());

        let price = definition
            .price_adjustment
            .map(PriceAdjustment::percentage_decrease);
        operations.push(Operation::Merge(MergeOperation {
            parent_variant_id: definition.id.clone(),
            cart_lines: matches,
            price,
        }));
    }

    operations
}

/// Speculatively match every required component against the pool.
///
/// Claims are tentative until the whole definition matches; a single missing
/// component discards them all, leaving the pool untouched.
fn match_components<'a>(
    lines: &'a [CartLine],
    definition: &ParentDefinition,
    pool: &QuantityPool,
) -> Option<Vec<CartLineInput>> {
    let mut matches = Vec::with_capacity(definition.component_reference.len());
    let mut held: HashMap<&'a str, Quantity> = HashMap::new();

    for (reference_id, required) in definition.components() {
        let line = lines.iter().find(|line| {
            line.variant().is_some_and(|variant| &variant.id == reference_id)
                && pool
                    .remaining(&line.id)
                    .saturating_sub(held.get(line.id.as_str()).copied().unwrap_or(0))
                    >= required
        })?;

        matches.push(CartLineInput {
            cart_line_id: line.id.clone(),
            quantity: required,
        });
        *held.entry(line.id.as_str()).or_insert(0) += required;
    }

    Some(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Merchandise, ProductVariant};

    fn line(id: &str, variant_id: &str, quantity: Quantity) -> CartLine {
        CartLine::new(id, quantity, ProductVariant::new(variant_id))
    }

    fn definition(id: &str, components: &[(&str, Quantity)]) -> ParentDefinition {
        ParentDefinition {
            id: id.into(),
            component_reference: components.iter().map(|(r, _)| (*r).into()).collect(),
            component_quantities: components.iter().map(|(_, q)| *q).collect(),
            price_adjustment: None,
        }
    }

    #[test]
    fn satisfied_definition_emits_merge_and_consumes_pool() {
        let lines = vec![line("1", "A", 1), line("2", "B", 2)];
        let definitions = vec![definition("parent", &[("A", 1), ("B", 2)])];
        let mut pool = QuantityPool::from_lines(&lines);

        let operations = resolve_merges(&lines, &definitions, &mut pool);

        assert_eq!(operations.len(), 1);
        let Operation::Merge(op) = &operations[0] else {
            panic!("expected merge operation");
        };
        assert_eq!(op.parent_variant_id, "parent");
        assert_eq!(
            op.cart_lines,
            vec![
                CartLineInput {
                    cart_line_id: "1".into(),
                    quantity: 1
                },
                CartLineInput {
                    cart_line_id: "2".into(),
                    quantity: 2
                },
            ]
        );
        assert_eq!(pool.remaining("1"), 0);
        assert_eq!(pool.remaining("2"), 0);
    }

    #[test]
    fn shortfall_emits_nothing_and_leaves_pool_untouched() {
        let lines = vec![line("1", "A", 1), line("2", "B", 1)];
        let definitions = vec![definition("parent", &[("A", 1), ("B", 2)])];
        let mut pool = QuantityPool::from_lines(&lines);

        let operations = resolve_merges(&lines, &definitions, &mut pool);

        assert!(operations.is_empty());
        assert_eq!(pool.remaining("1"), 1);
        assert_eq!(pool.remaining("2"), 1);
    }

    #[test]
    fn missing_component_leaves_pool_untouched() {
        let lines = vec![line("1", "A", 5)];
        let definitions = vec![definition("parent", &[("A", 1), ("B", 1)])];
        let mut pool = QuantityPool::from_lines(&lines);

        let operations = resolve_merges(&lines, &definitions, &mut pool);

        assert!(operations.is_empty());
        assert_eq!(pool.remaining("1"), 5);
    }

    #[test]
    fn repeated_reference_claims_cumulatively() {
        // Two components referencing the same merchandise must both fit
        // within the one line's quantity.
        let lines = vec![line("1", "A", 3)];
        let short = vec![definition("parent", &[("A", 2), ("A", 2)])];
        let mut pool = QuantityPool::from_lines(&lines);
        assert!(resolve_merges(&lines, &short, &mut pool).is_empty());
        assert_eq!(pool.remaining("1"), 3);

        let exact = vec![definition("parent", &[("A", 2), ("A", 1)])];
        let operations = resolve_merges(&lines, &exact, &mut pool);
        assert_eq!(operations.len(), 1);
        assert_eq!(pool.remaining("1"), 0);
    }

    #[test]
    fn committed_consumption_is_visible_to_later_definitions() {
        let lines = vec![line("1", "A", 1), line("2", "B", 2)];
        let definitions = vec![
            definition("parent-1", &[("A", 1), ("B", 1)]),
            definition("parent-2", &[("B", 2)]),
        ];
        let mut pool = QuantityPool::from_lines(&lines);

        let operations = resolve_merges(&lines, &definitions, &mut pool);

        // parent-1 takes one B, leaving one; parent-2 needs two.
        assert_eq!(operations.len(), 1);
        let Operation::Merge(op) = &operations[0] else {
            panic!("expected merge operation");
        };
        assert_eq!(op.parent_variant_id, "parent-1");
        assert_eq!(pool.remaining("2"), 1);
    }

    #[test]
    fn first_matching_line_in_cart_order_wins() {
        let lines = vec![line("1", "A", 1), line("2", "A", 1)];
        let definitions = vec![definition("parent", &[("A", 1)])];
        let mut pool = QuantityPool::from_lines(&lines);

        let operations = resolve_merges(&lines, &definitions, &mut pool);

        let Operation::Merge(op) = &operations[0] else {
            panic!("expected merge operation");
        };
        assert_eq!(op.cart_lines[0].cart_line_id, "1");
        assert_eq!(pool.remaining("1"), 0);
        assert_eq!(pool.remaining("2"), 1);
    }

    #[test]
    fn duplicate_parent_id_consumes_only_once() {
        let lines = vec![line("1", "A", 2)];
        let definitions = vec![
            definition("parent", &[("A", 1)]),
            definition("parent", &[("A", 1)]),
        ];
        let mut pool = QuantityPool::from_lines(&lines);

        let operations = resolve_merges(&lines, &definitions, &mut pool);

        assert_eq!(operations.len(), 1);
        assert_eq!(pool.remaining("1"), 1);
    }

    #[test]
    fn price_adjustment_carries_through() {
        let lines = vec![line("1", "A", 1)];
        let mut with_price = definition("parent", &[("A", 1)]);
        with_price.price_adjustment = Some(15.0);
        let mut pool = QuantityPool::from_lines(&lines);

        let operations = resolve_merges(&lines, &[with_price], &mut pool);

        let price = operations[0].price().unwrap();
        assert_eq!(price.percentage_decrease.value, 15.0);
    }

    #[test]
    fn non_variant_lines_never_match() {
        let lines = vec![CartLine::new("1", 5, Merchandise::Other)];
        let definitions = vec![definition("parent", &[("A", 1)])];
        let mut pool = QuantityPool::from_lines(&lines);

        assert!(resolve_merges(&lines, &definitions, &mut pool).is_empty());
    }
}
