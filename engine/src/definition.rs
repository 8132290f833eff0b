//! Parent definition extraction.
//!
//! Component lines may carry a `component_parents` metafield describing the
//! bundles they can be merged into. The raw value is a JSON array of loosely
//! shaped records; everything is decoded and checked here in one pass so the
//! resolvers only ever see well-formed definitions.

use crate::cart::CartLine;
use crate::{MerchandiseId, Quantity};
use serde::Deserialize;

/// A mergeable bundle parent derived from `component_parents` metadata.
///
/// Built fresh each run, never persisted. `component_reference` and
/// `component_quantities` are parallel, non-empty, and all quantities are
/// positive once extraction has accepted the definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentDefinition {
    /// Parent variant merchandise id
    pub id: MerchandiseId,
    /// Required component merchandise ids
    pub component_reference: Vec<MerchandiseId>,
    /// Required per-component quantities, parallel to the references
    pub component_quantities: Vec<Quantity>,
    /// Percentage price decrease applied when the bundle forms
    pub price_adjustment: Option<f64>,
}

impl ParentDefinition {
    /// Iterate `(reference id, required quantity)` pairs in array order.
    pub fn components(&self) -> impl Iterator<Item = (&MerchandiseId, Quantity)> {
        self.component_reference
            .iter()
            .zip(self.component_quantities.iter().copied())
    }

    fn is_well_formed(&self) -> bool {
        !self.component_reference.is_empty()
            && self.component_reference.len() == self.component_quantities.len()
            && self.component_quantities.iter().all(|&quantity| quantity > 0)
    }
}

/// Wire shape of one `component_parents` entry.
#[derive(Debug, Deserialize)]
struct ParentEntry {
    id: MerchandiseId,
    #[serde(alias = "componentReference", alias = "componentReferences")]
    component_reference: MaybeWrapped<Vec<MerchandiseId>>,
    #[serde(alias = "componentQuantities")]
    component_quantities: MaybeWrapped<Vec<Quantity>>,
    #[serde(default, alias = "priceAdjustment")]
    price_adjustment: Option<MaybeWrapped<f64>>,
}

/// Entry fields arrive either wrapped in `{"value": ...}` or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MaybeWrapped<T> {
    Wrapped { value: T },
    Bare(T),
}

impl<T> MaybeWrapped<T> {
    fn into_inner(self) -> T {
        match self {
            MaybeWrapped::Wrapped { value } => value,
            MaybeWrapped::Bare(value) => value,
        }
    }
}

/// Extract every parent definition declared across the cart lines, in
/// cart-line order.
///
/// Unparsable metadata means "no parent definitions from this line";
/// individually malformed or inconsistent entries are skipped. Neither case
/// aborts the run.
pub fn extract_parent_definitions(lines: &[CartLine]) -> Vec<ParentDefinition> {
    let mut definitions = Vec::new();

    for line in lines {
        let Some(variant) = line.variant() else {
            continue;
        };
        let Some(metafield) = &variant.component_parents else {
            continue;
        };

        let entries = match serde_json::from_str::<serde_json::Value>(&metafield.value) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!(
                    cart_line_id = %line.id,
                    "component_parents metafield is not a JSON array, skipping line"
                );
                continue;
            }
            Err(error) => {
                tracing::warn!(
                    cart_line_id = %line.id,
                    %error,
                    "unparsable component_parents metafield, skipping line"
                );
                continue;
            }
        };

        for entry in entries {
            let entry: ParentEntry = match serde_json::from_value(entry) {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(
                        cart_line_id = %line.id,
                        %error,
                        "skipping malformed parent definition entry"
                    );
                    continue;
                }
            };

            let definition = ParentDefinition {
                id: entry.id,
                component_reference: entry.component_reference.into_inner(),
                component_quantities: entry.component_quantities.into_inner(),
                price_adjustment: entry.price_adjustment.map(MaybeWrapped::into_inner),
            };

            if !definition.is_well_formed() {
                tracing::warn!(
                    parent_id = %definition.id,
                    "skipping parent definition with inconsistent component arrays"
                );
                continue;
            }

            definitions.push(definition);
        }
    }

    definitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartLine, Merchandise, Metafield, ProductVariant};
    use serde_json::json;

    fn line_with_parents(id: &str, parents: &str) -> CartLine {
        let mut variant = ProductVariant::new(format!("variant-{id}"));
        variant.component_parents = Some(Metafield::new(parents));
        CartLine::new(id, 1, variant)
    }

    #[test]
    fn extracts_wrapped_entries() {
        let parents = json!([{
            "id": "parent-1",
            "component_reference": { "value": ["2", "3"] },
            "component_quantities": { "value": [1, 2] },
            "price_adjustment": { "value": 10.0 }
        }])
        .to_string();

        let lines = vec![line_with_parents("1", &parents)];
        let definitions = extract_parent_definitions(&lines);

        assert_eq!(definitions.len(), 1);
        let definition = &definitions[0];
        assert_eq!(definition.id, "parent-1");
        assert_eq!(definition.component_reference, vec!["2", "3"]);
        assert_eq!(definition.component_quantities, vec![1, 2]);
        assert_eq!(definition.price_adjustment, Some(10.0));
    }

    #[test]
    fn extracts_bare_entries() {
        let parents = json!([{
            "id": "parent-1",
            "component_reference": ["2"],
            "component_quantities": [3]
        }])
        .to_string();

        let lines = vec![line_with_parents("1", &parents)];
        let definitions = extract_parent_definitions(&lines);

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].component_reference, vec!["2"]);
        assert_eq!(definitions[0].price_adjustment, None);
    }

    #[test]
    fn extracts_camel_case_entries() {
        let parents = json!([{
            "id": "parent-1",
            "componentReference": { "value": ["2"] },
            "componentQuantities": { "value": [1] },
            "priceAdjustment": 5.5
        }])
        .to_string();

        let lines = vec![line_with_parents("1", &parents)];
        let definitions = extract_parent_definitions(&lines);

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].price_adjustment, Some(5.5));
    }

    #[test]
    fn malformed_json_yields_nothing() {
        let lines = vec![line_with_parents("1", "not json at all")];
        assert!(extract_parent_definitions(&lines).is_empty());
    }

    #[test]
    fn non_array_value_yields_nothing() {
        let lines = vec![line_with_parents("1", "{\"id\":\"parent-1\"}")];
        assert!(extract_parent_definitions(&lines).is_empty());
    }

    #[test]
    fn malformed_entry_is_skipped_but_rest_survive() {
        let parents = json!([
            { "id": "broken" },
            {
                "id": "parent-2",
                "component_reference": ["2"],
                "component_quantities": [1]
            }
        ])
        .to_string();

        let lines = vec![line_with_parents("1", &parents)];
        let definitions = extract_parent_definitions(&lines);

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].id, "parent-2");
    }

    #[test]
    fn length_mismatch_is_skipped() {
        let parents = json!([{
            "id": "parent-1",
            "component_reference": ["2", "3"],
            "component_quantities": [1]
        }])
        .to_string();

        let lines = vec![line_with_parents("1", &parents)];
        assert!(extract_parent_definitions(&lines).is_empty());
    }

    #[test]
    fn empty_components_are_skipped() {
        let parents = json!([{
            "id": "parent-1",
            "component_reference": [],
            "component_quantities": []
        }])
        .to_string();

        let lines = vec![line_with_parents("1", &parents)];
        assert!(extract_parent_definitions(&lines).is_empty());
    }

    #[test]
    fn zero_quantity_is_skipped() {
        let parents = json!([{
            "id": "parent-1",
            "component_reference": ["2"],
            "component_quantities": [0]
        }])
        .to_string();

        let lines = vec![line_with_parents("1", &parents)];
        assert!(extract_parent_definitions(&lines).is_empty());
    }

    #[test]
    fn lines_without_metadata_contribute_nothing() {
        let lines = vec![
            CartLine::new("1", 1, ProductVariant::new("v-1")),
            CartLine::new("2", 1, Merchandise::Other),
        ];
        assert!(extract_parent_definitions(&lines).is_empty());
    }

    #[test]
    fn extraction_order_follows_cart_order() {
        let first = json!([{
            "id": "parent-a",
            "component_reference": ["2"],
            "component_quantities": [1]
        }])
        .to_string();
        let second = json!([{
            "id": "parent-b",
            "component_reference": ["3"],
            "component_quantities": [1]
        }])
        .to_string();

        let lines = vec![
            line_with_parents("1", &first),
            line_with_parents("2", &second),
        ];
        let definitions = extract_parent_definitions(&lines);

        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[0].id, "parent-a");
        assert_eq!(definitions[1].id, "parent-b");
    }
}
