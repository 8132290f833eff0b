//! Cart snapshot input types.
//!
//! The host passes one immutable cart per invocation. Bundle metadata
//! arrives as string-encoded metafields on the product variant; field-name
//! aliasing (camelCase vs snake_case) is normalized here at the decode
//! boundary rather than scattered through the algorithm.

use crate::{CartLineId, MerchandiseId, Quantity};
use serde::{Deserialize, Serialize};

/// A metafield wrapper holding a string-encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafield {
    /// Raw metafield value, usually JSON-encoded
    pub value: String,
}

impl Metafield {
    /// Create a new metafield from a raw value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// A purchasable product variant, possibly carrying bundle metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Merchandise identifier
    pub id: MerchandiseId,
    /// Gift cards are never rewritten
    #[serde(rename = "isGiftCard", alias = "is_gift_card", default)]
    pub is_gift_card: bool,
    /// JSON array of component merchandise ids
    #[serde(
        default,
        alias = "componentReference",
        alias = "componentReferences",
        skip_serializing_if = "Option::is_none"
    )]
    pub component_reference: Option<Metafield>,
    /// JSON array of per-component quantities, parallel to the references
    #[serde(
        default,
        alias = "componentQuantities",
        skip_serializing_if = "Option::is_none"
    )]
    pub component_quantities: Option<Metafield>,
    /// JSON array of parent definitions this variant is a component of
    #[serde(
        default,
        alias = "componentParents",
        skip_serializing_if = "Option::is_none"
    )]
    pub component_parents: Option<Metafield>,
    /// Percentage price decrease, JSON-encoded numeric string
    #[serde(
        default,
        alias = "priceAdjustment",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_adjustment: Option<Metafield>,
}

impl ProductVariant {
    /// Create a variant with no bundle metadata.
    pub fn new(id: impl Into<MerchandiseId>) -> Self {
        Self {
            id: id.into(),
            is_gift_card: false,
            component_reference: None,
            component_quantities: None,
            component_parents: None,
            price_adjustment: None,
        }
    }
}

/// Merchandise referenced by a cart line.
///
/// Only product variants participate in bundle resolution; anything else
/// (custom products, shipping lines) passes through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum Merchandise {
    ProductVariant(ProductVariant),
    #[serde(other)]
    Other,
}

impl From<ProductVariant> for Merchandise {
    fn from(variant: ProductVariant) -> Self {
        Merchandise::ProductVariant(variant)
    }
}

/// One line of the cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Stable line identifier assigned by the host
    pub id: CartLineId,
    /// Units of the merchandise on this line
    pub quantity: Quantity,
    /// What the line holds
    pub merchandise: Merchandise,
}

impl CartLine {
    /// Create a new cart line.
    pub fn new(
        id: impl Into<CartLineId>,
        quantity: Quantity,
        merchandise: impl Into<Merchandise>,
    ) -> Self {
        Self {
            id: id.into(),
            quantity,
            merchandise: merchandise.into(),
        }
    }

    /// The product variant on this line, if it holds one.
    pub fn variant(&self) -> Option<&ProductVariant> {
        match &self.merchandise {
            Merchandise::ProductVariant(variant) => Some(variant),
            Merchandise::Other => None,
        }
    }
}

/// The cart snapshot passed in by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Ordered line items
    pub lines: Vec<CartLine>,
}
