//! # Cartform Engine
//!
//! A deterministic cart transform engine for bundle products.
//!
//! This crate provides the core logic for rewriting a checkout cart around
//! bundles: expanding a bundle line into its component items, and merging
//! separate component lines into a single bundled parent line. It is invoked
//! synchronously by a checkout host, once per cart evaluation, and returns a
//! list of operations the host applies.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of files, network, or platform
//! - **Deterministic**: the same cart always produces the same operations
//! - **Testable**: pure logic, no mocks needed
//! - **Portable**: runs anywhere Rust runs (native, WASM, embedded)
//!
//! ## Core Concepts
//!
//! ### Cart lines and metafields
//!
//! The host passes a [`Cart`] snapshot whose lines reference merchandise.
//! Bundle behavior is encoded as string-valued metafields on the product
//! variant: `component_reference` / `component_quantities` describe what a
//! bundle line expands into, `component_parents` describes the bundles a
//! component line can be merged into, and `price_adjustment` carries an
//! optional percentage discount.
//!
//! ### Operations
//!
//! Changes are expressed as operations, not direct mutations:
//! - [`ExpandOperation`] - replace one bundle line with its components
//! - [`MergeOperation`] - collapse component lines into one parent line
//!
//! An empty operation list ([`FunctionResult::no_changes`]) is the canonical
//! "make no changes" response and is distinct from failure.
//!
//! ### Quantity pool
//!
//! Merge resolution works against a [`QuantityPool`], an owned scratch map
//! of remaining line quantities. A parent definition's component claims
//! commit atomically: all of them on full success, none otherwise.
//!
//! ## Quick Start
//!
//! ```rust
//! use cartform_engine::{Cart, CartLine, CartTransform, Metafield, Operation, ProductVariant};
//!
//! // A bundle line: one unit that expands into components "2" and "3".
//! let mut variant = ProductVariant::new("gid://shop/ProductVariant/1");
//! variant.component_reference = Some(Metafield::new(r#"["2","3"]"#));
//! variant.component_quantities = Some(Metafield::new("[1,2]"));
//!
//! let cart = Cart {
//!     lines: vec![CartLine::new("line-1", 1, variant)],
//! };
//!
//! let result = CartTransform::new().run(&cart).unwrap();
//! assert_eq!(result.operations.len(), 1);
//!
//! match &result.operations[0] {
//!     Operation::Expand(op) => {
//!         assert_eq!(op.cart_line_id, "line-1");
//!         assert_eq!(op.expanded_cart_items.len(), 2);
//!     }
//!     Operation::Merge(_) => unreachable!(),
//! }
//! ```
//!
//! ## FFI
//!
//! The [`ffi`] module provides C-compatible functions for hosts written in
//! other languages. All data is exchanged as JSON strings.

pub mod cart;
pub mod definition;
pub mod error;
pub mod expand;
pub mod ffi;
pub mod merge;
pub mod operation;
pub mod pool;
pub mod transform;

// Re-export main types at crate root
pub use cart::{Cart, CartLine, Merchandise, Metafield, ProductVariant};
pub use definition::{extract_parent_definitions, ParentDefinition};
pub use error::{Error, Result};
pub use expand::{resolve_expands, ExpandPolicy};
pub use merge::resolve_merges;
pub use operation::{
    dedupe_operations, CartLineInput, ExpandOperation, ExpandedItem, MergeOperation, Operation,
    OperationKey, PriceAdjustment, PriceAdjustmentValue,
};
pub use pool::QuantityPool;
pub use transform::{run, CartTransform, FunctionInput, FunctionResult};

/// Type aliases for clarity
pub type CartLineId = String;
pub type MerchandiseId = String;
pub type Quantity = u64;
