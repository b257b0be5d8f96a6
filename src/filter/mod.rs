//! Filter Module
//!
//! Boolean predicate trees evaluated against decoded items.
//!
//! ## Grammar
//! ```text
//! Predicate := Comparison { column, op, value }
//!            | And [Predicate...]     -- empty is true
//!            | Or  [Predicate...]     -- empty is false
//!            | Not Predicate
//! op        := $eq | $ne | $gt | $gte | $lt | $lte
//! ```
//!
//! ## Comparison Semantics
//! - Text: byte-lexicographic order of the UTF-8 bytes
//! - Integer/Float: numeric; an Integer meets a Float as a Float
//! - Boolean: `$eq` / `$ne` only
//! - A column absent from the item makes every comparison false
//!
//! Predicates are checked against the schema once (`CompiledFilter::compile`)
//! before any record is read.

mod evaluator;
mod predicate;

pub use evaluator::{evaluate, CompiledFilter};
pub use predicate::{Comparison, Operator, Predicate};
