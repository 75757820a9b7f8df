//! Predicate Module
//!
//! Typed `(field, operator, literal)` comparisons, combined by conjunction.
//!
//! ## Evaluation
//! 1. Resolve each predicate against the schema (unknown field → error)
//! 2. Coerce the literal to the field's declared type
//! 3. Compare with the record's value using the type's native ordering
//!
//! A literal that cannot be coerced, or a null on either side, never
//! matches, whatever the operator. An empty predicate list matches every
//! record.

mod criteria;

pub use criteria::{compile, evaluate, CompiledPredicate, Operator, Predicate};
