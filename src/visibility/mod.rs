//! Visibility label combination
//!
//! Aggregated results cover many underlying entries, each with its own
//! visibility label. Before a result leaves a cursor, the distinct labels of
//! its group are reduced to one expression by a [`LabelCombiner`].
//!
//! # Invariants
//!
//! - Combination is deterministic: the same label set yields the same bytes
//! - Malformed labels are an error, never dropped

mod combiner;
mod errors;
mod expression;

pub use combiner::{ConjunctiveCombiner, LabelCombiner};
pub use errors::{LabelError, LabelResult};
pub use expression::LabelExpression;
