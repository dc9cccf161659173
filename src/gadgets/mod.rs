//! The gadget library: higher-level circuit operations expressed as
//! compositions over the constraint builder.
//!
//! Every gadget is an inherent method on
//! [`ConstraintSystem`](crate::ConstraintSystem); the modules only group
//! them by concern. Pure operations rewrite linear expressions and emit no
//! constraints; multiplicative operations and assertions append to the
//! system.

mod arith;
mod bits;
mod boolean;
mod cmp;
