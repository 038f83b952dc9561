//! Type inference.
//!
//! Every node is checked by a resumable job. Jobs that need a type which is
//! not known yet are parked and retried, which lets declarations refer to
//! each other in any order, functions recurse, and types be computed from
//! other types. The pass finishes when no job is left, or fails when a full
//! sweep over the parked jobs makes no progress.
//!
//! - `type_checker` holds the driver and the job bookkeeping
//! - `algebra` reduces, matches and combines type expressions
//! - `statements` and `expressions` hold the per-node state machines

pub mod algebra;
pub mod expressions;
pub mod statements;
pub mod type_checker;

#[cfg(test)]
mod tests;
