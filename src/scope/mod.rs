//! Scope module.
//!
//! - scope: Scopes, bindings and the `Lookup` trait used by the type checker
//! - binder: The pass that builds scopes and annotates identifiers
pub mod binder;
pub mod scope;

#[cfg(test)]
mod tests;
