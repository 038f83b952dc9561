/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Node arena, node kinds and flags
/// - expressions: Payloads of expression nodes
/// - statements: Payloads of statement nodes
/// - types: Primitive type descriptors
/// - interner: Identifier interning
pub mod ast;
pub mod expressions;
pub mod interner;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;
