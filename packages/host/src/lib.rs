//! Host compiler facade
//!
//! The generator core never parses source text itself. The host compiler
//! hands it a set of parsed trees plus a semantic model, and this crate is
//! the concrete shape of that hand-off: declarations, symbols, type
//! references, library references and the cancellation signal. Hosts (and
//! tests) assemble a [`Compilation`] through [`CompilationBuilder`].

pub mod cancellation;
pub mod program;
pub mod source;
pub mod symbols;
pub mod syntax;

pub use cancellation::{Cancelled, CancellationToken};
pub use program::{
    Compilation, CompilationBuilder, LibraryReference, ResolutionError, SemanticModel,
};
pub use source::SourceLocation;
pub use symbols::{InterfaceImpl, MethodSymbol, ParamSymbol, TypeSymbol};
pub use syntax::{
    Accessibility, AttrValue, AttributeArg, AttributeDecl, ClassDecl, MethodDecl, MethodId,
    ParamDecl, ParsedTree, TypeRef,
};

/// Short name of the context parameter type handlers receive.
pub const CANCELLATION_TOKEN: &str = "CancellationToken";

/// Fully qualified spelling used when hosts build trees.
pub const CANCELLATION_TOKEN_FQN: &str = "System.Threading.CancellationToken";
