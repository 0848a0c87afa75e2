//! Symbols
//!
//! The resolved view of declarations. Symbols are produced by the semantic
//! model and are read-only to consumers.

use crate::source::SourceLocation;
use crate::syntax::{Accessibility, TypeRef};
use serde::{Deserialize, Serialize};

/// A structurally implemented interface, with its type arguments:
/// `IRequest<string>` is `{ interface: "IRequest", type_args: [string] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceImpl {
    pub interface: String,
    pub type_args: Vec<TypeRef>,
}

impl InterfaceImpl {
    pub fn new(interface: impl Into<String>, type_args: Vec<TypeRef>) -> Self {
        InterfaceImpl {
            interface: interface.into(),
            type_args,
        }
    }
}

/// A named type known to the compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSymbol {
    pub fqn: String,
    pub implements: Vec<InterfaceImpl>,
}

impl TypeSymbol {
    pub fn new(fqn: impl Into<String>) -> Self {
        TypeSymbol {
            fqn: fqn.into(),
            implements: Vec::new(),
        }
    }

    pub fn with_interface(mut self, interface: &str, type_args: &[&str]) -> Self {
        self.implements.push(InterfaceImpl::new(
            interface,
            type_args.iter().map(|a| TypeRef::parse(a)).collect(),
        ));
        self
    }

    /// First implementation of the named interface, any arity.
    pub fn implements_interface(&self, interface: &str) -> Option<&InterfaceImpl> {
        self.implements.iter().find(|i| i.interface == interface)
    }

    /// Short name, last dotted segment of the fqn.
    pub fn short_name(&self) -> &str {
        self.fqn.rsplit('.').next().unwrap_or(&self.fqn)
    }
}

/// A resolved method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSymbol {
    pub name: String,
    pub ty: TypeRef,
}

impl ParamSymbol {
    /// Whether this is the conventional trailing context parameter.
    pub fn is_cancellation(&self) -> bool {
        self.ty.short_name() == crate::CANCELLATION_TOKEN
    }
}

/// A resolved method declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub name: String,
    pub containing_type: String,
    pub parameters: Vec<ParamSymbol>,
    pub return_type: TypeRef,
    pub is_static: bool,
    pub accessibility: Accessibility,
    pub location: SourceLocation,
}

impl MethodSymbol {
    /// Parameters that carry payload, i.e. everything except the
    /// cancellation token.
    pub fn value_parameters(&self) -> impl Iterator<Item = &ParamSymbol> {
        self.parameters.iter().filter(|p| !p.is_cancellation())
    }

    pub fn has_cancellation_parameter(&self) -> bool {
        self.parameters.iter().any(|p| p.is_cancellation())
    }
}
