//! Program Model
//!
//! The compilation handed to the generator: parsed trees, library
//! references, the type table and per-tree semantic models. The model is
//! read-only once built; the generator never mutates it.

use crate::source::SourceLocation;
use crate::symbols::{MethodSymbol, ParamSymbol, TypeSymbol};
use crate::syntax::{MethodDecl, MethodId, ParsedTree};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A library the compilation references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryReference {
    pub name: String,
}

impl LibraryReference {
    pub fn new(name: impl Into<String>) -> Self {
        LibraryReference { name: name.into() }
    }
}

/// Raised by the semantic model when a declaration cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("declaration `{0}` is not part of this tree")]
    UnknownDeclaration(String),
    #[error("semantic model failure while binding `{0}`")]
    BindingFailed(String),
}

/// Per-tree resolver from declarations to symbols.
#[derive(Debug)]
pub struct SemanticModel {
    tree_name: String,
    methods: HashMap<MethodId, MethodSymbol>,
    poisoned: HashSet<MethodId>,
}

impl SemanticModel {
    pub fn tree_name(&self) -> &str {
        &self.tree_name
    }

    pub fn resolve_method(&self, decl: &MethodDecl) -> Result<MethodSymbol, ResolutionError> {
        if self.poisoned.contains(&decl.id) {
            return Err(ResolutionError::BindingFailed(decl.name.clone()));
        }
        self.methods
            .get(&decl.id)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownDeclaration(decl.name.clone()))
    }
}

/// The whole program as the host sees it.
#[derive(Debug)]
pub struct Compilation {
    trees: Vec<ParsedTree>,
    references: Vec<LibraryReference>,
    types: HashMap<String, TypeSymbol>,
    poisoned: HashSet<MethodId>,
}

impl Compilation {
    pub fn builder() -> CompilationBuilder {
        CompilationBuilder::new()
    }

    pub fn trees(&self) -> &[ParsedTree] {
        &self.trees
    }

    pub fn references(&self) -> &[LibraryReference] {
        &self.references
    }

    pub fn find_type(&self, fqn: &str) -> Option<&TypeSymbol> {
        self.types.get(fqn)
    }

    /// Build the semantic model for one tree. Expensive by contract, which
    /// is why callers memoize it.
    pub fn semantic_model(&self, tree_index: usize) -> Option<SemanticModel> {
        let tree = self.trees.get(tree_index)?;
        let mut methods = HashMap::new();
        let mut poisoned = HashSet::new();
        for class in &tree.classes {
            for method in &class.methods {
                if self.poisoned.contains(&method.id) {
                    poisoned.insert(method.id);
                    continue;
                }
                let location = if method.location.file.is_empty() {
                    SourceLocation::unknown(&tree.file_name)
                } else {
                    method.location.clone()
                };
                methods.insert(
                    method.id,
                    MethodSymbol {
                        name: method.name.clone(),
                        containing_type: class.fqn(),
                        parameters: method
                            .params
                            .iter()
                            .map(|p| ParamSymbol {
                                name: p.name.clone(),
                                ty: p.ty.clone(),
                            })
                            .collect(),
                        return_type: method.return_type.clone(),
                        is_static: method.is_static,
                        accessibility: method.accessibility,
                        location,
                    },
                );
            }
        }
        Some(SemanticModel {
            tree_name: tree.file_name.clone(),
            methods,
            poisoned,
        })
    }
}

/// Assembles a [`Compilation`]. Method ids are handed out here; poisoning a
/// method makes its later resolution fail, which is how hosts and tests
/// exercise the generator's fault isolation.
#[derive(Debug, Default)]
pub struct CompilationBuilder {
    trees: Vec<ParsedTree>,
    references: Vec<LibraryReference>,
    types: HashMap<String, TypeSymbol>,
    poison: Vec<(String, String)>,
    next_id: u64,
}

impl CompilationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference(mut self, name: &str) -> Self {
        self.references.push(LibraryReference::new(name));
        self
    }

    pub fn with_tree(mut self, mut tree: ParsedTree) -> Self {
        for class in &mut tree.classes {
            for method in &mut class.methods {
                self.next_id += 1;
                method.id = MethodId(self.next_id);
            }
        }
        self.trees.push(tree);
        self
    }

    pub fn with_type(mut self, symbol: TypeSymbol) -> Self {
        self.types.insert(symbol.fqn.clone(), symbol);
        self
    }

    /// Registers `fqn` as a request type with the given response type.
    pub fn with_request_type(self, fqn: &str, response: &str) -> Self {
        let symbol = TypeSymbol::new(fqn).with_interface("IRequest", &[response]);
        self.with_type(symbol)
    }

    /// Registers `fqn` as a void request type.
    pub fn with_void_request_type(self, fqn: &str) -> Self {
        self.with_type(TypeSymbol::new(fqn).with_interface("IRequest", &[]))
    }

    /// Registers `fqn` as a notification type.
    pub fn with_notification_type(self, fqn: &str) -> Self {
        self.with_type(TypeSymbol::new(fqn).with_interface("INotification", &[]))
    }

    /// Registers `fqn` as a stream request type with the given element type.
    pub fn with_stream_request_type(self, fqn: &str, element: &str) -> Self {
        self.with_type(TypeSymbol::new(fqn).with_interface("IStreamRequest", &[element]))
    }

    /// Makes resolution of `class_fqn.method_name` fail with a binding
    /// error once the compilation is built.
    pub fn with_poisoned_method(mut self, class_fqn: &str, method_name: &str) -> Self {
        self.poison
            .push((class_fqn.to_string(), method_name.to_string()));
        self
    }

    pub fn build(self) -> Compilation {
        let mut poisoned = HashSet::new();
        for tree in &self.trees {
            for class in &tree.classes {
                let fqn = class.fqn();
                for method in &class.methods {
                    if self
                        .poison
                        .iter()
                        .any(|(c, m)| *c == fqn && *m == method.name)
                    {
                        poisoned.insert(method.id);
                    }
                }
            }
        }
        Compilation {
            trees: self.trees,
            references: self.references,
            types: self.types,
            poisoned,
        }
    }
}
