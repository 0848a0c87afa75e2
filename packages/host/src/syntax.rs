//! Syntax Declarations
//!
//! The parsed-tree surface the generator walks: classes, methods,
//! attributes and textual type references. Everything here is lexical;
//! semantic questions go through the symbols in [`crate::program`].

use crate::source::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declaration identity of a method. Assigned by [`crate::CompilationBuilder`];
/// unique within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodId(pub u64);

/// Declared accessibility of a class or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accessibility {
    Public,
    Internal,
    ProtectedInternal,
    Protected,
    Private,
}

impl Accessibility {
    /// Whether generated code can reach a member with this accessibility.
    pub fn is_reachable(self) -> bool {
        !matches!(self, Accessibility::Private)
    }
}

/// A textual type reference, possibly generic: `Task<List<string>>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef {
            name: name.into(),
            args,
        }
    }

    /// Parse a textual reference. Whitespace around identifiers and commas
    /// is tolerated; an unbalanced argument list falls back to an opaque
    /// non-generic name so a malformed host string never panics.
    pub fn parse(text: &str) -> TypeRef {
        let text = text.trim();
        match parse_inner(text) {
            Some((ty, rest)) if rest.trim().is_empty() => ty,
            _ => TypeRef::new(text),
        }
    }

    pub fn is_void(&self) -> bool {
        self.name == "void" && self.args.is_empty()
    }

    /// Last dotted segment of the name: `System.Threading.CancellationToken`
    /// gives `CancellationToken`.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

fn parse_inner(text: &str) -> Option<(TypeRef, &str)> {
    let text = text.trim_start();
    let name_end = text
        .find(|c| c == '<' || c == '>' || c == ',')
        .unwrap_or(text.len());
    let name = text[..name_end].trim();
    if name.is_empty() {
        return None;
    }
    let mut rest = &text[name_end..];
    let mut args = Vec::new();
    if rest.starts_with('<') {
        rest = &rest[1..];
        loop {
            let (arg, after) = parse_inner(rest)?;
            args.push(arg);
            rest = after.trim_start();
            if let Some(stripped) = rest.strip_prefix(',') {
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix('>') {
                rest = stripped;
                break;
            } else {
                return None;
            }
        }
    }
    Some((
        TypeRef {
            name: name.to_string(),
            args,
        },
        rest,
    ))
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Value of an attribute argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    /// An identifier-like value, e.g. an enum member name.
    Ident(String),
}

/// A single named or positional attribute argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeArg {
    pub name: Option<String>,
    pub value: AttrValue,
}

/// An attribute applied to a method, e.g. `[Handle(Name = "primary")]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDecl {
    pub name: String,
    pub args: Vec<AttributeArg>,
}

impl AttributeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        AttributeDecl {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg_str(mut self, name: &str, value: &str) -> Self {
        self.args.push(AttributeArg {
            name: Some(name.to_string()),
            value: AttrValue::Str(value.to_string()),
        });
        self
    }

    pub fn with_arg_int(mut self, name: &str, value: i64) -> Self {
        self.args.push(AttributeArg {
            name: Some(name.to_string()),
            value: AttrValue::Int(value),
        });
        self
    }

    pub fn with_arg_ident(mut self, name: &str, value: &str) -> Self {
        self.args.push(AttributeArg {
            name: Some(name.to_string()),
            value: AttrValue::Ident(value.to_string()),
        });
        self
    }

    /// Named argument lookup, case-insensitive on the argument name.
    pub fn find_arg(&self, name: &str) -> Option<&AttrValue> {
        self.args
            .iter()
            .find(|a| {
                a.name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .map(|a| &a.value)
    }
}

/// A method parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: &str) -> Self {
        ParamDecl {
            name: name.into(),
            ty: TypeRef::parse(ty),
        }
    }
}

/// A method declaration inside a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub id: MethodId,
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub return_type: TypeRef,
    pub attributes: Vec<AttributeDecl>,
    pub is_static: bool,
    pub accessibility: Accessibility,
    pub location: SourceLocation,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        MethodDecl {
            id: MethodId(0),
            name: name.into(),
            params: Vec::new(),
            return_type: TypeRef::new("void"),
            attributes: Vec::new(),
            is_static: false,
            accessibility: Accessibility::Public,
            location: SourceLocation::unknown(""),
        }
    }

    pub fn with_param(mut self, name: &str, ty: &str) -> Self {
        self.params.push(ParamDecl::new(name, ty));
        self
    }

    /// Appends the conventional trailing cancellation parameter.
    pub fn with_cancellation_param(self) -> Self {
        self.with_param("cancellationToken", crate::CANCELLATION_TOKEN_FQN)
    }

    pub fn with_return(mut self, ty: &str) -> Self {
        self.return_type = TypeRef::parse(ty);
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDecl) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }
}

/// A class declaration inside a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub namespace: String,
    pub base_list: Vec<String>,
    pub methods: Vec<MethodDecl>,
    pub ctor_param_count: usize,
    pub accessibility: Accessibility,
    pub location: SourceLocation,
}

impl ClassDecl {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ClassDecl {
            name: name.into(),
            namespace: namespace.into(),
            base_list: Vec::new(),
            methods: Vec::new(),
            ctor_param_count: 0,
            accessibility: Accessibility::Public,
            location: SourceLocation::unknown(""),
        }
    }

    pub fn with_base(mut self, base: &str) -> Self {
        self.base_list.push(base.to_string());
        self
    }

    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_ctor_params(mut self, count: usize) -> Self {
        self.ctor_param_count = count;
        self
    }

    /// Fully qualified name, `Namespace.Name`. Classes without a namespace
    /// use the bare name.
    pub fn fqn(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// One parsed source tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTree {
    pub file_name: String,
    pub classes: Vec<ClassDecl>,
}

impl ParsedTree {
    pub fn new(file_name: impl Into<String>) -> Self {
        ParsedTree {
            file_name: file_name.into(),
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }
}
