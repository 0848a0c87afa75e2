//! Handler Model
//!
//! The validated output of discovery: handler records, structural
//! interface implementations and the marker vocabulary. Records are
//! immutable once discovery freezes the model; emitters only read it.

use bitflags::bitflags;
use relay_host::{Accessibility, SourceLocation, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The marker attributes the generator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    Handle,
    Notification,
    Pipeline,
    ExposeAsEndpoint,
}

impl MarkerKind {
    /// Attribute short name, without the optional `Attribute` suffix.
    pub fn attribute_name(self) -> &'static str {
        match self {
            MarkerKind::Handle => "Handle",
            MarkerKind::Notification => "Notification",
            MarkerKind::Pipeline => "Pipeline",
            MarkerKind::ExposeAsEndpoint => "ExposeAsEndpoint",
        }
    }

    /// Match a short attribute name against the marker vocabulary.
    /// Case-sensitive; the `Attribute` suffix has already been stripped.
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        match name {
            "Handle" => Some(MarkerKind::Handle),
            "Notification" => Some(MarkerKind::Notification),
            "Pipeline" => Some(MarkerKind::Pipeline),
            "ExposeAsEndpoint" => Some(MarkerKind::ExposeAsEndpoint),
            _ => None,
        }
    }
}

bitflags! {
    /// Set of markers found on one method. A method may carry several;
    /// each produces its own handler record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MarkerSet: u8 {
        const HANDLE = 1 << 0;
        const NOTIFICATION = 1 << 1;
        const PIPELINE = 1 << 2;
        const EXPOSE_AS_ENDPOINT = 1 << 3;
    }
}

impl From<MarkerKind> for MarkerSet {
    fn from(kind: MarkerKind) -> Self {
        match kind {
            MarkerKind::Handle => MarkerSet::HANDLE,
            MarkerKind::Notification => MarkerSet::NOTIFICATION,
            MarkerKind::Pipeline => MarkerSet::PIPELINE,
            MarkerKind::ExposeAsEndpoint => MarkerSet::EXPOSE_AS_ENDPOINT,
        }
    }
}

/// Which handler kinds a pipeline participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Scope {
    All = 0,
    Requests = 1,
    Streams = 2,
    Notifications = 3,
}

impl Scope {
    pub fn from_ident(name: &str) -> Option<Self> {
        match name {
            "All" => Some(Scope::All),
            "Requests" => Some(Scope::Requests),
            "Streams" => Some(Scope::Streams),
            "Notifications" => Some(Scope::Notifications),
            _ => None,
        }
    }

    pub fn from_int(value: i64) -> Option<Self> {
        match value {
            0 => Some(Scope::All),
            1 => Some(Scope::Requests),
            2 => Some(Scope::Streams),
            3 => Some(Scope::Notifications),
            _ => None,
        }
    }

    /// Whether a pipeline in this scope applies to the given scope.
    pub fn covers(self, other: Scope) -> bool {
        self == Scope::All || self == other
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::All => "All",
            Scope::Requests => "Requests",
            Scope::Streams => "Streams",
            Scope::Notifications => "Notifications",
        };
        f.write_str(name)
    }
}

/// Derived classification of a discovered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerKind {
    Request,
    Stream,
    Notification,
    Pipeline,
    Endpoint,
}

/// One discovered handler. Immutable after discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerRecord {
    pub kind: HandlerKind,
    pub declaring_type: String,
    pub method_name: String,
    pub request_type: TypeRef,
    pub response_type: Option<TypeRef>,
    pub name: Option<String>,
    pub priority: i32,
    pub order: Option<i32>,
    pub scope: Option<Scope>,
    pub route: Option<String>,
    pub location: SourceLocation,
    pub is_static: bool,
    pub accessibility: Accessibility,
}

impl HandlerRecord {
    /// `Declaring.Type.MethodName`, how diagnostics refer to the handler.
    pub fn display_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.method_name)
    }
}

/// Which handler interface a type implements structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceKind {
    Request,
    Notification,
    Stream,
}

impl InterfaceKind {
    pub fn from_interface_name(name: &str) -> Option<Self> {
        match name {
            "IRequestHandler" => Some(InterfaceKind::Request),
            "INotificationHandler" => Some(InterfaceKind::Notification),
            "IStreamHandler" => Some(InterfaceKind::Stream),
            _ => None,
        }
    }
}

/// A structural interface implementation, independent of markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceImplRecord {
    pub implementing_type: String,
    pub interface_kind: InterfaceKind,
    pub request_type: TypeRef,
    pub response_type: Option<TypeRef>,
}

/// The frozen result of discovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerModel {
    pub handlers: Vec<HandlerRecord>,
    pub interface_impls: Vec<InterfaceImplRecord>,
}

impl HandlerModel {
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers_of_kind(&self, kind: HandlerKind) -> impl Iterator<Item = &HandlerRecord> {
        self.handlers.iter().filter(move |h| h.kind == kind)
    }

    pub fn request_handlers(&self) -> impl Iterator<Item = &HandlerRecord> {
        self.handlers
            .iter()
            .filter(|h| matches!(h.kind, HandlerKind::Request | HandlerKind::Stream))
    }

    pub fn notification_handlers(&self) -> impl Iterator<Item = &HandlerRecord> {
        self.handlers_of_kind(HandlerKind::Notification)
    }

    pub fn pipelines(&self) -> impl Iterator<Item = &HandlerRecord> {
        self.handlers_of_kind(HandlerKind::Pipeline)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &HandlerRecord> {
        self.handlers_of_kind(HandlerKind::Endpoint)
    }

    /// Distinct declaring types, in first-seen order.
    pub fn handler_types(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for handler in &self.handlers {
            if !seen.contains(&handler.declaring_type.as_str()) {
                seen.push(handler.declaring_type.as_str());
            }
        }
        seen
    }
}
