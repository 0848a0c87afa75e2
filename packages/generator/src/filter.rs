//! Syntax Filter
//!
//! First-pass lexical scan over declaration trees. Selects methods that
//! carry a Relay marker attribute and classes whose base list mentions a
//! handler interface. Matching is purely textual; semantic confirmation
//! happens in discovery. The scan is pure and order-preserving, so the
//! expensive semantic model is only ever consulted for plausible nodes.

use crate::model::{InterfaceKind, MarkerKind, MarkerSet};
use relay_host::{Cancelled, CancellationToken, MethodId, ParsedTree};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Cancellation is checked once per this many visited nodes.
const CANCELLATION_STRIDE: usize = 256;

/// A method selected by the lexical scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub tree_index: usize,
    pub class_index: usize,
    pub method_index: usize,
    pub method_id: MethodId,
    pub markers: SmallVec<[MarkerKind; 2]>,
}

impl Candidate {
    pub fn marker_set(&self) -> MarkerSet {
        self.markers
            .iter()
            .fold(MarkerSet::empty(), |set, &kind| set | kind.into())
    }
}

/// A class whose base list mentions a handler interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateClass {
    pub tree_index: usize,
    pub class_index: usize,
    pub interface_kinds: Vec<InterfaceKind>,
}

/// Strip the conventional `Attribute` suffix from an attribute name.
pub(crate) fn short_attribute_name(name: &str) -> &str {
    name.strip_suffix("Attribute").unwrap_or(name)
}

/// The interface portion of a base-list entry, without type arguments.
fn base_interface_name(base: &str) -> &str {
    base.split('<').next().unwrap_or(base).trim()
}

/// Scan one tree for candidate methods. Order-preserving and idempotent;
/// a method carrying several markers yields a single candidate. Checks the
/// cancellation signal on entry and every 256 visited nodes.
pub fn scan_tree(
    tree: &ParsedTree,
    tree_index: usize,
    token: &CancellationToken,
) -> Result<Vec<Candidate>, Cancelled> {
    token.checkpoint()?;
    let mut candidates = Vec::new();
    let mut seen: HashSet<MethodId> = HashSet::new();
    let mut visited = 0usize;

    for (class_index, class) in tree.classes.iter().enumerate() {
        visit(&mut visited, token)?;
        for (method_index, method) in class.methods.iter().enumerate() {
            visit(&mut visited, token)?;
            let mut markers: SmallVec<[MarkerKind; 2]> = SmallVec::new();
            for attribute in &method.attributes {
                visit(&mut visited, token)?;
                let short = short_attribute_name(&attribute.name);
                if let Some(kind) = MarkerKind::from_attribute_name(short) {
                    if !markers.contains(&kind) {
                        markers.push(kind);
                    }
                }
            }
            if !markers.is_empty() && seen.insert(method.id) {
                candidates.push(Candidate {
                    tree_index,
                    class_index,
                    method_index,
                    method_id: method.id,
                    markers,
                });
            }
        }
    }
    Ok(candidates)
}

/// Scan one tree for classes that declare a handler interface in their
/// base list (suffix match on the interface name).
pub fn scan_classes(
    tree: &ParsedTree,
    tree_index: usize,
    token: &CancellationToken,
) -> Result<Vec<CandidateClass>, Cancelled> {
    token.checkpoint()?;
    let mut classes = Vec::new();
    let mut visited = 0usize;

    for (class_index, class) in tree.classes.iter().enumerate() {
        visit(&mut visited, token)?;
        let mut kinds = Vec::new();
        for base in &class.base_list {
            visit(&mut visited, token)?;
            let name = base_interface_name(base);
            for interface in ["IRequestHandler", "INotificationHandler", "IStreamHandler"] {
                if name.ends_with(interface) {
                    if let Some(kind) = InterfaceKind::from_interface_name(interface) {
                        if !kinds.contains(&kind) {
                            kinds.push(kind);
                        }
                    }
                }
            }
        }
        if !kinds.is_empty() {
            classes.push(CandidateClass {
                tree_index,
                class_index,
                interface_kinds: kinds,
            });
        }
    }
    Ok(classes)
}

fn visit(visited: &mut usize, token: &CancellationToken) -> Result<(), Cancelled> {
    *visited += 1;
    if *visited % CANCELLATION_STRIDE == 0 {
        token.checkpoint()?;
    }
    Ok(())
}
