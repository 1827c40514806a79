//! Member descriptors and table merging
//!
//! The member table builder merges a type's own declarations with its
//! parent's resolved table, applying the visibility and override rules:
//! private members are never inherited, kind changes on override are
//! rejected, and a concrete method resolves an inherited abstract or
//! interface-declared signature. Resolved descriptors are immutable and
//! shared by reference between parent and child tables.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{DefineError, RuntimeResult};
use crate::instance::CallContext;
use crate::typedef::TypeId;
use crate::value::Value;
use crate::visibility::Visibility;

/// Callable member implementation
pub type MethodBody = Arc<dyn Fn(&mut CallContext<'_>, &[Value]) -> RuntimeResult<Value> + Send + Sync>;

/// Kind of a member: data field or callable method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Data member holding a value
    Field,
    /// Callable member
    Method,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberKind::Field => "field",
            MemberKind::Method => "method",
        };
        f.write_str(s)
    }
}

/// Payload of a member descriptor
#[derive(Clone)]
pub enum MemberPayload {
    /// Default value of a data member
    Value(Value),
    /// Implemented method body
    Body(MethodBody),
    /// Abstract or interface signature awaiting an implementation
    Pending,
}

impl fmt::Debug for MemberPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberPayload::Value(v) => f.debug_tuple("Value").field(v).finish(),
            MemberPayload::Body(_) => f.write_str("Body(<fn>)"),
            MemberPayload::Pending => f.write_str("Pending"),
        }
    }
}

/// Immutable metadata and payload for one resolved member
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    /// Member kind
    pub kind: MemberKind,
    /// Value, body, or pending signature
    pub payload: MemberPayload,
    /// Visibility derived from the member name
    pub visibility: Visibility,
    /// Still awaiting a concrete implementation
    pub is_abstract: bool,
    /// Static (class-level) member
    pub is_static: bool,
    /// Immutable static (class or interface constant)
    pub is_constant: bool,
    /// Id of the type that declared this descriptor
    pub declared_by: TypeId,
}

/// One declared, not yet resolved, member of a type specification
#[derive(Debug, Clone)]
pub struct MemberDecl {
    /// Member kind
    pub kind: MemberKind,
    /// Value, body, or pending signature
    pub payload: MemberPayload,
    /// Static (class-level) member
    pub is_static: bool,
    /// Immutable static
    pub is_constant: bool,
}

/// Name-keyed table of resolved member descriptors
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    entries: FxHashMap<String, Arc<MemberDescriptor>>,
}

impl MemberTable {
    /// Create an empty table
    pub fn new() -> MemberTable {
        MemberTable::default()
    }

    /// Look up a descriptor by member name
    pub fn get(&self, name: &str) -> Option<&Arc<MemberDescriptor>> {
        self.entries.get(name)
    }

    /// Check if a member exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert or replace a descriptor
    pub(crate) fn insert(&mut self, name: String, desc: Arc<MemberDescriptor>) {
        self.entries.insert(name, desc);
    }

    /// Iterate over every (name, descriptor) entry
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<MemberDescriptor>)> {
        self.entries.iter()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no members
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seed a child table from this one.
    ///
    /// Every non-private descriptor is carried over by reference; private
    /// members stay bound to the declaring type's own table.
    pub(crate) fn inherit(&self) -> MemberTable {
        let entries = self
            .entries
            .iter()
            .filter(|(_, desc)| desc.visibility != Visibility::Private)
            .map(|(name, desc)| (name.clone(), Arc::clone(desc)))
            .collect();
        MemberTable { entries }
    }
}

/// Merge a type's own declarations onto its parent's resolved table.
///
/// The parent table is seeded via [`MemberTable::inherit`], then each own
/// declaration either introduces a new member or overrides an inherited
/// one. An override must keep the inherited member's kind; a concrete
/// declaration resolves an inherited pending signature.
pub(crate) fn merge(
    class: &str,
    class_id: TypeId,
    parent: Option<&MemberTable>,
    decls: &FxHashMap<String, MemberDecl>,
) -> Result<MemberTable, DefineError> {
    let mut table = parent.map(MemberTable::inherit).unwrap_or_default();

    for (name, decl) in decls {
        if let Some(inherited) = table.get(name) {
            if inherited.kind != decl.kind {
                return Err(DefineError::SignatureMismatch {
                    class: class.to_string(),
                    member: name.clone(),
                    expected: inherited.kind,
                    actual: decl.kind,
                });
            }
        }
        let desc = MemberDescriptor {
            kind: decl.kind,
            is_abstract: matches!(decl.payload, MemberPayload::Pending),
            payload: decl.payload.clone(),
            visibility: Visibility::classify(name),
            is_static: decl.is_static,
            is_constant: decl.is_constant,
            declared_by: class_id,
        };
        table.insert(name.clone(), Arc::new(desc));
    }

    Ok(table)
}

/// Contract validator: collect every member still awaiting an implementation.
///
/// Returns the sorted, deduplicated names so the caller can report all
/// violations at once.
pub(crate) fn unimplemented_members(members: &MemberTable, statics: &MemberTable) -> Vec<String> {
    let mut missing: Vec<String> = members
        .iter()
        .chain(statics.iter())
        .filter(|(_, desc)| desc.is_abstract)
        .map(|(name, _)| name.clone())
        .collect();
    missing.sort();
    missing.dedup();
    missing
}
