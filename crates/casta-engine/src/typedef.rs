//! Resolved type definitions
//!
//! A [`TypeDef`] is the immutable runtime representation of a defined
//! class or interface: its resolved member tables, inheritance metadata,
//! and flags. Definitions are built once by the engine and never mutated
//! afterwards; the handle is a cheap clone over shared storage, so
//! definitions can be passed around and queried concurrently. The only
//! runtime state is the static-member value cell.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{DefineError, RuntimeError, RuntimeResult};
use crate::instance::{CallContext, Instance};
use crate::member::{MemberDescriptor, MemberKind, MemberPayload, MemberTable};
use crate::value::Value;
use crate::visibility::Visibility;

/// Unique identifier of a type definition
pub type TypeId = u64;

/// Global counter for generating unique type IDs
static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique type ID
pub(crate) fn generate_type_id() -> TypeId {
    NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Constructor member names probed at instantiation, most visible first
const CONSTRUCTOR_NAMES: [&str; 3] = ["initialize", "_initialize", "__initialize"];

/// Resolved, immutable runtime representation of a class or interface.
///
/// Cloning the handle shares the definition; identity (and type-query
/// equality) is the [`TypeId`], never structural.
#[derive(Clone)]
pub struct TypeDef {
    inner: Arc<TypeInner>,
}

/// Shared storage behind a [`TypeDef`] handle
pub(crate) struct TypeInner {
    /// Unique type ID; identity for type queries
    pub(crate) id: TypeId,
    /// Type name
    pub(crate) name: String,
    /// Parent class
    pub(crate) parent: Option<TypeDef>,
    /// Implemented interfaces; for an interface, the interfaces it extends
    pub(crate) interfaces: Vec<TypeDef>,
    /// Resolved instance member table
    pub(crate) members: MemberTable,
    /// Resolved static member table
    pub(crate) statics: MemberTable,
    /// Runtime storage for static data members
    pub(crate) static_values: RwLock<FxHashMap<String, Value>>,
    /// Abstract class flag
    pub(crate) is_abstract: bool,
    /// Final flag: no further subclassing
    pub(crate) is_final: bool,
    /// Interface flag
    pub(crate) is_interface: bool,
}

impl TypeDef {
    /// Wrap freshly built storage into a handle
    pub(crate) fn from_inner(inner: TypeInner) -> TypeDef {
        TypeDef {
            inner: Arc::new(inner),
        }
    }

    /// Unique type ID
    pub fn id(&self) -> TypeId {
        self.inner.id
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Parent class, if any
    pub fn parent(&self) -> Option<&TypeDef> {
        self.inner.parent.as_ref()
    }

    /// Directly implemented (or, for an interface, extended) interfaces
    pub fn interfaces(&self) -> &[TypeDef] {
        &self.inner.interfaces
    }

    /// Resolved instance member table
    pub fn members(&self) -> &MemberTable {
        &self.inner.members
    }

    /// Resolved static member table
    pub fn statics(&self) -> &MemberTable {
        &self.inner.statics
    }

    /// Check the abstract flag
    pub fn is_abstract(&self) -> bool {
        self.inner.is_abstract
    }

    /// Check the final flag
    pub fn is_final(&self) -> bool {
        self.inner.is_final
    }

    /// Check the interface flag
    pub fn is_interface(&self) -> bool {
        self.inner.is_interface
    }

    /// Finality guard: error if `parent` does not admit subclasses.
    ///
    /// Pure metadata check, consulted by the engine before any table work.
    pub fn check_extend(parent: &TypeDef) -> Result<(), DefineError> {
        if parent.is_final() {
            return Err(DefineError::CannotExtendFinal {
                parent: parent.name().to_string(),
            });
        }
        Ok(())
    }

    /// Walk the parent chain looking for a type by ID
    pub(crate) fn find_in_chain(&self, id: TypeId) -> Option<TypeDef> {
        let mut cur = Some(self);
        while let Some(t) = cur {
            if t.inner.id == id {
                return Some(t.clone());
            }
            cur = t.inner.parent.as_ref();
        }
        None
    }

    /// Check whether this type is the candidate, derives from it, or
    /// implements it.
    ///
    /// The parent chain (self included) is walked first by identity; the
    /// interface closure of every type on the chain is walked second,
    /// transitively through extended interfaces.
    pub fn is_kind_of(&self, candidate: &TypeDef) -> bool {
        let mut cur = Some(self);
        while let Some(t) = cur {
            if t.inner.id == candidate.inner.id {
                return true;
            }
            cur = t.inner.parent.as_ref();
        }

        let mut cur = Some(self);
        while let Some(t) = cur {
            if interface_closure(&t.inner.interfaces)
                .iter()
                .any(|i| i.inner.id == candidate.inner.id)
            {
                return true;
            }
            cur = t.inner.parent.as_ref();
        }
        false
    }

    /// Create an instance of this type.
    ///
    /// Only concrete classes are constructible. If the resolved table
    /// declares a constructor (`initialize`, `_initialize`, or
    /// `__initialize`), it is invoked with `args` before the instance is
    /// returned.
    pub fn instantiate(&self, args: &[Value]) -> RuntimeResult<Instance> {
        if self.is_interface() {
            return Err(RuntimeError::CannotInstantiate {
                kind: "interface",
                name: self.name().to_string(),
            });
        }
        if self.is_abstract() {
            return Err(RuntimeError::CannotInstantiate {
                kind: "abstract class",
                name: self.name().to_string(),
            });
        }

        let mut instance = Instance::new(self.clone());
        if let Some(ctor) = self.constructor_name() {
            instance.invoke(ctor, args, Some(self))?;
        }
        Ok(instance)
    }

    /// Find the declared constructor member, if any
    fn constructor_name(&self) -> Option<&'static str> {
        CONSTRUCTOR_NAMES.into_iter().find(|name| {
            self.inner
                .members
                .get(name)
                .is_some_and(|desc| desc.kind == MemberKind::Method && !desc.is_abstract)
        })
    }

    /// Read a public static member from outside any class scope
    pub fn static_get(&self, name: &str) -> RuntimeResult<Value> {
        self.static_read(name, None)
    }

    /// Write a public static member from outside any class scope
    pub fn static_set(&self, name: &str, value: Value) -> RuntimeResult<()> {
        self.static_write(name, value, None)
    }

    /// Call a public static method from outside any class scope
    pub fn static_call(&self, name: &str, args: &[Value]) -> RuntimeResult<Value> {
        self.static_invoke(name, args, None)
    }

    /// Scope-checked static read
    pub(crate) fn static_read(&self, name: &str, scope: Option<&TypeDef>) -> RuntimeResult<Value> {
        let (desc, storage) = self.resolve_static(name, scope)?;
        match &desc.payload {
            MemberPayload::Value(default) => {
                let values = storage.inner.static_values.read();
                Ok(values.get(name).cloned().unwrap_or_else(|| default.clone()))
            }
            MemberPayload::Body(_) => Err(RuntimeError::NotAField {
                class: storage.name().to_string(),
                member: name.to_string(),
            }),
            MemberPayload::Pending => Err(RuntimeError::UnknownMember {
                class: storage.name().to_string(),
                member: name.to_string(),
            }),
        }
    }

    /// Scope-checked static write
    pub(crate) fn static_write(
        &self,
        name: &str,
        value: Value,
        scope: Option<&TypeDef>,
    ) -> RuntimeResult<()> {
        let (desc, storage) = self.resolve_static(name, scope)?;
        if desc.kind != MemberKind::Field || desc.is_constant {
            return Err(RuntimeError::NotAssignable {
                class: storage.name().to_string(),
                member: name.to_string(),
            });
        }
        storage
            .inner
            .static_values
            .write()
            .insert(name.to_string(), value);
        Ok(())
    }

    /// Scope-checked static call
    pub(crate) fn static_invoke(
        &self,
        name: &str,
        args: &[Value],
        scope: Option<&TypeDef>,
    ) -> RuntimeResult<Value> {
        let (desc, storage) = self.resolve_static(name, scope)?;
        let body = match &desc.payload {
            MemberPayload::Body(body) => Arc::clone(body),
            MemberPayload::Value(_) => {
                return Err(RuntimeError::NotCallable {
                    class: storage.name().to_string(),
                    member: name.to_string(),
                })
            }
            MemberPayload::Pending => {
                return Err(RuntimeError::UnknownMember {
                    class: storage.name().to_string(),
                    member: name.to_string(),
                })
            }
        };
        let declaring = self
            .find_in_chain(desc.declared_by)
            .unwrap_or_else(|| self.clone());
        let mut ctx = CallContext::for_static(self.clone(), declaring);
        (*body)(&mut ctx, args)
    }

    /// Resolve a static member to its descriptor and the type whose
    /// storage backs it.
    ///
    /// Private members resolve against the accessing scope's own table;
    /// everything else resolves virtually through this type's merged
    /// table.
    fn resolve_static<'a>(
        &'a self,
        name: &str,
        scope: Option<&'a TypeDef>,
    ) -> RuntimeResult<(Arc<MemberDescriptor>, &'a TypeDef)> {
        match Visibility::classify(name) {
            Visibility::Private => {
                let scope_ty = scope.ok_or_else(|| RuntimeError::AccessViolation {
                    class: self.name().to_string(),
                    member: name.to_string(),
                    visibility: Visibility::Private,
                    scope: scope_label(scope),
                })?;
                let desc =
                    scope_ty
                        .statics()
                        .get(name)
                        .ok_or_else(|| RuntimeError::UnknownMember {
                            class: scope_ty.name().to_string(),
                            member: name.to_string(),
                        })?;
                Ok((Arc::clone(desc), scope_ty))
            }
            Visibility::Protected => {
                let desc = self
                    .statics()
                    .get(name)
                    .ok_or_else(|| RuntimeError::UnknownMember {
                        class: self.name().to_string(),
                        member: name.to_string(),
                    })?;
                let related = scope.is_some_and(|s| s.is_kind_of(self) || self.is_kind_of(s));
                if !related {
                    return Err(RuntimeError::AccessViolation {
                        class: self.name().to_string(),
                        member: name.to_string(),
                        visibility: Visibility::Protected,
                        scope: scope_label(scope),
                    });
                }
                Ok((Arc::clone(desc), self))
            }
            Visibility::Public => {
                let desc = self
                    .statics()
                    .get(name)
                    .ok_or_else(|| RuntimeError::UnknownMember {
                        class: self.name().to_string(),
                        member: name.to_string(),
                    })?;
                Ok((Arc::clone(desc), self))
            }
        }
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("parent", &self.inner.parent.as_ref().map(|p| p.name()))
            .field("is_abstract", &self.inner.is_abstract)
            .field("is_final", &self.inner.is_final)
            .field("is_interface", &self.inner.is_interface)
            .finish()
    }
}

/// Collect the transitive closure of an interface list.
///
/// Breadth-first over extended interfaces, deduplicated by type ID.
pub(crate) fn interface_closure(interfaces: &[TypeDef]) -> Vec<TypeDef> {
    let mut queue: VecDeque<TypeDef> = interfaces.iter().cloned().collect();
    let mut seen: FxHashSet<TypeId> = FxHashSet::default();
    let mut closure = Vec::new();

    while let Some(iface) = queue.pop_front() {
        if seen.insert(iface.id()) {
            queue.extend(iface.interfaces().iter().cloned());
            closure.push(iface);
        }
    }
    closure
}

/// Describe an accessing scope for error messages
pub(crate) fn scope_label(scope: Option<&TypeDef>) -> String {
    match scope {
        Some(ty) => format!("class '{}'", ty.name()),
        None => "outside the class".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{define_class, define_final_class, define_interface};
    use crate::spec::TypeSpec;

    #[test]
    fn test_check_extend_rejects_final() {
        let sealed = define_final_class(TypeSpec::new("Sealed")).unwrap();
        let err = TypeDef::check_extend(&sealed).unwrap_err();
        assert_eq!(
            err,
            DefineError::CannotExtendFinal {
                parent: "Sealed".to_string()
            }
        );
    }

    #[test]
    fn test_is_kind_of_chain_and_self() {
        let base = define_class(TypeSpec::new("Base")).unwrap();
        let mid = define_class(TypeSpec::new("Mid").extends(&base)).unwrap();
        let leaf = define_class(TypeSpec::new("Leaf").extends(&mid)).unwrap();

        assert!(leaf.is_kind_of(&leaf));
        assert!(leaf.is_kind_of(&mid));
        assert!(leaf.is_kind_of(&base));
        assert!(!base.is_kind_of(&leaf));
    }

    #[test]
    fn test_interface_closure_is_transitive() {
        let a = define_interface(TypeSpec::new("A").abstract_method("a")).unwrap();
        let b = define_interface(TypeSpec::new("B").extends(&a).abstract_method("b")).unwrap();
        let closure = interface_closure(std::slice::from_ref(&b));
        let ids: Vec<TypeId> = closure.iter().map(|i| i.id()).collect();
        assert!(ids.contains(&a.id()));
        assert!(ids.contains(&b.id()));
    }

    #[test]
    fn test_definitions_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypeDef>();
        assert_send_sync::<crate::instance::Instance>();
        assert_send_sync::<crate::value::Value>();
    }

    #[test]
    fn test_instantiate_rejects_abstract_and_interface() {
        let shape = define_interface(TypeSpec::new("Shape").abstract_method("area")).unwrap();
        assert_eq!(
            shape.instantiate(&[]).unwrap_err(),
            RuntimeError::CannotInstantiate {
                kind: "interface",
                name: "Shape".to_string()
            }
        );

        let base =
            define_class(TypeSpec::new("Base").abstract_method("run").abstract_class()).unwrap();
        assert_eq!(
            base.instantiate(&[]).unwrap_err(),
            RuntimeError::CannotInstantiate {
                kind: "abstract class",
                name: "Base".to_string()
            }
        );
    }
}
