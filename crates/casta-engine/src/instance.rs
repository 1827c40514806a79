//! Instances and scope-checked member access
//!
//! Every member touch goes through an access check at the access site:
//! the external API ([`Instance::get`], [`Instance::set`],
//! [`Instance::call`]) runs with no class scope and reaches public
//! members only, while method bodies receive a [`CallContext`] whose
//! scope is the class that declared the running method. Private members
//! resolve against the declaring class's own table and storage slots, so
//! a parent's private member stays bound to parent code even when a
//! subclass redeclares the name.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{RuntimeError, RuntimeResult};
use crate::member::{MemberDescriptor, MemberPayload, MemberTable};
use crate::typedef::{scope_label, TypeDef, TypeId};
use crate::value::Value;
use crate::visibility::Visibility;

/// Storage key for one instance field slot.
///
/// Public and protected fields share one virtual slot per name; private
/// fields get a slot per declaring type, keyed by its ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FieldKey {
    owner: Option<TypeId>,
    name: String,
}

impl FieldKey {
    fn shared(name: &str) -> FieldKey {
        FieldKey {
            owner: None,
            name: name.to_string(),
        }
    }

    fn private(owner: TypeId, name: &str) -> FieldKey {
        FieldKey {
            owner: Some(owner),
            name: name.to_string(),
        }
    }
}

/// An object created from a concrete class
pub struct Instance {
    type_def: TypeDef,
    fields: FxHashMap<FieldKey, Value>,
}

impl Instance {
    /// Allocate an instance with every field slot set to its default.
    ///
    /// Only called by `TypeDef::instantiate`, which has already rejected
    /// abstract classes and interfaces.
    pub(crate) fn new(type_def: TypeDef) -> Instance {
        let mut fields = FxHashMap::default();

        for (name, desc) in type_def.members().iter() {
            if let MemberPayload::Value(default) = &desc.payload {
                if desc.visibility != Visibility::Private {
                    fields.insert(FieldKey::shared(name), default.clone());
                }
            }
        }

        // Private fields are not inherited, so each type on the chain
        // contributes exactly its own.
        let mut cur = Some(type_def.clone());
        while let Some(ty) = cur {
            for (name, desc) in ty.members().iter() {
                if desc.visibility == Visibility::Private {
                    if let MemberPayload::Value(default) = &desc.payload {
                        fields.insert(FieldKey::private(ty.id(), name), default.clone());
                    }
                }
            }
            cur = ty.parent().cloned();
        }

        Instance { type_def, fields }
    }

    /// The most-derived type this instance was created from
    pub fn type_def(&self) -> &TypeDef {
        &self.type_def
    }

    /// Name of the most-derived type
    pub fn class_name(&self) -> &str {
        self.type_def.name()
    }

    /// Read a public member from outside any class scope
    pub fn get(&self, name: &str) -> RuntimeResult<Value> {
        self.read(name, None)
    }

    /// Write a public field from outside any class scope
    pub fn set(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        self.write(name, value, None)
    }

    /// Call a public method from outside any class scope
    pub fn call(&mut self, name: &str, args: &[Value]) -> RuntimeResult<Value> {
        self.invoke(name, args, None)
    }

    /// Scope-checked field read
    pub(crate) fn read(&self, name: &str, scope: Option<&TypeDef>) -> RuntimeResult<Value> {
        let (desc, key) = self.resolve(name, scope)?;
        match &desc.payload {
            MemberPayload::Value(default) => {
                Ok(self.fields.get(&key).cloned().unwrap_or_else(|| default.clone()))
            }
            MemberPayload::Body(_) => Err(RuntimeError::NotAField {
                class: self.type_def.name().to_string(),
                member: name.to_string(),
            }),
            MemberPayload::Pending => Err(RuntimeError::UnknownMember {
                class: self.type_def.name().to_string(),
                member: name.to_string(),
            }),
        }
    }

    /// Scope-checked field write
    pub(crate) fn write(
        &mut self,
        name: &str,
        value: Value,
        scope: Option<&TypeDef>,
    ) -> RuntimeResult<()> {
        let (desc, key) = self.resolve(name, scope)?;
        if !matches!(desc.payload, MemberPayload::Value(_)) || desc.is_constant {
            return Err(RuntimeError::NotAssignable {
                class: self.type_def.name().to_string(),
                member: name.to_string(),
            });
        }
        self.fields.insert(key, value);
        Ok(())
    }

    /// Scope-checked method call
    pub(crate) fn invoke(
        &mut self,
        name: &str,
        args: &[Value],
        scope: Option<&TypeDef>,
    ) -> RuntimeResult<Value> {
        let (desc, _) = self.resolve(name, scope)?;
        let body = match &desc.payload {
            MemberPayload::Body(body) => Arc::clone(body),
            MemberPayload::Value(_) => {
                return Err(RuntimeError::NotCallable {
                    class: self.type_def.name().to_string(),
                    member: name.to_string(),
                })
            }
            MemberPayload::Pending => {
                return Err(RuntimeError::UnknownMember {
                    class: self.type_def.name().to_string(),
                    member: name.to_string(),
                })
            }
        };

        // The running method's scope is the class that declared it.
        let declaring = self
            .type_def
            .find_in_chain(desc.declared_by)
            .unwrap_or_else(|| self.type_def.clone());
        let target = self.type_def.clone();
        let mut ctx = CallContext {
            instance: Some(self),
            target,
            scope: declaring,
        };
        (*body)(&mut ctx, args)
    }

    /// Resolve a member name to its descriptor and storage slot under the
    /// given access scope.
    fn resolve(
        &self,
        name: &str,
        scope: Option<&TypeDef>,
    ) -> RuntimeResult<(Arc<MemberDescriptor>, FieldKey)> {
        match Visibility::classify(name) {
            Visibility::Private => {
                let scope_ty = scope.ok_or_else(|| RuntimeError::AccessViolation {
                    class: self.type_def.name().to_string(),
                    member: name.to_string(),
                    visibility: Visibility::Private,
                    scope: scope_label(scope),
                })?;
                let desc = lookup(scope_ty.members(), scope_ty.name(), name)?;
                Ok((desc, FieldKey::private(scope_ty.id(), name)))
            }
            Visibility::Protected => {
                let desc = lookup(self.type_def.members(), self.type_def.name(), name)?;
                let related = scope
                    .is_some_and(|s| s.is_kind_of(&self.type_def) || self.type_def.is_kind_of(s));
                if !related {
                    return Err(RuntimeError::AccessViolation {
                        class: self.type_def.name().to_string(),
                        member: name.to_string(),
                        visibility: Visibility::Protected,
                        scope: scope_label(scope),
                    });
                }
                Ok((desc, FieldKey::shared(name)))
            }
            Visibility::Public => {
                let desc = lookup(self.type_def.members(), self.type_def.name(), name)?;
                Ok((desc, FieldKey::shared(name)))
            }
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.type_def.name())
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// Table lookup with an `UnknownMember` error on miss
fn lookup(table: &MemberTable, class: &str, name: &str) -> RuntimeResult<Arc<MemberDescriptor>> {
    table
        .get(name)
        .map(Arc::clone)
        .ok_or_else(|| RuntimeError::UnknownMember {
            class: class.to_string(),
            member: name.to_string(),
        })
}

/// Execution context handed to every method body.
///
/// Carries the receiver (absent in static calls), the type the call was
/// dispatched through, and the class that declared the running method —
/// the visibility scope all member accesses are checked against.
pub struct CallContext<'a> {
    instance: Option<&'a mut Instance>,
    target: TypeDef,
    scope: TypeDef,
}

impl<'a> CallContext<'a> {
    /// Context for a static method call (no receiver)
    pub(crate) fn for_static(target: TypeDef, scope: TypeDef) -> CallContext<'a> {
        CallContext {
            instance: None,
            target,
            scope,
        }
    }

    /// The type the call was dispatched through: the receiver's
    /// most-derived type, or the target of a static call
    pub fn type_def(&self) -> &TypeDef {
        &self.target
    }

    /// The class that declared the running method
    pub fn scope(&self) -> &TypeDef {
        &self.scope
    }

    /// Read an instance member visible to the running method's scope
    pub fn get(&self, name: &str) -> RuntimeResult<Value> {
        let instance = self.receiver(name)?;
        instance.read(name, Some(&self.scope))
    }

    /// Write an instance field visible to the running method's scope
    pub fn set(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        let scope = self.scope.clone();
        let instance = self.receiver_mut(name)?;
        instance.write(name, value, Some(&scope))
    }

    /// Call a sibling method through the receiver's most-derived table
    pub fn call(&mut self, name: &str, args: &[Value]) -> RuntimeResult<Value> {
        let scope = self.scope.clone();
        let instance = self.receiver_mut(name)?;
        instance.invoke(name, args, Some(&scope))
    }

    /// Read a static member of the dispatch target
    pub fn static_get(&self, name: &str) -> RuntimeResult<Value> {
        self.target.static_read(name, Some(&self.scope))
    }

    /// Write a static member of the dispatch target
    pub fn static_set(&self, name: &str, value: Value) -> RuntimeResult<()> {
        self.target.static_write(name, value, Some(&self.scope))
    }

    /// Call a static method of the dispatch target
    pub fn static_call(&self, name: &str, args: &[Value]) -> RuntimeResult<Value> {
        self.target.static_invoke(name, args, Some(&self.scope))
    }

    fn receiver(&self, member: &str) -> RuntimeResult<&Instance> {
        self.instance
            .as_deref()
            .ok_or_else(|| RuntimeError::MissingReceiver {
                member: member.to_string(),
            })
    }

    fn receiver_mut(&mut self, member: &str) -> RuntimeResult<&mut Instance> {
        self.instance
            .as_deref_mut()
            .ok_or_else(|| RuntimeError::MissingReceiver {
                member: member.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::define_class;
    use crate::spec::TypeSpec;

    #[test]
    fn test_field_defaults_and_writes() {
        let point = define_class(
            TypeSpec::new("Point")
                .field("x", Value::int(0))
                .field("y", Value::int(0)),
        )
        .unwrap();
        let mut p = point.instantiate(&[]).unwrap();

        assert_eq!(p.get("x").unwrap(), Value::int(0));
        p.set("x", Value::int(9)).unwrap();
        assert_eq!(p.get("x").unwrap(), Value::int(9));
        assert_eq!(p.get("y").unwrap(), Value::int(0));
    }

    #[test]
    fn test_unknown_member() {
        let empty = define_class(TypeSpec::new("Empty")).unwrap();
        let obj = empty.instantiate(&[]).unwrap();
        assert_eq!(
            obj.get("nope").unwrap_err(),
            RuntimeError::UnknownMember {
                class: "Empty".to_string(),
                member: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_method_is_not_a_field() {
        let greeter = define_class(TypeSpec::new("Greeter").method(
            "greet",
            |_ctx: &mut CallContext<'_>, _args: &[Value]| Ok(Value::str("hi")),
        ))
        .unwrap();
        let mut g = greeter.instantiate(&[]).unwrap();

        assert_eq!(g.call("greet", &[]).unwrap(), Value::str("hi"));
        assert!(matches!(g.get("greet"), Err(RuntimeError::NotAField { .. })));
        assert!(matches!(
            g.set("greet", Value::Null),
            Err(RuntimeError::NotAssignable { .. })
        ));
    }

    #[test]
    fn test_field_is_not_callable() {
        let point = define_class(TypeSpec::new("Point").field("x", Value::int(0))).unwrap();
        let mut p = point.instantiate(&[]).unwrap();
        assert!(matches!(
            p.call("x", &[]),
            Err(RuntimeError::NotCallable { .. })
        ));
    }
}
