//! Type definition engine
//!
//! The engine turns a [`TypeSpec`] into a resolved [`TypeDef`]:
//!
//! 1. Guard the declared parent (finality, parent kind).
//! 2. Merge the own declarations onto the parent's resolved tables.
//! 3. Fold in every implemented interface's requirements, transitively
//!    through extended interfaces.
//! 4. For concrete classes, validate that no member is left pending.
//!
//! Every failure aborts the definition; nothing partially built escapes.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{DefineError, DefineResult};
use crate::member::{
    merge, unimplemented_members, MemberDecl, MemberDescriptor, MemberKind, MemberPayload,
    MemberTable,
};
use crate::spec::TypeSpec;
use crate::typedef::{generate_type_id, interface_closure, TypeDef, TypeInner};
use crate::value::Value;

/// Define a class.
///
/// The class is concrete unless the spec was marked with
/// [`TypeSpec::abstract_class`]; concrete classes must implement every
/// abstract and interface-required member and expose a constructor
/// capability through [`TypeDef::instantiate`].
pub fn define_class(spec: TypeSpec) -> DefineResult<TypeDef> {
    build_class(spec, false)
}

/// Define a class that admits no subclasses.
///
/// Identical to [`define_class`] with the final flag forced on: any
/// later attempt to use the result as a parent fails with
/// [`DefineError::CannotExtendFinal`].
pub fn define_final_class(spec: TypeSpec) -> DefineResult<TypeDef> {
    build_class(spec, true)
}

/// Define an interface.
///
/// Members carry signatures only; a concrete instance or static member
/// in the spec is a definition-time error. Constants are the one
/// exception: an interface may declare immutable static values, and its
/// implementers inherit them. A parent given via [`TypeSpec::extends`]
/// (or any entry of `implements`) must itself be an interface and
/// becomes an extended interface.
pub fn define_interface(mut spec: TypeSpec) -> DefineResult<TypeDef> {
    if let Some(parent) = spec.parent.take() {
        if !parent.is_interface() {
            return Err(DefineError::InterfaceCannotExtendClass {
                interface: spec.name.clone(),
                class: parent.name().to_string(),
            });
        }
        spec.interfaces.push(parent);
    }
    for extended in &spec.interfaces {
        if !extended.is_interface() {
            return Err(DefineError::InterfaceCannotExtendClass {
                interface: spec.name.clone(),
                class: extended.name().to_string(),
            });
        }
    }

    apply_forced_abstracts(&mut spec)?;

    for (name, decl) in &spec.members {
        if !matches!(decl.payload, MemberPayload::Pending) {
            return Err(DefineError::InterfaceMemberMustBeAbstract {
                interface: spec.name.clone(),
                member: name.clone(),
            });
        }
    }
    for (name, decl) in &spec.statics {
        if !matches!(decl.payload, MemberPayload::Pending) && !decl.is_constant {
            return Err(DefineError::InterfaceMemberMustBeAbstract {
                interface: spec.name.clone(),
                member: name.clone(),
            });
        }
    }

    let id = generate_type_id();
    let members = merge(&spec.name, id, None, &spec.members)?;
    let statics = merge(&spec.name, id, None, &spec.statics)?;
    let static_values = RwLock::new(init_static_values(&statics));

    Ok(TypeDef::from_inner(TypeInner {
        id,
        name: spec.name,
        parent: None,
        interfaces: spec.interfaces,
        members,
        statics,
        static_values,
        is_abstract: false,
        is_final: false,
        is_interface: true,
    }))
}

fn build_class(mut spec: TypeSpec, is_final: bool) -> DefineResult<TypeDef> {
    if let Some(parent) = &spec.parent {
        if parent.is_interface() {
            return Err(DefineError::CannotExtendInterface {
                class: spec.name.clone(),
                interface: parent.name().to_string(),
            });
        }
        TypeDef::check_extend(parent)?;
    }
    for iface in &spec.interfaces {
        if !iface.is_interface() {
            return Err(DefineError::ImplementsNonInterface {
                class: spec.name.clone(),
                name: iface.name().to_string(),
            });
        }
    }

    apply_forced_abstracts(&mut spec)?;

    let id = generate_type_id();
    let mut members = merge(
        &spec.name,
        id,
        spec.parent.as_ref().map(|p| p.members()),
        &spec.members,
    )?;
    let mut statics = merge(
        &spec.name,
        id,
        spec.parent.as_ref().map(|p| p.statics()),
        &spec.statics,
    )?;

    let mut origins: FxHashMap<String, String> = FxHashMap::default();
    for iface in interface_closure(&spec.interfaces) {
        fold_interface(&spec.name, &mut members, &mut statics, &iface, &mut origins)?;
    }

    if !spec.is_abstract {
        let missing = unimplemented_members(&members, &statics);
        if !missing.is_empty() {
            return Err(DefineError::IncompleteImplementation {
                class: spec.name,
                missing,
            });
        }
    }

    let static_values = RwLock::new(init_static_values(&statics));
    Ok(TypeDef::from_inner(TypeInner {
        id,
        name: spec.name,
        parent: spec.parent,
        interfaces: spec.interfaces,
        members,
        statics,
        static_values,
        is_abstract: spec.is_abstract,
        is_final,
        is_interface: false,
    }))
}

/// Convert every name listed via `abstracts` into a pending signature.
///
/// A forced name with no matching declaration becomes a pending instance
/// method; a data member cannot be forced abstract.
fn apply_forced_abstracts(spec: &mut TypeSpec) -> DefineResult<()> {
    let names: Vec<String> = spec.force_abstract.drain(..).collect();
    for name in names {
        let decl = if spec.members.contains_key(&name) {
            spec.members.get_mut(&name)
        } else if spec.statics.contains_key(&name) {
            spec.statics.get_mut(&name)
        } else {
            spec.members.insert(
                name,
                MemberDecl {
                    kind: MemberKind::Method,
                    payload: MemberPayload::Pending,
                    is_static: false,
                    is_constant: false,
                },
            );
            continue;
        };
        if let Some(decl) = decl {
            if decl.kind == MemberKind::Field {
                return Err(DefineError::SignatureMismatch {
                    class: spec.name.clone(),
                    member: name,
                    expected: MemberKind::Method,
                    actual: MemberKind::Field,
                });
            }
            decl.payload = MemberPayload::Pending;
        }
    }
    Ok(())
}

/// Fold one interface's requirements into the class tables
fn fold_interface(
    class: &str,
    members: &mut MemberTable,
    statics: &mut MemberTable,
    iface: &TypeDef,
    origins: &mut FxHashMap<String, String>,
) -> DefineResult<()> {
    for (name, req) in iface.members().iter() {
        fold_entry(class, members, name, req, iface.name(), origins)?;
    }
    for (name, req) in iface.statics().iter() {
        fold_entry(class, statics, name, req, iface.name(), origins)?;
    }
    Ok(())
}

/// Fold one required member into a class table.
///
/// An absent name takes the interface's descriptor as a pending entry; a
/// present entry of the same kind satisfies the requirement (or already
/// tracks it). A kind clash is a conflict between two interfaces when the
/// entry was folded in earlier, otherwise a mismatch with the class's own
/// declaration.
fn fold_entry(
    class: &str,
    table: &mut MemberTable,
    name: &str,
    req: &Arc<MemberDescriptor>,
    iface_name: &str,
    origins: &mut FxHashMap<String, String>,
) -> DefineResult<()> {
    let existing_kind = table.get(name).map(|desc| desc.kind);
    match existing_kind {
        None => {
            table.insert(name.to_string(), Arc::clone(req));
            origins.insert(name.to_string(), iface_name.to_string());
            Ok(())
        }
        Some(kind) if kind == req.kind => Ok(()),
        Some(kind) => {
            if let Some(first) = origins.get(name) {
                Err(DefineError::DuplicateInterfaceMethodConflict {
                    member: name.to_string(),
                    first: first.clone(),
                    second: iface_name.to_string(),
                })
            } else {
                Err(DefineError::SignatureMismatch {
                    class: class.to_string(),
                    member: name.to_string(),
                    expected: req.kind,
                    actual: kind,
                })
            }
        }
    }
}

/// Seed the runtime static storage from the resolved static table
fn init_static_values(statics: &MemberTable) -> FxHashMap<String, Value> {
    let mut values = FxHashMap::default();
    for (name, desc) in statics.iter() {
        if let MemberPayload::Value(default) = &desc.payload {
            values.insert(name.clone(), default.clone());
        }
    }
    values
}
