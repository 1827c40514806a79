//! Declarative type specifications
//!
//! [`TypeSpec`] is the configuration surface consumed by the definition
//! entry points. A specification names the parent type, the implemented
//! interfaces, the members (instance and static, concrete and abstract),
//! and the flags; the engine turns it into a resolved [`TypeDef`].
//! Declaring the same member name twice keeps the last declaration.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::RuntimeResult;
use crate::instance::CallContext;
use crate::member::{MemberDecl, MemberKind, MemberPayload};
use crate::typedef::TypeDef;
use crate::value::Value;

/// Declarative description of a class or interface
#[derive(Debug)]
pub struct TypeSpec {
    pub(crate) name: String,
    pub(crate) parent: Option<TypeDef>,
    pub(crate) interfaces: Vec<TypeDef>,
    pub(crate) members: FxHashMap<String, MemberDecl>,
    pub(crate) statics: FxHashMap<String, MemberDecl>,
    pub(crate) force_abstract: Vec<String>,
    pub(crate) is_abstract: bool,
}

impl TypeSpec {
    /// Start a specification for a type with the given name
    pub fn new(name: impl Into<String>) -> TypeSpec {
        TypeSpec {
            name: name.into(),
            parent: None,
            interfaces: Vec::new(),
            members: FxHashMap::default(),
            statics: FxHashMap::default(),
            force_abstract: Vec::new(),
            is_abstract: false,
        }
    }

    /// Declare the parent type.
    ///
    /// For a class this is the superclass; for an interface it is an
    /// extended interface.
    pub fn extends(mut self, parent: &TypeDef) -> TypeSpec {
        self.parent = Some(parent.clone());
        self
    }

    /// Declare an implemented interface (repeatable)
    pub fn implements(mut self, interface: &TypeDef) -> TypeSpec {
        self.interfaces.push(interface.clone());
        self
    }

    /// Declare a data member with a default value
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> TypeSpec {
        self.members.insert(
            name.into(),
            MemberDecl {
                kind: MemberKind::Field,
                payload: MemberPayload::Value(value.into()),
                is_static: false,
                is_constant: false,
            },
        );
        self
    }

    /// Declare a method with an implementation
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> TypeSpec
    where
        F: Fn(&mut CallContext<'_>, &[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        self.members.insert(
            name.into(),
            MemberDecl {
                kind: MemberKind::Method,
                payload: MemberPayload::Body(Arc::new(body)),
                is_static: false,
                is_constant: false,
            },
        );
        self
    }

    /// Declare a method signature without an implementation
    pub fn abstract_method(mut self, name: impl Into<String>) -> TypeSpec {
        self.members.insert(
            name.into(),
            MemberDecl {
                kind: MemberKind::Method,
                payload: MemberPayload::Pending,
                is_static: false,
                is_constant: false,
            },
        );
        self
    }

    /// Declare a static data member with a default value
    pub fn static_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> TypeSpec {
        self.statics.insert(
            name.into(),
            MemberDecl {
                kind: MemberKind::Field,
                payload: MemberPayload::Value(value.into()),
                is_static: true,
                is_constant: false,
            },
        );
        self
    }

    /// Declare a static method with an implementation
    pub fn static_method<F>(mut self, name: impl Into<String>, body: F) -> TypeSpec
    where
        F: Fn(&mut CallContext<'_>, &[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        self.statics.insert(
            name.into(),
            MemberDecl {
                kind: MemberKind::Method,
                payload: MemberPayload::Body(Arc::new(body)),
                is_static: true,
                is_constant: false,
            },
        );
        self
    }

    /// Declare a static method signature without an implementation
    pub fn static_abstract_method(mut self, name: impl Into<String>) -> TypeSpec {
        self.statics.insert(
            name.into(),
            MemberDecl {
                kind: MemberKind::Method,
                payload: MemberPayload::Pending,
                is_static: true,
                is_constant: false,
            },
        );
        self
    }

    /// Declare an immutable static constant.
    ///
    /// Constants are the one concrete member category an interface may
    /// carry; on classes they behave as write-protected statics.
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> TypeSpec {
        self.statics.insert(
            name.into(),
            MemberDecl {
                kind: MemberKind::Field,
                payload: MemberPayload::Value(value.into()),
                is_static: true,
                is_constant: true,
            },
        );
        self
    }

    /// Force the named members abstract, discarding any supplied bodies.
    ///
    /// Names with no matching declaration become pending method
    /// signatures.
    pub fn abstracts<I, S>(mut self, names: I) -> TypeSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.force_abstract.extend(names.into_iter().map(Into::into));
        self
    }

    /// Mark the class abstract: it may keep unimplemented members and
    /// cannot be instantiated
    pub fn abstract_class(mut self) -> TypeSpec {
        self.is_abstract = true;
        self
    }
}
