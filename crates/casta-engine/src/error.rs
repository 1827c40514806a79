//! Error types for type definition and member access
//!
//! Definition failures ([`DefineError`]) are raised while a type is being
//! built and abort the definition. Access failures ([`RuntimeError`]) are
//! raised at the member access site or at instantiation. Both are
//! unrecoverable for the attempt: the caller fixes the specification or
//! the access site.

use thiserror::Error;

use crate::member::MemberKind;
use crate::visibility::Visibility;

/// Result alias for definition-time operations
pub type DefineResult<T> = Result<T, DefineError>;

/// Result alias for access-time operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised while building a type definition
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DefineError {
    /// The declared parent is marked final
    #[error("Cannot extend final class '{parent}'")]
    CannotExtendFinal {
        /// Name of the final parent class
        parent: String,
    },

    /// A concrete class left abstract or interface members unimplemented
    #[error("Class '{class}' must implement missing member(s): {}", missing.join(", "))]
    IncompleteImplementation {
        /// Name of the class being defined
        class: String,
        /// Every unimplemented member name, sorted
        missing: Vec<String>,
    },

    /// A declaration conflicts with the kind of an inherited or required member
    #[error("Member '{member}' of class '{class}' must be declared as a {expected}, not a {actual}")]
    SignatureMismatch {
        /// Name of the class being defined
        class: String,
        /// Conflicting member name
        member: String,
        /// Kind the inherited or required member has
        expected: MemberKind,
        /// Kind the conflicting declaration has
        actual: MemberKind,
    },

    /// Two implemented interfaces require the same member with incompatible shapes
    #[error("Member '{member}' is declared by interfaces '{first}' and '{second}' with incompatible shapes")]
    DuplicateInterfaceMethodConflict {
        /// Conflicting member name
        member: String,
        /// Interface that declared the member first
        first: String,
        /// Interface that declared the incompatible duplicate
        second: String,
    },

    /// An interface declared a concrete (implemented) member
    #[error("Member '{member}' of interface '{interface}' must be declared without an implementation")]
    InterfaceMemberMustBeAbstract {
        /// Name of the interface being defined
        interface: String,
        /// Offending member name
        member: String,
    },

    /// A class used an interface as its parent
    #[error("Class '{class}' cannot extend interface '{interface}'; interfaces are implemented, not extended")]
    CannotExtendInterface {
        /// Name of the class being defined
        class: String,
        /// Interface that was used as a parent
        interface: String,
    },

    /// An interface used a class as one of its parents
    #[error("Interface '{interface}' cannot extend class '{class}'")]
    InterfaceCannotExtendClass {
        /// Name of the interface being defined
        interface: String,
        /// Class that was used as a parent
        class: String,
    },

    /// A non-interface type was passed as an implemented interface
    #[error("Class '{class}' cannot implement '{name}': not an interface")]
    ImplementsNonInterface {
        /// Name of the class being defined
        class: String,
        /// Name of the non-interface type
        name: String,
    },
}

/// Errors raised while instantiating a type or touching its members
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    /// An abstract class or interface was instantiated
    #[error("Cannot instantiate {kind} '{name}'")]
    CannotInstantiate {
        /// What the type is: "abstract class" or "interface"
        kind: &'static str,
        /// Name of the type
        name: String,
    },

    /// A member was touched from a scope its visibility does not permit
    #[error("Cannot access {visibility} member '{member}' of class '{class}' from {scope}")]
    AccessViolation {
        /// Class owning the member
        class: String,
        /// Member name
        member: String,
        /// Visibility boundary that was crossed
        visibility: Visibility,
        /// Description of the accessing scope
        scope: String,
    },

    /// No member with the given name exists
    #[error("Class '{class}' has no member named '{member}'")]
    UnknownMember {
        /// Class that was searched
        class: String,
        /// Missing member name
        member: String,
    },

    /// A data member was invoked as a method
    #[error("Member '{member}' of class '{class}' is not callable")]
    NotCallable {
        /// Class owning the member
        class: String,
        /// Member name
        member: String,
    },

    /// A method member was read as a data value
    #[error("Member '{member}' of class '{class}' is not a data member")]
    NotAField {
        /// Class owning the member
        class: String,
        /// Member name
        member: String,
    },

    /// Assignment to a method or a constant
    #[error("Cannot assign to member '{member}' of class '{class}'")]
    NotAssignable {
        /// Class owning the member
        class: String,
        /// Member name
        member: String,
    },

    /// An instance member was touched from a static method
    #[error("Cannot access instance member '{member}' without a receiver")]
    MissingReceiver {
        /// Member name
        member: String,
    },
}
