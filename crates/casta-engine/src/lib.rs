//! Casta class-system engine
//!
//! This crate retrofits classical object-oriented constructs onto a
//! dynamic, runtime-checked object model:
//! - **Classes**: concrete, abstract, and final, with single inheritance
//! - **Interfaces**: method contracts with transitive extension
//! - **Visibility**: name-derived public/protected/private members,
//!   enforced at every access site
//! - **Type queries**: `is_instance_of` over the ancestry and
//!   implemented-interface graph
//!
//! Type definitions are built once by the definition entry points and are
//! immutable afterwards, so they can be shared and queried concurrently.
//!
//! # Example
//!
//! ```rust,ignore
//! use casta_engine::{define_class, is_instance_of, TypeSpec, Value};
//!
//! let animal = define_class(
//!     TypeSpec::new("Animal")
//!         .field("name", Value::str(""))
//!         .method("speak", |_ctx, _args| Ok(Value::str("..."))),
//! )?;
//! let dog = define_class(
//!     TypeSpec::new("Dog")
//!         .extends(&animal)
//!         .method("speak", |_ctx, _args| Ok(Value::str("woof"))),
//! )?;
//!
//! let mut d = dog.instantiate(&[])?;
//! assert_eq!(d.call("speak", &[])?, Value::str("woof"));
//! assert!(is_instance_of(&d, &animal));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod engine;
pub mod error;
pub mod instance;
pub mod member;
pub mod query;
pub mod spec;
pub mod typedef;
pub mod value;
pub mod visibility;

pub use engine::{define_class, define_final_class, define_interface};
pub use error::{DefineError, DefineResult, RuntimeError, RuntimeResult};
pub use instance::{CallContext, Instance};
pub use member::{MemberDescriptor, MemberKind, MemberPayload, MemberTable, MethodBody};
pub use query::is_instance_of;
pub use spec::TypeSpec;
pub use typedef::{TypeDef, TypeId};
pub use value::{ObjectRef, Value};
pub use visibility::Visibility;
