//! Type relationship queries
//!
//! Read-only walk over the metadata the definition engine produced: the
//! parent chain first, then the implemented-interface closure of every
//! type on it. Queries never fail; they answer `false` for unrelated
//! types.

use crate::instance::Instance;
use crate::typedef::TypeDef;

/// Check whether `instance` is an instance of `candidate`.
///
/// True when the candidate is the instance's own type, any ancestor of
/// it, or an interface implemented anywhere along the chain (transitively
/// through extended interfaces). An interface candidate matches through
/// its implementers; an unrelated one yields `false`.
pub fn is_instance_of(instance: &Instance, candidate: &TypeDef) -> bool {
    instance.type_def().is_kind_of(candidate)
}
