//! Authorization policy - pure allow/deny decisions.

use crate::domain::{Owned, Principal};
use crate::error::DomainError;

/// What the caller is trying to do to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

/// Decide whether `principal` may perform `action` on `resource`.
///
/// Reads and creates carry no ownership constraint; creating a post is
/// gated on authentication by the route chain, not here. Updates and
/// deletes need the owner or an admin.
pub fn authorize<R: Owned + ?Sized>(
    principal: Option<&Principal>,
    resource: &R,
    action: Action,
) -> Result<(), DomainError> {
    match action {
        Action::Read | Action::Create => Ok(()),
        Action::Update | Action::Delete => authorize_owner_or_admin(principal, resource),
    }
}

/// Allow iff the caller is an admin or owns the resource.
///
/// A missing principal is `Forbidden` rather than unauthenticated, so the
/// answer does not depend on whether the resource exists.
pub fn authorize_owner_or_admin<R: Owned + ?Sized>(
    principal: Option<&Principal>,
    resource: &R,
) -> Result<(), DomainError> {
    match principal {
        Some(principal) if is_owner_or_admin(principal, resource) => Ok(()),
        _ => Err(DomainError::Forbidden),
    }
}

pub fn is_owner_or_admin<R: Owned + ?Sized>(principal: &Principal, resource: &R) -> bool {
    principal.is_admin() || resource.owner_id() == Some(principal.id)
}
