//! Access-control decision functions.
//!
//! These are pure functions over the resolved principal - no I/O, no state -
//! so they are trivially safe to call from any handler. Each decision has a
//! `can_*` form returning `bool` and an `ensure_*` form returning the
//! [`Error::AccessDenied`] the handler can bubble up with `?`.

use crate::{
    api::models::users::{CurrentUser, Role},
    errors::Error,
    types::{Operation, ResourceKind, UserId},
};

/// Can `user` touch the record owned by `owner_id` of kind `resource`?
///
/// Rules, first match wins:
/// 1. Admins can access everything.
/// 2. Users can access their own record (the resource kind must match their role).
/// 3. Instructors can access student records. They can NOT access other
///    instructors' records - the asymmetry is intentional.
/// 4. Everything else is denied.
pub fn can_access(user: &CurrentUser, owner_id: UserId, resource: ResourceKind) -> bool {
    if user.role == Role::Admin {
        return true;
    }

    if resource.owning_role() == user.role && owner_id == user.id {
        return true;
    }

    if user.role == Role::Instructor && resource == ResourceKind::Student {
        return true;
    }

    false
}

/// Can `user` list every record of `resource`?
///
/// Students may never list all students; instructors may. Instructor and
/// admin listings are admin-only. Course listings are open to anyone
/// authenticated.
pub fn can_list(user: &CurrentUser, resource: ResourceKind) -> bool {
    match resource {
        ResourceKind::Student => matches!(user.role, Role::Admin | Role::Instructor),
        ResourceKind::Instructor | ResourceKind::Admin => user.role == Role::Admin,
        ResourceKind::Course => true,
    }
}

pub fn ensure_can_access(user: &CurrentUser, owner_id: UserId, resource: ResourceKind, action: Operation) -> Result<(), Error> {
    if can_access(user, owner_id, resource) {
        Ok(())
    } else {
        Err(Error::AccessDenied {
            action,
            resource: format!("{resource} {owner_id}"),
        })
    }
}

pub fn ensure_can_list(user: &CurrentUser, resource: ResourceKind) -> Result<(), Error> {
    if can_list(user, resource) {
        Ok(())
    } else {
        Err(Error::AccessDenied {
            action: Operation::List,
            resource: format!("all {resource}s"),
        })
    }
}

pub fn ensure_admin(user: &CurrentUser, action: Operation, resource: impl Into<String>) -> Result<(), Error> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(Error::AccessDenied {
            action,
            resource: resource.into(),
        })
    }
}
