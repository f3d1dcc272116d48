//! Access policy: one pure decision function for every protected operation.

use thiserror::Error;

use clientdesk_core::{ClientId, DomainError, UserId};

use crate::Identity;

/// An operation together with the resource it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    RegisterClient,
    ListClients,
    GetClient(ClientId),
    UpdateClient(ClientId),
    DeleteClient(ClientId),
    RegisterUser,
    ListUsers,
    GetUser(UserId),
    /// `changes_role` is set when the patch carries a role.
    UpdateUser { email: &'a str, changes_role: bool },
    DeleteUser { email: &'a str },
}

impl Action<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Action::RegisterClient => "clients.register",
            Action::ListClients => "clients.list",
            Action::GetClient(_) => "clients.get",
            Action::UpdateClient(_) => "clients.update",
            Action::DeleteClient(_) => "clients.delete",
            Action::RegisterUser => "users.register",
            Action::ListUsers => "users.list",
            Action::GetUser(_) => "users.get",
            Action::UpdateUser { .. } => "users.update",
            Action::DeleteUser { .. } => "users.delete",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(&'static str),
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Unauthenticated => DomainError::unauthenticated("authentication required"),
            AuthzError::Forbidden(reason) => DomainError::forbidden(reason),
        }
    }
}

/// Decide whether `caller` may perform `action`.
///
/// - No IO
/// - No panics
/// - `None` caller means no (or an invalid) token was presented.
pub fn authorize(caller: Option<&Identity>, action: &Action<'_>) -> Result<(), AuthzError> {
    if let Action::RegisterClient = action {
        return Ok(());
    }

    let caller = caller.ok_or(AuthzError::Unauthenticated)?;
    if caller.is_admin() {
        return Ok(());
    }

    Err(match action {
        Action::RegisterClient => return Ok(()),
        Action::ListClients
        | Action::GetClient(_)
        | Action::UpdateClient(_)
        | Action::DeleteClient(_) => AuthzError::Forbidden("only admins can manage clients"),
        Action::RegisterUser => AuthzError::Forbidden("only admins can create new users"),
        Action::ListUsers => AuthzError::Forbidden("only admins can list all users"),
        Action::GetUser(id) if *id == caller.id => return Ok(()),
        Action::GetUser(_) => AuthzError::Forbidden("you can only access your own data"),
        Action::UpdateUser { email, .. } if *email != caller.email => {
            AuthzError::Forbidden("you can only update your own data")
        }
        Action::UpdateUser { changes_role: true, .. } => {
            AuthzError::Forbidden("only admins can change roles")
        }
        Action::UpdateUser { .. } => return Ok(()),
        Action::DeleteUser { .. } => AuthzError::Forbidden("only admins can delete users"),
    })
}
