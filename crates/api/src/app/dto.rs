use serde::{Deserialize, Serialize};

use clientdesk_auth::{NewUser, Role, User, UserPatch};
use clientdesk_clients::NewClient;
use clientdesk_core::{DomainResult, UserId, ValidationErrors};

// -------------------------
// Request DTOs
// -------------------------

// Fields are optional so a missing field is reported as a field violation
// rather than a bare deserialization error.

#[derive(Debug, Default, Deserialize)]
pub struct CreateClientRequest {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub color: Option<String>,
    pub annotations: Option<String>,
}

impl CreateClientRequest {
    pub fn into_new_client(self) -> DomainResult<NewClient> {
        let mut missing = ValidationErrors::new();
        let client = NewClient {
            name: required(&mut missing, "name", self.name),
            cpf: required(&mut missing, "cpf", self.cpf),
            email: required(&mut missing, "email", self.email),
            color: required(&mut missing, "color", self.color),
            annotations: self.annotations.unwrap_or_default(),
        };
        missing.into_result()?;
        Ok(client)
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_credentials(self) -> DomainResult<(String, String)> {
        let mut missing = ValidationErrors::new();
        let email = required(&mut missing, "email", self.email);
        let password = required(&mut missing, "password", self.password);
        missing.into_result()?;
        Ok((email, password))
    }
}

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl RegisterUserRequest {
    pub fn into_new_user(self) -> DomainResult<NewUser> {
        let mut missing = ValidationErrors::new();
        let username = required(&mut missing, "username", self.username);
        let email = required(&mut missing, "email", self.email);
        let password = required(&mut missing, "password", self.password);
        missing.into_result()?;

        let role = match self.role {
            Some(role) => role.parse::<Role>()?,
            None => Role::default(),
        };
        Ok(NewUser {
            username,
            email,
            password,
            role,
        })
    }
}

/// `PUT /user`: `email` selects the record, the rest is a partial patch.
///
/// The key and whether a role is being set are read first so the access
/// policy can run before the role string itself is parsed.
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    pub fn target_email(&self) -> DomainResult<String> {
        let mut missing = ValidationErrors::new();
        let email = required(&mut missing, "email", self.email.clone());
        missing.into_result()?;
        Ok(email)
    }

    pub fn sets_role(&self) -> bool {
        self.role.is_some()
    }

    pub fn into_patch(self) -> DomainResult<UserPatch> {
        let role = self.role.map(|r| r.parse::<Role>()).transpose()?;
        Ok(UserPatch {
            username: self.username,
            password: self.password,
            role,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UserEmailRequest {
    pub email: Option<String>,
}

impl UserEmailRequest {
    pub fn into_email(self) -> DomainResult<String> {
        let mut missing = ValidationErrors::new();
        let email = required(&mut missing, "email", self.email);
        missing.into_result()?;
        Ok(email)
    }
}

fn required(missing: &mut ValidationErrors, field: &str, value: Option<String>) -> String {
    match value {
        Some(value) => value,
        None => {
            missing.push(field, "is required");
            String::new()
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// A user as returned over HTTP: never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}
