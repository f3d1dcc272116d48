use serde::{Deserialize, Serialize};

use clientdesk_core::{ClientId, DomainResult, FieldChecks};

pub const NAME_LEN: (usize, usize) = (3, 50);
pub const CPF_LEN: usize = 11;
pub const COLOR_LEN: (usize, usize) = (3, 20);

/// A stored client record.
///
/// `cpf` (national ID) is globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub color: String,
    #[serde(default)]
    pub annotations: String,
}

/// Payload for registering a new client (id assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub color: String,
    #[serde(default)]
    pub annotations: String,
}

/// Partial update: only the fields present are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub color: Option<String>,
    pub annotations: Option<String>,
}

fn check_name(checks: &mut FieldChecks, name: &str) {
    checks.length("name", name, NAME_LEN.0, NAME_LEN.1);
}

fn check_cpf(checks: &mut FieldChecks, cpf: &str) {
    checks.exact_length("cpf", cpf, CPF_LEN);
}

fn check_color(checks: &mut FieldChecks, color: &str) {
    checks.length("color", color, COLOR_LEN.0, COLOR_LEN.1);
}

impl NewClient {
    pub fn validate(&self) -> DomainResult<()> {
        let mut checks = FieldChecks::new();
        check_name(&mut checks, &self.name);
        check_cpf(&mut checks, &self.cpf);
        checks.email("email", &self.email);
        check_color(&mut checks, &self.color);
        checks.finish()
    }

    pub fn into_client(self, id: ClientId) -> Client {
        Client {
            id,
            name: self.name,
            cpf: self.cpf,
            email: self.email,
            color: self.color,
            annotations: self.annotations,
        }
    }
}

impl ClientPatch {
    pub fn validate(&self) -> DomainResult<()> {
        let mut checks = FieldChecks::new();
        if let Some(name) = &self.name {
            check_name(&mut checks, name);
        }
        if let Some(cpf) = &self.cpf {
            check_cpf(&mut checks, cpf);
        }
        if let Some(email) = &self.email {
            checks.email("email", email);
        }
        if let Some(color) = &self.color {
            check_color(&mut checks, color);
        }
        checks.finish()
    }
}

impl Client {
    /// Merge the provided fields over this record.
    pub fn apply(&mut self, patch: ClientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(cpf) = patch.cpf {
            self.cpf = cpf;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(annotations) = patch.annotations {
            self.annotations = annotations;
        }
    }
}
