//! Startup seeding. Idempotent: existing records are left untouched.

use clientdesk_auth::{NewUser, Role};
use clientdesk_clients::NewClient;
use clientdesk_core::DomainResult;

use crate::config::SeedConfig;
use crate::repository::{ClientRepository, UserRepository};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub users_created: usize,
    pub clients_created: usize,
}

fn demo_users() -> Vec<NewUser> {
    (1..=3)
        .map(|n| NewUser {
            username: format!("user{n}"),
            email: format!("user{n}@example.com"),
            password: format!("password{n}"),
            role: Role::User,
        })
        .collect()
}

fn demo_clients() -> Vec<NewClient> {
    [
        ("client1", "11111111111", "red"),
        ("client2", "22222222222", "green"),
        ("client3", "33333333333", "blue"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (name, cpf, color))| NewClient {
        name: name.to_string(),
        cpf: cpf.to_string(),
        email: format!("{name}@example.com"),
        color: color.to_string(),
        annotations: format!("annotation{}", i + 1),
    })
    .collect()
}

pub async fn seed(
    users: &UserRepository,
    clients: &ClientRepository,
    config: &SeedConfig,
) -> DomainResult<SeedReport> {
    let mut report = SeedReport::default();

    if let Some(admin) = &config.admin {
        if users.find_by_email(&admin.email).await?.is_none() {
            users
                .create(NewUser {
                    username: admin.username.clone(),
                    email: admin.email.clone(),
                    password: admin.password.clone(),
                    role: Role::Admin,
                })
                .await?;
            report.admin_created = true;
        }
    }

    if config.demo_data {
        for user in demo_users() {
            if users.find_by_email(&user.email).await?.is_none() {
                users.create(user).await?;
                report.users_created += 1;
            }
        }

        let existing = clients.list().await?;
        for client in demo_clients() {
            if !existing.iter().any(|c| c.cpf == client.cpf) {
                clients.create(client).await?;
                report.clients_created += 1;
            }
        }
    }

    tracing::info!(
        admin_created = report.admin_created,
        users_created = report.users_created,
        clients_created = report.clients_created,
        "seeding finished"
    );
    Ok(report)
}
