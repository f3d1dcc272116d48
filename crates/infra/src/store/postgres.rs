//! Postgres-backed stores.
//!
//! One pool serves both tables. `UNIQUE` constraints on `users.email` and
//! `clients.cpf` are the real race guard; violations (SQLSTATE 23505) come
//! back as [`StoreError::UniqueViolation`].

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use clientdesk_auth::{NewUserRecord, Role, User};
use clientdesk_clients::{Client, NewClient};
use clientdesk_core::{ClientId, UserId};

use super::{ClientStore, StoreError, UserStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username VARCHAR NOT NULL,
        email VARCHAR NOT NULL,
        password VARCHAR NOT NULL,
        role VARCHAR NOT NULL DEFAULT 'user',
        CONSTRAINT users_email_key UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR NOT NULL,
        cpf VARCHAR NOT NULL,
        email VARCHAR NOT NULL,
        color VARCHAR NOT NULL,
        annotations VARCHAR,
        CONSTRAINT clients_cpf_key UNIQUE (cpf)
    )
    "#,
];

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        Ok(())
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation(db.constraint().unwrap_or("unique").to_string());
        }
    }
    StoreError::Backend(err.to_string())
}

fn client_from_row(row: &PgRow) -> Result<Client, StoreError> {
    let read = || -> Result<Client, sqlx::Error> {
        Ok(Client {
            id: ClientId::from_i64(row.try_get("id")?),
            name: row.try_get("name")?,
            cpf: row.try_get("cpf")?,
            email: row.try_get("email")?,
            color: row.try_get("color")?,
            annotations: row
                .try_get::<Option<String>, _>("annotations")?
                .unwrap_or_default(),
        })
    };
    read().map_err(map_sqlx_error)
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.try_get("role").map_err(map_sqlx_error)?;
    let role: Role = role
        .parse()
        .map_err(|_| StoreError::Backend(format!("unknown role '{role}' in users table")))?;
    let read = || -> Result<User, sqlx::Error> {
        Ok(User {
            id: UserId::from_i64(row.try_get("id")?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            role,
        })
    };
    read().map_err(map_sqlx_error)
}

// ─────────────────────────────────────────────────────────────────────────────
// Clients
// ─────────────────────────────────────────────────────────────────────────────

const CLIENT_COLUMNS: &str = "id, name, cpf, email, color, annotations";

#[async_trait]
impl ClientStore for PostgresStore {
    async fn find_by_id(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
        let row = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Client>, StoreError> {
        let row = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE cpf = $1"))
            .bind(cpf)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Client>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        rows.iter().map(client_from_row).collect()
    }

    async fn insert(&self, client: NewClient) -> Result<Client, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO clients (name, cpf, email, color, annotations)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(&client.name)
        .bind(&client.cpf)
        .bind(&client.email)
        .bind(&client.color)
        .bind(&client.annotations)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        client_from_row(&row)
    }

    async fn update(&self, client: Client) -> Result<Option<Client>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE clients
            SET name = $2, cpf = $3, email = $4, color = $5, annotations = $6
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(client.id.as_i64())
        .bind(&client.name)
        .bind(&client.cpf)
        .bind(&client.email)
        .bind(&client.color)
        .bind(&client.annotations)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn delete_by_id(&self, id: ClientId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

const USER_COLUMNS: &str = "id, username, email, password, role";

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        rows.iter().map(user_from_row).collect()
    }

    async fn insert(&self, user: NewUserRecord) -> Result<User, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        user_from_row(&row)
    }

    async fn update(&self, user: User) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET username = $2, password = $3, role = $4
            WHERE email = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn delete_by_email(&self, email: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
