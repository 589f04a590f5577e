use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, Row};

use super::AuthStore;
use crate::error::AuthError;
use crate::profile::Profile;
use crate::types::*;

/// SQLite extended result code for a UNIQUE constraint violation.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

pub struct SqliteAuthStore {
    conn: Mutex<Connection>,
}

impl SqliteAuthStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &str) -> Result<Self, AuthError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> Result<Self, AuthError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self::new(conn))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AuthError> {
        self.conn
            .lock()
            .map_err(|_| AuthError::Internal("auth store lock poisoned".into()))
    }
}

const MIGRATE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS admin_roles (
    id TEXT PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    is_system INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS admin_users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE,
    password_hash TEXT NOT NULL,
    role_id TEXT REFERENCES admin_roles(id) ON DELETE SET NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS admin_permissions (
    id TEXT PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS admin_role_permissions (
    role_id TEXT NOT NULL REFERENCES admin_roles(id) ON DELETE CASCADE,
    permission_id TEXT NOT NULL REFERENCES admin_permissions(id) ON DELETE CASCADE,
    PRIMARY KEY (role_id, permission_id)
);

CREATE TABLE IF NOT EXISTS admin_audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT,
    action TEXT NOT NULL,
    target TEXT,
    ip_addr TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const USER_COLUMNS: &str = "id, username, email, role_id, is_active, created_at, updated_at";
const ROLE_COLUMNS: &str = "id, name, description, is_system, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role_id: row.get(3)?,
        is_active: row.get::<_, i32>(4)? != 0,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn role_from_row(row: &Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        is_system: row.get::<_, i32>(3)? != 0,
        created_at: row.get(4)?,
    })
}

fn permission_from_row(row: &Row<'_>) -> rusqlite::Result<Permission> {
    Ok(Permission {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn not_found(what: &'static str) -> impl Fn(rusqlite::Error) -> AuthError {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => AuthError::NotFound(format!("{what} not found")),
        _ => AuthError::Database(e.to_string()),
    }
}

fn duplicate(message: String) -> impl FnOnce(rusqlite::Error) -> AuthError {
    move |e| {
        if let rusqlite::Error::SqliteFailure(ref err, _) = e {
            if err.extended_code == SQLITE_CONSTRAINT_UNIQUE {
                return AuthError::Duplicate(message);
            }
        }
        AuthError::Database(e.to_string())
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<User, AuthError> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM admin_users WHERE {column} = ?1"),
        [value],
        user_from_row,
    )
    .map_err(not_found("user"))
}

fn query_role(conn: &Connection, column: &str, value: &str) -> Result<Role, AuthError> {
    conn.query_row(
        &format!("SELECT {ROLE_COLUMNS} FROM admin_roles WHERE {column} = ?1"),
        [value],
        role_from_row,
    )
    .map_err(not_found("role"))
}

#[async_trait]
impl AuthStore for SqliteAuthStore {
    async fn migrate(&self) -> Result<(), AuthError> {
        self.conn()?.execute_batch(MIGRATE_SQL)?;
        Ok(())
    }

    async fn seed_defaults(&self) -> Result<(), AuthError> {
        super::seed::seed_defaults(self).await
    }

    // --- Admin accounts ---

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        role_id: Option<&str>,
    ) -> Result<User, AuthError> {
        let conn = self.conn()?;
        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO admin_users (id, username, email, password_hash, role_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, username, email, password_hash, role_id],
        )
        .map_err(duplicate(format!("admin '{username}' already exists")))?;
        query_user(&conn, "id", &id)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<User, AuthError> {
        let conn = self.conn()?;
        query_user(&conn, "id", id)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, AuthError> {
        let conn = self.conn()?;
        query_user(&conn, "username", username)
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM admin_users ORDER BY created_at, username"
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    async fn set_user_role(&self, user_id: &str, role_id: &str) -> Result<User, AuthError> {
        let conn = self.conn()?;
        query_role(&conn, "id", role_id)?;
        let changed = conn.execute(
            "UPDATE admin_users SET role_id = ?1, updated_at = datetime('now') WHERE id = ?2",
            rusqlite::params![role_id, user_id],
        )?;
        if changed == 0 {
            return Err(AuthError::NotFound("user not found".into()));
        }
        query_user(&conn, "id", user_id)
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, AuthError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE admin_users SET is_active = ?1, updated_at = datetime('now') WHERE id = ?2",
            rusqlite::params![is_active as i32, user_id],
        )?;
        if changed == 0 {
            return Err(AuthError::NotFound("user not found".into()));
        }
        query_user(&conn, "id", user_id)
    }

    async fn delete_user(&self, id: &str) -> Result<(), AuthError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM admin_users WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AuthError::NotFound("user not found".into()));
        }
        Ok(())
    }

    async fn get_password_hash(&self, user_id: &str) -> Result<String, AuthError> {
        self.conn()?
            .query_row(
                "SELECT password_hash FROM admin_users WHERE id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .map_err(not_found("user"))
    }

    async fn user_count(&self) -> Result<u64, AuthError> {
        let count: u64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM admin_users", [], |row| row.get(0))?;
        Ok(count)
    }

    // --- Roles ---

    async fn create_role(
        &self,
        name: &str,
        description: &str,
        is_system: bool,
    ) -> Result<Role, AuthError> {
        let conn = self.conn()?;
        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO admin_roles (id, name, description, is_system) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, name, description, is_system as i32],
        )
        .map_err(duplicate(format!("role '{name}' already exists")))?;
        query_role(&conn, "id", &id)
    }

    async fn get_role(&self, id: &str) -> Result<Role, AuthError> {
        let conn = self.conn()?;
        query_role(&conn, "id", id)
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Role, AuthError> {
        let conn = self.conn()?;
        query_role(&conn, "name", name)
    }

    async fn list_roles(&self) -> Result<Vec<Role>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ROLE_COLUMNS} FROM admin_roles ORDER BY is_system DESC, name"
        ))?;
        let roles = stmt
            .query_map([], role_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(roles)
    }

    async fn update_role(&self, id: &str, req: &UpdateRoleRequest) -> Result<Role, AuthError> {
        let conn = self.conn()?;
        let current = query_role(&conn, "id", id)?;
        if let Some(ref name) = req.name {
            if current.is_system && *name != current.name {
                return Err(AuthError::Forbidden("cannot rename system role".into()));
            }
            conn.execute(
                "UPDATE admin_roles SET name = ?1 WHERE id = ?2",
                rusqlite::params![name, id],
            )
            .map_err(duplicate(format!("role '{name}' already exists")))?;
        }
        if let Some(ref desc) = req.description {
            conn.execute(
                "UPDATE admin_roles SET description = ?1 WHERE id = ?2",
                rusqlite::params![desc, id],
            )?;
        }
        query_role(&conn, "id", id)
    }

    async fn delete_role(&self, id: &str) -> Result<(), AuthError> {
        let conn = self.conn()?;
        let role = query_role(&conn, "id", id)?;
        if role.is_system {
            return Err(AuthError::Forbidden("cannot delete system role".into()));
        }
        conn.execute("DELETE FROM admin_roles WHERE id = ?1", [id])?;
        Ok(())
    }

    // --- Role-Permission ---

    async fn add_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), AuthError> {
        let conn = self.conn()?;
        query_role(&conn, "id", role_id)?;
        conn.query_row(
            "SELECT id FROM admin_permissions WHERE id = ?1",
            [permission_id],
            |row| row.get::<_, String>(0),
        )
        .map_err(not_found("permission"))?;
        conn.execute(
            "INSERT OR IGNORE INTO admin_role_permissions (role_id, permission_id) VALUES (?1, ?2)",
            rusqlite::params![role_id, permission_id],
        )?;
        Ok(())
    }

    async fn remove_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), AuthError> {
        self.conn()?.execute(
            "DELETE FROM admin_role_permissions WHERE role_id = ?1 AND permission_id = ?2",
            rusqlite::params![role_id, permission_id],
        )?;
        Ok(())
    }

    async fn list_role_permissions(&self, role_id: &str) -> Result<Vec<Permission>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, p.description, p.created_at
             FROM admin_permissions p
             JOIN admin_role_permissions rp ON rp.permission_id = p.id
             WHERE rp.role_id = ?1
             ORDER BY p.name",
        )?;
        let perms = stmt
            .query_map([role_id], permission_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(perms)
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<Profile, AuthError> {
        let conn = self.conn()?;
        let user = query_user(&conn, "id", user_id)?;
        if !user.is_active {
            return Err(AuthError::Forbidden("account disabled".into()));
        }
        let Some(role_id) = user.role_id else {
            return Ok(Profile {
                role: String::new(),
                permissions: Vec::new(),
            });
        };
        let role = query_role(&conn, "id", &role_id)?;
        let mut stmt = conn.prepare(
            "SELECT p.name
             FROM admin_permissions p
             JOIN admin_role_permissions rp ON rp.permission_id = p.id
             WHERE rp.role_id = ?1
             ORDER BY p.name",
        )?;
        let permissions = stmt
            .query_map([&role_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Profile {
            role: role.name,
            permissions,
        })
    }

    // --- Permissions ---

    async fn list_permissions(&self) -> Result<Vec<Permission>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_at FROM admin_permissions ORDER BY name",
        )?;
        let perms = stmt
            .query_map([], permission_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(perms)
    }

    async fn create_permission(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Permission, AuthError> {
        let conn = self.conn()?;
        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT OR IGNORE INTO admin_permissions (id, name, description) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, description],
        )?;
        conn.query_row(
            "SELECT id, name, description, created_at FROM admin_permissions WHERE name = ?1",
            [name],
            permission_from_row,
        )
        .map_err(|e| AuthError::Database(e.to_string()))
    }

    // --- Audit ---

    async fn log_audit(
        &self,
        user_id: Option<&str>,
        action: &str,
        target: Option<&str>,
        ip_addr: Option<&str>,
    ) -> Result<(), AuthError> {
        self.conn()?.execute(
            "INSERT INTO admin_audit_log (user_id, action, target, ip_addr) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, action, target, ip_addr],
        )?;
        Ok(())
    }

    async fn list_audit(&self, limit: u32, offset: u32) -> Result<Vec<AuditEntry>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, action, target, ip_addr, created_at
             FROM admin_audit_log ORDER BY id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let entries = stmt
            .query_map(rusqlite::params![limit, offset], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    action: row.get(2)?,
                    target: row.get(3)?,
                    ip_addr: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
