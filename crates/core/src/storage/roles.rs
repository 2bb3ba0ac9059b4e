//! Role storage operations

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::OptionalExt;
use crate::error::Result;
use crate::models::Role;

pub struct RoleStore<'a> {
    conn: &'a Connection,
}

impl<'a> RoleStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Register a role
    #[instrument(skip(self, role), fields(role = %role.identifier))]
    pub fn create(&self, role: &Role) -> Result<()> {
        self.conn.execute(
            "INSERT INTO roles (identifier, created_at) VALUES (?1, ?2)",
            params![role.identifier, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Find a role by its identifier
    pub fn find(&self, identifier: &str) -> Result<Option<Role>> {
        let role = self
            .conn
            .query_row(
                "SELECT identifier FROM roles WHERE identifier = ?1",
                params![identifier],
                |row| Ok(Role::new(row.get::<_, String>(0)?)),
            )
            .optional()?;

        Ok(role)
    }

    /// List all registered roles
    pub fn list(&self) -> Result<Vec<Role>> {
        let mut stmt = self
            .conn
            .prepare("SELECT identifier FROM roles ORDER BY identifier")?;

        let roles = stmt
            .query_map([], |row| Ok(Role::new(row.get::<_, String>(0)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(roles)
    }

    /// Roles assigned to an account
    pub fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Role>> {
        let mut stmt = self.conn.prepare(
            "SELECT role_identifier FROM account_roles WHERE account_id = ?1 ORDER BY role_identifier",
        )?;

        let roles = stmt
            .query_map(params![account_id.to_string()], |row| {
                Ok(Role::new(row.get::<_, String>(0)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::Role;
    use crate::storage::Database;

    #[test]
    fn test_create_and_list_roles() {
        let db = Database::open_in_memory().unwrap();
        let roles = db.roles();

        roles.create(&Role::new("Keyward.Backend:Editor")).unwrap();
        roles.create(&Role::new("Keyward.Backend:Administrator")).unwrap();

        let listed = roles.list().unwrap();
        assert_eq!(
            listed,
            vec![
                Role::new("Keyward.Backend:Administrator"),
                Role::new("Keyward.Backend:Editor"),
            ]
        );
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.roles().create(&Role::new("Keyward.Backend:Editor")).unwrap();
        assert!(db.roles().create(&Role::new("Keyward.Backend:Editor")).is_err());
    }

    #[test]
    fn test_find_unknown_role() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.roles().find("Keyward.Backend:Nobody").unwrap().is_none());
    }
}
