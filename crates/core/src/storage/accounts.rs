//! Account storage operations

use rusqlite::{params, Connection, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::parse::{parse_datetime, parse_datetime_opt, parse_uuid, OptionalExt};
use super::roles::RoleStore;
use crate::error::{Error, Result};
use crate::invariants::assert_account_invariants;
use crate::models::Account;

const ACCOUNT_COLUMNS: &str = "id, user_id, account_identifier, authentication_provider_name, \
     credentials_source, expiration_date, created_at";

pub struct AccountStore<'a> {
    conn: &'a Connection,
}

impl<'a> AccountStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create an account together with its role assignments
    #[instrument(skip(self, account), fields(account = %account.account_identifier))]
    pub fn create(&self, account: &Account) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        insert_account(&tx, account)?;
        tx.commit()?;
        Ok(())
    }

    /// Find account by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1");
        let account = self
            .conn
            .query_row(&sql, params![id.to_string()], account_from_row)
            .optional()?;

        account.map(|a| self.with_roles(a)).transpose()
    }

    /// Find account by login name (any provider, oldest first)
    #[instrument(skip(self))]
    pub fn find_by_identifier(&self, account_identifier: &str) -> Result<Option<Account>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_identifier = ?1 \
             ORDER BY created_at LIMIT 1"
        );
        let account = self
            .conn
            .query_row(&sql, params![account_identifier], account_from_row)
            .optional()?;

        account.map(|a| self.with_roles(a)).transpose()
    }

    /// All accounts owned by a user
    pub fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Account>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE user_id = ?1 ORDER BY created_at, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let accounts = stmt
            .query_map(params![user_id.to_string()], account_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        accounts.into_iter().map(|a| self.with_roles(a)).collect()
    }

    /// Write back an existing account, including its roles
    #[instrument(skip(self, account), fields(account = %account.account_identifier, expires = ?account.expiration_date))]
    pub fn update(&self, account: &Account) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        let updated = tx.execute(
            "UPDATE accounts SET account_identifier = ?1, authentication_provider_name = ?2, \
             credentials_source = ?3, expiration_date = ?4 WHERE id = ?5",
            params![
                account.account_identifier,
                account.authentication_provider_name,
                account.credentials_source,
                account.expiration_date.map(|t| t.to_rfc3339()),
                account.id.to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("account {}", account.id)));
        }

        replace_roles(&tx, account)?;
        tx.commit()?;

        debug!("Account updated");
        Ok(())
    }

    fn with_roles(&self, mut account: Account) -> Result<Account> {
        account.roles = RoleStore::new(self.conn).list_for_account(account.id)?;
        assert_account_invariants(&account);
        Ok(account)
    }
}

/// Insert an account row and its roles on an open transaction
pub(super) fn insert_account(conn: &Connection, account: &Account) -> Result<()> {
    conn.execute(
        "INSERT INTO accounts (id, user_id, account_identifier, authentication_provider_name, \
         credentials_source, expiration_date, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            account.id.to_string(),
            account.user_id.to_string(),
            account.account_identifier,
            account.authentication_provider_name,
            account.credentials_source,
            account.expiration_date.map(|t| t.to_rfc3339()),
            account.created_at.to_rfc3339(),
        ],
    )?;

    replace_roles(conn, account)
}

fn replace_roles(conn: &Connection, account: &Account) -> Result<()> {
    conn.execute(
        "DELETE FROM account_roles WHERE account_id = ?1",
        params![account.id.to_string()],
    )?;

    let roles = RoleStore::new(conn);
    for role in &account.roles {
        if roles.find(&role.identifier)?.is_none() {
            return Err(Error::NotFound(format!("role {}", role.identifier)));
        }

        conn.execute(
            "INSERT INTO account_roles (account_id, role_identifier) VALUES (?1, ?2)",
            params![account.id.to_string(), role.identifier],
        )?;
    }

    Ok(())
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        account_identifier: row.get(2)?,
        authentication_provider_name: row.get(3)?,
        credentials_source: row.get(4)?,
        roles: Vec::new(),
        expiration_date: parse_datetime_opt(row.get::<_, Option<String>>(5)?)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
    })
}
