//! Command line interface and command handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keyward_core::{
    FlashMessage, Overview, PersonName, Role, RoleRepository, User, UserManagement,
    UserRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "keyward", version, about = "Activate and deactivate platform user accounts")]
pub struct Cli {
    /// Config file (defaults to keyward.toml in the user config directory)
    #[arg(long, global = true, env = "KEYWARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true, env = "KEYWARD_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List users, active ones first
    Users {
        #[arg(long)]
        json: bool,
    },
    /// List roles
    Roles {
        #[arg(long)]
        json: bool,
    },
    /// Activate every account of a user
    ActivateUser { user_id: Uuid },
    /// Deactivate every account of a user
    DeactivateUser { user_id: Uuid },
    /// Activate all users holding a role
    ActivateRole { role: String },
    /// Deactivate all users holding a role
    DeactivateRole { role: String },
    /// Manage roles
    #[command(subcommand)]
    Role(RoleCommand),
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Open a session; the logged-in account is protected from deactivation
    Login {
        account: String,
        #[arg(long, env = "KEYWARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Close the current session
    Logout,
}

#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// Register a role, e.g. `Keyward.Backend:Editor`
    Add { identifier: String },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user with one account
    Add {
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        /// Login name of the account
        #[arg(long)]
        account: String,
        #[arg(long, env = "KEYWARD_PASSWORD", hide_env_values = true)]
        password: String,
        /// Role identifier; repeat for several
        #[arg(long = "role")]
        roles: Vec<String>,
    },
}

/// Run a command and return what should be printed
pub fn run(state: &AppState, command: Command) -> Result<String> {
    let security = state.security_context()?;
    let management = UserManagement::new(&state.db, &security);

    let output = match command {
        Command::Users { json } => {
            let overview = management.overview()?;
            if json {
                serde_json::to_string_pretty(&overview)?
            } else {
                render_users(&overview)
            }
        }
        Command::Roles { json } => {
            let overview = management.overview()?;
            if json {
                serde_json::to_string_pretty(&overview.roles)?
            } else {
                render_roles(&overview)
            }
        }
        Command::ActivateUser { user_id } => confirm(management.activate_user(user_id)?),
        Command::DeactivateUser { user_id } => confirm(management.deactivate_user(user_id)?),
        Command::ActivateRole { role } => confirm(management.activate_users_by_role(&role)?),
        Command::DeactivateRole { role } => {
            confirm(management.deactivate_users_by_role(&role)?)
        }
        Command::Role(RoleCommand::Add { identifier }) => {
            state.db.create_role(&Role::new(identifier.as_str()))?;
            format!("Role \"{identifier}\" was added!")
        }
        Command::User(UserCommand::Add {
            first,
            last,
            account,
            password,
            roles,
        }) => {
            let mut user = User::new(PersonName::new(first, last));
            let new_account = user.add_account(account, auth::hash_password(&password)?);
            for role in roles {
                new_account.add_role(Role::new(role));
            }
            state.db.create_user(&user)?;
            info!(user_id = %user.id, "User created");
            format!("User \"{}\" was added with id {}!", user.label(), user.id)
        }
        Command::Login { account, password } => {
            auth::login(state, &account, &password)?;
            format!("Logged in as \"{account}\"")
        }
        Command::Logout => {
            auth::logout(state)?;
            "Logged out".to_string()
        }
    };

    Ok(output)
}

fn confirm(message: FlashMessage) -> String {
    message.to_string()
}

/// Plain-text user table; `*` marks the logged-in user
pub fn render_users(overview: &Overview) -> String {
    let current = overview.current_user.as_ref().map(|u| u.id);
    let mut out = String::new();

    for user in &overview.users {
        let marker = if Some(user.id) == current { "*" } else { " " };
        let state = if user.is_active() { "active" } else { "inactive" };
        out.push_str(&format!(
            "{marker} {:<8} {}  {}\n",
            state,
            user.id,
            user.label()
        ));

        for account in &user.accounts {
            let roles: Vec<&str> = account.roles.iter().map(|r| r.identifier.as_str()).collect();
            let expires = match account.expiration_date {
                Some(at) => format!("expires {}", at.format("%Y-%m-%d %H:%M:%S")),
                None => "never expires".to_string(),
            };
            out.push_str(&format!(
                "      {} [{}] {}\n",
                account.account_identifier,
                roles.join(", "),
                expires
            ));
        }
    }

    if overview.users.is_empty() {
        out.push_str("No users\n");
    }
    out
}

pub fn render_roles(overview: &Overview) -> String {
    let mut out = String::new();
    for role in &overview.roles {
        out.push_str(&format!("{:<24} {}\n", role.name(), role.identifier));
    }
    if overview.roles.is_empty() {
        out.push_str("No roles\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_core::{AccountRepository, SessionRepository};

    const EDITOR: &str = "Keyward.Backend:Editor";

    fn setup_state(dir: &tempfile::TempDir) -> AppState {
        let state = AppState::in_memory(&dir.path().join("session")).unwrap();
        run(&state, Command::Role(RoleCommand::Add { identifier: EDITOR.into() })).unwrap();
        state
    }

    fn add_user(state: &AppState, first: &str, login: &str) -> Uuid {
        run(
            state,
            Command::User(UserCommand::Add {
                first: first.into(),
                last: "Tester".into(),
                account: login.into(),
                password: "secret".into(),
                roles: vec![EDITOR.into()],
            }),
        )
        .unwrap();
        state
            .db
            .find_account_by_identifier(login)
            .unwrap()
            .unwrap()
            .user_id
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from(["keyward", "deactivate-role", EDITOR]).unwrap();
        assert!(matches!(cli.command, Command::DeactivateRole { role } if role == EDITOR));

        let cli = Cli::try_parse_from([
            "keyward", "user", "add", "--first", "Ada", "--last", "Lovelace", "--account", "ada",
            "--password", "pw", "--role", EDITOR, "--role", "Keyward.Backend:Administrator",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::User(UserCommand::Add { roles, .. }) if roles.len() == 2));

        assert!(Cli::try_parse_from(["keyward", "activate-user", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_role_deactivation_spares_logged_in_operator() {
        let dir = tempfile::tempdir().unwrap();
        let state = setup_state(&dir);
        let ada = add_user(&state, "Ada", "ada");
        let grace = add_user(&state, "Grace", "grace");

        run(
            &state,
            Command::Login {
                account: "ada".into(),
                password: "secret".into(),
            },
        )
        .unwrap();

        let output = run(&state, Command::DeactivateRole { role: EDITOR.into() }).unwrap();
        assert_eq!(output, "Users with Role \"Keyward.Backend:Editor\" were deactivated!");

        assert!(state.db.find_user_by_id(ada).unwrap().unwrap().is_active());
        assert!(!state.db.find_user_by_id(grace).unwrap().unwrap().is_active());
    }

    #[test]
    fn test_user_commands_confirm_with_label() {
        let dir = tempfile::tempdir().unwrap();
        let state = setup_state(&dir);
        let ada = add_user(&state, "Ada", "ada");

        let output = run(&state, Command::DeactivateUser { user_id: ada }).unwrap();
        assert_eq!(output, "User \"Ada Tester\" was deactivated!");

        let output = run(&state, Command::ActivateUser { user_id: ada }).unwrap();
        assert_eq!(output, "User \"Ada Tester\" was activated!");
        assert!(state.db.find_user_by_id(ada).unwrap().unwrap().is_active());
    }

    #[test]
    fn test_listing_marks_current_user_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = setup_state(&dir);
        add_user(&state, "Ada", "ada");
        let grace = add_user(&state, "Grace", "grace");
        run(&state, Command::DeactivateUser { user_id: grace }).unwrap();
        auth::login(&state, "ada", "secret").unwrap();

        let output = run(&state, Command::Users { json: false }).unwrap();
        let lines: Vec<&str> = output.lines().filter(|l| !l.starts_with("      ")).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("* active"));
        assert!(lines[0].ends_with("Ada Tester"));
        assert!(lines[1].starts_with("  inactive"));
        assert!(output.contains("expires 2000-01-01 00:00:00"));

        let json = run(&state, Command::Users { json: true }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["users"].as_array().map(|u| u.len()), Some(2));
        assert!(!json.contains("argon2"));

        let roles = run(&state, Command::Roles { json: false }).unwrap();
        assert!(roles.starts_with("Editor"));
    }

    #[test]
    fn test_logout_closes_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = setup_state(&dir);
        add_user(&state, "Ada", "ada");
        let session = auth::login(&state, "ada", "secret").unwrap();

        run(&state, Command::Logout).unwrap();
        assert!(state.db.find_valid_session(session.id).unwrap().is_none());
    }

    #[test]
    fn test_empty_listings_say_so() {
        let overview = Overview {
            current_user: None,
            users: Vec::new(),
            roles: Vec::new(),
        };
        assert_eq!(render_users(&overview), "No users\n");
        assert_eq!(render_roles(&overview), "No roles\n");
    }

    #[test]
    fn test_role_lines_end_with_newline() {
        let overview = Overview {
            current_user: None,
            users: Vec::new(),
            roles: vec![Role::new(EDITOR)],
        };
        assert_eq!(
            render_roles(&overview),
            format!("{:<24} {}\n", "Editor", EDITOR)
        );
    }
}
