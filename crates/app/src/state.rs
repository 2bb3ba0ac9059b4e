//! Application state management

use std::path::Path;

use keyward_core::{Database, SessionContext};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;

/// Database handle plus the session carried between invocations
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.database.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database)?;
        Ok(Self { db, config })
    }

    #[cfg(test)]
    pub fn in_memory(session_file: &Path) -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
            config: Config {
                database: ":memory:".into(),
                session_file: session_file.to_path_buf(),
                log_filter: String::new(),
                session_hours: 1,
            },
        })
    }

    /// Session id stored by the last `login`, if any
    pub fn current_session_id(&self) -> Option<Uuid> {
        read_session_file(&self.config.session_file)
    }

    pub fn set_current_session(&self, session_id: Option<Uuid>) -> Result<()> {
        let path = &self.config.session_file;
        match session_id {
            Some(id) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, id.to_string())?;
            }
            None => {
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
            }
        }
        Ok(())
    }

    /// Security context for this invocation
    pub fn security_context(&self) -> Result<SessionContext> {
        let Some(session_id) = self.current_session_id() else {
            return Ok(SessionContext::default());
        };

        let context = SessionContext::resolve(&self.db, session_id)?;
        if context.session().is_none() {
            warn!(%session_id, "Stored session is no longer valid; run `keyward login` again");
        }
        Ok(context)
    }
}

fn read_session_file(path: &Path) -> Option<Uuid> {
    let contents = std::fs::read_to_string(path).ok()?;
    match Uuid::parse_str(contents.trim()) {
        Ok(id) => Some(id),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Ignoring malformed session file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_core::SecurityContext;

    #[test]
    fn test_session_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::in_memory(&dir.path().join("nested/session")).unwrap();
        assert_eq!(state.current_session_id(), None);

        let id = Uuid::new_v4();
        state.set_current_session(Some(id)).unwrap();
        assert_eq!(state.current_session_id(), Some(id));

        state.set_current_session(None).unwrap();
        assert_eq!(state.current_session_id(), None);
    }

    #[test]
    fn test_malformed_session_file_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        std::fs::write(&path, "garbage").unwrap();

        let state = AppState::in_memory(&path).unwrap();
        assert_eq!(state.current_session_id(), None);
        assert!(!state.security_context().unwrap().is_initialized());
    }

    #[test]
    fn test_on_disk_state_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database: dir.path().join("data/keyward.db"),
            session_file: dir.path().join("data/session"),
            log_filter: String::new(),
            session_hours: 1,
        };

        AppState::new(config).unwrap();
        assert!(dir.path().join("data/keyward.db").exists());
    }
}
