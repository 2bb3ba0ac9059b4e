//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{Account, User};

/// Validate that an account is internally consistent
pub fn assert_account_invariants(account: &Account) {
    debug_assert!(
        account.user_id != Uuid::nil(),
        "Account {} has nil user_id",
        account.id
    );

    debug_assert!(
        !account.account_identifier.trim().is_empty(),
        "Account {} has empty identifier",
        account.id
    );

    // Each role is assigned at most once
    for (i, role) in account.roles.iter().enumerate() {
        debug_assert!(
            !account.roles[..i].contains(role),
            "Account {} has role {} twice",
            account.id,
            role
        );
    }
}

/// Validate that a user owns every account attached to it
pub fn assert_user_invariants(user: &User) {
    for account in &user.accounts {
        debug_assert!(
            account.user_id == user.id,
            "User {} holds account {} owned by {}",
            user.id,
            account.id,
            account.user_id
        );
    }
}
