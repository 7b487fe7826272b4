// session.rs

use crate::entities::{Entity, User};
use crate::error::AppError;

/// The authenticated identity for this run, established once at sign-in and
/// handed to every page controller rather than re-derived per page.
#[derive(Clone, Debug)]
pub struct Session {
    user: User,
    access_token: String,
}

impl Session {
    pub fn new(user: User, access_token: String) -> Self {
        Self { user, access_token }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> &str {
        self.user.email.as_deref().unwrap_or("")
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Client-side ownership check gating every update and delete. A mismatch
    /// aborts the action before any remote call; the backend's row-level
    /// security remains the authoritative enforcement.
    pub fn ensure_owner(
        &self,
        entity: &impl Entity,
        action: &'static str,
        kind: &'static str,
    ) -> Result<(), AppError> {
        if entity.owner_id() == self.user_id() {
            Ok(())
        } else {
            Err(AppError::Ownership { action, kind })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PlannerEntry;
    use chrono::NaiveDate;

    fn entry_owned_by(user_id: &str) -> PlannerEntry {
        PlannerEntry {
            id: "e1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            content: "plan".to_string(),
            emoji: "📝".to_string(),
            user_id: user_id.to_string(),
            user_email: String::new(),
        }
    }

    fn session_for(user_id: &str) -> Session {
        Session::new(
            User {
                id: user_id.to_string(),
                email: Some(format!("{user_id}@example.com")),
            },
            "token".to_string(),
        )
    }

    #[test]
    fn owner_passes_the_guard() {
        let session = session_for("alice");
        assert!(
            session
                .ensure_owner(&entry_owned_by("alice"), "edit", "entries")
                .is_ok()
        );
    }

    #[test]
    fn non_owner_is_rejected() {
        let session = session_for("bob");
        let err = session
            .ensure_owner(&entry_owned_by("alice"), "delete", "entries")
            .unwrap_err();
        assert_eq!(err.to_string(), "you can only delete your own entries");
    }
}
