//! Session identity.
//!
//! Sign-in happens outside this crate. Its result is captured in a
//! [`SessionContext`] value that is handed to whatever needs the user id.

use crate::config::DEFAULT_APP_ID;

/// Identity established by the auth bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    app_id: String,
    user_id: Option<String>,
}

impl SessionContext {
    /// No sign-in was possible (no backend configured, or sign-in failed)
    pub fn unauthenticated(app_id: Option<String>) -> Self {
        Self {
            app_id: resolve_app_id(app_id),
            user_id: None,
        }
    }

    /// Sign-in succeeded; `uid` is the backend's user id if it reported one.
    ///
    /// Without a uid a random one is generated for the session.
    pub fn signed_in(app_id: Option<String>, uid: Option<String>) -> Self {
        let user_id = uid
            .filter(|uid| !uid.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            app_id: resolve_app_id(app_id),
            user_id: Some(user_id),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// One-line status for the display layer
    pub fn status_line(&self) -> String {
        match &self.user_id {
            Some(id) => format!("User ID: {}", id),
            None => "Authentication Failed.".to_string(),
        }
    }
}

fn resolve_app_id(app_id: Option<String>) -> String {
    app_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_APP_ID.to_string())
}
