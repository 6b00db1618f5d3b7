use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - the identity that owns posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            first_name: String::new(),
            last_name: String::new(),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_name(mut self, first_name: String, last_name: String) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    /// First and last name, falling back to the username when both are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let user = User::new("leo".into(), "leo@example.com".into(), "hash".into());
        assert_eq!(user.display_name(), "leo");

        let user = user.with_name("Leo".into(), "Tolstoy".into());
        assert_eq!(user.display_name(), "Leo Tolstoy");
    }
}
