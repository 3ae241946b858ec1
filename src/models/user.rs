use serde::Serialize;

/// Represents a user in the system.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i32,
    /// The user's login, unique across the system.
    pub login: String,
    /// The user's display name. May be empty.
    pub name: String,
    /// The user's Argon2id password hash (PHC string).
    pub password: String,
}

impl User {
    /// The name shown to other users: the display name, or the login when that is empty.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.login
        } else {
            &self.name
        }
    }
}

/// An entry of the user directory.
#[derive(Debug, Clone, Serialize)]
pub struct UserListItem {
    pub id: i32,
    pub login: String,
    pub name: String,
}

/// The user directory page.
#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<UserListItem>,
}

/// An owner that shares at least one record, with the number of shared records.
#[derive(Debug, Clone, Serialize)]
pub struct SharingUser {
    pub id: i32,
    pub name: String,
    pub shared_records: i64,
}

/// The shared-by page.
#[derive(Debug, Serialize)]
pub struct SharingUserList {
    pub total_count: i64,
    pub users: Vec<SharingUser>,
}
