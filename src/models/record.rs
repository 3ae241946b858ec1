use serde::Serialize;

/// A user a record is shared to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grantee {
    /// The grantee's user ID.
    pub id: i32,
    /// The grantee's display name.
    pub name: String,
}

/// A record as seen by one requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// The unique identifier for the record.
    pub id: i32,
    /// The description followed by the duration, e.g. `test music (00:04:00)`.
    pub name: String,
    /// Whether the requester owns the record.
    pub is_owner: bool,
    /// The ID of the owning user.
    pub owner_id: i32,
    /// The owner's display name.
    pub owner_name: String,
    /// Every user the record is currently shared to, ordered by display name.
    pub shared_to: Vec<Grantee>,
}

/// One page of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPage {
    /// Number of records visible to the requester, independent of the page window.
    pub total_count: i64,
    /// The records of the requested window.
    pub records: Vec<Record>,
}

/// Metadata needed to serve a record's content.
#[derive(Debug, Clone)]
pub struct FileRef {
    pub description: String,
    pub file_handle: String,
    pub mime_type: Option<String>,
    pub checksum: String,
    pub size_bytes: i64,
}

/// A record about to be inserted.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub owner_id: i32,
    pub file_handle: String,
    pub description: String,
    /// `HH:MM:SS` or any other PostgreSQL interval literal; `None` stores zero.
    pub duration: Option<String>,
    pub mime_type: Option<String>,
    pub checksum: String,
    pub size_bytes: i64,
}
