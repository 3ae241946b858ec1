/// The authenticated caller, attached to the request by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// The ID of the user this session belongs to.
    pub user_id: i32,
}
