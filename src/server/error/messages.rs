
//! Common error messages, as constants to be reused by endpoints.

pub const NOT_FOUND: &str = "Not Found";
pub const BAD_REQUEST: &str = "Bad Request";
pub const UNAUTHORIZED: &str = "Authentication credentials were not provided.";
pub const INVALID_CREDENTIALS: &str = "Invalid username or API key.";
pub const INVALID_TOKEN: &str = "Invalid or expired token.";
pub const FORBIDDEN: &str = "You do not have permission to perform this action.";
pub const THROTTLED: &str = "Request was throttled.";
pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NAME_TAKEN: &str = "An entry with this name already exists.";
