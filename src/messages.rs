//! User-facing response messages.
//!
//! Centralized so the API answers with consistent text everywhere.

pub const USERNAME_REQUIREMENTS: &str = "Username must be between 5 and 50 characters.";
pub const PASSWORD_REQUIREMENTS: &str =
    "Password must be at least 8 characters long and include digits, uppercase, and lowercase letters.";

pub const USER_NOT_FOUND: &str = "User not found";
pub const INVALID_PASSWORD: &str = "Invalid password";
pub const AUTH_SUCCESSFUL: &str = "Authentication successful";
pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful";
pub const USER_ALREADY_EXISTS: &str = "User already exists";
pub const CREDENTIALS_REQUIRED: &str = "Login and password are required";

pub const REFRESH_TOKEN_MISSING: &str = "Refresh token is missing";
pub const TOKEN_LOGGED_OUT: &str = "This token is no longer active (logged out)";
pub const TOKEN_INVALID: &str = "This token is no longer valid (invalid or expired)";
pub const LOGOUT_SUCCESSFUL: &str = "Logout successful. Token blacklisted.";

pub const INVALID_URL: &str = "The provided URL is not valid.";
pub const URL_NOT_FOUND: &str = "The requested URL was not found.";
pub const EXPIRED_URL: &str = "The URL has expired.";
pub const INVALID_EXPIRATION_DATE: &str = "Expiration date cannot be in the past.";
pub const URL_CREATED: &str = "URL has been successfully created.";
pub const URL_UPDATED: &str = "URL has been successfully updated.";
pub const URL_DELETED: &str = "URL has been successfully deleted.";
pub const LINK_FOUND: &str = "Link found";
pub const FOREIGN_LINK: &str = "Access denied to this link";

pub const NOTE_NOT_FOUND: &str = "Note not found";
pub const NOTE_ACCESS_DENIED: &str = "Access denied";
pub const NOTE_CREATED: &str = "Note created";
pub const NOTE_UPDATED: &str = "Note updated";
pub const NOTE_DELETED: &str = "Note deleted";
pub const NOTE_FOUND: &str = "Note found";
pub const NOTE_LIST: &str = "Note list";

pub const NO_URLS_FOUND: &str = "No URLs found";
pub const NO_ACTIVE_URLS_FOUND: &str = "No active URLs found";

pub const INTERNAL_ERROR: &str = "Internal server error. Please try again later.";
pub const V2_UNDER_DEVELOPMENT: &str = "Version 2 is currently under development.";
