/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (signup, login)
/// - `todos`: Todo CRUD, filtering, and notes
/// - `tags`: Tag registry CRUD
/// - `users`: User directory and profiles

pub mod auth;
pub mod health;
pub mod tags;
pub mod todos;
pub mod users;
