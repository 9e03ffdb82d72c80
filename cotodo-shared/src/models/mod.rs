/// Database models for cotodo
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, public profiles, mention resolution
/// - `tag`: Global tag registry with creator-only mutation
/// - `todo`: Todo items, the authorized list query builder, hydrated views
/// - `note`: Append-only notes attached to todos
///
/// # Example
///
/// ```no_run
/// use cotodo_shared::models::user::{CreateUser, User};
/// use cotodo_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Alice".to_string(),
///     email: "alice@example.com".to_string(),
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     avatar_url: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod note;
pub mod tag;
pub mod todo;
pub mod user;
