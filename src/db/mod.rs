// Persistence boundary for users and posts

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Post, PostDocument, User};

pub use memory::MemoryStore;
pub use postgres::Database;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user. A duplicate email is a `Conflict`.
    async fn create_user(&self, user: User) -> Result<User, ApiError>;

    /// Looks up a user by normalised email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, ApiError>;

    async fn create_post(&self, post: Post) -> Result<Post, ApiError>;

    /// Shallow-merges `changes` into the stored document and returns the
    /// updated post.
    async fn update_post(&self, id: Uuid, changes: PostDocument) -> Result<Post, ApiError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), ApiError>;
}
