use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::db::{PostRepository, UserRepository};
use crate::error::ApiError;
use crate::models::{Post, PostDocument, User};

/// In-process store with the same constraints as the Postgres schema
/// (unique email). Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User, ApiError> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.email == user.email) {
            return Err(ApiError::conflict("Email address already exists"));
        }

        users.insert(user.id, user.clone());
        info!("Created user with id: {}", user.id);
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let posts = self.posts.read().await;
        let mut list: Vec<Post> = posts.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn create_post(&self, post: Post) -> Result<Post, ApiError> {
        self.posts.write().await.insert(post.id, post.clone());
        info!("Created post with id: {}", post.id);
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, changes: PostDocument) -> Result<Post, ApiError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found(format!("Post with id {}", id)))?;

        post.apply(changes);
        info!("Updated post with id: {}", id);
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), ApiError> {
        match self.posts.write().await.remove(&id) {
            Some(_) => {
                info!("Deleted post with id: {}", id);
                Ok(())
            }
            None => Err(ApiError::not_found(format!("Post with id {}", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> PostDocument {
        serde_json::from_value(value).expect("valid document")
    }

    fn user(email: &str) -> User {
        User::new("Test".to_string(), email.to_string(), "$argon2id$stub".to_string())
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(user("a@example.com")).await.expect("first insert");

        let result = store.create_user(user("a@example.com")).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let store = MemoryStore::new();
        let created = store.create_user(user("b@example.com")).await.unwrap();

        let found = store.find_user_by_email("b@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));
        assert!(store.find_user_by_email("missing@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_lifecycle() {
        let store = MemoryStore::new();
        let post = store
            .create_post(Post::new(document(json!({"title": "First"}))))
            .await
            .unwrap();

        let updated = store
            .update_post(post.id, document(json!({"title": "Edited", "pinned": true})))
            .await
            .unwrap();
        assert_eq!(updated.fields["title"], "Edited");
        assert_eq!(updated.fields["pinned"], true);

        assert_eq!(store.list_posts().await.unwrap().len(), 1);

        store.delete_post(post.id).await.unwrap();
        assert!(store.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(
            store.update_post(id, document(json!({"a": 1}))).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(store.delete_post(id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_posts_listed_newest_first() {
        let store = MemoryStore::new();
        let older = store.create_post(Post::new(document(json!({"n": 1})))).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = store.create_post(Post::new(document(json!({"n": 2})))).await.unwrap();

        let ids: Vec<Uuid> = store.list_posts().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
