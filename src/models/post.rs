use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Keys owned by the store; clients cannot set them.
const RESERVED_KEYS: [&str; 3] = ["id", "created_at", "updated_at"];

/// A schema-less post. Everything except the store-assigned identifier and
/// timestamps is kept verbatim and flattened into the JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a post. Must be a JSON object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PostDocument {
    fields: Map<String, Value>,
}

impl Post {
    pub fn new(document: PostDocument) -> Self {
        let now = Utc::now();

        Post {
            id: Uuid::new_v4(),
            fields: document.into_fields(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow merge: top-level keys in `changes` replace existing ones.
    pub fn apply(&mut self, changes: PostDocument) {
        self.fields.extend(changes.into_fields());
        self.updated_at = Utc::now();
    }
}

impl PostDocument {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn validate_for_create(&self) -> Result<(), String> {
        if self.fields.is_empty() {
            return Err("Post document cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn validate_for_update(&self) -> Result<(), String> {
        if self.fields.is_empty() {
            return Err("At least one field must be provided for update".to_string());
        }
        Ok(())
    }

    /// Drops `id`, `created_at` and `updated_at` from client input.
    pub fn without_reserved_keys(mut self) -> Self {
        for key in RESERVED_KEYS {
            self.fields.remove(key);
        }
        self
    }
}

/// Parses a post identifier from a path segment.
pub fn parse_post_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| "Invalid post ID format".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> PostDocument {
        serde_json::from_value::<PostDocument>(value)
            .expect("Failed to deserialize document")
            .without_reserved_keys()
    }

    #[test]
    fn test_post_creation_keeps_fields() {
        let post = Post::new(document(json!({"title": "Hello", "tags": ["a", "b"]})));

        assert_ne!(post.id, Uuid::nil());
        assert_eq!(post.fields["title"], "Hello");
        assert_eq!(post.fields["tags"], json!(["a", "b"]));
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_reserved_keys_are_stripped() {
        let doc = document(json!({
            "id": "client-chosen",
            "created_at": "yesterday",
            "updated_at": "today",
            "title": "Hi"
        }));

        assert_eq!(doc.fields().len(), 1);
        assert!(doc.fields().contains_key("title"));
    }

    #[test]
    fn test_apply_merges_top_level_keys() {
        let mut post = Post::new(document(json!({"title": "Old", "body": "Text"})));
        let created_at = post.created_at;

        std::thread::sleep(std::time::Duration::from_millis(2));
        post.apply(document(json!({"title": "New", "draft": null})));

        assert_eq!(post.fields["title"], "New");
        assert_eq!(post.fields["body"], "Text");
        assert_eq!(post.fields["draft"], Value::Null);
        assert_eq!(post.created_at, created_at);
        assert!(post.updated_at > created_at);
    }

    #[test]
    fn test_document_must_be_an_object() {
        assert!(serde_json::from_value::<PostDocument>(json!(["not", "an", "object"])).is_err());
        assert!(serde_json::from_value::<PostDocument>(json!("text")).is_err());
    }

    #[test]
    fn test_empty_documents_are_rejected() {
        let empty = document(json!({}));
        assert!(empty.validate_for_create().is_err());
        assert!(empty.validate_for_update().is_err());

        let only_reserved = document(json!({"id": "x"}));
        assert!(only_reserved.validate_for_create().is_err());
    }

    #[test]
    fn test_post_serialization_flattens_fields() {
        let post = Post {
            id: Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap(),
            fields: document(json!({"title": "Test Post"})).into_fields(),
            created_at: DateTime::parse_from_rfc3339("2022-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339("2022-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
        };

        let json = serde_json::to_value(&post).expect("Failed to serialize post");
        assert_eq!(
            json,
            json!({
                "id": "123e4567-e89b-12d3-a456-426614174000",
                "title": "Test Post",
                "created_at": "2022-01-01T00:00:00Z",
                "updated_at": "2022-01-01T00:00:00Z"
            })
        );

        let back: Post = serde_json::from_value(json).expect("Failed to deserialize post");
        assert_eq!(back, post);
    }

    #[test]
    fn test_parse_post_id() {
        assert!(parse_post_id("123e4567-e89b-12d3-a456-426614174000").is_ok());
        assert!(parse_post_id("not-a-uuid").is_err());
        assert!(parse_post_id("").is_err());
    }
}
