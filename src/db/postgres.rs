use async_trait::async_trait;
use deadpool_postgres::{Config, Object, Pool, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use serde_json::{Map, Value};
use tokio_postgres::Row;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::db::{PostRepository, UserRepository};
use crate::error::ApiError;
use crate::models::{Post, PostDocument, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";
const POST_COLUMNS: &str = "id, document, created_at, updated_at";

/// Postgres-backed store built on a deadpool connection pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Builds the pool and checks that a connection can be made.
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);
        pg_config.connect_timeout = Some(config.connection_timeout);

        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => deadpool_postgres::SslMode::Disable,
            "allow" | "prefer" => deadpool_postgres::SslMode::Prefer,
            "require" | "verify-ca" | "verify-full" => deadpool_postgres::SslMode::Require,
            other => {
                warn!("Unknown SSL mode '{}', defaulting to 'require'", other);
                deadpool_postgres::SslMode::Require
            }
        });

        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        let mut pool_config = deadpool_postgres::PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder()
            .build()
            .map_err(|e| {
                error!("Failed to create TLS connector: {}", e);
                ApiError::Database(format!("TLS connector creation failed: {}", e))
            })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                ApiError::Database(format!("Connection pool creation failed: {}", e))
            })
    }

    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    pub async fn health_check(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database health check failed: {}", e);
                ApiError::Database(format!("Health check failed: {}", e))
            })?;

        Ok(())
    }

    async fn test_connection(&self) -> Result<(), ApiError> {
        self.health_check().await?;
        info!("Database connection test successful");
        Ok(())
    }

    /// Creates the `users` and `posts` tables if they do not exist.
    pub async fn migrate(&self) -> Result<(), ApiError> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        let statements = [
            (
                "users table",
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id UUID PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    email VARCHAR(255) UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "posts table",
                r#"
                CREATE TABLE IF NOT EXISTS posts (
                    id UUID PRIMARY KEY,
                    document JSONB NOT NULL DEFAULT '{}'::jsonb,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "posts created_at index",
                "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at DESC)",
            ),
        ];

        for (name, sql) in statements {
            client.execute(sql, &[])
                .await
                .map_err(|e| {
                    error!("Failed to create {}: {}", name, e);
                    ApiError::Database(format!("Migration of {} failed: {}", name, e))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get(0),
        name: row.get(1),
        email: row.get(2),
        password_hash: row.get(3),
        created_at: row.get(4),
        updated_at: row.get(5),
    }
}

fn post_from_row(row: &Row) -> Post {
    let document: Value = row.get(1);
    let fields = match document {
        Value::Object(map) => map,
        other => {
            warn!("Post document is not an object, wrapping it: {}", other);
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };

    Post {
        id: row.get(0),
        fields,
        created_at: row.get(2),
        updated_at: row.get(3),
    }
}

#[async_trait]
impl UserRepository for Database {
    async fn create_user(&self, user: User) -> Result<User, ApiError> {
        let client = self.get_connection().await?;

        let query = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {cols}",
            cols = USER_COLUMNS
        );

        let row = client.query_one(
            &query,
            &[&user.id, &user.name, &user.email, &user.password_hash, &user.created_at, &user.updated_at]
        )
        .await
        .map_err(ApiError::from)?;

        let created_user = user_from_row(&row);
        info!("Created user with id: {}", created_user.id);
        Ok(created_user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let row = client.query_opt(&query, &[&email])
            .await
            .map_err(ApiError::from)?;

        Ok(row.as_ref().map(user_from_row))
    }
}

#[async_trait]
impl PostRepository for Database {
    async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM posts ORDER BY created_at DESC", POST_COLUMNS);

        let rows = client.query(&query, &[])
            .await
            .map_err(ApiError::from)?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn create_post(&self, post: Post) -> Result<Post, ApiError> {
        let client = self.get_connection().await?;

        let query = format!(
            "INSERT INTO posts ({cols}) VALUES ($1, $2, $3, $4) RETURNING {cols}",
            cols = POST_COLUMNS
        );
        let document = Value::Object(post.fields);

        let row = client.query_one(
            &query,
            &[&post.id, &document, &post.created_at, &post.updated_at]
        )
        .await
        .map_err(ApiError::from)?;

        let created_post = post_from_row(&row);
        info!("Created post with id: {}", created_post.id);
        Ok(created_post)
    }

    async fn update_post(&self, id: Uuid, changes: PostDocument) -> Result<Post, ApiError> {
        let client = self.get_connection().await?;

        // jsonb `||` replaces top-level keys and keeps the rest.
        let query = format!(
            "UPDATE posts SET document = document || $1::jsonb, updated_at = $2 WHERE id = $3 RETURNING {}",
            POST_COLUMNS
        );
        let changes = Value::Object(changes.into_fields());
        let updated_at = chrono::Utc::now();

        let row = client.query_opt(&query, &[&changes, &updated_at, &id])
            .await
            .map_err(ApiError::from)?;

        match row {
            Some(row) => {
                let updated_post = post_from_row(&row);
                info!("Updated post with id: {}", updated_post.id);
                Ok(updated_post)
            }
            None => Err(ApiError::NotFound(format!("Post with id {}", id))),
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        let rows_affected = client.execute("DELETE FROM posts WHERE id = $1", &[&id])
            .await
            .map_err(ApiError::from)?;

        if rows_affected == 0 {
            Err(ApiError::NotFound(format!("Post with id {}", id)))
        } else {
            info!("Deleted post with id: {}", id);
            Ok(())
        }
    }
}
