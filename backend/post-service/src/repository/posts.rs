use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geo_core::Point;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{ItemKind, NewPost, Post, PostCategory};
use crate::repository::PostStore;
use crate::services::feed::BoundsQuery;

/// Postgres-backed post store
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    post_type: String,
    item_kind: Option<String>,
    content: String,
    lng: f64,
    lat: f64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    idempotency_key: String,
    report_count: i32,
    hidden: bool,
}

impl TryFrom<PostRow> for Post {
    type Error = AppError;

    fn try_from(row: PostRow) -> Result<Self> {
        let category = PostCategory::from_slug(&row.post_type).ok_or_else(|| {
            AppError::StoreUnavailable(format!("unknown post_type '{}'", row.post_type))
        })?;
        let item_kind = match row.item_kind.as_deref() {
            Some(slug) => Some(ItemKind::from_slug(slug).ok_or_else(|| {
                AppError::StoreUnavailable(format!("unknown item_kind '{}'", slug))
            })?),
            None => None,
        };
        let location = Point::new(row.lng, row.lat)
            .map_err(|err| AppError::StoreUnavailable(err.to_string()))?;

        Ok(Post {
            id: row.id,
            author_id: row.author_id,
            category,
            item_kind,
            content: row.content,
            location,
            created_at: row.created_at,
            expires_at: row.expires_at,
            idempotency_key: row.idempotency_key,
            report_count: row.report_count,
            hidden: row.hidden,
        })
    }
}

const POST_COLUMNS: &str = "id, author_id, post_type, item_kind, content, lng, lat, \
                            created_at, expires_at, idempotency_key, report_count, hidden";

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let inserted = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts (id, author_id, post_type, item_kind, content, lng, lat, expires_at, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (idempotency_key) DO NOTHING
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(post.author_id)
        .bind(post.category.as_str())
        .bind(post.item_kind.map(|k| k.as_str()))
        .bind(&post.content)
        .bind(post.location.lng)
        .bind(post.location.lat)
        .bind(post.expires_at)
        .bind(&post.idempotency_key)
        .fetch_optional(&self.pool)
        .await?;

        let row = match inserted {
            Some(row) => row,
            // Retried submission: hand back the row the first attempt wrote.
            None => {
                sqlx::query_as::<_, PostRow>(&format!(
                    r#"
                    SELECT {POST_COLUMNS}
                    FROM posts
                    WHERE idempotency_key = $1
                    "#
                ))
                .bind(&post.idempotency_key)
                .fetch_one(&self.pool)
                .await?
            }
        };

        row.try_into()
    }

    async fn posts_in_bounds(&self, query: &BoundsQuery) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE lng > $1 AND lng < $2
              AND lat > $3 AND lat < $4
              AND hidden = FALSE
              AND expires_at > NOW()
            ORDER BY created_at DESC
            "#
        ))
        .bind(query.sw_lng)
        .bind(query.ne_lng)
        .bind(query.sw_lat)
        .bind(query.ne_lat)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Post::try_from).collect()
    }
}
