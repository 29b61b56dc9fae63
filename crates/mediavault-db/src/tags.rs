//! Tag repository. Tags are name-unique and shared across assets.

use mediavault_core::models::Tag;
use mediavault_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve tag names to rows, creating missing ones. Names are
    /// case-sensitive; a concurrent insert of the same name wins and the
    /// existing row is returned (first-seen-wins).
    pub async fn ensure(&self, names: &[String]) -> Result<Vec<Tag>, AppError> {
        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            let tag = sqlx::query_as::<_, Tag>(
                r#"
                INSERT INTO tags (id, name)
                VALUES ($1, $2)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
            tags.push(tag);
        }
        Ok(tags)
    }

    pub async fn attach(&self, media_id: Uuid, tags: &[Tag]) -> Result<(), AppError> {
        for tag in tags {
            sqlx::query(
                r#"
                INSERT INTO media_tags (media_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(media_id)
            .bind(tag.id)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub async fn tags_for(&self, media_id: Uuid) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN media_tags mt ON mt.tag_id = t.id
            WHERE mt.media_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(media_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }
}
