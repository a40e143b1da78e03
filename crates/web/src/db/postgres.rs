//! `PostgreSQL` store.
//!
//! Queries are checked at runtime (`sqlx::query_as`) so the crate builds
//! without a live database or prepared query metadata.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use ideabox_core::{
    CommentId, Email, IdeaId, IdeaNumber, IdeaStatus, NewComment, NewIdea, NewTag, Role, Slug,
    TagId, UserId,
};

use super::{IdeaStore, RepositoryError, TagStore, UserStore};
use crate::models::{Comment, Idea, IdeaResponse, Tag, User};

/// Store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a failed write: unique violations become `Conflict`, foreign key
/// violations `NotFound`.
fn write_error(e: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(e)
}

#[derive(sqlx::FromRow)]
struct IdeaRow {
    id: i32,
    number: i32,
    title: String,
    slug: String,
    description: String,
    user_id: i32,
    status: IdeaStatus,
    response_text: Option<String>,
    response_user_id: Option<i32>,
    responded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<IdeaRow> for Idea {
    fn from(row: IdeaRow) -> Self {
        let response = match (row.response_text, row.response_user_id, row.responded_at) {
            (Some(text), Some(user_id), Some(responded_at)) => Some(IdeaResponse {
                text,
                user_id: UserId::new(user_id),
                responded_at,
            }),
            _ => None,
        };

        Self {
            id: IdeaId::new(row.id),
            number: IdeaNumber::new(row.number),
            title: row.title,
            slug: Slug::from_stored(row.slug),
            description: row.description,
            user_id: UserId::new(row.user_id),
            status: row.status,
            response,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: Email,
    role: Role,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i32,
    idea_id: i32,
    content: String,
    user_id: i32,
    user_name: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::new(row.id),
            idea_id: IdeaId::new(row.idea_id),
            content: row.content,
            user_id: UserId::new(row.user_id),
            user_name: row.user_name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: i32,
    name: String,
    slug: String,
    color: String,
    is_public: bool,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: TagId::new(row.id),
            name: row.name,
            slug: Slug::from_stored(row.slug),
            color: row.color,
            is_public: row.is_public,
        }
    }
}

const IDEA_COLUMNS: &str = "id, number, title, slug, description, user_id, status, \
                            response_text, response_user_id, responded_at, created_at";

const USER_COLUMNS: &str = "id, name, email, role, created_at";

const TAG_COLUMNS: &str = "id, name, slug, color, is_public";

#[async_trait]
impl IdeaStore for PgStore {
    async fn add_idea(&self, user_id: UserId, idea: &NewIdea) -> Result<Idea, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serialise number assignment; readers are unaffected.
        sqlx::query("LOCK TABLE ideas IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, IdeaRow>(&format!(
            r"
            INSERT INTO ideas (number, title, slug, description, user_id)
            SELECT COALESCE(MAX(number), 0) + 1, $1, $2, $3, $4 FROM ideas
            RETURNING {IDEA_COLUMNS}
            "
        ))
        .bind(&idea.title)
        .bind(idea.slug().as_str())
        .bind(&idea.description)
        .bind(user_id.as_i32())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, "idea number already taken"))?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn get_idea_by_number(
        &self,
        number: IdeaNumber,
    ) -> Result<Option<Idea>, RepositoryError> {
        let row = sqlx::query_as::<_, IdeaRow>(&format!(
            "SELECT {IDEA_COLUMNS} FROM ideas WHERE number = $1"
        ))
        .bind(number.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Idea::from))
    }

    async fn recent_ideas(&self, limit: u32) -> Result<Vec<Idea>, RepositoryError> {
        let rows = sqlx::query_as::<_, IdeaRow>(&format!(
            "SELECT {IDEA_COLUMNS} FROM ideas ORDER BY number DESC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Idea::from).collect())
    }

    async fn update_idea(
        &self,
        number: IdeaNumber,
        idea: &NewIdea,
    ) -> Result<Idea, RepositoryError> {
        let row = sqlx::query_as::<_, IdeaRow>(&format!(
            r"
            UPDATE ideas SET title = $2, slug = $3, description = $4
            WHERE number = $1
            RETURNING {IDEA_COLUMNS}
            "
        ))
        .bind(number.as_i32())
        .bind(&idea.title)
        .bind(idea.slug().as_str())
        .bind(&idea.description)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Idea::from).ok_or(RepositoryError::NotFound)
    }

    async fn set_response(
        &self,
        number: IdeaNumber,
        user_id: UserId,
        status: IdeaStatus,
        text: &str,
    ) -> Result<Idea, RepositoryError> {
        let row = sqlx::query_as::<_, IdeaRow>(&format!(
            r"
            UPDATE ideas
            SET status = $2, response_text = $3, response_user_id = $4, responded_at = now()
            WHERE number = $1
            RETURNING {IDEA_COLUMNS}
            "
        ))
        .bind(number.as_i32())
        .bind(status)
        .bind(text)
        .bind(user_id.as_i32())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "response conflict"))?;

        row.map(Idea::from).ok_or(RepositoryError::NotFound)
    }

    async fn add_comment(
        &self,
        number: IdeaNumber,
        user_id: UserId,
        comment: &NewComment,
    ) -> Result<Comment, RepositoryError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r"
            WITH inserted AS (
                INSERT INTO comments (idea_id, content, user_id)
                SELECT id, $2, $3 FROM ideas WHERE number = $1
                RETURNING id, idea_id, content, user_id, created_at
            )
            SELECT inserted.id, inserted.idea_id, inserted.content, inserted.user_id,
                   users.name AS user_name, inserted.created_at
            FROM inserted JOIN users ON users.id = inserted.user_id
            ",
        )
        .bind(number.as_i32())
        .bind(&comment.content)
        .bind(user_id.as_i32())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "comment conflict"))?;

        row.map(Comment::from).ok_or(RepositoryError::NotFound)
    }

    async fn comments_for(&self, idea_id: IdeaId) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r"
            SELECT c.id, c.idea_id, c.content, c.user_id, u.name AS user_name, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.idea_id = $1
            ORDER BY c.id
            ",
        )
        .bind(idea_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}

#[async_trait]
impl TagStore for PgStore {
    async fn add_tag(&self, tag: &NewTag) -> Result<Tag, RepositoryError> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            r"
            INSERT INTO tags (name, slug, color, is_public)
            VALUES ($1, $2, $3, $4)
            RETURNING {TAG_COLUMNS}
            "
        ))
        .bind(&tag.name)
        .bind(tag.slug().as_str())
        .bind(&tag.color)
        .bind(tag.is_public)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "tag slug taken"))?;

        Ok(row.into())
    }

    async fn update_tag(&self, id: TagId, tag: &NewTag) -> Result<Tag, RepositoryError> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            r"
            UPDATE tags SET name = $2, slug = $3, color = $4, is_public = $5
            WHERE id = $1
            RETURNING {TAG_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&tag.name)
        .bind(tag.slug().as_str())
        .bind(&tag.color)
        .bind(tag.is_public)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "tag slug taken"))?;

        row.map(Tag::from).ok_or(RepositoryError::NotFound)
    }

    async fn remove_tag(&self, id: TagId) -> Result<(), RepositoryError> {
        // Assignments go with the tag (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get_tag_by_slug(&self, slug: &Slug) -> Result<Option<Tag>, RepositoryError> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Tag::from))
    }

    async fn all_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        let rows = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn assign_tag(
        &self,
        tag_id: TagId,
        idea_id: IdeaId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO idea_tags (tag_id, idea_id, created_by_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (tag_id, idea_id) DO NOTHING
            ",
        )
        .bind(tag_id.as_i32())
        .bind(idea_id.as_i32())
        .bind(user_id.as_i32())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "tag already assigned"))?;

        Ok(())
    }

    async fn unassign_tag(&self, tag_id: TagId, idea_id: IdeaId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM idea_tags WHERE tag_id = $1 AND idea_id = $2")
            .bind(tag_id.as_i32())
            .bind(idea_id.as_i32())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn assigned_tags(&self, idea_id: IdeaId) -> Result<Vec<Tag>, RepositoryError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r"
            SELECT t.id, t.name, t.slug, t.color, t.is_public
            FROM tags t
            JOIN idea_tags it ON it.tag_id = t.id
            WHERE it.idea_id = $1
            ORDER BY t.name
            ",
        )
        .bind(idea_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn save_verification(
        &self,
        email: &Email,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO email_verifications (key, email, expires_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(key)
        .bind(email)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "verification key reused"))?;

        Ok(())
    }

    async fn take_verification(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Email>, RepositoryError> {
        let email: Option<Email> = sqlx::query_scalar(
            r"
            UPDATE email_verifications
            SET verified_at = $2
            WHERE key = $1 AND verified_at IS NULL AND expires_at > $2
            RETURNING email
            ",
        )
        .bind(key)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(email)
    }

    async fn get_or_create_user(
        &self,
        email: &Email,
        name: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (name, email, role)
            VALUES (
                $1,
                $2,
                CASE WHEN EXISTS (SELECT 1 FROM users)
                    THEN 'visitor'::user_role
                    ELSE 'administrator'::user_role
                END
            )
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from).ok_or(RepositoryError::NotFound)
    }
}
