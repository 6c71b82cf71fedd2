//! SQLite conversation and turn repository.
//!
//! Implements `ConversationRepository` and `TurnRepository` from `neon-core`
//! with raw queries, private Row structs, and split reader/writer pools.

use chrono::{DateTime, SecondsFormat, Utc};
use neon_core::conversation::repository::{ConversationRepository, TurnRepository};
use neon_types::conversation::{Conversation, MediaRef, Modality, Turn, TurnRole};
use neon_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed store for conversations and their turns.
#[derive(Clone)]
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: String,
    title: String,
    modality: String,
    preview: String,
    created_at: String,
    updated_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            modality: row.try_get("modality")?,
            preview: row.try_get("preview")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
        let modality: Modality = self
            .modality
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Conversation {
            id,
            title: self.title,
            modality,
            preview: self.preview,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct TurnRow {
    id: String,
    conversation_id: String,
    role: String,
    content: String,
    media: Option<String>,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            media: row.try_get("media")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid turn id: {e}")))?;
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let role: TurnRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let media = self
            .media
            .as_deref()
            .map(serde_json::from_str::<MediaRef>)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid media: {e}")))?;

        Ok(Turn {
            id,
            conversation_id,
            role,
            content: self.content,
            media,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so that text ordering in SQL matches time ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return RepositoryError::Conflict(db.message().to_string());
        }
        if db.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Query(e.to_string())
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO conversations (id, title, modality, preview, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.title)
        .bind(conversation.modality.to_string())
        .bind(&conversation.preview)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_write_error)?;

        Ok(conversation.clone())
    }

    async fn get_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(conversation_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let conversation_row = ConversationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(conversation_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn list_conversations(
        &self,
        modality: Option<Modality>,
        limit: Option<i64>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let mut sql = String::from(
            "SELECT * FROM conversations WHERE (?1 IS NULL OR modality = ?1) ORDER BY updated_at DESC, id DESC",
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit.max(0)));
        }

        let rows = sqlx::query(&sql)
            .bind(modality.map(|m| m.to_string()))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            let conversation_row = ConversationRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            conversations.push(conversation_row.into_conversation()?);
        }

        Ok(conversations)
    }

    async fn count_conversations(&self, modality: Option<Modality>) -> Result<u64, RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as cnt FROM conversations WHERE (?1 IS NULL OR modality = ?1)",
        )
        .bind(modality.map(|m| m.to_string()))
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }

    async fn update_preview(
        &self,
        conversation_id: &Uuid,
        preview: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET preview = ?, updated_at = ? WHERE id = ?")
            .bind(preview)
            .bind(format_datetime(&updated_at))
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_conversation(&self, conversation_id: &Uuid) -> Result<(), RepositoryError> {
        // Turns go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TurnRepository implementation
// ---------------------------------------------------------------------------

impl TurnRepository for SqliteConversationRepository {
    async fn create_turn(&self, turn: &Turn) -> Result<Turn, RepositoryError> {
        let media = turn
            .media
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("media serialization: {e}")))?;

        sqlx::query(
            r#"INSERT INTO turns (id, conversation_id, role, content, media, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(turn.id.to_string())
        .bind(turn.conversation_id.to_string())
        .bind(turn.role.to_string())
        .bind(&turn.content)
        .bind(media)
        .bind(format_datetime(&turn.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_write_error)?;

        Ok(turn.clone())
    }

    async fn list_turns(&self, conversation_id: &Uuid) -> Result<Vec<Turn>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM turns WHERE conversation_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row =
                TurnRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            turns.push(turn_row.into_turn()?);
        }

        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn repo_with(modality: Modality) -> (SqliteConversationRepository, Conversation) {
        let repo = SqliteConversationRepository::new(test_pool().await);
        let conversation = repo
            .create_conversation(&Conversation::new("Test".to_string(), modality))
            .await
            .unwrap();
        (repo, conversation)
    }

    #[tokio::test]
    async fn test_create_and_get_conversation() {
        let (repo, created) = repo_with(Modality::Search).await;

        let fetched = repo.get_conversation(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, "Test");
        assert_eq!(fetched.modality, Modality::Search);
        assert_eq!(fetched.preview, "");
        assert_eq!(
            fetched.created_at.timestamp_micros(),
            created.created_at.timestamp_micros()
        );

        assert!(repo.get_conversation(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_conversation_conflicts() {
        let (repo, created) = repo_with(Modality::Image).await;
        let err = repo.create_conversation(&created).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_by_updated_at() {
        let repo = SqliteConversationRepository::new(test_pool().await);
        let a = repo
            .create_conversation(&Conversation::new("A".into(), Modality::Assistant))
            .await
            .unwrap();
        let b = repo
            .create_conversation(&Conversation::new("B".into(), Modality::Assistant))
            .await
            .unwrap();
        repo.create_conversation(&Conversation::new("C".into(), Modality::Video))
            .await
            .unwrap();

        repo.update_preview(&a.id, "plus récent", Utc::now() + Duration::seconds(10))
            .await
            .unwrap();

        let chats = repo
            .list_conversations(Some(Modality::Assistant), None)
            .await
            .unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].id, a.id);
        assert_eq!(chats[0].preview, "plus récent");
        assert_eq!(chats[1].id, b.id);

        assert_eq!(repo.list_conversations(None, None).await.unwrap().len(), 3);
        assert_eq!(
            repo.list_conversations(None, Some(2)).await.unwrap().len(),
            2
        );
        assert_eq!(repo.count_conversations(None).await.unwrap(), 3);
        assert_eq!(
            repo.count_conversations(Some(Modality::Video))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            repo.count_conversations(Some(Modality::Search))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_update_preview_missing_conversation() {
        let repo = SqliteConversationRepository::new(test_pool().await);
        let err = repo
            .update_preview(&Uuid::now_v7(), "x", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_turns_roundtrip_with_media_in_order() {
        let (repo, conversation) = repo_with(Modality::Video).await;

        let user = Turn::user(conversation.id, "sunset over ocean".to_string());
        let assistant = Turn::assistant(
            conversation.id,
            "Vidéo générée avec 4 images ! Voici la séquence :".to_string(),
            Some(MediaRef::Sequence {
                urls: (1..=4).map(|i| format!("https://img/{i}.png")).collect(),
            }),
        );
        repo.create_turn(&user).await.unwrap();
        repo.create_turn(&assistant).await.unwrap();

        let turns = repo.list_turns(&conversation.id).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].id, user.id);
        assert_eq!(turns[0].role, TurnRole::User);
        assert!(turns[0].media.is_none());
        assert_eq!(turns[1].id, assistant.id);
        assert_eq!(turns[1].media, assistant.media);
    }

    #[tokio::test]
    async fn test_turns_with_equal_timestamps_keep_insertion_order() {
        let (repo, conversation) = repo_with(Modality::Assistant).await;
        let at = Utc::now();

        let mut ids = Vec::new();
        for i in 0..5 {
            let mut turn = Turn::user(conversation.id, format!("t{i}"));
            turn.created_at = at;
            ids.push(turn.id);
            repo.create_turn(&turn).await.unwrap();
        }

        let listed: Vec<Uuid> = repo
            .list_turns(&conversation.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_turn_for_missing_conversation_is_not_found() {
        let repo = SqliteConversationRepository::new(test_pool().await);
        let err = repo
            .create_turn(&Turn::user(Uuid::now_v7(), "orphan".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_turns_cannot_be_updated() {
        let (repo, conversation) = repo_with(Modality::Assistant).await;
        let turn = repo
            .create_turn(&Turn::user(conversation.id, "original".to_string()))
            .await
            .unwrap();

        let result = sqlx::query("UPDATE turns SET content = 'edited' WHERE id = ?")
            .bind(turn.id.to_string())
            .execute(&repo.pool.writer)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_modality_cannot_change() {
        let (repo, conversation) = repo_with(Modality::Image).await;

        let result = sqlx::query("UPDATE conversations SET modality = 'video' WHERE id = ?")
            .bind(conversation.id.to_string())
            .execute(&repo.pool.writer)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_turns() {
        let (repo, conversation) = repo_with(Modality::Search).await;
        repo.create_turn(&Turn::user(conversation.id, "q".to_string()))
            .await
            .unwrap();

        repo.delete_conversation(&conversation.id).await.unwrap();

        assert!(repo.get_conversation(&conversation.id).await.unwrap().is_none());
        assert!(repo.list_turns(&conversation.id).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete_conversation(&conversation.id).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
