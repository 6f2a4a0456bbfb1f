use uuid::Uuid;

use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};

stored_object!(CachedAnswer, "cached_answer", {
    question: String,
    answer: String
});

impl CachedAnswer {
    pub fn new(question: String, answer: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            question,
            answer,
        }
    }

    /// Appends a question/answer row. Repeated identical questions each
    /// produce a new row; nothing is deduplicated or updated in place.
    pub async fn insert(
        question: &str,
        answer: &str,
        db: &SurrealDbClient,
    ) -> Result<(), AppError> {
        db.store_item(Self::new(question.to_owned(), answer.to_owned()))
            .await?;
        Ok(())
    }

    /// Returns the answer of the earliest stored row whose question contains
    /// `query` as a case-sensitive substring, or `None` when nothing matches.
    ///
    /// The containment direction matters: a stored question "capital of
    /// France" is hit by the query "France", not the other way around.
    pub async fn find_fuzzy(
        query: &str,
        db: &SurrealDbClient,
    ) -> Result<Option<String>, AppError> {
        let mut response = db
            .client
            .query(
                "SELECT answer, created_at, id FROM cached_answer \
                 WHERE string::contains(question, $needle) \
                 ORDER BY created_at ASC, id ASC LIMIT 1",
            )
            .bind(("needle", query.to_owned()))
            .await?;

        let rows: Vec<AnswerRow> = response.take(0)?;
        Ok(rows.into_iter().next().map(|row| row.answer))
    }
}

#[derive(Debug, Deserialize)]
struct AnswerRow {
    answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> SurrealDbClient {
        let database = Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory("test_ns", &database)
            .await
            .expect("Failed to start in-memory surrealdb");
        db.ensure_initialized()
            .await
            .expect("Failed to initialize tables");
        db
    }

    #[tokio::test]
    async fn test_round_trip() {
        let db = memory_db().await;

        CachedAnswer::insert("what is rust", "a systems language", &db)
            .await
            .expect("insert failed");

        let answer = CachedAnswer::find_fuzzy("what is rust", &db)
            .await
            .expect("lookup failed");
        assert_eq!(answer.as_deref(), Some("a systems language"));
    }

    #[tokio::test]
    async fn test_substring_containment_hit() {
        let db = memory_db().await;

        CachedAnswer::insert("capital of France", "Paris", &db)
            .await
            .expect("insert failed");

        // The stored question contains the query as a substring.
        let answer = CachedAnswer::find_fuzzy("France", &db)
            .await
            .expect("lookup failed");
        assert_eq!(answer.as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn test_containment_is_case_sensitive() {
        let db = memory_db().await;

        CachedAnswer::insert("capital of France", "Paris", &db)
            .await
            .expect("insert failed");

        let answer = CachedAnswer::find_fuzzy("france", &db)
            .await
            .expect("lookup failed");
        assert_eq!(answer, None);
    }

    #[tokio::test]
    async fn test_superstring_query_misses() {
        let db = memory_db().await;

        CachedAnswer::insert("capital of France", "Paris", &db)
            .await
            .expect("insert failed");

        // A query longer than any stored question cannot be contained by one.
        let answer = CachedAnswer::find_fuzzy("what is the capital of France?", &db)
            .await
            .expect("lookup failed");
        assert_eq!(answer, None);
    }

    #[tokio::test]
    async fn test_lookup_miss_returns_none() {
        let db = memory_db().await;

        let answer = CachedAnswer::find_fuzzy("unseen question", &db)
            .await
            .expect("lookup failed");
        assert_eq!(answer, None);
    }

    #[tokio::test]
    async fn test_insert_appends_without_dedup() {
        let db = memory_db().await;

        CachedAnswer::insert("repeated question", "first", &db)
            .await
            .expect("insert failed");
        CachedAnswer::insert("repeated question", "second", &db)
            .await
            .expect("insert failed");

        let rows: Vec<CachedAnswer> = db
            .client
            .select(CachedAnswer::table_name())
            .await
            .expect("select failed");
        assert_eq!(rows.len(), 2, "each insert should produce its own row");
    }

    #[tokio::test]
    async fn test_first_inserted_match_wins() {
        let db = memory_db().await;

        CachedAnswer::insert("the capital of France is well known", "first", &db)
            .await
            .expect("insert failed");
        CachedAnswer::insert("capital of France", "second", &db)
            .await
            .expect("insert failed");

        // Both stored questions contain the query; insertion order decides.
        let answer = CachedAnswer::find_fuzzy("capital of France", &db)
            .await
            .expect("lookup failed");
        assert_eq!(answer.as_deref(), Some("first"));
    }
}
