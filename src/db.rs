use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

// One stored entry per session field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    CurrentStep,
    UserType,
    Username,
    PreTestQuestions,
    PreTestAnswers,
    PreTestScore,
    PreTestCurrentQuestion,
    VideoCompleted,
    PostTestQuestions,
    PostTestAnswers,
    PostTestScore,
    PostTestCurrentQuestion,
    QuestionsPool,
}

impl Key {
    pub const ALL: [Key; 13] = [
        Key::CurrentStep,
        Key::UserType,
        Key::Username,
        Key::PreTestQuestions,
        Key::PreTestAnswers,
        Key::PreTestScore,
        Key::PreTestCurrentQuestion,
        Key::VideoCompleted,
        Key::PostTestQuestions,
        Key::PostTestAnswers,
        Key::PostTestScore,
        Key::PostTestCurrentQuestion,
        Key::QuestionsPool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Key::CurrentStep => "quiz_current_step",
            Key::UserType => "quiz_user_type",
            Key::Username => "quiz_username",
            Key::PreTestQuestions => "quiz_pre_test_questions",
            Key::PreTestAnswers => "quiz_pre_test_answers",
            Key::PreTestScore => "quiz_pre_test_score",
            Key::PreTestCurrentQuestion => "quiz_pre_test_current_question",
            Key::VideoCompleted => "quiz_video_completed",
            Key::PostTestQuestions => "quiz_post_test_questions",
            Key::PostTestAnswers => "quiz_post_test_answers",
            Key::PostTestScore => "quiz_post_test_score",
            Key::PostTestCurrentQuestion => "quiz_post_test_current_question",
            Key::QuestionsPool => "quiz_questions_pool",
        }
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: Key, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.save_raw(key, &raw)
    }

    pub(crate) fn save_raw(&self, key: Key, raw: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key.as_str(), raw],
        )?;
        debug!(key = key.as_str(), "saved");
        Ok(())
    }

    /// Returns the stored value, or `None` when absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: Key) -> Option<T> {
        let raw = match self.load_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "failed to read stored value");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "ignoring malformed stored value");
                None
            }
        }
    }

    pub fn load_raw(&self, key: Key) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn clear(&self, keys: &[Key]) -> Result<()> {
        for key in keys {
            self.conn
                .execute("DELETE FROM kv_store WHERE key = ?1", params![key.as_str()])?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn stored_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Answers, Question, Step};
    use crate::questions::default_pool;

    fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    mod init_tests {
        use super::*;

        #[test]
        fn init_creates_table() {
            let db = setup_db();
            let count: i64 = db
                .conn
                .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
                .expect("kv_store table should exist");
            assert_eq!(count, 0);
        }

        #[test]
        fn init_is_idempotent() {
            let db = setup_db();
            db.save(Key::Username, "alice").unwrap();

            db.init().expect("Re-init should succeed");

            assert_eq!(db.load::<String>(Key::Username), Some("alice".to_string()));
        }
    }

    mod key_tests {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn keys_are_namespaced_and_unique() {
            let names: HashSet<&str> = Key::ALL.iter().map(Key::as_str).collect();
            assert_eq!(names.len(), Key::ALL.len());
            assert!(names.iter().all(|n| n.starts_with("quiz_")));
        }
    }

    mod save_load_tests {
        use super::*;

        #[test]
        fn load_absent_key() {
            let db = setup_db();
            assert_eq!(db.load::<u32>(Key::PreTestScore), None);
        }

        #[test]
        fn score_stored_as_decimal_text() {
            let db = setup_db();
            db.save(Key::PreTestScore, &67u32).unwrap();
            assert_eq!(db.load_raw(Key::PreTestScore).unwrap(), Some("67".to_string()));
            assert_eq!(db.load::<u32>(Key::PreTestScore), Some(67));
        }

        #[test]
        fn bool_stored_as_literal() {
            let db = setup_db();
            db.save(Key::VideoCompleted, &true).unwrap();
            assert_eq!(db.load_raw(Key::VideoCompleted).unwrap(), Some("true".to_string()));
            assert_eq!(db.load::<bool>(Key::VideoCompleted), Some(true));
        }

        #[test]
        fn step_round_trips() {
            let db = setup_db();
            db.save(Key::CurrentStep, &Step::PostTest).unwrap();
            assert_eq!(db.load::<Step>(Key::CurrentStep), Some(Step::PostTest));
        }

        #[test]
        fn questions_round_trip() {
            let db = setup_db();
            let pool = default_pool();
            db.save(Key::QuestionsPool, &pool).unwrap();
            assert_eq!(db.load::<Vec<Question>>(Key::QuestionsPool), Some(pool));
        }

        #[test]
        fn answers_round_trip_with_unanswered_entries() {
            let db = setup_db();
            let mut answers = Answers::new();
            answers.insert(4, Some(1));
            answers.insert(9, None);
            db.save(Key::PreTestAnswers, &answers).unwrap();
            assert_eq!(db.load::<Answers>(Key::PreTestAnswers), Some(answers));
        }

        #[test]
        fn save_overwrites_previous_value() {
            let db = setup_db();
            db.save(Key::Username, "alice").unwrap();
            db.save(Key::Username, "bob").unwrap();
            assert_eq!(db.load::<String>(Key::Username), Some("bob".to_string()));
        }

        #[test]
        fn malformed_value_loads_as_absent() {
            let db = setup_db();
            db.save_raw(Key::QuestionsPool, "{not json").unwrap();
            assert_eq!(db.load::<Vec<Question>>(Key::QuestionsPool), None);
        }

        #[test]
        fn foreign_shape_loads_as_absent() {
            let db = setup_db();
            db.save_raw(Key::PreTestScore, "\"sixty-seven\"").unwrap();
            assert_eq!(db.load::<u32>(Key::PreTestScore), None);
        }

        #[test]
        fn malformed_field_does_not_affect_others() {
            let db = setup_db();
            db.save_raw(Key::QuestionsPool, "[[[").unwrap();
            db.save(Key::Username, "alice").unwrap();
            assert_eq!(db.load::<Vec<Question>>(Key::QuestionsPool), None);
            assert_eq!(db.load::<String>(Key::Username), Some("alice".to_string()));
        }
    }

    mod clear_tests {
        use super::*;

        #[test]
        fn clear_removes_only_given_keys() {
            let db = setup_db();
            db.save(Key::Username, "alice").unwrap();
            db.save(Key::PreTestScore, &67u32).unwrap();

            db.clear(&[Key::Username]).unwrap();

            assert_eq!(db.load::<String>(Key::Username), None);
            assert_eq!(db.load::<u32>(Key::PreTestScore), Some(67));
        }

        #[test]
        fn clear_all_empties_store() {
            let db = setup_db();
            db.save(Key::Username, "alice").unwrap();
            db.save(Key::VideoCompleted, &false).unwrap();

            db.clear(&Key::ALL).unwrap();

            assert!(db.stored_keys().unwrap().is_empty());
        }

        #[test]
        fn clear_missing_key_is_ok() {
            let db = setup_db();
            assert!(db.clear(&[Key::PostTestScore]).is_ok());
        }
    }
}
