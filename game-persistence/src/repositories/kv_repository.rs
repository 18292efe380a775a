use anyhow::Result;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait};

use crate::entities::{kv_entries, prelude::*};
use crate::store::KeyValueStore;

pub struct KeyValueRepository {
    db: DatabaseConnection,
}

impl KeyValueRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for KeyValueRepository {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = KvEntries::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(entry.map(|model| model.value))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let entry = kv_entries::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        KvEntries::insert(entry)
            .on_conflict(
                OnConflict::column(kv_entries::Column::Key)
                    .update_columns([kv_entries::Column::Value, kv_entries::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        tracing::debug!("Stored value for key '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> KeyValueRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        KeyValueRepository::new(db)
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let repo = setup_test_db().await;
        assert_eq!(repo.get("nothing-here").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_overwrite() {
        let repo = setup_test_db().await;

        repo.set("history", "[]".to_string()).await.unwrap();
        assert_eq!(repo.get("history").await.unwrap(), Some("[]".to_string()));

        repo.set("history", "[1]".to_string()).await.unwrap();
        assert_eq!(repo.get("history").await.unwrap(), Some("[1]".to_string()));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let repo = setup_test_db().await;

        repo.set("a", "first".to_string()).await.unwrap();
        repo.set("b", "second".to_string()).await.unwrap();

        assert_eq!(repo.get("a").await.unwrap(), Some("first".to_string()));
        assert_eq!(repo.get("b").await.unwrap(), Some("second".to_string()));
    }
}
