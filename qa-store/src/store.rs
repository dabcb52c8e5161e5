//! Team state store: one row per team, JSON-encoded `TeamState`.
//!
//! `Arc<Mutex<Connection>>` bridged into an async API via `spawn_blocking`, since
//! `rusqlite::Connection` is synchronous and not `Sync`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use qa_core::model::TeamState;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::error::StoreError;
use crate::sanitize::sanitize;
use crate::secrets::SecretCipher;

pub struct Store {
    db: Arc<Mutex<Connection>>,
    cipher: SecretCipher,
}

impl Store {
    /// Opens or creates the database and tables. `master_key` encrypts the `team_secrets`
    /// table's values at rest (AES-256-GCM).
    pub fn open(path: impl AsRef<Path>, master_key: &[u8; 32]) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS team_state (
                team_id TEXT PRIMARY KEY,
                document TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS team_secrets (
                team_id TEXT NOT NULL,
                provider_key TEXT NOT NULL,
                nonce TEXT NOT NULL,
                ciphertext TEXT NOT NULL,
                PRIMARY KEY (team_id, provider_key)
            );
            "#,
        )?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
            cipher: SecretCipher::new(master_key),
        })
    }

    /// In-memory database, for tests.
    pub fn open_in_memory(master_key: &[u8; 32]) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS team_state (
                team_id TEXT PRIMARY KEY,
                document TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS team_secrets (
                team_id TEXT NOT NULL,
                provider_key TEXT NOT NULL,
                nonce TEXT NOT NULL,
                ciphertext TEXT NOT NULL,
                PRIMARY KEY (team_id, provider_key)
            );
            "#,
        )?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
            cipher: SecretCipher::new(master_key),
        })
    }

    /// Loads `team_id`'s document, inserting a sanitized default if absent
    /// (sanitize-on-read).
    pub async fn get_or_create(&self, team_id: &str) -> Result<TeamState, StoreError> {
        let db = self.db.clone();
        let team_id = team_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|_| StoreError::Storage("poisoned".into()))?;
            let existing: Option<String> = conn
                .query_row(
                    "SELECT document FROM team_state WHERE team_id = ?1",
                    params![team_id],
                    |row| row.get(0),
                )
                .optional()?;

            let mut state = match existing {
                Some(json) => serde_json::from_str(&json)?,
                None => TeamState::default(),
            };
            sanitize(&mut state);

            let json = serde_json::to_string(&state)?;
            conn.execute(
                "INSERT INTO team_state (team_id, document) VALUES (?1, ?2)
                 ON CONFLICT(team_id) DO UPDATE SET document = excluded.document",
                params![team_id, json],
            )?;
            Ok(state)
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }

    /// Sanitizes then upserts `state` (sanitize-on-write). `writer` is logged for audit.
    pub async fn save(&self, team_id: &str, writer: &str, mut state: TeamState) -> Result<(), StoreError> {
        sanitize(&mut state);
        info!(team_id, writer, "saving team state");

        let db = self.db.clone();
        let team_id = team_id.to_string();
        let json = serde_json::to_string(&state)?;
        tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|_| StoreError::Storage("poisoned".into()))?;
            conn.execute(
                "INSERT INTO team_state (team_id, document) VALUES (?1, ?2)
                 ON CONFLICT(team_id) DO UPDATE SET document = excluded.document",
                params![team_id, json],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }

    /// Decrypts and returns every provider key stored for `team_id`. Never exposed through
    /// `get_or_create`/`save` — callers read keys only through this method.
    pub async fn get_provider_keys(
        &self,
        team_id: &str,
    ) -> Result<std::collections::HashMap<String, String>, StoreError> {
        let db = self.db.clone();
        let team_id = team_id.to_string();
        let cipher = self.cipher.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|_| StoreError::Storage("poisoned".into()))?;
            let mut stmt = conn.prepare(
                "SELECT provider_key, nonce, ciphertext FROM team_secrets WHERE team_id = ?1",
            )?;
            let rows = stmt.query_map(params![team_id], |row| {
                let provider_key: String = row.get(0)?;
                let nonce: String = row.get(1)?;
                let ciphertext: String = row.get(2)?;
                Ok((provider_key, nonce, ciphertext))
            })?;

            let mut out = std::collections::HashMap::new();
            for row in rows {
                let (provider_key, nonce, ciphertext) = row?;
                let plaintext = cipher
                    .decrypt(&nonce, &ciphertext)
                    .map_err(StoreError::Crypto)?;
                out.insert(provider_key, plaintext);
            }
            Ok(out)
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }

    pub async fn set_provider_keys(
        &self,
        team_id: &str,
        keys: std::collections::HashMap<String, String>,
    ) -> Result<(), StoreError> {
        let db = self.db.clone();
        let team_id = team_id.to_string();
        let cipher = self.cipher.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = db.lock().map_err(|_| StoreError::Storage("poisoned".into()))?;
            let tx = conn.transaction()?;
            for (provider_key, plaintext) in keys {
                let (nonce, ciphertext) = cipher.encrypt(&plaintext).map_err(StoreError::Crypto)?;
                tx.execute(
                    "INSERT INTO team_secrets (team_id, provider_key, nonce, ciphertext)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(team_id, provider_key) DO UPDATE SET nonce = excluded.nonce, ciphertext = excluded.ciphertext",
                    params![team_id, provider_key, nonce, ciphertext],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        [7u8; 32]
    }

    #[tokio::test]
    async fn get_or_create_returns_sanitized_default() {
        let store = Store::open_in_memory(&test_key()).unwrap();
        let state = store.get_or_create("team-1").await.unwrap();
        assert_eq!(state.settings.parallelism, 3);
    }

    #[tokio::test]
    async fn save_then_get_or_create_round_trips() {
        let store = Store::open_in_memory(&test_key()).unwrap();
        let mut state = store.get_or_create("team-1").await.unwrap();
        state.settings.parallelism = 10;
        store.save("team-1", "tester", state).await.unwrap();

        let reloaded = store.get_or_create("team-1").await.unwrap();
        assert_eq!(reloaded.settings.parallelism, 10);
    }

    #[tokio::test]
    async fn provider_keys_round_trip_encrypted() {
        let store = Store::open_in_memory(&test_key()).unwrap();
        let mut keys = std::collections::HashMap::new();
        keys.insert("hyperbrowser".to_string(), "sk-test-123".to_string());
        store.set_provider_keys("team-1", keys).await.unwrap();

        let loaded = store.get_provider_keys("team-1").await.unwrap();
        assert_eq!(loaded.get("hyperbrowser").map(String::as_str), Some("sk-test-123"));
    }

    #[tokio::test]
    async fn provider_keys_never_appear_in_team_state_document() {
        let store = Store::open_in_memory(&test_key()).unwrap();
        let mut keys = std::collections::HashMap::new();
        keys.insert("hyperbrowser".to_string(), "sk-test-123".to_string());
        store.set_provider_keys("team-1", keys).await.unwrap();

        let state = store.get_or_create("team-1").await.unwrap();
        let json = serde_json::to_string(&state).unwrap();
        assert!(!json.contains("sk-test-123"));
    }
}
