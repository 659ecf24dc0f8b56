// ============================
// visionassist-backend/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
//!
//! Layout under the root directory:
//! - `users/<id>.json`: one account record per file
//! - `history/<user id>.log`: append-only JSON lines of analysis results
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::{fs as tokio_fs, io::AsyncWriteExt, sync::Mutex};
use uuid::Uuid;
use visionassist_common::{AnalysisResponse, NewAnalysis, UserId, UserResponse, UserUpdate};

use crate::error::AppError;

/// Speech rate given to new accounts
pub const DEFAULT_SPEECH_RATE: f64 = 1.0;

/// Stored account
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    /// Normalised (lowercase) address
    pub email: String,
    /// PHC string; never the plaintext
    pub password_hash: String,
    pub speech_rate: f64,
    pub high_contrast: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            speech_rate: self.speech_rate,
            high_contrast: self.high_contrast,
            created_at: self.created_at,
        }
    }

    fn apply(&mut self, update: &UserUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(rate) = update.speech_rate {
            self.speech_rate = rate;
        }
        if let Some(high_contrast) = update.high_contrast {
            self.high_contrast = high_contrast;
        }
        self.updated_at = now;
    }
}

/// Fields supplied when an account is created
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Stored image-analysis result
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub image_filename: Option<String>,
    pub caption: Option<String>,
    pub objects_detected: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(user_id: UserId, entry: NewAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            image_filename: entry.image_filename,
            caption: entry.caption,
            objects_detected: entry.objects_detected,
            created_at: Utc::now(),
        }
    }

    pub fn to_response(&self) -> AnalysisResponse {
        AnalysisResponse {
            id: self.id,
            image_filename: self.image_filename.clone(),
            caption: self.caption.clone(),
            objects_detected: self.objects_detected.clone(),
            created_at: self.created_at,
        }
    }
}

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create an account; fails with `EmailTaken` if the address is in use
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AppError>;

    /// Look up an account by normalised email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    /// Look up an account by id
    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, AppError>;

    /// Apply a partial update; `None` if the account does not exist
    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<Option<UserRecord>, AppError>;

    /// Append an analysis result to the owner's history
    async fn append_history(&self, record: &AnalysisRecord) -> Result<(), AppError>;

    /// Most recent analysis results first
    async fn list_history(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>, AppError>;

    /// Probe that the backend is reachable and writable
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Flat-file implementation of the Storage trait
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    /// email -> account id, rebuilt from disk at startup
    emails: Arc<DashMap<String, UserId>>,
    /// Serialises writers so the email index and files stay consistent
    write_lock: Arc<Mutex<()>>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("users"))?;
        std::fs::create_dir_all(root.join("history"))?;

        let emails = DashMap::new();
        for entry in std::fs::read_dir(root.join("users"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|s| serde_json::from_str::<UserRecord>(&s).map_err(Into::into));
            match parsed {
                Ok(user) => {
                    emails.insert(user.email, user.id);
                },
                Err(e) => tracing::warn!(path = %path.display(), "skipping unreadable user record: {e}"),
            }
        }
        tracing::debug!(users = emails.len(), root = %root.display(), "flat-file storage opened");

        Ok(Self {
            root,
            emails: Arc::new(emails),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn user_path(&self, id: UserId) -> PathBuf {
        self.root.join("users").join(format!("{id}.json"))
    }

    fn history_path(&self, user_id: UserId) -> PathBuf {
        self.root.join("history").join(format!("{user_id}.log"))
    }

    /// Write through a temp file so readers never see a torn record
    async fn write_user(&self, user: &UserRecord) -> Result<(), AppError> {
        let path = self.user_path(user.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(user)?;
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let _guard = self.write_lock.lock().await;

        if self.emails.contains_key(&user.email) {
            return Err(AppError::EmailTaken);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            speech_rate: DEFAULT_SPEECH_RATE,
            high_contrast: false,
            created_at: now,
            updated_at: now,
        };

        self.write_user(&record).await?;
        self.emails.insert(record.email.clone(), record.id);
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let id = match self.emails.get(email) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.get_user(id).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, AppError> {
        let content = match tokio_fs::read_to_string(self.user_path(id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<Option<UserRecord>, AppError> {
        let _guard = self.write_lock.lock().await;

        let Some(mut user) = self.get_user(id).await? else {
            return Ok(None);
        };
        user.apply(update, Utc::now());
        self.write_user(&user).await?;
        Ok(Some(user))
    }

    async fn append_history(&self, record: &AnalysisRecord) -> Result<(), AppError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio_fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.history_path(record.user_id))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn list_history(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>, AppError> {
        let content = match tokio_fs::read_to_string(self.history_path(user_id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let records = content
            .lines()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<AnalysisRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(%user_id, "skipping corrupt history line: {e}");
                    None
                },
            })
            .take(limit)
            .collect();

        Ok(records)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        // Unique per call so concurrent probes never remove each other's file
        let probe = self.root.join(format!(".health-{}", Uuid::new_v4()));
        tokio_fs::write(&probe, b"ok")
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        tokio_fs::remove_file(&probe)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }
}
