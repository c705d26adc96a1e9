//! Alert recipient lookup.
//!
//! The `AlertDirectory` trait resolves a tenant id to the e-mail alerts
//! registered for it. `InMemoryAlertDirectory` holds registrations in memory
//! and can be seeded from a JSON file at startup.

use crate::models::{AlertRecipient, Registration};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use validator::Validate;

/// Errors that can occur while loading or reading alert registrations.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The registrations file could not be read.
    #[error("Failed to read alert registrations: {0}")]
    Io(#[from] std::io::Error),

    /// The registrations file is not valid JSON.
    #[error("Failed to parse alert registrations: {0}")]
    Parse(#[from] serde_json::Error),

    /// A registration failed validation.
    #[error("Invalid alert registration '{id}': {reason}")]
    Invalid {
        /// The offending registration id.
        id: String,
        /// Validation failure details.
        reason: String,
    },

    /// Lock poisoned.
    #[error("Failed to acquire lock on alert directory")]
    LockError,
}

/// Looks up the alert recipients registered for a tenant.
#[async_trait]
pub trait AlertDirectory: Send + Sync {
    /// Returns the recipients registered for `unique_id`.
    ///
    /// An unknown id yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    async fn recipients(&self, unique_id: &str) -> Result<Vec<AlertRecipient>, AlertError>;
}

/// In-memory alert directory.
///
/// # Example
///
/// ```
/// use shared::alerts::{AlertDirectory, InMemoryAlertDirectory};
/// use shared::models::AlertRecipient;
///
/// # tokio_test::block_on(async {
/// let directory = InMemoryAlertDirectory::new();
/// directory
///     .insert("shop-api", vec![AlertRecipient {
///         id: "1".into(),
///         from: "alerts@example.com".into(),
///         to: "oncall@example.com".into(),
///         subject: "Errors".into(),
///         body: String::new(),
///     }])
///     .unwrap();
///
/// assert_eq!(directory.recipients("shop-api").await.unwrap().len(), 1);
/// assert!(directory.recipients("unknown").await.unwrap().is_empty());
/// # });
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryAlertDirectory {
    registrations: Arc<RwLock<HashMap<String, Vec<AlertRecipient>>>>,
}

impl InMemoryAlertDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates registrations from a JSON array file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if any
    /// registration fails validation.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AlertError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Loads and validates registrations from a JSON array string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be parsed or any registration
    /// fails validation.
    pub fn from_json_str(content: &str) -> Result<Self, AlertError> {
        let registrations: Vec<Registration> = serde_json::from_str(content)?;
        let directory = Self::new();
        for registration in registrations {
            directory.register(registration)?;
        }
        Ok(directory)
    }

    /// Adds a validated registration. Alerts for an id registered twice are
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration fails validation.
    pub fn register(&self, registration: Registration) -> Result<(), AlertError> {
        registration
            .validate()
            .map_err(|e| AlertError::Invalid {
                id: registration.registration_id.clone(),
                reason: e.to_string(),
            })?;
        self.insert(&registration.registration_id, registration.emails)
    }

    /// Appends recipients for a tenant without validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn insert(&self, unique_id: &str, emails: Vec<AlertRecipient>) -> Result<(), AlertError> {
        let mut registrations = self
            .registrations
            .write()
            .map_err(|_| AlertError::LockError)?;
        registrations
            .entry(unique_id.to_string())
            .or_default()
            .extend(emails);
        Ok(())
    }

    /// Number of registered tenants.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn len(&self) -> Result<usize, AlertError> {
        let registrations = self
            .registrations
            .read()
            .map_err(|_| AlertError::LockError)?;
        Ok(registrations.len())
    }

    /// Returns true if no tenant is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, AlertError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl AlertDirectory for InMemoryAlertDirectory {
    async fn recipients(&self, unique_id: &str) -> Result<Vec<AlertRecipient>, AlertError> {
        let registrations = self
            .registrations
            .read()
            .map_err(|_| AlertError::LockError)?;
        Ok(registrations.get(unique_id).cloned().unwrap_or_default())
    }
}
