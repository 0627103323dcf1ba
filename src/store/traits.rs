//! `Database` trait: the persistence collaborator for leads.
//!
//! Leads are append-only: this system writes them and never reads them back
//! on the request path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// A lead about to be written.
#[derive(Debug, Clone)]
pub struct NewLead {
    /// The stored document: submitted fields plus `createdAt` and `source`.
    pub document: serde_json::Value,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// A lead as stored.
#[derive(Debug, Clone)]
pub struct StoredLead {
    pub id: String,
    pub document: serde_json::Value,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Backend-agnostic lead store.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    /// Append a lead. Returns its generated id.
    async fn insert_lead(&self, lead: &NewLead) -> Result<String, DatabaseError>;
}
