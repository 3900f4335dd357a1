//! Admin dashboard model
//!
//! The document list shown on the dashboard, the statistics cards
//! computed from it, and the indicator weight editor's arithmetic.

mod documents;
pub mod weights;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use documents::{
    Document, DocumentRegistry, DocumentStatus, DocumentUpload, ALLOWED_CONTENT_TYPES,
    MAX_FILE_SIZE, MIN_DOCUMENT_YEAR,
};

/// Figures behind the dashboard's statistics cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_documents: usize,
    pub pending: usize,
    pub processed: usize,
    pub validated: usize,
    pub errored: usize,
    pub total_records: u64,
    pub years: BTreeSet<i32>,
    pub latest_upload: Option<DateTime<Utc>>,
}

impl DashboardStats {
    /// Share of documents that reached `validated`, as a whole percentage.
    pub fn validated_percent(&self) -> u8 {
        if self.total_documents == 0 {
            return 0;
        }
        ((self.validated * 100) / self.total_documents) as u8
    }
}

impl DocumentRegistry {
    pub fn stats(&self) -> DashboardStats {
        self.iter().fold(DashboardStats::default(), |mut stats, doc| {
            stats.total_documents += 1;
            match doc.status {
                DocumentStatus::Pending => stats.pending += 1,
                DocumentStatus::Processed => stats.processed += 1,
                DocumentStatus::Validated => stats.validated += 1,
                DocumentStatus::Error => stats.errored += 1,
            }
            stats.total_records += doc.record_count;
            stats.years.insert(doc.year);
            stats.latest_upload = stats.latest_upload.max(Some(doc.upload_date));
            stats
        })
    }
}
