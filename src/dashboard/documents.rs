use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, ValidationErrors};
use crate::Result;

pub const MIN_DOCUMENT_YEAR: i32 = 2000;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processed,
    Validated,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub indicator: String,
    pub year: i32,
    pub upload_date: DateTime<Utc>,
    pub status: DocumentStatus,
    pub record_count: u64,
}

/// What the upload screen collects before a document is listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub name: String,
    pub indicator: String,
    pub year: i32,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub record_count: u64,
}

impl DocumentUpload {
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Document title is required");
        }
        if self.indicator.trim().is_empty() {
            errors.add("indicator", "Indicator is required");
        }
        if self.year < MIN_DOCUMENT_YEAR {
            errors.add(
                "year",
                format!("Valid year is required (must be at least {})", MIN_DOCUMENT_YEAR),
            );
        }
        if self.file_name.trim().is_empty() {
            errors.add("file", "File is required");
        } else if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            errors.add("file", "Only PDF and Word documents are accepted");
        } else if self.size_bytes == 0 {
            errors.add("file", "File is empty");
        } else if self.size_bytes > MAX_FILE_SIZE {
            errors.add("file", "File must not exceed 10MB");
        }
        errors.into_result()
    }
}

/// In-memory document list behind the admin dashboard tables.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists a new upload as pending. One document per indicator and year.
    pub fn add(&mut self, upload: DocumentUpload) -> Result<Document> {
        upload.validate()?;

        let indicator = upload.indicator.trim();
        if self
            .documents
            .iter()
            .any(|d| d.year == upload.year && d.indicator.eq_ignore_ascii_case(indicator))
        {
            let mut errors = ValidationErrors::new();
            errors.add(
                "year",
                format!("A document for {} {} already exists", indicator, upload.year),
            );
            return Err(errors.into());
        }

        let document = Document {
            id: Uuid::new_v4(),
            name: upload.name.trim().to_string(),
            indicator: indicator.to_string(),
            year: upload.year,
            upload_date: Utc::now(),
            status: DocumentStatus::Pending,
            record_count: upload.record_count,
        };
        info!("Listed document {} ({} {})", document.id, document.indicator, document.year);
        self.documents.push(document.clone());
        Ok(document)
    }

    pub fn get(&self, id: Uuid) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Newest year first; within a year, most recent upload first.
    pub fn list(&self) -> Vec<&Document> {
        let mut documents: Vec<_> = self.documents.iter().collect();
        documents.sort_by(|a, b| b.year.cmp(&a.year).then(b.upload_date.cmp(&a.upload_date)));
        documents
    }

    pub fn filter_by_status(&self, status: DocumentStatus) -> Vec<&Document> {
        self.list().into_iter().filter(|d| d.status == status).collect()
    }

    pub fn set_status(&mut self, id: Uuid, status: DocumentStatus) -> Result<&Document> {
        let document = self
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::NotFound(format!("document {}", id)))?;
        document.status = status;
        Ok(document)
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Document> {
        let index = self
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| AppError::NotFound(format!("document {}", id)))?;
        info!("Removing document {}", id);
        Ok(self.documents.remove(index))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(indicator: &str, year: i32) -> DocumentUpload {
        DocumentUpload {
            name: format!("{} {}", indicator, year),
            indicator: indicator.to_string(),
            year,
            file_name: "report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 2048,
            record_count: 54,
        }
    }

    #[test]
    fn test_add_lists_as_pending() {
        let mut registry = DocumentRegistry::new();
        let document = registry.add(upload("Infrastructure", 2023)).unwrap();
        assert_eq!(document.status, DocumentStatus::Pending);
        assert_eq!(registry.get(document.id), Some(&document));
    }

    #[test]
    fn test_upload_validation() {
        tokio_test::assert_ok!(upload("Infrastructure", 2023).validate());

        let mut bad = upload("Infrastructure", 1999);
        bad.content_type = "image/png".to_string();
        bad.name = " ".to_string();
        let errors = bad.validate().unwrap_err();
        assert!(errors.contains("year"));
        assert!(errors.contains("file"));
        assert!(errors.contains("name"));

        let mut too_big = upload("Infrastructure", 2023);
        too_big.size_bytes = MAX_FILE_SIZE + 1;
        assert_eq!(
            too_big.validate().unwrap_err().get("file"),
            Some("File must not exceed 10MB")
        );
    }

    #[test]
    fn test_one_document_per_indicator_and_year() {
        let mut registry = DocumentRegistry::new();
        registry.add(upload("Infrastructure", 2023)).unwrap();
        let err = registry.add(upload("infrastructure", 2023)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        registry.add(upload("Infrastructure", 2024)).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_list_orders_by_year_descending() {
        let mut registry = DocumentRegistry::new();
        registry.add(upload("Talent", 2021)).unwrap();
        registry.add(upload("Talent", 2024)).unwrap();
        registry.add(upload("Talent", 2022)).unwrap();
        let years: Vec<_> = registry.list().iter().map(|d| d.year).collect();
        assert_eq!(years, vec![2024, 2022, 2021]);
    }

    #[test]
    fn test_status_changes_and_removal() {
        let mut registry = DocumentRegistry::new();
        let a = registry.add(upload("Talent", 2021)).unwrap();
        let b = registry.add(upload("Governance", 2021)).unwrap();

        registry.set_status(a.id, DocumentStatus::Validated).unwrap();
        assert_eq!(registry.filter_by_status(DocumentStatus::Validated).len(), 1);
        assert_eq!(registry.filter_by_status(DocumentStatus::Pending)[0].id, b.id);

        let removed = registry.remove(b.id).unwrap();
        assert_eq!(removed.id, b.id);
        assert!(matches!(registry.remove(b.id), Err(AppError::NotFound(_))));
        assert!(matches!(
            registry.set_status(b.id, DocumentStatus::Error),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(DocumentStatus::Processed).unwrap(),
            serde_json::json!("processed")
        );
    }
}
