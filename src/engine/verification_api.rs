use async_trait::async_trait;
use uuid::Uuid;

use super::helpers::{
    fetch_document, fetch_documents_for_driver, fetch_driver_by_handle,
    recompute_driver_verification,
};
use super::Engine;

use crate::api::{DocumentStanding, VerificationApi, VerificationStatus};
use crate::entities::{meets_requirements, Category, Document, DocumentStatus};
use crate::error::Error;

#[async_trait]
impl VerificationApi for Engine {
    #[tracing::instrument(skip(self, payload))]
    async fn submit_document(
        &self,
        driver_handle: String,
        category: Category,
        payload: String,
    ) -> Result<Document, Error> {
        let mut tx = self.pool.begin().await?;

        let driver = fetch_driver_by_handle(&mut tx, &driver_handle).await?;
        let document = Document::new(driver.id, category, payload);

        // resubmission supersedes the prior document in place: same row,
        // fresh payload, status back to pending, rejection reason cleared
        sqlx::query(
            "INSERT INTO driver_documents (id, driver_id, category, payload, status, reason, submitted_at)
             VALUES (?, ?, ?, ?, ?, NULL, ?)
             ON CONFLICT (driver_id, category) DO UPDATE SET
                 payload = excluded.payload,
                 status = excluded.status,
                 reason = NULL,
                 submitted_at = excluded.submitted_at",
        )
        .bind(&document.id)
        .bind(&document.driver_id)
        .bind(document.category.name())
        .bind(&document.payload)
        .bind(document.status.name())
        .bind(&document.submitted_at)
        .execute(&mut *tx)
        .await?;

        let documents = fetch_documents_for_driver(&mut tx, &driver.id).await?;
        let stored = documents
            .into_iter()
            .find(|stored| stored.category == category)
            .ok_or_else(|| Error::NotFound("document"))?;

        recompute_driver_verification(&mut tx, &driver.id).await?;

        tx.commit().await?;

        Ok(stored)
    }

    #[tracing::instrument(skip(self))]
    async fn adjudicate_document(
        &self,
        document_id: Uuid,
        approve: bool,
        reason: Option<String>,
    ) -> Result<Document, Error> {
        let mut tx = self.pool.begin().await?;

        let mut document = fetch_document(&mut tx, &document_id).await?;

        if approve {
            document.status = DocumentStatus::Approved;
            document.reason = None;
        } else {
            document.status = DocumentStatus::Rejected;
            document.reason = reason;
        }

        sqlx::query("UPDATE driver_documents SET status = ?, reason = ? WHERE id = ?")
            .bind(document.status.name())
            .bind(&document.reason)
            .bind(&document.id)
            .execute(&mut *tx)
            .await?;

        recompute_driver_verification(&mut tx, &document.driver_id).await?;

        tx.commit().await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self))]
    async fn verification_status(
        &self,
        driver_handle: String,
    ) -> Result<VerificationStatus, Error> {
        let mut tx = self.pool.begin().await?;

        let driver = fetch_driver_by_handle(&mut tx, &driver_handle).await?;
        let documents = fetch_documents_for_driver(&mut tx, &driver.id).await?;

        tx.commit().await?;

        // derived from the document rows, not the stored flag
        let verified = meets_requirements(&documents);

        let documents = documents
            .into_iter()
            .map(|document| DocumentStanding {
                id: document.id,
                category: document.category,
                status: document.status,
                reason: document.reason,
            })
            .collect();

        Ok(VerificationStatus {
            driver_id: driver.id,
            verified,
            documents,
        })
    }
}
