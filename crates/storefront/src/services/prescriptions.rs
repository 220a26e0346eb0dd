//! Prescription file storage and the upload submission flow.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use medicart_core::{PrescriptionRef, PrescriptionUpload, ProductId, UploadError, UploadedFile};

/// Errors from a prescription store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file rejected by storage: {0}")]
    Rejected(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Where uploaded prescription files go.
#[async_trait::async_trait]
pub trait PrescriptionStore: Send + Sync {
    /// Store a file for `product_id` and return a stable reference the order
    /// service can use.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file could not be stored.
    async fn store(
        &self,
        file: &UploadedFile,
        contents: &[u8],
        product_id: &ProductId,
    ) -> Result<PrescriptionRef, StoreError>;
}

/// Store that waits a fixed delay and then accepts every file.
#[derive(Debug, Clone)]
pub struct SimulatedPrescriptionStore {
    delay: Duration,
}

impl SimulatedPrescriptionStore {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl PrescriptionStore for SimulatedPrescriptionStore {
    async fn store(
        &self,
        file: &UploadedFile,
        contents: &[u8],
        product_id: &ProductId,
    ) -> Result<PrescriptionRef, StoreError> {
        tokio::time::sleep(self.delay).await;

        let reference = PrescriptionRef::new(format!("rx-{}", Uuid::new_v4()));
        tracing::info!(
            product_id = %product_id,
            file_name = %file.name,
            size_bytes = contents.len(),
            prescription = %reference,
            "Prescription stored"
        );
        Ok(reference)
    }
}

/// Why a submission did not complete.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The dialog was not in a state that allows submitting.
    #[error(transparent)]
    Upload(#[from] UploadError),
    /// Storage refused the file. The selection is kept.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drive an upload from `FileSelected` through storage to `Done`.
///
/// On success `on_success` receives the file and the product it was uploaded
/// for, then `on_close` runs if one was supplied. Neither runs on failure.
///
/// # Errors
///
/// `SubmitError::Upload` when no file is selected or an upload is already
/// running (state unchanged), `SubmitError::Store` when storage fails (state
/// back to `FileSelected`).
pub async fn submit_upload<S, C>(
    upload: &mut PrescriptionUpload,
    contents: &[u8],
    store: &dyn PrescriptionStore,
    on_success: S,
    on_close: Option<C>,
) -> Result<PrescriptionRef, SubmitError>
where
    S: FnOnce(&UploadedFile, &ProductId) + Send,
    C: FnOnce() + Send,
{
    let file = upload.begin_submit()?;

    let reference = match store.store(&file, contents, upload.product_id()).await {
        Ok(reference) => reference,
        Err(e) => {
            upload.fail()?;
            tracing::warn!(product_id = %upload.product_id(), error = %e, "Prescription upload failed");
            return Err(e.into());
        }
    };

    let file = upload.complete(reference.clone())?;
    on_success(&file, upload.product_id());
    if let Some(close) = on_close {
        close();
    }
    Ok(reference)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use medicart_core::UploadState;

    use super::*;

    struct FailingStore;

    #[async_trait::async_trait]
    impl PrescriptionStore for FailingStore {
        async fn store(
            &self,
            _file: &UploadedFile,
            _contents: &[u8],
            _product_id: &ProductId,
        ) -> Result<PrescriptionRef, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    fn selected(file: UploadedFile) -> PrescriptionUpload {
        let mut upload = PrescriptionUpload::new(ProductId::new("prod_12345"));
        upload.select(file).unwrap();
        upload
    }

    fn pdf() -> UploadedFile {
        UploadedFile::new("script.pdf", 2048, "application/pdf")
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_store_waits_configured_delay() {
        let store = SimulatedPrescriptionStore::new(Duration::from_millis(1500));
        let started = tokio::time::Instant::now();

        let reference = store
            .store(&pdf(), b"%PDF", &ProductId::new("prod_12345"))
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert!(reference.as_str().starts_with("rx-"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_invokes_success_then_close() {
        let store = SimulatedPrescriptionStore::new(Duration::from_millis(1500));
        let mut upload = selected(pdf());
        let calls = Mutex::new(Vec::new());

        let reference = submit_upload(
            &mut upload,
            b"%PDF",
            &store,
            |file, product_id| {
                calls
                    .lock()
                    .unwrap()
                    .push(format!("success:{}:{product_id}", file.name));
            },
            Some(|| calls.lock().unwrap().push("close".to_string())),
        )
        .await
        .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["success:script.pdf:prod_12345", "close"]
        );
        assert_eq!(upload.state(), &UploadState::Done(pdf(), reference));
    }

    #[tokio::test]
    async fn test_submit_without_file_runs_no_callbacks() {
        let store = SimulatedPrescriptionStore::new(Duration::ZERO);
        let mut upload = PrescriptionUpload::new(ProductId::new("prod_12345"));
        let mut called = false;

        let result = submit_upload(&mut upload, &[], &store, |_, _| called = true, None::<fn()>).await;

        assert!(matches!(
            result,
            Err(SubmitError::Upload(UploadError::NoFileSelected))
        ));
        assert!(!called);
        assert_eq!(upload.state(), &UploadState::Idle);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_selection() {
        let mut upload = selected(pdf());
        let result = submit_upload(&mut upload, b"%PDF", &FailingStore, |_, _| {}, None::<fn()>).await;

        assert!(matches!(result, Err(SubmitError::Store(_))));
        assert_eq!(upload.state(), &UploadState::FileSelected(pdf()));
    }
}
