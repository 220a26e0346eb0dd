//! Prescription upload dialog state.
//!
//! ```text
//! Idle ──select(valid)──▶ FileSelected ──begin_submit──▶ Uploading ──complete──▶ Done
//!   ▲                          │
//!   └────────remove────────────┘
//! ```
//!
//! Invalid selections and submits without a file leave the state unchanged
//! and surface a [`Notice`]. Once `Uploading`, nothing but `complete` is
//! accepted: there is no cancellation path for an in-flight upload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PrescriptionRef, ProductId};

/// MIME type accepted alongside any `image/*`.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl UploadedFile {
    #[must_use]
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Images of any kind and PDFs are accepted.
    #[must_use]
    pub fn is_accepted_type(&self) -> bool {
        self.mime_type.starts_with("image/") || self.mime_type == PDF_MIME_TYPE
    }

    /// Size in kilobytes with two decimals, e.g. "12.34 KB".
    #[must_use]
    pub fn size_label(&self) -> String {
        #[allow(clippy::cast_precision_loss)] // display only
        let kb = self.size_bytes as f64 / 1024.0;
        format!("{kb:.2} KB")
    }
}

/// Where the upload dialog is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "file", rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    FileSelected(UploadedFile),
    Uploading(UploadedFile),
    Done(UploadedFile, PrescriptionRef),
}

/// Why an upload action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("unsupported file type: {0}")]
    InvalidFileType(String),
    #[error("no file selected")]
    NoFileSelected,
    #[error("upload already in progress")]
    UploadInProgress,
    #[error("no upload in progress")]
    NotUploading,
    #[error("upload already completed")]
    AlreadyDone,
}

impl UploadError {
    /// The user-facing notice for this refusal.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::InvalidFileType(_) => Notice::error(
                "Invalid file type.",
                "Please upload an image (JPG, PNG) or a PDF file.",
            ),
            Self::NoFileSelected => Notice::error(
                "No file selected",
                "Please select a prescription file to upload.",
            ),
            Self::UploadInProgress => Notice::error(
                "Upload in progress",
                "Please wait for the current upload to finish.",
            ),
            Self::NotUploading | Self::AlreadyDone => Notice::error(
                "Upload not available",
                "Please start the upload again.",
            ),
        }
    }
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Shown once a prescription for `product_id` has been received.
    #[must_use]
    pub fn uploaded(product_id: &ProductId) -> Self {
        Self::success(
            "Prescription Uploaded!",
            format!("Your prescription for product ID {product_id} has been received."),
        )
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Upload dialog for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionUpload {
    product_id: ProductId,
    state: UploadState,
}

impl PrescriptionUpload {
    #[must_use]
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            state: UploadState::Idle,
        }
    }

    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    #[must_use]
    pub const fn state(&self) -> &UploadState {
        &self.state
    }

    /// Idle/FileSelected → FileSelected.
    ///
    /// # Errors
    ///
    /// `InvalidFileType` for anything but images and PDFs (state unchanged),
    /// `UploadInProgress` or `AlreadyDone` past selection.
    pub fn select(&mut self, file: UploadedFile) -> Result<(), UploadError> {
        self.ensure_selectable()?;
        if !file.is_accepted_type() {
            return Err(UploadError::InvalidFileType(file.mime_type));
        }
        self.state = UploadState::FileSelected(file);
        Ok(())
    }

    /// FileSelected → Idle. Clearing an empty selection is a no-op.
    ///
    /// # Errors
    ///
    /// `UploadInProgress` or `AlreadyDone` past selection.
    pub fn remove(&mut self) -> Result<(), UploadError> {
        self.ensure_selectable()?;
        self.state = UploadState::Idle;
        Ok(())
    }

    /// FileSelected → Uploading. Returns the file to hand to storage.
    ///
    /// # Errors
    ///
    /// `NoFileSelected` from Idle (state unchanged), `UploadInProgress` while
    /// uploading, `AlreadyDone` after completion.
    pub fn begin_submit(&mut self) -> Result<UploadedFile, UploadError> {
        match &self.state {
            UploadState::Idle => Err(UploadError::NoFileSelected),
            UploadState::Uploading(_) => Err(UploadError::UploadInProgress),
            UploadState::Done(..) => Err(UploadError::AlreadyDone),
            UploadState::FileSelected(file) => {
                let file = file.clone();
                self.state = UploadState::Uploading(file.clone());
                Ok(file)
            }
        }
    }

    /// Uploading → Done.
    ///
    /// # Errors
    ///
    /// `NotUploading` from any other state.
    pub fn complete(&mut self, reference: PrescriptionRef) -> Result<UploadedFile, UploadError> {
        let UploadState::Uploading(file) = &self.state else {
            return Err(UploadError::NotUploading);
        };
        let file = file.clone();
        self.state = UploadState::Done(file.clone(), reference);
        Ok(file)
    }

    /// Uploading → FileSelected, when storage refused the file. The selection
    /// is kept so the shopper can retry.
    ///
    /// # Errors
    ///
    /// `NotUploading` from any other state.
    pub fn fail(&mut self) -> Result<(), UploadError> {
        let UploadState::Uploading(file) = &self.state else {
            return Err(UploadError::NotUploading);
        };
        self.state = UploadState::FileSelected(file.clone());
        Ok(())
    }

    /// Close the dialog without uploading.
    ///
    /// # Errors
    ///
    /// `UploadInProgress` while uploading.
    pub fn cancel(&mut self) -> Result<(), UploadError> {
        if matches!(self.state, UploadState::Uploading(_)) {
            return Err(UploadError::UploadInProgress);
        }
        Ok(())
    }

    fn ensure_selectable(&self) -> Result<(), UploadError> {
        match self.state {
            UploadState::Idle | UploadState::FileSelected(_) => Ok(()),
            UploadState::Uploading(_) => Err(UploadError::UploadInProgress),
            UploadState::Done(..) => Err(UploadError::AlreadyDone),
        }
    }
}
