//! Multipart photo intake.
//!
//! The file under the `photo` field is validated against the allow-list before a single byte is
//! written, streamed chunk by chunk into storage, and committed only once the whole request body
//! has been read. Any failure discards the partial file, as does the request future being dropped.

use axum::extract::Multipart;
use picbox_core::AppError;
use picbox_storage::{generate_filename, StoredFile, UploadSink};
use std::time::Instant;

use crate::constants::PHOTO_FIELD;
use crate::error::{app_error_from_multipart, app_error_from_storage};
use crate::state::AppState;

pub struct PhotoUploadService<'a> {
    state: &'a AppState,
}

impl<'a> PhotoUploadService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Receive exactly one file from the `photo` field and store it under a generated name.
    ///
    /// Other fields are ignored. A second `photo` file aborts the request without storing
    /// anything.
    pub async fn receive(&self, mut multipart: Multipart) -> Result<StoredFile, AppError> {
        let start = Instant::now();
        let mut pending: Option<Box<dyn UploadSink>> = None;

        let read = self.read_photo(&mut multipart, &mut pending).await;
        let Some(mut sink) = pending else {
            return read.and(Err(AppError::NoFileUploaded));
        };

        let committed = match read {
            Ok(()) => sink.commit().await.map_err(app_error_from_storage),
            Err(e) => Err(e),
        };
        if committed.is_err() {
            sink.discard().await;
        }
        let stored = committed?;

        tracing::info!(
            filename = %stored.filename,
            size_bytes = stored.size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Photo stored"
        );

        Ok(stored)
    }

    /// Stream the `photo` file into `pending`. On error, `pending` holds whatever was started.
    async fn read_photo(
        &self,
        multipart: &mut Multipart,
        pending: &mut Option<Box<dyn UploadSink>>,
    ) -> Result<(), AppError> {
        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(app_error_from_multipart)?
        {
            if field.name() != Some(PHOTO_FIELD) {
                tracing::debug!(field = ?field.name(), "Ignoring multipart field");
                continue;
            }

            let Some(original_filename) = field.file_name().map(str::to_owned) else {
                tracing::debug!("Ignoring non-file photo field");
                continue;
            };

            if pending.is_some() {
                return Err(AppError::UnexpectedField(format!(
                    "{} (only one file may be uploaded)",
                    PHOTO_FIELD
                )));
            }

            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            let ext = self
                .state
                .allow_list
                .check(&original_filename, &content_type)?;
            let filename = generate_filename(self.state.config.filename_strategy(), ext);

            tracing::debug!(
                original_filename = %original_filename,
                content_type = %content_type,
                filename = %filename,
                "Accepted photo field"
            );

            let sink = pending.insert(
                self.state
                    .storage
                    .begin_upload(&filename)
                    .await
                    .map_err(app_error_from_storage)?,
            );

            while let Some(chunk) = field.chunk().await.map_err(app_error_from_multipart)? {
                sink.write_chunk(&chunk)
                    .await
                    .map_err(app_error_from_storage)?;
            }
        }

        Ok(())
    }
}
