use crate::api::{
    auth_headers, to_body, BackofficeApiClient, RequestBody, RequestOptions, RequestType, Routes,
};
use backoffice_error::{ApiError, UploadError, UtilError};
use backoffice_settings::UploadSettings;
use backoffice_types::{
    BeginUploadRequest, FinalizeUploadRequest, PresignedUrl, UploadAction, UploadPart,
    UploadSession, UploadTargetsRequest,
};
use backoffice_utils::{file_name, strip_etag_quotes, FileCategory};
use bytes::Bytes;
use reqwest::header::ETAG;
use std::ops::Range;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const MAX_PARTS: usize = 10000;

/// Stages of a single upload. `Failed` and `Done` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Init,
    RequestingUploadId,
    RequestingUrls,
    UploadingBytes,
    Completing,
    Done,
    Failed,
}

impl UploadStage {
    /// Coarse progress reported when the stage is entered
    pub fn progress(&self) -> Option<u8> {
        match self {
            UploadStage::RequestingUploadId => Some(10),
            UploadStage::RequestingUrls => Some(30),
            UploadStage::UploadingBytes => Some(50),
            UploadStage::Completing => Some(80),
            UploadStage::Done => Some(100),
            UploadStage::Init | UploadStage::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStage::Done | UploadStage::Failed)
    }
}

/// A file selected for upload, held in memory
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub file_type: FileCategory,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(filename: &str, bytes: Bytes) -> Self {
        let path = Path::new(filename);
        Self {
            filename: filename.to_string(),
            file_type: FileCategory::from_path(path),
            content_type: mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, UtilError> {
        let filename = file_name(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| UtilError::ReadError(format!("{}: {}", path.display(), e)))?;

        Ok(Self::new(&filename, Bytes::from(bytes)))
    }
}

/// Drives the four step multipart upload: upload id, presigned urls,
/// raw PUTs to the storage backend, then complete or abort.
#[derive(Debug, Clone)]
pub struct MultipartUploader {
    api_client: BackofficeApiClient,
    part_size: Option<usize>,
}

impl MultipartUploader {
    pub fn new(api_client: BackofficeApiClient, settings: &UploadSettings) -> Self {
        Self {
            api_client,
            part_size: settings.part_size.filter(|size| *size > 0),
        }
    }

    /// Byte ranges of each part, in part number order
    fn plan_parts(&self, len: usize) -> Result<Vec<Range<usize>>, ApiError> {
        let part_size = match self.part_size {
            Some(size) if size < len => size,
            _ => return Ok(vec![0..len]),
        };

        let part_count = len.div_ceil(part_size);
        if part_count > MAX_PARTS {
            return Err(ApiError::Error(format!(
                "File size is too large for multipart upload: {} parts of {} bytes",
                part_count, part_size
            )));
        }

        Ok((0..part_count)
            .map(|index| {
                let start = index * part_size;
                start..std::cmp::min(start + part_size, len)
            })
            .collect())
    }

    /// Step 1: allocate an upload slot on the server
    pub async fn begin_upload(
        &self,
        filename: &str,
        file_type: &str,
        collection_name: &str,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<UploadSession, UploadError> {
        let request = BeginUploadRequest {
            file_name: filename.to_string(),
            file_type: file_type.to_string(),
            collection_name: collection_name.to_string(),
        };

        let session: UploadSession = self
            .api_client
            .request_json(
                Routes::UploadStart,
                RequestType::Post,
                Some(to_body(&request).map_err(UploadError::Init)?),
                Vec::new(),
                auth_token,
                cancel,
            )
            .await
            .map_err(|e| {
                warn!("Failed to start upload of {}: {}", filename, e);
                UploadError::Init(e)
            })?;

        debug!(upload_id = %session.upload_id, key = %session.key, "Upload session created");
        Ok(session)
    }

    /// Step 2: one presigned url per part, ordered by part number
    pub async fn request_upload_targets(
        &self,
        upload_id: &str,
        key: &str,
        part_count: u32,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<PresignedUrl>, UploadError> {
        if part_count == 0 {
            return Err(UploadError::Url(ApiError::Error(
                "Part count must be at least 1".to_string(),
            )));
        }

        let request = UploadTargetsRequest {
            upload_id: upload_id.to_string(),
            key: key.to_string(),
            parts: part_count,
        };

        let mut urls: Vec<PresignedUrl> = self
            .api_client
            .request_json(
                Routes::UploadUrls,
                RequestType::Post,
                Some(to_body(&request).map_err(UploadError::Url)?),
                Vec::new(),
                auth_token,
                cancel,
            )
            .await
            .map_err(|e| {
                warn!(upload_id = %upload_id, "Failed to get upload urls: {}", e);
                UploadError::Url(e)
            })?;

        urls.sort_by_key(|url| url.part_number);

        let contiguous = urls
            .iter()
            .enumerate()
            .all(|(index, url)| url.part_number as usize == index + 1);

        if urls.len() != part_count as usize || !contiguous {
            warn!(
                upload_id = %upload_id,
                "Expected {} upload urls, received {}",
                part_count,
                urls.len()
            );
            return Err(UploadError::Url(ApiError::Error(format!(
                "Expected {} upload urls numbered from 1, received {}",
                part_count,
                urls.len()
            ))));
        }

        Ok(urls)
    }

    /// Step 3: PUT raw bytes straight to the storage backend.
    /// The presigned url is used verbatim and carries its own credentials.
    pub async fn put_part(
        &self,
        presigned_url: &str,
        bytes: Bytes,
        content_type: &str,
        cancel: &CancellationToken,
    ) -> Result<String, UploadError> {
        let response = self
            .api_client
            .request(
                presigned_url,
                RequestType::Put,
                Some(RequestBody::Bytes {
                    data: bytes,
                    content_type: content_type.to_string(),
                }),
                None,
                Some(""),
                cancel,
            )
            .await
            .map_err(|e| {
                warn!("Failed to upload part: {}", e);
                UploadError::Put(e)
            })?;

        let e_tag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(strip_etag_quotes)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                warn!("Storage response did not include an ETag");
                UploadError::Put(ApiError::Error(
                    "Storage response did not include an ETag".to_string(),
                ))
            })?;

        Ok(e_tag)
    }

    /// Step 4: assemble the object, or discard the partial upload
    pub async fn finalize_upload(
        &self,
        upload_id: &str,
        key: &str,
        parts: &[UploadPart],
        action: UploadAction,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<(), UploadError> {
        let request = FinalizeUploadRequest {
            upload_id: upload_id.to_string(),
            key: key.to_string(),
            parts: parts.to_vec(),
            action,
        };

        let body = to_body(&request).map_err(UploadError::Finalize)?;
        let options =
            RequestOptions::with_headers(auth_headers(auth_token).map_err(UploadError::Finalize)?);

        // any 2xx is success, the response body is not read
        self.api_client
            .request(
                &Routes::UploadFinalize.path(),
                RequestType::Post,
                Some(RequestBody::Json(body)),
                Some(options),
                None,
                cancel,
            )
            .await
            .map_err(|e| {
                warn!(upload_id = %upload_id, action = %action, "Failed to finalize upload: {}", e);
                UploadError::Finalize(e)
            })?;

        Ok(())
    }

    fn advance<F: FnMut(u8)>(stage: &mut UploadStage, next: UploadStage, on_progress: &mut F) {
        debug!(from = ?stage, to = ?next, "Upload stage transition");
        *stage = next;
        if let Some(percent) = next.progress() {
            on_progress(percent);
        }
    }

    /// Steps 2 to 4 for an existing session
    async fn transfer<F: FnMut(u8)>(
        &self,
        session: &UploadSession,
        file: &UploadFile,
        ranges: &[Range<usize>],
        auth_token: &str,
        cancel: &CancellationToken,
        stage: &mut UploadStage,
        on_progress: &mut F,
    ) -> Result<(), UploadError> {
        let urls = self
            .request_upload_targets(
                &session.upload_id,
                &session.key,
                ranges.len() as u32,
                auth_token,
                cancel,
            )
            .await?;
        Self::advance(stage, UploadStage::UploadingBytes, on_progress);

        let mut parts = Vec::with_capacity(urls.len());
        for (url, range) in urls.iter().zip(ranges) {
            let e_tag = self
                .put_part(
                    &url.url,
                    file.bytes.slice(range.clone()),
                    &file.content_type,
                    cancel,
                )
                .await?;

            debug!(part_number = url.part_number, e_tag = %e_tag, "Uploaded part");
            parts.push(UploadPart {
                part_number: url.part_number,
                e_tag,
            });
        }
        Self::advance(stage, UploadStage::Completing, on_progress);

        self.finalize_upload(
            &session.upload_id,
            &session.key,
            &parts,
            UploadAction::Complete,
            auth_token,
            cancel,
        )
        .await
    }

    /// Best effort cleanup after a failure. Runs on its own token so a
    /// cancelled caller still releases the server side upload slot.
    async fn abort_quietly(&self, session: &UploadSession, auth_token: &str) {
        let result = self
            .finalize_upload(
                &session.upload_id,
                &session.key,
                &[],
                UploadAction::Abort,
                auth_token,
                &CancellationToken::new(),
            )
            .await;

        match result {
            Ok(()) => info!(upload_id = %session.upload_id, "Aborted failed upload"),
            Err(e) => warn!(
                upload_id = %session.upload_id,
                "Failed to abort upload, parts may be left behind: {}", e
            ),
        }
    }

    /// Upload a file and return its object key.
    ///
    /// Progress is reported at 10, 30, 50, 80 and 100. The first error is
    /// returned unchanged; if the upload session already exists an abort is
    /// attempted first.
    pub async fn upload_file<F: FnMut(u8)>(
        &self,
        file: &UploadFile,
        collection_name: &str,
        auth_token: &str,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<String, UploadError> {
        let mut stage = UploadStage::Init;
        Self::advance(&mut stage, UploadStage::RequestingUploadId, &mut on_progress);

        if file.bytes.is_empty() {
            stage = UploadStage::Failed;
            warn!(stage = ?stage, "Refusing to upload empty file {}", file.filename);
            return Err(UploadError::Init(ApiError::Error(format!(
                "File {} is empty",
                file.filename
            ))));
        }

        let ranges = self.plan_parts(file.bytes.len()).map_err(UploadError::Init)?;

        info!(
            filename = %file.filename,
            collection = %collection_name,
            parts = ranges.len(),
            "Starting upload"
        );

        let session = match self
            .begin_upload(
                &file.filename,
                file.file_type.as_str(),
                collection_name,
                auth_token,
                cancel,
            )
            .await
        {
            Ok(session) => session,
            Err(e) => {
                stage = UploadStage::Failed;
                error!(stage = ?stage, "Upload of {} failed: {}", file.filename, e);
                return Err(e);
            }
        };
        Self::advance(&mut stage, UploadStage::RequestingUrls, &mut on_progress);

        let result = self
            .transfer(
                &session,
                file,
                &ranges,
                auth_token,
                cancel,
                &mut stage,
                &mut on_progress,
            )
            .await;

        match result {
            Ok(()) => {
                Self::advance(&mut stage, UploadStage::Done, &mut on_progress);
                info!(key = %session.key, "Upload complete");
                Ok(session.key)
            }
            Err(e) => {
                error!(stage = ?stage, key = %session.key, "Upload failed: {}", e);
                stage = UploadStage::Failed;
                self.abort_quietly(&session, auth_token).await;
                debug!(stage = ?stage, "Upload finished");
                Err(e)
            }
        }
    }
}
