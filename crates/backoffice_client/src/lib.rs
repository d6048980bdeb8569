pub mod actions;
pub mod api;
pub mod upload;
pub mod version;

pub use api::{
    auth_headers, build_http_client, BackofficeApiClient, RequestBody, RequestOptions,
    RequestType, Routes,
};
pub use upload::{MultipartUploader, UploadFile, UploadStage};
pub use version::{VersionStatus, VersionWatcher};
