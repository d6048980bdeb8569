use crate::api::{to_body, BackofficeApiClient, RequestType, Routes};
use backoffice_error::ApiError;
use backoffice_types::{CreatePointModificationRequest, ListQuery, Page, PointModification};
use tokio_util::sync::CancellationToken;

impl BackofficeApiClient {
    pub async fn list_point_modifications(
        &self,
        query: &ListQuery,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Page<PointModification>, ApiError> {
        self.request_json(
            Routes::PointModifications,
            RequestType::Get,
            None,
            query.to_query_params(),
            auth_token,
            cancel,
        )
        .await
    }

    /// Records an adjustment; the balance change is applied by the api
    pub async fn create_point_modification(
        &self,
        request: &CreatePointModificationRequest,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<PointModification, ApiError> {
        self.request_json(
            Routes::PointModifications,
            RequestType::Post,
            Some(to_body(request)?),
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }
}
