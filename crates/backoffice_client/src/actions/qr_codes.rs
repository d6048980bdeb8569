use crate::api::{to_body, BackofficeApiClient, RequestType, Routes};
use backoffice_error::ApiError;
use backoffice_types::{CreateQrCodeRequest, DeleteResponse, ListQuery, Page, QrCode};
use tokio_util::sync::CancellationToken;

impl BackofficeApiClient {
    pub async fn list_qr_codes(
        &self,
        query: &ListQuery,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Page<QrCode>, ApiError> {
        self.request_json(
            Routes::QrCodes,
            RequestType::Get,
            None,
            query.to_query_params(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn create_qr_code(
        &self,
        request: &CreateQrCodeRequest,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<QrCode, ApiError> {
        self.request_json(
            Routes::QrCodes,
            RequestType::Post,
            Some(to_body(request)?),
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn delete_qr_code(
        &self,
        qr_code_id: &str,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, ApiError> {
        let response: DeleteResponse = self
            .request_json(
                Routes::QrCode(qr_code_id.to_string()),
                RequestType::Delete,
                None,
                Vec::new(),
                auth_token,
                cancel,
            )
            .await?;

        Ok(response.deleted)
    }
}
