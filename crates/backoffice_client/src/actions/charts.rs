use crate::api::{BackofficeApiClient, RequestType, Routes};
use backoffice_error::ApiError;
use backoffice_types::{ChartEntry, ListQuery, Page};
use tokio_util::sync::CancellationToken;

impl BackofficeApiClient {
    /// Ranking rows as computed by the api, filtered by period via the query
    pub async fn list_chart_entries(
        &self,
        query: &ListQuery,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Page<ChartEntry>, ApiError> {
        self.request_json(
            Routes::Charts,
            RequestType::Get,
            None,
            query.to_query_params(),
            auth_token,
            cancel,
        )
        .await
    }
}
