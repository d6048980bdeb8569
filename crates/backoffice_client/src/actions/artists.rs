use crate::api::{to_body, BackofficeApiClient, RequestType, Routes};
use backoffice_error::ApiError;
use backoffice_types::{Artist, ArtistRequest, ListQuery, Page};
use tokio_util::sync::CancellationToken;

impl BackofficeApiClient {
    pub async fn list_artists(
        &self,
        query: &ListQuery,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Page<Artist>, ApiError> {
        self.request_json(
            Routes::Artists,
            RequestType::Get,
            None,
            query.to_query_params(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn create_artist(
        &self,
        request: &ArtistRequest,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Artist, ApiError> {
        self.request_json(
            Routes::Artists,
            RequestType::Post,
            Some(to_body(request)?),
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn update_artist(
        &self,
        artist_id: &str,
        request: &ArtistRequest,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Artist, ApiError> {
        self.request_json(
            Routes::Artist(artist_id.to_string()),
            RequestType::Patch,
            Some(to_body(request)?),
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }
}
