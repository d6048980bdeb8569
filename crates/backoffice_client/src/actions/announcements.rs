use crate::api::{to_body, BackofficeApiClient, RequestType, Routes};
use backoffice_error::ApiError;
use backoffice_types::{Announcement, AnnouncementRequest, DeleteResponse, ListQuery, Page};
use tokio_util::sync::CancellationToken;

impl BackofficeApiClient {
    pub async fn list_announcements(
        &self,
        query: &ListQuery,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Page<Announcement>, ApiError> {
        self.request_json(
            Routes::Announcements,
            RequestType::Get,
            None,
            query.to_query_params(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn create_announcement(
        &self,
        request: &AnnouncementRequest,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Announcement, ApiError> {
        self.request_json(
            Routes::Announcements,
            RequestType::Post,
            Some(to_body(request)?),
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn update_announcement(
        &self,
        announcement_id: &str,
        request: &AnnouncementRequest,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Announcement, ApiError> {
        self.request_json(
            Routes::Announcement(announcement_id.to_string()),
            RequestType::Patch,
            Some(to_body(request)?),
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn delete_announcement(
        &self,
        announcement_id: &str,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, ApiError> {
        let response: DeleteResponse = self
            .request_json(
                Routes::Announcement(announcement_id.to_string()),
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
