use crate::api::{to_body, BackofficeApiClient, RequestType, Routes};
use backoffice_error::ApiError;
use backoffice_types::{BanUserRequest, ListQuery, Page, User};
use tokio_util::sync::CancellationToken;

impl BackofficeApiClient {
    pub async fn list_users(
        &self,
        query: &ListQuery,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Page<User>, ApiError> {
        self.request_json(
            Routes::Users,
            RequestType::Get,
            None,
            query.to_query_params(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn get_user(
        &self,
        user_id: &str,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<User, ApiError> {
        self.request_json(
            Routes::User(user_id.to_string()),
            RequestType::Get,
            None,
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }

    /// Ban enforcement is applied by the api; the updated user is returned
    pub async fn ban_user(
        &self,
        user_id: &str,
        reason: &str,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<User, ApiError> {
        let body = to_body(&BanUserRequest {
            reason: reason.to_string(),
        })?;

        self.request_json(
            Routes::UserBan(user_id.to_string()),
            RequestType::Post,
            Some(body),
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn unban_user(
        &self,
        user_id: &str,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<User, ApiError> {
        self.request_json(
            Routes::UserUnban(user_id.to_string()),
            RequestType::Post,
            None,
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }
}
