use crate::api::{to_body, BackofficeApiClient, RequestType, Routes};
use backoffice_error::ApiError;
use backoffice_types::{
    AnniversaryRewardPolicy, DeleteResponse, ListQuery, Page, RewardPolicyRequest,
};
use tokio_util::sync::CancellationToken;

impl BackofficeApiClient {
    pub async fn list_reward_policies(
        &self,
        query: &ListQuery,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Page<AnniversaryRewardPolicy>, ApiError> {
        self.request_json(
            Routes::RewardPolicies,
            RequestType::Get,
            None,
            query.to_query_params(),
            auth_token,
            cancel,
        )
        .await
    }

    /// POST for a new policy, PUT to replace an existing one
    pub async fn upsert_reward_policy(
        &self,
        request: &RewardPolicyRequest,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<AnniversaryRewardPolicy, ApiError> {
        let (route, request_type) = match &request.id {
            Some(id) => (Routes::RewardPolicy(id.clone()), RequestType::Put),
            None => (Routes::RewardPolicies, RequestType::Post),
        };

        self.request_json(
            route,
            request_type,
            Some(to_body(request)?),
            Vec::new(),
            auth_token,
            cancel,
        )
        .await
    }

    pub async fn delete_reward_policy(
        &self,
        policy_id: &str,
        auth_token: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, ApiError> {
        let response: DeleteResponse = self
            .request_json(
                Routes::RewardPolicy(policy_id.to_string()),
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
