use super::{not_found_as, ApiClient};
use crate::domain::model::{ListResponse, Organization, OrganizationDraft, OrganizationStats};
use crate::domain::ports::OrganizationDirectory;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

const COLLECTION: &str = "organizations/";

#[derive(Debug, Clone)]
pub struct OrganizationApi {
    client: Arc<ApiClient>,
}

impl OrganizationApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get_all(&self, params: &[(&str, &str)]) -> Result<Vec<Organization>> {
        let response: ListResponse<Organization> = self.client.get(COLLECTION, params).await?;
        Ok(response.into_items())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Organization> {
        self.client
            .get(&format!("{}{}/", COLLECTION, id), &[])
            .await
            .map_err(not_found_as("Organization", id))
    }

    pub async fn create(&self, draft: &OrganizationDraft) -> Result<Organization> {
        self.client.post(COLLECTION, draft).await
    }

    pub async fn update(&self, id: &str, patch: &OrganizationDraft) -> Result<Organization> {
        self.client
            .patch(&format!("{}{}/", COLLECTION, id), patch)
            .await
            .map_err(not_found_as("Organization", id))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("{}{}/", COLLECTION, id))
            .await
            .map_err(not_found_as("Organization", id))
    }

    /// 空字串查詢時後端回傳空陣列
    pub async fn search(&self, query: &str) -> Result<Vec<Organization>> {
        let response: ListResponse<Organization> = self
            .client
            .get(&format!("{}search/", COLLECTION), &[("q", query)])
            .await?;
        Ok(response.into_items())
    }

    pub async fn get_stats(&self, id: &str) -> Result<OrganizationStats> {
        self.client
            .get(&format!("{}{}/stats/", COLLECTION, id), &[])
            .await
            .map_err(not_found_as("Organization", id))
    }
}

#[async_trait]
impl OrganizationDirectory for OrganizationApi {
    async fn get_all(&self) -> Result<Vec<Organization>> {
        OrganizationApi::get_all(self, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TechVaultError;
    use httpmock::prelude::*;

    fn api_for(server: &MockServer) -> OrganizationApi {
        OrganizationApi::new(Arc::new(ApiClient::new(&server.base_url()).unwrap()))
    }

    #[tokio::test]
    async fn test_get_all_unwraps_pagination_envelope() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/organizations/");
            then.status(200).json_body(serde_json::json!({
                "count": 2,
                "next": null,
                "previous": null,
                "results": [
                    {"id": "3", "name": "Acme"},
                    {"id": "7", "name": "Globex"}
                ]
            }));
        });

        let orgs = OrganizationDirectory::get_all(&api_for(&server)).await.unwrap();
        mock.assert();
        let ids: Vec<&str> = orgs.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "7"]);
    }

    #[tokio::test]
    async fn test_get_all_passes_filters() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/organizations/")
                .query_param("is_active", "true");
            then.status(200).json_body(serde_json::json!({"results": []}));
        });

        let orgs = api_for(&server)
            .get_all(&[("is_active", "true")])
            .await
            .unwrap();
        mock.assert();
        assert!(orgs.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_maps_404() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/organizations/42/");
            then.status(404).json_body(serde_json::json!({"detail": "Not found."}));
        });

        let err = api_for(&server).get_by_id("42").await.unwrap_err();
        assert!(
            matches!(err, TechVaultError::NotFound { ref resource, ref id } if resource == "Organization" && id == "42")
        );
    }

    #[tokio::test]
    async fn test_search_and_stats() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(GET)
                .path("/organizations/search/")
                .query_param("q", "acme");
            then.status(200)
                .json_body(serde_json::json!([{"id": "3", "name": "Acme"}]));
        });
        let stats = server.mock(|when, then| {
            when.method(GET).path("/organizations/3/stats/");
            then.status(200).json_body(serde_json::json!({
                "organization": "Acme",
                "locations_count": 2,
                "contacts_count": 5,
                "documentations_count": 1,
                "password_entries_count": 4,
                "configurations_count": 0
            }));
        });

        let api = api_for(&server);
        let found = api.search("acme").await.unwrap();
        assert_eq!(found.len(), 1);

        let counts = api.get_stats("3").await.unwrap();
        search.assert();
        stats.assert();
        assert_eq!(counts.organization, "Acme");
        assert_eq!(counts.contacts_count, 5);
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let server = MockServer::start();
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/organizations/")
                .json_body(serde_json::json!({"name": "Initech"}));
            then.status(201)
                .json_body(serde_json::json!({"id": "11", "name": "Initech"}));
        });
        let update = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/organizations/11/")
                .json_body(serde_json::json!({"city": "Austin"}));
            then.status(200)
                .json_body(serde_json::json!({"id": "11", "name": "Initech", "city": "Austin"}));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/organizations/11/");
            then.status(204);
        });

        let api = api_for(&server);
        let created = api
            .create(&OrganizationDraft {
                name: Some("Initech".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, "11");

        let updated = api
            .update(
                "11",
                &OrganizationDraft {
                    city: Some("Austin".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.city, "Austin");

        api.delete("11").await.unwrap();
        create.assert();
        update.assert();
        delete.assert();
    }
}
