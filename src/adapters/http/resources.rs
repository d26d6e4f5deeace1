use super::{not_found_as, ApiClient};
use crate::domain::model::{
    Configuration, Contact, Documentation, EndpointUser, ListResponse, Location, NetworkDevice,
    PasswordEntry, Peripheral, Server,
};
use crate::domain::ports::ScopedResource;
use crate::utils::error::Result;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

impl ScopedResource for Location {
    const COLLECTION: &'static str = "locations";
    const LABEL: &'static str = "Location";
}

impl ScopedResource for Contact {
    const COLLECTION: &'static str = "contacts";
    const LABEL: &'static str = "Contact";
}

impl ScopedResource for Documentation {
    const COLLECTION: &'static str = "documentations";
    const LABEL: &'static str = "Documentation";
}

impl ScopedResource for PasswordEntry {
    const COLLECTION: &'static str = "passwords";
    const LABEL: &'static str = "Password entry";
}

impl ScopedResource for Configuration {
    const COLLECTION: &'static str = "configurations";
    const LABEL: &'static str = "Configuration";
}

// 端點盤點
impl ScopedResource for NetworkDevice {
    const COLLECTION: &'static str = "network-devices";
    const LABEL: &'static str = "Network device";
}

impl ScopedResource for EndpointUser {
    const COLLECTION: &'static str = "endpoint-users";
    const LABEL: &'static str = "Endpoint user";
}

impl ScopedResource for Server {
    const COLLECTION: &'static str = "servers";
    const LABEL: &'static str = "Server";
}

impl ScopedResource for Peripheral {
    const COLLECTION: &'static str = "peripherals";
    const LABEL: &'static str = "Peripheral";
}

/// 單一組織範圍資源的 CRUD 端點
#[derive(Debug)]
pub struct ResourceApi<T: ScopedResource> {
    client: Arc<ApiClient>,
    _resource: PhantomData<fn() -> T>,
}

impl<T: ScopedResource> Clone for ResourceApi<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.client))
    }
}

pub type LocationApi = ResourceApi<Location>;
pub type ContactApi = ResourceApi<Contact>;
pub type DocumentationApi = ResourceApi<Documentation>;
pub type PasswordApi = ResourceApi<PasswordEntry>;
pub type ConfigurationApi = ResourceApi<Configuration>;
pub type NetworkDeviceApi = ResourceApi<NetworkDevice>;
pub type EndpointUserApi = ResourceApi<EndpointUser>;
pub type ServerApi = ResourceApi<Server>;
pub type PeripheralApi = ResourceApi<Peripheral>;

impl<T: ScopedResource> ResourceApi<T> {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn collection_path() -> String {
        format!("{}/", T::COLLECTION)
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}/", T::COLLECTION, id)
    }

    pub async fn get_all(&self, params: &[(&str, &str)]) -> Result<Vec<T>> {
        let response: ListResponse<T> = self.client.get(&Self::collection_path(), params).await?;
        Ok(response.into_items())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<T> {
        self.client
            .get(&Self::item_path(id), &[])
            .await
            .map_err(not_found_as(T::LABEL, id))
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T> {
        self.client.post(&Self::collection_path(), body).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, patch: &B) -> Result<T> {
        self.client
            .patch(&Self::item_path(id), patch)
            .await
            .map_err(not_found_as(T::LABEL, id))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete(&Self::item_path(id))
            .await
            .map_err(not_found_as(T::LABEL, id))
    }

    pub async fn by_organization(&self, organization_id: &str) -> Result<Vec<T>> {
        let response: ListResponse<T> = self
            .client
            .get(
                &format!("{}/by_organization/", T::COLLECTION),
                &[("organization_id", organization_id)],
            )
            .await?;
        Ok(response.into_items())
    }
}

impl ResourceApi<Contact> {
    pub async fn by_location(&self, location_id: &str) -> Result<Vec<Contact>> {
        let response: ListResponse<Contact> = self
            .client
            .get("contacts/by_location/", &[("location_id", location_id)])
            .await?;
        Ok(response.into_items())
    }
}

impl ResourceApi<Documentation> {
    pub async fn publish(&self, id: &str) -> Result<()> {
        self.client
            .post_action(&format!("documentations/{}/publish/", id))
            .await
            .map_err(not_found_as(Documentation::LABEL, id))
    }

    pub async fn unpublish(&self, id: &str) -> Result<()> {
        self.client
            .post_action(&format!("documentations/{}/unpublish/", id))
            .await
            .map_err(not_found_as(Documentation::LABEL, id))
    }
}
