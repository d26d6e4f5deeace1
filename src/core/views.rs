use crate::adapters::http::{
    ApiClient, ConfigurationApi, ContactApi, DocumentationApi, EndpointUserApi, LocationApi,
    NetworkDeviceApi, OrganizationApi, PasswordApi, PeripheralApi, ResourceApi, ServerApi,
};
use crate::core::session::SessionScope;
use crate::domain::model::{
    Configuration, Contact, Documentation, EndpointUser, Location, NetworkDevice, Organization,
    OrganizationStats, PasswordEntry, Peripheral, Server,
};
use crate::domain::ports::ScopedResource;
use crate::utils::error::Result;
use std::sync::Arc;

/// 選取組織底下所有資源的一次性載入結果
#[derive(Debug, Clone)]
pub struct OrganizationOverview {
    pub organization: Organization,
    pub locations: Vec<Location>,
    pub contacts: Vec<Contact>,
    pub documentations: Vec<Documentation>,
    pub passwords: Vec<PasswordEntry>,
    pub configurations: Vec<Configuration>,
}

/// 選取組織的端點盤點：網路設備、使用者端點、伺服器、周邊
#[derive(Debug, Clone)]
pub struct EndpointInventory {
    pub organization: Organization,
    pub network_devices: Vec<NetworkDevice>,
    pub endpoint_users: Vec<EndpointUser>,
    pub servers: Vec<Server>,
    pub peripherals: Vec<Peripheral>,
}

impl EndpointInventory {
    pub fn total(&self) -> usize {
        self.network_devices.len()
            + self.endpoint_users.len()
            + self.servers.len()
            + self.peripherals.len()
    }
}

/// List views scoped to the selected organization.
///
/// Every method returns `Ok(None)` when nothing is selected, without calling
/// the API.
#[derive(Debug, Clone)]
pub struct OrganizationViews {
    organizations: OrganizationApi,
    locations: LocationApi,
    contacts: ContactApi,
    documentations: DocumentationApi,
    passwords: PasswordApi,
    configurations: ConfigurationApi,
    network_devices: NetworkDeviceApi,
    endpoint_users: EndpointUserApi,
    servers: ServerApi,
    peripherals: PeripheralApi,
}

impl OrganizationViews {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            organizations: OrganizationApi::new(Arc::clone(&client)),
            locations: LocationApi::new(Arc::clone(&client)),
            contacts: ContactApi::new(Arc::clone(&client)),
            documentations: DocumentationApi::new(Arc::clone(&client)),
            passwords: PasswordApi::new(Arc::clone(&client)),
            configurations: ConfigurationApi::new(Arc::clone(&client)),
            network_devices: NetworkDeviceApi::new(Arc::clone(&client)),
            endpoint_users: EndpointUserApi::new(Arc::clone(&client)),
            servers: ServerApi::new(Arc::clone(&client)),
            peripherals: PeripheralApi::new(client),
        }
    }

    fn selected(scope: &SessionScope) -> Result<Option<Organization>> {
        Ok(scope.context()?.selected_org())
    }

    async fn scoped<T: ScopedResource>(
        api: &ResourceApi<T>,
        organization: &Organization,
    ) -> Result<Vec<T>> {
        api.by_organization(&organization.id).await.map_err(|e| {
            tracing::error!("Failed to load {}: {}", T::COLLECTION, e);
            e
        })
    }

    async fn list<T: ScopedResource>(
        api: &ResourceApi<T>,
        scope: &SessionScope,
    ) -> Result<Option<Vec<T>>> {
        let Some(organization) = Self::selected(scope)? else {
            tracing::debug!("No organization selected, skipping {}", T::COLLECTION);
            return Ok(None);
        };
        Ok(Some(Self::scoped(api, &organization).await?))
    }

    pub async fn locations(&self, scope: &SessionScope) -> Result<Option<Vec<Location>>> {
        Self::list(&self.locations, scope).await
    }

    pub async fn contacts(&self, scope: &SessionScope) -> Result<Option<Vec<Contact>>> {
        Self::list(&self.contacts, scope).await
    }

    pub async fn documentations(
        &self,
        scope: &SessionScope,
    ) -> Result<Option<Vec<Documentation>>> {
        Self::list(&self.documentations, scope).await
    }

    pub async fn passwords(&self, scope: &SessionScope) -> Result<Option<Vec<PasswordEntry>>> {
        Self::list(&self.passwords, scope).await
    }

    pub async fn configurations(
        &self,
        scope: &SessionScope,
    ) -> Result<Option<Vec<Configuration>>> {
        Self::list(&self.configurations, scope).await
    }

    pub async fn network_devices(
        &self,
        scope: &SessionScope,
    ) -> Result<Option<Vec<NetworkDevice>>> {
        Self::list(&self.network_devices, scope).await
    }

    pub async fn endpoint_users(&self, scope: &SessionScope) -> Result<Option<Vec<EndpointUser>>> {
        Self::list(&self.endpoint_users, scope).await
    }

    pub async fn servers(&self, scope: &SessionScope) -> Result<Option<Vec<Server>>> {
        Self::list(&self.servers, scope).await
    }

    pub async fn peripherals(&self, scope: &SessionScope) -> Result<Option<Vec<Peripheral>>> {
        Self::list(&self.peripherals, scope).await
    }

    pub async fn stats(&self, scope: &SessionScope) -> Result<Option<OrganizationStats>> {
        let Some(organization) = Self::selected(scope)? else {
            return Ok(None);
        };
        let stats = self
            .organizations
            .get_stats(&organization.id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load organization stats: {}", e);
                e
            })?;
        Ok(Some(stats))
    }

    /// 並行載入所有資源，任一失敗即回傳錯誤
    pub async fn overview(&self, scope: &SessionScope) -> Result<Option<OrganizationOverview>> {
        let Some(organization) = Self::selected(scope)? else {
            return Ok(None);
        };

        let (locations, contacts, documentations, passwords, configurations) = tokio::try_join!(
            Self::scoped(&self.locations, &organization),
            Self::scoped(&self.contacts, &organization),
            Self::scoped(&self.documentations, &organization),
            Self::scoped(&self.passwords, &organization),
            Self::scoped(&self.configurations, &organization),
        )?;

        Ok(Some(OrganizationOverview {
            organization,
            locations,
            contacts,
            documentations,
            passwords,
            configurations,
        }))
    }

    /// 四類端點同時載入，任一失敗即整體失敗
    pub async fn endpoints(&self, scope: &SessionScope) -> Result<Option<EndpointInventory>> {
        let Some(organization) = Self::selected(scope)? else {
            return Ok(None);
        };

        let (network_devices, endpoint_users, servers, peripherals) = tokio::try_join!(
            Self::scoped(&self.network_devices, &organization),
            Self::scoped(&self.endpoint_users, &organization),
            Self::scoped(&self.servers, &organization),
            Self::scoped(&self.peripherals, &organization),
        )?;

        Ok(Some(EndpointInventory {
            organization,
            network_devices,
            endpoint_users,
            servers,
            peripherals,
        }))
    }
}
