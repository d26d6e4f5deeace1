use crate::core::context::OrganizationContext;
use crate::domain::ports::{OrganizationDirectory, SelectionStore};
use crate::utils::error::{Result, TechVaultError};
use std::sync::Arc;

/// Owns the lifetime of an [`OrganizationContext`].
///
/// Views receive the scope and ask it for the context. Asking an unmounted
/// scope returns [`TechVaultError::ContextNotInitialized`], which is a wiring
/// bug in the caller rather than a data error.
#[derive(Debug, Default)]
pub struct SessionScope {
    context: Option<Arc<OrganizationContext>>,
}

impl SessionScope {
    /// 未掛載的範圍
    pub fn unmounted() -> Self {
        Self::default()
    }

    /// 建立上下文並執行第一次目錄載入
    pub async fn mount(
        directory: Arc<dyn OrganizationDirectory>,
        store: Arc<dyn SelectionStore>,
    ) -> Self {
        let scope = Self::mount_deferred(directory, store);
        if let Some(context) = &scope.context {
            context.load_organizations().await;
        }
        scope
    }

    /// 建立上下文但不載入，由呼叫端決定何時載入
    pub fn mount_deferred(
        directory: Arc<dyn OrganizationDirectory>,
        store: Arc<dyn SelectionStore>,
    ) -> Self {
        tracing::debug!("Mounting organization session");
        Self {
            context: Some(Arc::new(OrganizationContext::new(directory, store))),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Result<Arc<OrganizationContext>> {
        self.context
            .clone()
            .ok_or(TechVaultError::ContextNotInitialized)
    }

    /// 結束工作階段；只有保存的 id 會留下
    pub fn unmount(&mut self) -> Option<Arc<OrganizationContext>> {
        tracing::debug!("Unmounting organization session");
        self.context.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemorySelectionStore;
    use crate::domain::model::Organization;
    use crate::domain::ports::SELECTED_ORG_KEY;
    use async_trait::async_trait;

    struct FixedDirectory(Vec<Organization>);

    #[async_trait]
    impl OrganizationDirectory for FixedDirectory {
        async fn get_all(&self) -> Result<Vec<Organization>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_unmounted_scope_reports_programmer_error() {
        let scope = SessionScope::unmounted();
        let err = scope.context().unwrap_err();
        assert!(err.is_programmer_error());
    }

    #[test]
    fn test_mount_restores_and_unmount_keeps_store() {
        let store = Arc::new(MemorySelectionStore::with_entry(SELECTED_ORG_KEY, "2"));
        let directory = Arc::new(FixedDirectory(vec![
            Organization::new("1", "One"),
            Organization::new("2", "Two"),
        ]));

        let mut scope = tokio_test::block_on(SessionScope::mount(directory, store.clone()));
        assert!(scope.is_mounted());
        assert_eq!(scope.context().unwrap().selected_org().unwrap().name, "Two");

        assert!(scope.unmount().is_some());
        assert!(matches!(
            scope.context(),
            Err(TechVaultError::ContextNotInitialized)
        ));
        assert_eq!(store.get(SELECTED_ORG_KEY).unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_mount_deferred_does_not_load() {
        let directory = Arc::new(FixedDirectory(vec![Organization::new("1", "One")]));
        let scope = SessionScope::mount_deferred(directory, Arc::new(MemorySelectionStore::new()));
        let context = scope.context().unwrap();
        assert!(context.organizations().is_empty());
        assert!(!context.loading());
    }
}
