//! Session-scoped organization selection.
//!
//! [`OrganizationContext`] owns the organization directory, the selected
//! organization and the loading flag. The selected id is mirrored into a
//! [`SelectionStore`] under [`SELECTED_ORG_KEY`] so it survives restarts.
//!
//! Overlapping loads are resolved last-requested-wins: every load takes a
//! generation number, and a completion is dropped once a newer generation has
//! already been applied. A newer load that fails does not hide an older
//! success. `loading` stays true while any load is in flight.

use crate::domain::model::Organization;
use crate::domain::ports::{OrganizationDirectory, SelectionStore, SELECTED_ORG_KEY};
use crate::utils::error::{Result, TechVaultError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPhase {
    Uninitialized,
    Loading,
    ReadyWithSelection,
    ReadyWithoutSelection,
}

/// 某一時刻的選取狀態複本
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    pub organizations: Vec<Organization>,
    pub selected_org: Option<Organization>,
    pub loading: bool,
    pub phase: ContextPhase,
}

#[derive(Debug, Default)]
struct SelectionState {
    organizations: Vec<Organization>,
    selected_org: Option<Organization>,
    in_flight: usize,
    latest_generation: u64,
    applied_generation: u64,
    completed_once: bool,
    last_load_error: Option<String>,
}

impl SelectionState {
    fn phase(&self) -> ContextPhase {
        if self.in_flight > 0 {
            ContextPhase::Loading
        } else if !self.completed_once {
            ContextPhase::Uninitialized
        } else if self.selected_org.is_some() {
            ContextPhase::ReadyWithSelection
        } else {
            ContextPhase::ReadyWithoutSelection
        }
    }
}

/// 載入結束時（不論成功、失敗或 future 被丟棄）清除 loading
struct LoadingGuard<'a> {
    state: &'a Mutex<SelectionState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = state.in_flight.saturating_sub(1);
        state.completed_once = true;
    }
}

pub struct OrganizationContext {
    directory: Arc<dyn OrganizationDirectory>,
    store: Arc<dyn SelectionStore>,
    state: Mutex<SelectionState>,
}

impl std::fmt::Debug for OrganizationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizationContext")
            .field("state", &*self.lock_state())
            .finish_non_exhaustive()
    }
}

impl OrganizationContext {
    /// 建立尚未載入的上下文；通常經由 `SessionScope::mount` 建立
    pub fn new(directory: Arc<dyn OrganizationDirectory>, store: Arc<dyn SelectionStore>) -> Self {
        Self {
            directory,
            store,
            state: Mutex::new(SelectionState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn organizations(&self) -> Vec<Organization> {
        self.lock_state().organizations.clone()
    }

    pub fn selected_org(&self) -> Option<Organization> {
        self.lock_state().selected_org.clone()
    }

    pub fn loading(&self) -> bool {
        self.lock_state().in_flight > 0
    }

    pub fn phase(&self) -> ContextPhase {
        self.lock_state().phase()
    }

    /// 最近一次目錄載入失敗的訊息；成功載入後清除
    pub fn last_load_error(&self) -> Option<String> {
        self.lock_state().last_load_error.clone()
    }

    /// 目錄從未成功載入且最近一次載入失敗時回傳 `DirectoryLoadError`
    pub fn ensure_loaded(&self) -> Result<()> {
        let state = self.lock_state();
        match &state.last_load_error {
            Some(message) if state.organizations.is_empty() => {
                Err(TechVaultError::DirectoryLoadError {
                    message: message.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        let state = self.lock_state();
        SelectionSnapshot {
            organizations: state.organizations.clone(),
            selected_org: state.selected_org.clone(),
            loading: state.in_flight > 0,
            phase: state.phase(),
        }
    }

    /// Fetch the directory and restore the persisted selection.
    ///
    /// Failures are logged and leave the previous organizations in place;
    /// nothing is returned to the caller and no retry is scheduled.
    pub async fn load_organizations(&self) {
        let generation = {
            let mut state = self.lock_state();
            state.in_flight += 1;
            state.latest_generation += 1;
            state.latest_generation
        };
        let _loading = LoadingGuard { state: &self.state };

        tracing::debug!("Loading organization directory (generation {})", generation);
        let result = self.directory.get_all().await;

        let mut state = self.lock_state();
        if generation < state.applied_generation {
            tracing::debug!(
                "Discarding organization directory from generation {} (generation {} already applied)",
                generation,
                state.applied_generation
            );
            return;
        }

        match result {
            Ok(organizations) => {
                tracing::debug!("Loaded {} organizations", organizations.len());
                state.organizations = organizations;
                state.applied_generation = generation;
                state.last_load_error = None;
                self.restore_selection(&mut state);
            }
            Err(e) => {
                tracing::error!("Failed to load organizations: {}", e);
                state.last_load_error = Some(e.to_string());
            }
        }
    }

    pub async fn refresh_organizations(&self) {
        self.load_organizations().await;
    }

    fn restore_selection(&self, state: &mut SelectionState) {
        let saved_id = match self.store.get(SELECTED_ORG_KEY) {
            Ok(saved_id) => saved_id,
            Err(e) => {
                tracing::warn!("Could not read saved organization: {}", e);
                None
            }
        };

        let Some(saved_id) = saved_id else {
            tracing::debug!("No saved organization to restore");
            return;
        };

        match state.organizations.iter().find(|org| org.id == saved_id) {
            Some(org) => {
                tracing::info!("Restored organization {} ({})", org.name, org.id);
                state.selected_org = Some(org.clone());
            }
            None => {
                // 已刪除或失去存取權的組織不可再被選取
                tracing::warn!(
                    "Saved organization {} is no longer available, clearing selection",
                    saved_id
                );
                if let Err(e) = self.store.remove(SELECTED_ORG_KEY) {
                    tracing::warn!("Could not clear saved organization: {}", e);
                }
                state.selected_org = None;
            }
        }
    }

    /// Replace the selection and mirror it into the store.
    ///
    /// Membership in the directory is not checked. Store failures are logged
    /// and otherwise ignored.
    pub fn set_selected_org(&self, org: Option<Organization>) {
        let mut state = self.lock_state();
        let persisted = match &org {
            Some(org) => self.store.set(SELECTED_ORG_KEY, &org.id),
            None => self.store.remove(SELECTED_ORG_KEY),
        };
        if let Err(e) = persisted {
            tracing::warn!("Could not persist organization selection: {}", e);
        }
        state.selected_org = org;
    }

    /// 依 id 從目前目錄選取組織
    pub fn select_by_id(&self, id: &str) -> Result<Organization> {
        let org = self
            .lock_state()
            .organizations
            .iter()
            .find(|org| org.id == id)
            .cloned()
            .ok_or_else(|| TechVaultError::NotFound {
                resource: "Organization".to_string(),
                id: id.to_string(),
            })?;
        self.set_selected_org(Some(org.clone()));
        Ok(org)
    }
}
