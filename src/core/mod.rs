pub mod context;
pub mod session;
pub mod views;

pub use crate::domain::model::Organization;
pub use crate::domain::ports::{OrganizationDirectory, SelectionStore, SELECTED_ORG_KEY};
pub use crate::utils::error::Result;
pub use context::{ContextPhase, OrganizationContext, SelectionSnapshot};
pub use session::SessionScope;
pub use views::{EndpointInventory, OrganizationOverview, OrganizationViews};
