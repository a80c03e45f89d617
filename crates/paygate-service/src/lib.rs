//! Credential verification and authorization for paygate.
//!
//! [`bootstrap`] wires the pieces together from [`Settings`]: an
//! [`auth::Authenticator`] over the given store and an [`auth::Authorizer`]
//! over the configured permission catalog.

pub mod auth;
pub mod error;

use std::sync::Arc;

use paygate_core::config::Settings;
use paygate_store::store::CredentialStore;

use crate::auth::{Authenticator, Authorizer, PermissionCatalog};
use crate::error::ServiceResult;

/// ## Summary
/// Builds the authentication and authorization services from settings.
///
/// ## Errors
/// Returns `ConfigurationError` for invalid settings or catalog policy, and
/// `CasbinError` if the catalog model cannot be evaluated.
#[tracing::instrument(skip_all)]
pub async fn bootstrap(
    store: Arc<dyn CredentialStore>,
    settings: &Settings,
) -> ServiceResult<(Authenticator, Authorizer)> {
    let authenticator = Authenticator::from_settings(store, settings)?;
    let catalog = PermissionCatalog::load(&settings.catalog).await?;

    tracing::info!(
        max_attempts = authenticator.policy().max_attempts(),
        lockout_secs = authenticator.policy().lockout_duration().num_seconds(),
        "Authentication services ready"
    );
    Ok((authenticator, Authorizer::new(Arc::new(catalog))))
}
