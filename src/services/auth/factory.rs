/// Factory: build `Authorizer` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::Authorizer;

pub fn build_authorizer(config: &Config) -> Result<Arc<Authorizer>, AppError> {
    let authorizer = Authorizer::new(config).map_err(|e| {
        tracing::error!(error = %e, algorithm = ?config.jwt_algorithm, "failed to load verification key");
        AppError::Internal
    })?;

    if authorizer.dev_bypass_active() {
        tracing::warn!("development session bypass is active; never run this build in production");
    }

    Ok(Arc::new(authorizer))
}
