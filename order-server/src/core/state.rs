//! Shared server state

use std::path::Path;
use std::sync::Arc;

use shared::error::AppResult;

use super::config::Config;
use crate::db::Store;
use crate::gateway::client::RestGateway;
use crate::gateway::retry::RetryPolicy;
use crate::orders::engine::OrderWorkflow;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub workflow: Arc<OrderWorkflow>,
}

impl ServerState {
    pub fn initialize(config: Config) -> AppResult<Self> {
        if let Some(parent) = Path::new(&config.db_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| shared::error::AppError::internal(e.to_string()))?;
        }

        let store = Store::open(&config.db_path).map_err(shared::error::AppError::from)?;
        let gateway = Arc::new(RestGateway::new(&config));
        let workflow = OrderWorkflow::new(
            store,
            gateway,
            RetryPolicy::default(),
            config.payment_redirect_url.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            workflow: Arc::new(workflow),
        })
    }
}
