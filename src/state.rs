use std::sync::Arc;

use crate::auth::{TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::services::{CartService, ClassService, InstructorService, UserService};

/// Shared handles injected into every handler. Built once at startup;
/// cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenService>,
    pub classes: ClassService,
    pub instructors: InstructorService,
    pub users: UserService,
    pub carts: CartService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, TokenError> {
        let tokens = TokenService::from_config(&config.security)?;
        Ok(Self {
            classes: ClassService::new(store.clone()),
            instructors: InstructorService::new(store.clone()),
            users: UserService::new(store.clone()),
            carts: CartService::new(store.clone()),
            config: Arc::new(config),
            store,
            tokens: Arc::new(tokens),
        })
    }

    pub fn home_page_limit(&self) -> i64 {
        self.config.api.home_page_limit
    }
}
