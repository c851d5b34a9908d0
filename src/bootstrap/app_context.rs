use std::sync::Arc;

use crate::application::access::WriteAuthorizer;
use crate::application::ports::document_store::DocumentStore;
use crate::application::ports::user_directory::UserDirectory;
use crate::bootstrap::config::Config;
use crate::domain::users::user::UserAccount;
use crate::infrastructure::store::MemoryDocumentStore;
use crate::infrastructure::users::StaticUserDirectory;

/// Which port a router serves; decides how callers are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listener {
    Public,
    Admin,
}

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    pub listener: Listener,
    services: Arc<AppServices>,
}

pub struct AppServices {
    document_store: Arc<dyn DocumentStore>,
    user_directory: Arc<dyn UserDirectory>,
    authorizer: WriteAuthorizer,
}

impl AppServices {
    pub fn new(
        document_store: Arc<dyn DocumentStore>,
        user_directory: Arc<dyn UserDirectory>,
        authorizer: WriteAuthorizer,
    ) -> Self {
        Self {
            document_store,
            user_directory,
            authorizer,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            listener: Listener::Public,
            services: Arc::new(services),
        }
    }

    /// Same services, resolved as the admin listener.
    pub fn for_admin(&self) -> Self {
        Self {
            listener: Listener::Admin,
            ..self.clone()
        }
    }

    /// In-memory store, configured users and the configured policy.
    pub fn in_memory(cfg: Config, users: Vec<UserAccount>) -> Self {
        let services = AppServices::new(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(StaticUserDirectory::new(users)),
            WriteAuthorizer::new(cfg.policy.clone()),
        );
        Self::new(cfg, services)
    }

    pub fn document_store(&self) -> Arc<dyn DocumentStore> {
        self.services.document_store.clone()
    }

    pub fn user_directory(&self) -> Arc<dyn UserDirectory> {
        self.services.user_directory.clone()
    }

    pub fn authorizer(&self) -> &WriteAuthorizer {
        &self.services.authorizer
    }
}
