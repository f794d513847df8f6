use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_document::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::infra_rules::*;
use crate::logger::*;
use crate::server::*;
use crate::settings::Settings;
use nanoid::nanoid;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Server {
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub friendship_service: Arc<dyn FriendshipService>,
    pub directory_service: Arc<dyn DirectoryService>,
    pub library_service: Arc<dyn LibraryService>,
    pub profile_service: Arc<dyn ProfileService>,
    pub dispatcher: Arc<FriendActionDispatcher>,
    relationships: Arc<dyn RelationshipStore>,
    directory: Arc<dyn UserDirectory>,
    sweep_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);

        let backend: Arc<dyn DocumentStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryDocumentStore::new()),
            "redis" => {
                let dsn = settings
                    .store
                    .redis_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.redis_dsn is required for redis"))?;
                let redis_client = redis::Client::open(dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisDocumentStore::new(
                    redis_manager,
                    settings.store.redis_prefix.clone(),
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let identity_provider: Arc<dyn IdentityProvider> = match settings.identity.backend.as_str()
        {
            "fake" => Arc::new(FakeIdentityProvider::new()),
            other => return Err(anyhow::anyhow!("Unknown identity backend: {}", other)),
        };

        let cancel = CancellationToken::new();
        let server = Self::with_store(
            backend,
            identity_provider,
            settings.store.enforce_rules,
            settings.friendship,
            cancel,
        );

        if settings.sweep.enabled {
            let interval = Duration::from_secs(settings.sweep.interval_secs);
            let sweep = server.reconciliation_sweep(interval);
            let handle = tokio::spawn(async move {
                if let Err(e) = sweep.run().await {
                    error!("reconciliation sweep stopped: {:?}", e);
                }
            });
            if let Ok(mut lock) = server.sweep_handle.lock() {
                *lock = Some(handle);
            }
        }

        info!(%run_id, backend = %settings.store.backend, "server started");
        Ok(server)
    }

    /// Wires every service over `backend`. No background task is started.
    pub fn with_store(
        backend: Arc<dyn DocumentStore>,
        identity_provider: Arc<dyn IdentityProvider>,
        enforce_rules: bool,
        policy: FriendshipPolicy,
        cancel: CancellationToken,
    ) -> Self {
        let store: Arc<dyn DocumentStore> = if enforce_rules {
            Arc::new(RuleEnforcingStore::new(backend))
        } else {
            warn!("access rules disabled; every caller may touch every document");
            backend
        };

        let relationships: Arc<dyn RelationshipStore> =
            Arc::new(DocRelationshipStore::new(store.clone()));
        let directory: Arc<dyn UserDirectory> = Arc::new(DocUserDirectory::new(store.clone()));
        let library: Arc<dyn LibraryStore> = Arc::new(DocLibraryStore::new(store));

        let friendship_service: Arc<dyn FriendshipService> =
            Arc::new(RealFriendshipService::new(relationships.clone(), policy));
        let directory_service: Arc<dyn DirectoryService> = Arc::new(RealDirectoryService::new(
            directory.clone(),
            friendship_service.clone(),
        ));
        let library_service: Arc<dyn LibraryService> = Arc::new(RealLibraryService::new(
            library,
            friendship_service.clone(),
        ));
        let profile_service: Arc<dyn ProfileService> =
            Arc::new(RealProfileService::new(directory.clone()));
        let dispatcher = Arc::new(FriendActionDispatcher::new(
            friendship_service.clone(),
            directory.clone(),
        ));
        debug!(?policy, "friendship policy");

        Self {
            identity_provider,
            friendship_service,
            directory_service,
            library_service,
            profile_service,
            dispatcher,
            sweep_handle: Mutex::new(None),
            cancel,
            relationships,
            directory,
        }
    }

    pub fn reconciliation_sweep(&self, interval: Duration) -> ReconciliationSweep {
        ReconciliationSweep::new(
            self.directory.clone(),
            self.relationships.clone(),
            interval,
            self.cancel.clone(),
        )
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = self.sweep_handle.lock().ok().and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("sweep handle dropped: {:?}", r);
        }
    }
}
