//! Composition root wiring the session, guard, and synchronizers.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::{ClientSettings, ConfigError};
use crate::domain::ports::RemoteApi;
use crate::domain::{
    AssetResolver, AuthService, HrSynchronizer, InventorySynchronizer, RouteGuard, RouteTable,
    SessionHandle, SiteSynchronizer, WarehouseSynchronizer,
};
use crate::outbound::events::BroadcastAuthEvents;
use crate::outbound::http::HttpRemoteApi;

/// Failures while assembling an [`AppContext`].
#[derive(Debug, Error)]
pub enum ContextError {
    /// Settings did not validate.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Every service of the client, sharing one session and one remote API.
pub struct AppContext<A> {
    pub session: SessionHandle,
    pub events: BroadcastAuthEvents,
    pub auth: AuthService<A>,
    pub guard: RouteGuard<AuthService<A>>,
    pub hr: HrSynchronizer<A>,
    pub warehouses: WarehouseSynchronizer<A>,
    pub inventory: InventorySynchronizer<A>,
    pub site: SiteSynchronizer<A>,
}

impl AppContext<HttpRemoteApi> {
    /// Build the context over the HTTP adapter described by `settings`.
    ///
    /// A configured token seeds the session; the profile is fetched by the
    /// first guarded navigation.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] for invalid settings or an unbuildable client.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ContextError> {
        let api_url = settings.api_url()?;
        let timeout = settings.request_timeout()?;
        let session = SessionHandle::new();
        if let Some(token) = settings.token() {
            debug!("session seeded from configured token");
            session.set_token(token);
        }
        let events = BroadcastAuthEvents::default();
        let api = HttpRemoteApi::new(
            &api_url,
            timeout,
            session.clone(),
            Arc::new(events.clone()),
        )?;
        Ok(Self::assemble(
            Arc::new(api),
            session,
            events,
            AssetResolver::from_api_url(api_url.as_str()),
        ))
    }
}

impl<A: RemoteApi> AppContext<A> {
    /// Build the context over any [`RemoteApi`], with the application routes.
    pub fn with_api(api: Arc<A>, session: SessionHandle, assets: AssetResolver) -> Self {
        Self::assemble(api, session, BroadcastAuthEvents::default(), assets)
    }

    fn assemble(
        api: Arc<A>,
        session: SessionHandle,
        events: BroadcastAuthEvents,
        assets: AssetResolver,
    ) -> Self {
        let auth = AuthService::new(Arc::clone(&api), session.clone());
        let guard = RouteGuard::new(
            Arc::new(auth.clone()),
            session.clone(),
            Arc::new(RouteTable::application()),
        );
        Self {
            hr: HrSynchronizer::new(Arc::clone(&api)),
            warehouses: WarehouseSynchronizer::new(Arc::clone(&api)),
            inventory: InventorySynchronizer::new(Arc::clone(&api)),
            site: SiteSynchronizer::new(api, assets),
            session,
            events,
            auth,
            guard,
        }
    }
}
