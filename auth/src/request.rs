use std::marker::PhantomData;

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use crate::session::{SessionManager, SessionStore};

/// Resolves the session attached to each request and, when there is a live one, inserts
/// `USERDATA` built from it into the request extensions. Requests without a session pass
/// through untouched, so handlers decide whether they need an identity.
///
/// The session cookie is read from the [tower_cookies::Cookies] extension, so
/// `CookieManagerLayer` must wrap this layer.
pub struct AuthenticationLayer<SESSIONSTORE: SessionStore, USERDATA> {
    pub sessions: SessionManager<SESSIONSTORE>,
    user_data_phantom: PhantomData<fn() -> USERDATA>,
}

impl<SESSIONSTORE: SessionStore, USERDATA> AuthenticationLayer<SESSIONSTORE, USERDATA>
where
    USERDATA: From<SESSIONSTORE::SessionFetchData> + Clone + Send + Sync + 'static,
{
    pub fn new(session_manager: SessionManager<SESSIONSTORE>) -> Self {
        Self {
            sessions: session_manager,
            user_data_phantom: PhantomData,
        }
    }
}

impl<SESSIONSTORE: SessionStore, USERDATA> Clone for AuthenticationLayer<SESSIONSTORE, USERDATA> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            user_data_phantom: PhantomData,
        }
    }
}

impl<S, SESSIONSTORE: SessionStore, USERDATA> Layer<S>
    for AuthenticationLayer<SESSIONSTORE, USERDATA>
{
    type Service = Authenticator<S, SESSIONSTORE, USERDATA>;

    fn layer(&self, inner: S) -> Self::Service {
        Authenticator {
            sessions: self.sessions.clone(),
            user_data_phantom: PhantomData,
            inner,
        }
    }
}

pub struct Authenticator<S, SESSIONSTORE: SessionStore, USERDATA> {
    sessions: SessionManager<SESSIONSTORE>,
    user_data_phantom: PhantomData<fn() -> USERDATA>,
    inner: S,
}

impl<S: Clone, SESSIONSTORE: SessionStore, USERDATA> Clone
    for Authenticator<S, SESSIONSTORE, USERDATA>
{
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            user_data_phantom: PhantomData,
            inner: self.inner.clone(),
        }
    }
}

impl<S, SESSIONSTORE, USERDATA> Service<Request<Body>> for Authenticator<S, SESSIONSTORE, USERDATA>
where
    S: Service<Request<Body>> + Send + Clone + 'static,
    S::Future: Send + 'static,
    S::Response: IntoResponse + Send + 'static,
    SESSIONSTORE: SessionStore,
    USERDATA: From<SESSIONSTORE::SessionFetchData> + Clone + Send + Sync + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner);

        let sessions = self.sessions.clone();
        // Read the ID before the future starts so it doesn't hold a borrow of the request.
        let session_id = sessions.session_id(&req);
        Box::pin(async move {
            let session_id = match session_id {
                Ok(id) => id,
                Err(response) => return Ok(response),
            };

            if let Some(id) = session_id {
                match sessions.get_session(&id).await {
                    Ok(Some(data)) => {
                        req.extensions_mut().insert(USERDATA::from(data));
                    }
                    Ok(None) => {}
                    Err(e) => return Ok(e.into_response()),
                }
            }

            Ok(inner.call(req).await?.into_response())
        })
    }
}
