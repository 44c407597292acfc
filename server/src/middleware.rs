use axum::{
    extract::{Extension, Host, Request},
    middleware::Next,
    response::Response,
};

use crate::error::{ErrorKind, ServerResult};
use crate::State;

/// Restricts valid Host headers.
///
/// We also require that all request have a Host header in
/// the first place.
pub async fn restrict_host(
    Extension(state): Extension<State>,
    Host(host): Host,
    req: Request,
    next: Next,
) -> ServerResult<Response> {
    let allowed_hosts = &state.config.allowed_hosts;

    if !allowed_hosts.is_empty() && !allowed_hosts.iter().any(|h| h.as_str() == host) {
        tracing::debug!("Rejected request for host {:?}", host);
        return Err(ErrorKind::InvalidHost.into());
    }

    Ok(next.run(req).await)
}
