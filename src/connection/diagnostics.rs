//! Per-connection diagnostic sink
//!
//! Every diagnostic a connection emits goes through [`Diagnostics::scope`],
//! which enters the connection's span and, if one was configured, the
//! connection's own `Dispatch` instead of the global default subscriber.

use tracing::{Dispatch, Span};

use super::handle::ConnectionHandle;

pub(crate) struct Diagnostics {
    dispatch: Option<Dispatch>,
    span: Span,
}

impl Diagnostics {
    pub(crate) fn new(dispatch: Option<Dispatch>, handle: ConnectionHandle) -> Self {
        let make_span = || tracing::info_span!("stream_connection", connection = %handle);
        let span = match &dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, make_span),
            None => make_span(),
        };

        Self { dispatch, span }
    }

    /// Run `f` with this connection's dispatcher and span active
    pub(crate) fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || self.span.in_scope(f)),
            None => self.span.in_scope(f),
        }
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("injected", &self.dispatch.is_some())
            .finish()
    }
}
