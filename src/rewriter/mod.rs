//! Rewriter module.
//!
//! Hook invoked by the proxy's request pipeline once the client's destination
//! is known and before the outbound connection is dialed.

mod logger;

pub use logger::{LogLogger, RewriteLogger, TracingLogger, DEFAULT_LOG_TARGET};

use crate::rules::RuleSet;
use crate::types::{AddrSpec, Request};

/// Destination rewrite interface.
///
/// `C` is the request context of the surrounding pipeline; it is handed back
/// unchanged so the hook fits the pipeline's calling convention.
pub trait Rewriter<C>: Send + Sync {
    /// Return the context and the destination to dial for this request.
    fn rewrite(&self, ctx: C, request: &Request, logger: &dyn RewriteLogger) -> (C, AddrSpec);
}

impl<C> Rewriter<C> for RuleSet {
    fn rewrite(&self, ctx: C, request: &Request, logger: &dyn RewriteLogger) -> (C, AddrSpec) {
        let (mapped, applied) = self.apply(&request.dest_addr);

        if applied {
            logger.log_line(format_args!("mapped {} to {}", request.dest_addr, mapped));
        }

        (ctx, mapped)
    }
}

/// Rewriter that passes every destination through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRewrite;

impl<C> Rewriter<C> for NoRewrite {
    fn rewrite(&self, ctx: C, request: &Request, _logger: &dyn RewriteLogger) -> (C, AddrSpec) {
        (ctx, request.dest_addr.clone())
    }
}
