//! SOCKS5 Mapping - destination rewriting for SOCKS5 proxies
//!
//! Given the destination a client asked for, an ordered set of mapping rules
//! decides whether the proxy should dial a different address and port:
//! - Exact IP address matching, optionally restricted to one port
//! - Target port substitution or pass-through of the requested port
//! - First-match-wins evaluation in configuration order
//! - A rewrite hook for the proxy's request pipeline
//!
//! # Example
//!
//! ```rust
//! use std::net::IpAddr;
//! use socks5_mapping::{AddrSpec, Request, Rewriter, RuleSet, TracingLogger};
//!
//! // Usually collected from repeated `-m` command-line options
//! let rules = RuleSet::from_specs([
//!     "1.2.3.4:10.11.12.13",
//!     "4.5.6.7:23:10.11.12.14:48",
//! ])
//! .unwrap();
//!
//! let ip: IpAddr = "4.5.6.7".parse().unwrap();
//! let request = Request::connect(AddrSpec::from_ip(ip, 23));
//!
//! let ((), dest) = rules.rewrite((), &request, &TracingLogger);
//! assert_eq!(dest.to_string(), "10.11.12.14:48");
//! ```
//!
//! # Mapping Syntax
//!
//! | Form | Example | Description |
//! |------|---------|-------------|
//! | `src:dst` | `1.2.3.4:10.0.0.1` | Any port on `src` goes to `dst`, port kept |
//! | `src:sport:dst:dport` | `1.2.3.4:23:10.0.0.1:2323` | `src:sport` goes to `dst:dport` |
//!
//! A port of `0` means "any port" on the source side and "keep the requested
//! port" on the target side.
//!
//! Mapping files hold one specification per line; `#` starts a comment and
//! `file: /path` includes another mapping file.

pub mod error;
pub mod parser;
pub mod rewriter;
pub mod rules;
pub mod types;

// Re-export commonly used items
pub use error::{MappingError, MappingErrorKind, Result};
pub use parser::{parse_rule, parse_rules, parse_rules_from_file, parse_specs, USAGE};
pub use rewriter::{
    LogLogger, NoRewrite, RewriteLogger, Rewriter, TracingLogger, DEFAULT_LOG_TARGET,
};
pub use rules::{Rule, RuleSet};
pub use types::{AddrSpec, Command, Request};
