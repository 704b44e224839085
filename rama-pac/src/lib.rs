//! PAC (Proxy Auto-Configuration) script evaluation.
//!
//! Loads a PAC script into a sandboxed JavaScript VM, binds the Mozilla
//! helper API (`isInNet`, `dnsDomainIs`, `shExpMatch`, ...) plus the
//! Microsoft IPv6-aware extensions (`dnsResolveEx`, `isInNetEx`,
//! `sortIpAddressList`, ...), and evaluates `FindProxyForURL` /
//! `FindProxyForURLEx` for a requested URL and host.
//!
//! [`pool::EvaluatorPool`] amortizes the cost of spinning up a VM per
//! request by keeping a small set of long-lived evaluators, one per
//! dedicated worker thread.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod alert;
pub mod error;
pub mod eval;
pub mod pool;
pub mod resolver;

pub use alert::{AlertSink, TracingAlertSink};
pub use error::PacError;
pub use eval::{Evaluator, ScriptBundle};
pub use pool::EvaluatorPool;
pub use resolver::{NameResolver, StaticResolver, SystemResolver};
