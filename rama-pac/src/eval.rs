//! The PAC [`Evaluator`]: a single-script, single-threaded JavaScript VM
//! bound with the Mozilla/Microsoft helper API.

use std::net::IpAddr;
use std::sync::Arc;

use boa_engine::{Context, JsArgs, JsNativeError, JsResult, JsValue, NativeFunction, Source, js_string};
use boa_engine::object::FunctionObjectBuilder;
use boa_engine::property::Attribute;

use crate::alert::{self, AlertSink};
use crate::error::PacError;
use crate::resolver::{NameResolver, SystemResolver};

const HELPERS_SRC: &str = include_str!("helpers.js");

/// A PAC script plus the host bindings it evaluates against.
///
/// Cloning is cheap: the script source and host bindings are reference
/// counted, so a bundle can be shared across however many [`Evaluator`]s a
/// [`crate::pool::EvaluatorPool`] wants to spin up.
#[derive(Clone)]
pub struct ScriptBundle {
    source: Arc<str>,
    alert_sink: Arc<dyn AlertSink>,
    resolver: Arc<dyn NameResolver>,
}

impl ScriptBundle {
    /// Wrap a PAC script, using the real system resolver and a
    /// `tracing`-backed alert sink.
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
            alert_sink: alert::default_sink(),
            resolver: Arc::new(SystemResolver),
        }
    }

    /// Override the `alert()` sink.
    pub fn with_alert_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.alert_sink = sink;
        self
    }

    /// Override the DNS / local-IP resolver backing `dnsResolve` and
    /// `myIpAddress` (and their `Ex` siblings).
    pub fn with_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryPoint {
    Basic,
    Extended,
}

/// A freshly loaded PAC script, ready to evaluate `FindProxyForURL` calls.
///
/// Not `Send`: `boa_engine::Context` isn't, since its heap is
/// reference-counted rather than atomically so. [`crate::pool::EvaluatorPool`]
/// keeps evaluators pinned to the worker that created them for this reason.
pub struct Evaluator {
    context: Context,
    entry_point: EntryPoint,
}

impl Evaluator {
    /// Parse `bundle`'s script, bind the helper API, and locate its entry
    /// point. Fails with [`PacError::MissingEntryPoint`] or
    /// [`PacError::AmbiguousEntryPoint`] per spec.
    pub fn new(bundle: &ScriptBundle) -> Result<Self, PacError> {
        let mut context = Context::default();
        register_natives(&mut context, bundle.resolver.clone(), bundle.alert_sink.clone())?;

        context
            .eval(Source::from_bytes(HELPERS_SRC))
            .map_err(|e| PacError::Script(e.to_string()))?;
        context
            .eval(Source::from_bytes(bundle.source.as_bytes()))
            .map_err(|e| PacError::Script(e.to_string()))?;

        let has_basic = is_callable_global(&mut context, "FindProxyForURL");
        let has_extended = is_callable_global(&mut context, "FindProxyForURLEx");
        let entry_point = match (has_basic, has_extended) {
            (true, false) => EntryPoint::Basic,
            (false, true) => EntryPoint::Extended,
            (true, true) => return Err(PacError::AmbiguousEntryPoint),
            (false, false) => return Err(PacError::MissingEntryPoint),
        };

        Ok(Self { context, entry_point })
    }

    /// Evaluate the script's entry point for `url`/`host`, returning the
    /// proxy directive string (e.g. `"DIRECT"`, `"PROXY 10.0.0.1:8080"`).
    pub fn evaluate(&mut self, url: &str, host: &str) -> Result<String, PacError> {
        let name = match self.entry_point {
            EntryPoint::Basic => "FindProxyForURL",
            EntryPoint::Extended => "FindProxyForURLEx",
        };
        let function = self
            .context
            .global_object()
            .get(js_string!(name), &mut self.context)
            .map_err(|e| PacError::Script(e.to_string()))?;
        let function = function
            .as_callable()
            .ok_or(PacError::MissingEntryPoint)?
            .clone();

        let args = [js_string!(url).into(), js_string!(host).into()];
        let result = function
            .call(&JsValue::undefined(), &args, &mut self.context)
            .map_err(|e| PacError::Script(e.to_string()))?;

        let Some(js_str) = result.as_string() else {
            return Err(PacError::NonStringReturn);
        };
        let value = js_str.to_std_string_escaped();
        if !value.is_ascii() {
            return Err(PacError::NonAsciiReturn);
        }
        Ok(value)
    }
}

fn is_callable_global(context: &mut Context, name: &str) -> bool {
    context
        .global_object()
        .get(js_string!(name), context)
        .ok()
        .is_some_and(|v| v.as_callable().is_some())
}

fn register(context: &mut Context, name: &str, length: usize, f: NativeFunction) -> Result<(), PacError> {
    let function = FunctionObjectBuilder::new(context.realm(), f)
        .name(js_string!(name))
        .length(length)
        .build();
    context
        .register_global_property(js_string!(name), function, Attribute::all())
        .map_err(|e| PacError::Script(format!("registering helper `{name}`: {e}")))
}

fn register_natives(
    context: &mut Context,
    resolver: Arc<dyn NameResolver>,
    alert_sink: Arc<dyn AlertSink>,
) -> Result<(), PacError> {
    {
        let resolver = resolver.clone();
        register(
            context,
            "dnsResolve",
            1,
            NativeFunction::from_closure(move |_this, args, context| {
                let host = args.get_or_undefined(0).to_string(context)?.to_std_string_escaped();
                Ok(match resolver.resolve_all(&host).into_iter().find(|a| a.is_ipv4()) {
                    Some(addr) => js_string!(addr.to_string()).into(),
                    None => JsValue::null(),
                })
            }),
        )?;
    }
    {
        let resolver = resolver.clone();
        register(
            context,
            "dnsResolveEx",
            1,
            NativeFunction::from_closure(move |_this, args, context| {
                let host = args.get_or_undefined(0).to_string(context)?.to_std_string_escaped();
                Ok(js_string!(join_addrs(&resolver.resolve_all(&host))).into())
            }),
        )?;
    }
    {
        let resolver = resolver.clone();
        register(
            context,
            "myIpAddress",
            0,
            NativeFunction::from_closure(move |_this, _args, _context| {
                let addr = resolver
                    .local_addresses()
                    .into_iter()
                    .find(|a| a.is_ipv4())
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "127.0.0.1".to_owned());
                Ok(js_string!(addr).into())
            }),
        )?;
    }
    {
        let resolver = resolver.clone();
        register(
            context,
            "myIpAddressEx",
            0,
            NativeFunction::from_closure(move |_this, _args, _context| {
                Ok(js_string!(join_addrs(&resolver.local_addresses())).into())
            }),
        )?;
    }
    {
        let resolver = resolver.clone();
        register(
            context,
            "isResolvableEx",
            1,
            NativeFunction::from_closure(move |_this, args, context| {
                let host = args.get_or_undefined(0).to_string(context)?.to_std_string_escaped();
                Ok(JsValue::from(!resolver.resolve_all(&host).is_empty()))
            }),
        )?;
    }
    register(
        context,
        "isInNetEx",
        2,
        NativeFunction::from_closure(|_this, args, context| {
            let ip = args.get_or_undefined(0).to_string(context)?.to_std_string_escaped();
            let prefix = args.get_or_undefined(1).to_string(context)?.to_std_string_escaped();
            Ok(JsValue::from(is_in_net_ex(&ip, &prefix)))
        }),
    )?;
    register(
        context,
        "sortIpAddressList",
        1,
        NativeFunction::from_closure(|_this, args, context| {
            let list = args.get_or_undefined(0).to_string(context)?.to_std_string_escaped();
            let mut addrs = Vec::new();
            for part in list.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                match part.parse::<IpAddr>() {
                    Ok(addr) => addrs.push(addr),
                    Err(_) => return Ok(JsValue::null()),
                }
            }
            // `IpAddr`'s own `Ord` puts every `V4` before every `V6` regardless
            // of value; spec §4.4 wants IPv6 sorted before IPv4.
            addrs.sort_by_key(|a| (matches!(a, IpAddr::V4(_)), *a));
            Ok(js_string!(join_addrs(&addrs)).into())
        }),
    )?;
    register(
        context,
        "getClientVersion",
        0,
        NativeFunction::from_closure(|_this, _args, _context| Ok(js_string!("1.0").into())),
    )?;
    {
        register(
            context,
            "alert",
            1,
            NativeFunction::from_closure(move |_this, args, context| {
                let message = args.get_or_undefined(0).to_string(context)?.to_std_string_escaped();
                alert_sink.alert(&message);
                Ok(JsValue::undefined())
            }),
        )?;
    }
    Ok(())
}

fn join_addrs(addrs: &[IpAddr]) -> String {
    addrs
        .iter()
        .map(IpAddr::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn is_in_net_ex(ip: &str, prefix: &str) -> bool {
    let Ok(ip) = ip.parse::<IpAddr>() else {
        return false;
    };
    let Some((net, bits)) = prefix.split_once('/') else {
        return false;
    };
    let Ok(net) = net.parse::<IpAddr>() else {
        return false;
    };
    let Ok(bits) = bits.parse::<u32>() else {
        return false;
    };
    match (ip, net) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if bits > 32 {
                return false;
            }
            let mask = if bits == 0 { 0 } else { u32::MAX << (32 - bits) };
            (u32::from(ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if bits > 128 {
                return false;
            }
            let mask = if bits == 0 { 0 } else { u128::MAX << (128 - bits) };
            (u128::from(ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticResolver;

    fn bundle(script: &str) -> ScriptBundle {
        ScriptBundle::new(script.to_owned())
            .with_resolver(Arc::new(
                StaticResolver::new()
                    .with_host("proxy.example.com", vec!["10.0.0.1".parse().unwrap()])
                    .with_local_addresses(vec!["192.168.1.50".parse().unwrap()]),
            ))
    }

    #[test]
    fn evaluates_direct_for_plain_hostnames() {
        let bundle = bundle(
            "function FindProxyForURL(url, host) {
                if (isPlainHostName(host)) return 'DIRECT';
                return 'PROXY proxy.example.com:8080';
            }",
        );
        let mut evaluator = Evaluator::new(&bundle).unwrap();
        assert_eq!(evaluator.evaluate("http://printer/", "printer").unwrap(), "DIRECT");
        assert_eq!(
            evaluator.evaluate("http://a.b.c/", "a.b.c").unwrap(),
            "PROXY proxy.example.com:8080"
        );
    }

    #[test]
    fn rejects_script_with_no_entry_point() {
        let bundle = bundle("function notAnEntryPoint() { return 'DIRECT'; }");
        assert!(matches!(Evaluator::new(&bundle), Err(PacError::MissingEntryPoint)));
    }

    #[test]
    fn rejects_script_with_both_entry_points() {
        let bundle = bundle(
            "function FindProxyForURL(url, host) { return 'DIRECT'; }
             function FindProxyForURLEx(url, host) { return 'DIRECT'; }",
        );
        assert!(matches!(Evaluator::new(&bundle), Err(PacError::AmbiguousEntryPoint)));
    }

    #[test]
    fn rejects_non_string_return() {
        let bundle = bundle("function FindProxyForURL(url, host) { return 42; }");
        let mut evaluator = Evaluator::new(&bundle).unwrap();
        assert!(matches!(
            evaluator.evaluate("http://x/", "x"),
            Err(PacError::NonStringReturn)
        ));
    }

    #[test]
    fn uses_injected_dns_resolver() {
        let bundle = bundle(
            "function FindProxyForURL(url, host) {
                return dnsResolve('proxy.example.com');
            }",
        );
        let mut evaluator = Evaluator::new(&bundle).unwrap();
        assert_eq!(evaluator.evaluate("http://x/", "x").unwrap(), "10.0.0.1");
    }

    #[test]
    fn uses_injected_local_address() {
        let bundle = bundle("function FindProxyForURL(url, host) { return myIpAddress(); }");
        let mut evaluator = Evaluator::new(&bundle).unwrap();
        assert_eq!(evaluator.evaluate("http://x/", "x").unwrap(), "192.168.1.50");
    }

    #[test]
    fn supports_extended_entry_point_and_cidr_helper() {
        let bundle = bundle(
            "function FindProxyForURLEx(url, host) {
                if (isInNetEx('10.1.2.3', '10.1.0.0/16')) return 'DIRECT';
                return 'PROXY proxy.example.com:8080';
            }",
        );
        let mut evaluator = Evaluator::new(&bundle).unwrap();
        assert_eq!(evaluator.evaluate("http://x/", "x").unwrap(), "DIRECT");
    }

    #[test]
    fn sort_ip_address_list_orders_ipv6_before_ipv4() {
        let bundle = bundle(
            "function FindProxyForURL(url, host) {
                return sortIpAddressList('10.0.0.1;192.168.1.1;::1;2001:db8::1');
            }",
        );
        let mut evaluator = Evaluator::new(&bundle).unwrap();
        assert_eq!(
            evaluator.evaluate("http://x/", "x").unwrap(),
            "::1;2001:db8::1;10.0.0.1;192.168.1.1"
        );
    }
}
