//! Integration tests for mapping rule sets through the public API

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::thread;

use serde::{Deserialize, Serialize};
use socks5_mapping::{
    AddrSpec, MappingError, MappingErrorKind, Request, RewriteLogger, Rewriter, Rule, RuleSet,
};

fn ip(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

fn sample_specs() -> Vec<&'static str> {
    vec!["1.2.3.4:10.11.12.13", "4.5.6.7:23:10.11.12.14:48"]
}

#[derive(Default)]
struct Lines(Mutex<Vec<String>>);

impl RewriteLogger for Lines {
    fn log_line(&self, args: fmt::Arguments<'_>) {
        self.0.lock().unwrap().push(args.to_string());
    }
}

#[test]
fn test_build_preserves_input_order() {
    let set = RuleSet::from_specs(["1.2.3.4:10.11.12.13", "1.2.3.4:23:10.11.12.13:48"]).unwrap();

    assert_eq!(
        set.rules(),
        &[
            Rule::new(ip(1, 2, 3, 4), 0, ip(10, 11, 12, 13), 0),
            Rule::new(ip(1, 2, 3, 4), 23, ip(10, 11, 12, 13), 48),
        ]
    );
}

#[test]
fn test_build_fails_on_any_invalid_spec() {
    let err = RuleSet::from_specs([
        "1.2.3.4:10.11.12.13",
        "1.2.3.4:23:10.11.12.13:aa",
        "5.6.7.8:10.0.0.1",
    ])
    .unwrap_err();

    let display = err.to_string();
    assert!(
        display.contains("1.2.3.4:23:10.11.12.13:aa"),
        "error should name the failing spec, got: {}",
        display
    );
    assert!(display.contains("destination port"), "got: {}", display);
    assert_eq!(err.kind(), MappingErrorKind::DestinationPort);
}

#[test]
fn test_build_reports_first_failure_only() {
    let err = RuleSet::from_specs(["bad:10.0.0.1", "1.2.3.4:23:10.11.12.13:aa"]).unwrap_err();
    match err {
        MappingError::InvalidMapping { spec, .. } => assert_eq!(spec, "bad:10.0.0.1"),
        other => panic!("expected InvalidMapping, got {:?}", other),
    }
}

#[test]
fn test_apply_scenarios() {
    let set = RuleSet::from_specs(sample_specs()).unwrap();

    assert_eq!(
        set.apply(&AddrSpec::from_ip(ip(1, 2, 3, 4), 66)),
        (AddrSpec::from_ip(ip(10, 11, 12, 13), 66), true)
    );
    assert_eq!(
        set.apply(&AddrSpec::from_ip(ip(4, 5, 6, 7), 23)),
        (AddrSpec::from_ip(ip(10, 11, 12, 14), 48), true)
    );
    assert_eq!(
        set.apply(&AddrSpec::from_ip(ip(9, 9, 9, 9), 1)),
        (AddrSpec::from_ip(ip(9, 9, 9, 9), 1), false)
    );
}

#[test]
fn test_later_matching_rules_have_no_effect() {
    let incoming = AddrSpec::from_ip(ip(1, 2, 3, 4), 80);
    let first = "1.2.3.4:80:10.0.0.1:8080";

    for later in ["1.2.3.4:10.0.0.2", "1.2.3.4:80:10.0.0.3:9090", first] {
        let both = RuleSet::from_specs([first, later]).unwrap();
        let only_first = RuleSet::from_specs([first]).unwrap();
        assert_eq!(both.apply(&incoming), only_first.apply(&incoming));
    }
}

#[test]
fn test_hook_passes_context_through() {
    let set = RuleSet::from_specs(sample_specs()).unwrap();
    let logger = Lines::default();
    let request = Request::connect(AddrSpec::from_ip(ip(1, 2, 3, 4), 66))
        .with_remote_addr(AddrSpec::from_ip(ip(192, 168, 1, 10), 50123));

    let (ctx, dest) = set.rewrite(String::from("conn-1"), &request, &logger);

    assert_eq!(ctx, "conn-1");
    assert_eq!(dest, AddrSpec::from_ip(ip(10, 11, 12, 13), 66));
    assert_eq!(
        *logger.0.lock().unwrap(),
        vec!["mapped 1.2.3.4:66 to 10.11.12.13:66".to_string()]
    );
}

#[test]
fn test_shared_across_threads() {
    let set: Arc<dyn Rewriter<usize>> = Arc::new(RuleSet::from_specs(sample_specs()).unwrap());
    let logger = Arc::new(Lines::default());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let set = Arc::clone(&set);
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                let port = 1000 + i as u16;
                let request = Request::connect(AddrSpec::from_ip(ip(1, 2, 3, 4), port));
                let (ctx, dest) = set.rewrite(i, &request, logger.as_ref());
                assert_eq!(ctx, i);
                assert_eq!(dest, AddrSpec::from_ip(ip(10, 11, 12, 13), port));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(logger.0.lock().unwrap().len(), 8);
}

#[derive(Debug, Serialize, Deserialize)]
struct ProxyConfig {
    listen: String,
    mappings: RuleSet,
}

#[test]
fn test_config_round_trip() {
    let json = r#"{
        "listen": "localhost:9998",
        "mappings": ["1.2.3.4:10.11.12.13", "4.5.6.7:23:10.11.12.14:48"]
    }"#;

    let config: ProxyConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.listen, "localhost:9998");
    assert_eq!(config.mappings, RuleSet::from_specs(sample_specs()).unwrap());

    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(
        value["mappings"],
        serde_json::json!(["1.2.3.4:10.11.12.13", "4.5.6.7:23:10.11.12.14:48"])
    );
}

#[test]
fn test_config_rejects_invalid_mapping() {
    let json = r#"{ "listen": "localhost:9998", "mappings": ["1.2.3.4:23:10.11.12.13"] }"#;

    let err = serde_json::from_str::<ProxyConfig>(json).unwrap_err();
    assert!(
        err.to_string().contains("1.2.3.4:23:10.11.12.13"),
        "got: {}",
        err
    );
}

#[test]
fn test_single_rule_deserialize() {
    let rule: Rule = serde_json::from_str(r#""4.5.6.7:23:10.11.12.14:48""#).unwrap();
    assert_eq!(rule.source_port(), Some(23));
    assert_eq!(serde_json::to_string(&rule).unwrap(), r#""4.5.6.7:23:10.11.12.14:48""#);

    assert!(serde_json::from_str::<Rule>(r#""4.5.6.7:x:10.11.12.14:48""#).is_err());
}

#[test]
fn test_from_file() {
    use std::io::Write;
    let dir = std::env::temp_dir().join("socks5_mapping_it");
    let _ = std::fs::create_dir_all(&dir);
    let path = dir.join("mappings");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "# staging").unwrap();
    writeln!(f, "1.2.3.4:10.11.12.13").unwrap();
    writeln!(f, "4.5.6.7:23:10.11.12.14:48  # telnet").unwrap();
    drop(f);

    let set = RuleSet::from_file(&path).unwrap();
    assert_eq!(set, RuleSet::from_specs(sample_specs()).unwrap());

    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_dir(&dir);
}
