use std::fmt;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};
use crate::parser::{parse_rule, parse_rules, parse_rules_from_file, parse_specs};
use crate::types::AddrSpec;

/// A single destination mapping: source address (and optional port) to target
/// address (and optional port).
///
/// Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    source: IpAddr,
    source_port: u16,
    target: IpAddr,
    target_port: u16,
}

impl Rule {
    /// Port value meaning "any port" on the source side and "keep the
    /// incoming port" on the target side.
    pub const ANY_PORT: u16 = 0;

    /// Create a rule. Pass [`Rule::ANY_PORT`] for an unspecified port.
    pub fn new(source: IpAddr, source_port: u16, target: IpAddr, target_port: u16) -> Self {
        Self {
            source,
            source_port,
            target,
            target_port,
        }
    }

    /// Address matched against the requested destination
    pub fn source(&self) -> IpAddr {
        self.source
    }

    /// Port matched against the requested destination, `None` for any port
    pub fn source_port(&self) -> Option<u16> {
        Some(self.source_port).filter(|&p| p != Self::ANY_PORT)
    }

    /// Address substituted on match
    pub fn target(&self) -> IpAddr {
        self.target
    }

    /// Port substituted on match, `None` to keep the requested port
    pub fn target_port(&self) -> Option<u16> {
        Some(self.target_port).filter(|&p| p != Self::ANY_PORT)
    }

    /// Check if this rule matches the given destination
    pub fn matches(&self, incoming: &AddrSpec) -> bool {
        let Some(ip) = incoming.ip else {
            return false;
        };

        // IPv4-mapped IPv6 addresses compare equal to their IPv4 form
        if ip.to_canonical() != self.source.to_canonical() {
            return false;
        }

        self.source_port == Self::ANY_PORT || self.source_port == incoming.port
    }

    /// Apply this rule to a destination.
    ///
    /// Returns the rewritten destination and whether the rule matched. On a
    /// miss the destination is returned unchanged.
    pub fn apply(&self, incoming: &AddrSpec) -> (AddrSpec, bool) {
        if !self.matches(incoming) {
            return (incoming.clone(), false);
        }

        let mut mapped = incoming.clone();
        mapped.ip = Some(self.target);
        if self.target_port != Self::ANY_PORT {
            mapped.port = self.target_port;
        }

        (mapped, true)
    }
}

impl FromStr for Rule {
    type Err = MappingError;

    fn from_str(spec: &str) -> Result<Self> {
        parse_rule(spec)
    }
}

/// Renders the rule in the specification syntax it was parsed from.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source_port == Self::ANY_PORT && self.target_port == Self::ANY_PORT {
            write!(f, "{}:{}", self.source, self.target)
        } else {
            write!(
                f,
                "{}:{}:{}:{}",
                self.source, self.source_port, self.target, self.target_port
            )
        }
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let spec = String::deserialize(deserializer)?;
        parse_rule(&spec).map_err(|e| de::Error::custom(e.in_spec(&spec)))
    }
}

/// Ordered set of mapping rules, evaluated first-match-wins.
///
/// Built once at configuration time and read-only afterwards; share it across
/// connection handlers behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a rule set from already parsed rules, keeping their order
    pub fn new(rules: Vec<Rule>) -> Self {
        tracing::debug!(rules = rules.len(), "built destination mapping rule set");
        Self { rules }
    }

    /// Build a rule set from mapping specifications, e.g. repeated `-m` flags.
    ///
    /// Fails on the first invalid specification; the error names it.
    pub fn from_specs<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        parse_specs(specs).map(Self::new)
    }

    /// Build a rule set from mapping file text.
    pub fn from_text(text: &str) -> Result<Self> {
        parse_rules(text).map(Self::new)
    }

    /// Build a rule set from a mapping file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        parse_rules_from_file(path).map(Self::new)
    }

    /// Rewrite a destination using the first matching rule.
    ///
    /// Destinations without an IP address never match. Later rules are not
    /// consulted once one matches, regardless of port specificity.
    pub fn apply(&self, incoming: &AddrSpec) -> (AddrSpec, bool) {
        if incoming.ip.is_none() {
            return (incoming.clone(), false);
        }

        for rule in &self.rules {
            let (mapped, applied) = rule.apply(incoming);
            if applied {
                return (mapped, true);
            }
        }

        (incoming.clone(), false)
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Iterate over the rules in evaluation order
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Get the number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Comma-separated list of specifications
impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.rules)
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let specs = Vec::<String>::deserialize(deserializer)?;
        Self::from_specs(&specs).map_err(de::Error::custom)
    }
}
