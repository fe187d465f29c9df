use std::fs;
use std::net::IpAddr;
use std::path::Path;

use crate::error::{MappingError, Result};
use crate::rules::Rule;

/// Separator between the fields of a mapping specification
const FIELD_SEPARATOR: char = ':';

/// Maximum nesting depth for `file:` include directives.
const MAX_INCLUDE_DEPTH: usize = 10;

/// Valid mapping forms, for embedding in a proxy's command-line help.
pub const USAGE: &str = "\
Valid destination mappings:

 * <source address>:<source port>:<target address>:<target port>
 * <source address>:<target address>
";

/// Parse a single mapping specification.
///
/// Accepts `src:dst` (both ports unspecified) and `src:sport:dst:dport`.
/// Any other number of fields leaves both addresses unpopulated and is
/// reported as an unparseable source address.
///
/// Port errors abort immediately. Address errors are only raised once both
/// address slots have been attempted, source before destination.
pub fn parse_rule(spec: &str) -> Result<Rule> {
    let fields: Vec<&str> = spec.split(FIELD_SEPARATOR).collect();

    let mut source: Option<IpAddr> = None;
    let mut target: Option<IpAddr> = None;
    let mut source_port = Rule::ANY_PORT;
    let mut target_port = Rule::ANY_PORT;

    match fields.as_slice() {
        [src, dst] => {
            source = src.parse().ok();
            target = dst.parse().ok();
        }
        [src, sport, dst, dport] => {
            source = src.parse().ok();
            target = dst.parse().ok();
            source_port = sport
                .parse()
                .map_err(|_| MappingError::InvalidSourcePort)?;
            target_port = dport
                .parse()
                .map_err(|_| MappingError::InvalidDestinationPort)?;
        }
        _ => {}
    }

    let source = source.ok_or(MappingError::InvalidSourceAddress)?;
    let target = target.ok_or(MappingError::InvalidDestinationAddress)?;

    Ok(Rule::new(source, source_port, target, target_port))
}

/// Parse every specification in order, stopping at the first failure.
///
/// The returned error names the offending specification.
pub fn parse_specs<I, S>(specs: I) -> Result<Vec<Rule>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    specs
        .into_iter()
        .map(|spec| {
            let spec = spec.as_ref();
            parse_rule(spec).map_err(|e| e.in_spec(spec))
        })
        .collect()
}

/// Parse a mapping file: one specification per line.
///
/// `#` starts a comment, blank lines are skipped, and
/// `file: /path/to/mappings` includes another mapping file in place.
pub fn parse_rules(text: &str) -> Result<Vec<Rule>> {
    parse_rules_inner(text, 0)
}

fn parse_rules_inner(text: &str, depth: usize) -> Result<Vec<Rule>> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(MappingError::ParseError(format!(
            "file include depth exceeds maximum ({MAX_INCLUDE_DEPTH}), possible circular include"
        )));
    }

    let mut rules = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line_num = line_num + 1; // 1-based line numbers

        let line = match line.find('#') {
            Some(comment_pos) => &line[..comment_pos],
            None => line,
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(path) = line.strip_prefix("file:") {
            let path = path.trim();
            tracing::debug!(path, depth = depth + 1, "including mapping file");
            rules.extend(parse_rules_from_file_inner(path, depth + 1)?);
            continue;
        }

        let rule = parse_rule(line).map_err(|e| e.in_spec(line).at_line(line_num))?;
        rules.push(rule);
    }

    Ok(rules)
}

/// Parse a mapping file from disk.
pub fn parse_rules_from_file(path: impl AsRef<Path>) -> Result<Vec<Rule>> {
    parse_rules_from_file_inner(path, 0)
}

fn parse_rules_from_file_inner(path: impl AsRef<Path>, depth: usize) -> Result<Vec<Rule>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        MappingError::ParseError(format!(
            "Failed to read mapping file '{}': {}",
            path.display(),
            e
        ))
    })?;
    parse_rules_inner(&text, depth)
}
