//! Node selector algebra and the equality-based label selector syntax.
//!
//! A node selector is a plain `key -> value` map. Two selectors conflict when
//! they require different values for the same key; merging is a key union.
//! Parsing accepts only the equality subset of the label selector grammar
//! (`k=v`, `k==v`), since a node selector cannot express set-based terms.

use std::collections::BTreeMap;

use crate::error::{NodeEnvError, Result};

/// Key/value placement constraints. Ordered only for stable output.
pub type NodeSelector = BTreeMap<String, String>;

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

/// True iff some key is present in both selectors with different values.
pub fn conflicts(policy: &NodeSelector, requested: &NodeSelector) -> bool {
    // Walk the smaller map.
    let (small, large) = if policy.len() <= requested.len() {
        (policy, requested)
    } else {
        (requested, policy)
    };
    small
        .iter()
        .any(|(k, v)| large.get(k).is_some_and(|other| other != v))
}

/// Key union of both selectors. Callers check `conflicts` first; on a shared
/// key the requested value wins.
pub fn merge(policy: &NodeSelector, requested: &NodeSelector) -> NodeSelector {
    let mut out = policy.clone();
    out.extend(requested.iter().map(|(k, v)| (k.clone(), v.clone())));
    out
}

/// True when both selectors hold exactly the same pairs.
pub fn equals(a: &NodeSelector, b: &NodeSelector) -> bool {
    a == b
}

/// Parse `k1=v1,k2=v2` into a selector. Blank input is the empty selector.
pub fn parse(selector: &str) -> Result<NodeSelector> {
    let mut out = NodeSelector::new();
    if selector.trim().is_empty() {
        return Ok(out);
    }

    for term in selector.split(',') {
        let term = term.trim();
        if term.is_empty() {
            return Err(invalid(selector, "empty term"));
        }
        if term.contains("!=") {
            return Err(invalid(selector, &format!("unsupported operator in {term:?}")));
        }

        let (key, value) = term
            .split_once("==")
            .or_else(|| term.split_once('='))
            .ok_or_else(|| invalid(selector, &format!("{term:?} is not key=value")))?;
        let (key, value) = (key.trim(), value.trim());
        if value.contains('=') {
            return Err(invalid(selector, &format!("{term:?} is not key=value")));
        }

        validate_key(key).map_err(|why| invalid(selector, &why))?;
        validate_value(value).map_err(|why| invalid(selector, &why))?;

        match out.get(key) {
            Some(existing) if existing != value => {
                return Err(invalid(
                    selector,
                    &format!("key {key:?} repeated with values {existing:?} and {value:?}"),
                ));
            }
            Some(_) => {}
            None => {
                out.insert(key.to_string(), value.to_string());
            }
        }
    }
    Ok(out)
}

/// Canonical `k=v,...` rendering.
pub fn to_selector_string(selector: &NodeSelector) -> String {
    selector
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn invalid(selector: &str, why: &str) -> NodeEnvError {
    NodeEnvError::InvalidSelector(format!("{selector:?}: {why}"))
}

fn validate_key(key: &str) -> std::result::Result<(), String> {
    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN || !is_dns_subdomain(prefix) {
                return Err(format!("key prefix {prefix:?} must be a DNS subdomain"));
            }
            name
        }
        None => key,
    };
    if !is_label_token(name) {
        return Err(format!(
            "key name {name:?} must be 1-{MAX_NAME_LEN} alphanumeric characters, '-', '_' or '.'"
        ));
    }
    Ok(())
}

fn validate_value(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() || is_label_token(value) {
        Ok(())
    } else {
        Err(format!(
            "value {value:?} must be at most {MAX_NAME_LEN} alphanumeric characters, '-', '_' or '.'"
        ))
    }
}

// [A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?
fn is_label_token(s: &str) -> bool {
    let bytes = s.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            s.len() <= MAX_NAME_LEN
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        }
        _ => false,
    }
}

fn is_dns_subdomain(s: &str) -> bool {
    s.split('.').all(|label| {
        let bytes = label.as_bytes();
        match (bytes.first(), bytes.last()) {
            (Some(first), Some(last)) => {
                label.len() <= MAX_NAME_LEN
                    && (first.is_ascii_lowercase() || first.is_ascii_digit())
                    && (last.is_ascii_lowercase() || last.is_ascii_digit())
                    && bytes
                        .iter()
                        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
            }
            _ => false,
        }
    })
}
