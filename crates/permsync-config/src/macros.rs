//! FOR/IF macro expansion over the raw YAML value tree.
//!
//! Macros are sequence items shaped as single-key mappings:
//!
//! ```yaml
//! ace_config:
//!   - FOR site IN [site1, site2]:
//!       - principal: ${site}-editors
//!         entries:
//!           - path: /content/${site}
//!             permission: allow
//!             privileges: [jcr:read]
//!   - IF ${provision_admins}:
//!       - principal: administrators
//!         entries: []
//! ```
//!
//! A `FOR` item splices one substituted copy of its child sequence per
//! list element; an `IF` item splices its child sequence when the
//! variable resolves truthy (non-empty and not `false`). `${var}`
//! substitution applies to every string scalar and mapping key, with
//! unknown references rejected.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::error::{ConfigError, ConfigResult};

/// Variables in scope during expansion.
pub type Variables = BTreeMap<String, String>;

/// Expand macros and substitute variables over a whole document.
pub fn expand_macros(value: Value, vars: &Variables) -> ConfigResult<Value> {
    expand_value(value, vars)
}

fn expand_value(value: Value, vars: &Variables) -> ConfigResult<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute(&s, vars)?)),
        Value::Sequence(items) => Ok(Value::Sequence(expand_sequence(items, vars)?)),
        Value::Mapping(map) => {
            let mut out = Mapping::new();
            for (key, val) in map {
                let key = expand_value(key, vars)?;
                let val = expand_value(val, vars)?;
                out.insert(key, val);
            }
            Ok(Value::Mapping(out))
        }
        other => Ok(other),
    }
}

fn expand_sequence(items: Vec<Value>, vars: &Variables) -> ConfigResult<Vec<Value>> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match parse_directive(&item) {
            Some(Directive::For { var, values, body }) => {
                for element in values {
                    let mut scoped = vars.clone();
                    scoped.insert(var.clone(), element);
                    out.extend(expand_body(body.clone(), &scoped, "FOR")?);
                }
            }
            Some(Directive::If { name, body }) => {
                let resolved = vars
                    .get(&name)
                    .ok_or_else(|| ConfigError::unknown_variable(&name))?;
                if is_truthy(resolved) {
                    out.extend(expand_body(body, vars, "IF")?);
                }
            }
            None => out.push(expand_value(item, vars)?),
        }
    }
    Ok(out)
}

fn expand_body(body: Value, vars: &Variables, directive: &str) -> ConfigResult<Vec<Value>> {
    match body {
        Value::Sequence(items) => expand_sequence(items, vars),
        _ => Err(ConfigError::validation(format!(
            "{directive} body must be a sequence"
        ))),
    }
}

enum Directive {
    For {
        var: String,
        values: Vec<String>,
        body: Value,
    },
    If {
        name: String,
        body: Value,
    },
}

/// A macro item is a single-key mapping whose key starts with `FOR `
/// or `IF `.
fn parse_directive(item: &Value) -> Option<Directive> {
    let map = item.as_mapping()?;
    if map.len() != 1 {
        return None;
    }
    let (key, body) = map.iter().next()?;
    let key = key.as_str()?;

    if let Some(rest) = key.strip_prefix("FOR ") {
        let (var, list) = rest.split_once(" IN ")?;
        let list = list.trim();
        let list = list.strip_prefix('[')?.strip_suffix(']')?;
        let values = list
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        return Some(Directive::For {
            var: var.trim().to_string(),
            values,
            body: body.clone(),
        });
    }

    if let Some(rest) = key.strip_prefix("IF ") {
        let rest = rest.trim();
        let name = rest.strip_prefix("${")?.strip_suffix('}')?;
        return Some(Directive::If {
            name: name.to_string(),
            body: body.clone(),
        });
    }

    None
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && !value.eq_ignore_ascii_case("false")
}

/// Replace every `${name}` occurrence; unknown names are an error so a
/// typo cannot silently produce a literal `${...}` principal or path.
fn substitute(input: &str, vars: &Variables) -> ConfigResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(ConfigError::validation(format!(
                "unterminated variable reference in '{input}'"
            )));
        };
        let name = &after[..end];
        let value = vars
            .get(name)
            .ok_or_else(|| ConfigError::unknown_variable(name))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
