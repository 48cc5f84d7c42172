//! Two-stage templating for target construction
//!
//! Targets are composed as strings before they are parsed, and two
//! transforms run over the composite in order: positional printf-style
//! formatting, where a count or type mismatch is a configuration failure,
//! then named `${variable}` substitution through a [`TemplateEngine`]
//! collaborator, whose failure policy is its own.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::ConfigError;
use crate::context::TargetContext;

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("variable pattern"));

/// A positional argument supplied by the declarative configuration.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum TemplateArg {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for TemplateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateArg::Int(v) => write!(f, "{v}"),
            TemplateArg::Float(v) => write!(f, "{v}"),
            TemplateArg::Str(s) => f.write_str(s),
        }
    }
}

/// Apply printf-style positional substitution, consuming `args` in order.
///
/// Supported conversions: `%s` (any argument), `%d` and `%x` (integers),
/// `%f` (floats), `%%` (literal percent). Running out of arguments, a
/// conversion/argument type mismatch, or an unknown conversion yields
/// [`ConfigError::Format`]. Surplus arguments are ignored.
pub fn positional_format(template: &str, args: &[TemplateArg]) -> Result<String, ConfigError> {
    let mismatch = || ConfigError::Format {
        template: template.to_string(),
        supplied: args.len(),
    };

    let mut out = String::with_capacity(template.len());
    let mut next = 0usize;
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(conversion @ ('s' | 'd' | 'f' | 'x')) => {
                let arg = args.get(next).ok_or_else(mismatch)?;
                next += 1;
                match (conversion, arg) {
                    ('s', arg) => out.push_str(&arg.to_string()),
                    ('d', TemplateArg::Int(v)) => out.push_str(&v.to_string()),
                    ('x', TemplateArg::Int(v)) => out.push_str(&format!("{v:x}")),
                    ('f', TemplateArg::Float(v)) => out.push_str(&v.to_string()),
                    _ => return Err(mismatch()),
                }
            }
            _ => return Err(mismatch()),
        }
    }
    Ok(out)
}

/// Named-variable substitution collaborator.
///
/// Runs after positional formatting on the fully composed target string.
/// Unresolvable variables are the engine's own concern; the default engine
/// leaves them literal.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, ctx: &TargetContext, args: &[TemplateArg]) -> String;
}

/// Default engine resolving `${host}`, `${argN}` and host properties.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyTemplater;

impl TemplateEngine for PropertyTemplater {
    fn render(&self, template: &str, ctx: &TargetContext, args: &[TemplateArg]) -> String {
        VARIABLE
            .replace_all(template, |caps: &Captures| {
                let name = &caps[1];
                if name == "host" {
                    return ctx.canonical_name().to_string();
                }
                if let Some(index) = name.strip_prefix("arg")
                    && let Ok(index) = index.parse::<usize>()
                    && let Some(arg) = args.get(index)
                {
                    return arg.to_string();
                }
                match ctx.property(name) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
