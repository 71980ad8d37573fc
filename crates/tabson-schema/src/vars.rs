use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z0-9_.]+)\}").expect("valid pattern"));

/// Substitutes variables into user-authored mapping strings.
///
/// Passed explicitly into schema compilation — there is no ambient
/// variable space. Interpolation runs once at compile; the compiled
/// schema is immutable afterwards.
pub trait Interpolator {
    fn interpolate(&self, raw: &str) -> String;
}

/// An interpolator with no variables defined. Leaves strings untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVars;

impl Interpolator for NoVars {
    fn interpolate(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// A name→value variable space resolving `${NAME}` references.
///
/// Unknown references are left in place so a misspelled variable is
/// visible in the resulting path error rather than silently vanishing.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    vars: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl Interpolator for Variables {
    fn interpolate(&self, raw: &str) -> String {
        VAR_PATTERN
            .replace_all(raw, |caps: &regex::Captures<'_>| {
                match self.vars.get(&caps[1]) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_vars_is_identity() {
        assert_eq!(NoVars.interpolate("a.${X}.b"), "a.${X}.b");
    }

    #[test]
    fn substitutes_known_variables() {
        let mut vars = Variables::new();
        vars.set("PREFIX", "orders").set("IDX", "0");
        assert_eq!(vars.interpolate("${PREFIX}.items[${IDX}]"), "orders.items[0]");
    }

    #[test]
    fn unknown_variables_are_left_in_place() {
        let vars = Variables::new();
        assert_eq!(vars.interpolate("a.${MISSING}"), "a.${MISSING}");
    }

    #[test]
    fn plain_strings_pass_through() {
        let vars = Variables::new();
        assert_eq!(vars.interpolate("plain.path"), "plain.path");
    }
}
