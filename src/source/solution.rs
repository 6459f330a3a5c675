//! The fetch-tool solution descriptor.
//!
//! A [`Solution`] names the upstream repository and tells the fetch tool
//! which sub-trees to skip. It is a typed record everywhere in the crate and
//! only turned into the tool's Python-literal `--spec` text by
//! [`Solution::render_spec`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::constants::{DEFAULT_DEPS_FILE, DEFAULT_SOLUTION_NAME, DEFAULT_SOLUTION_URL};

/// Sub-paths the fetch tool must not download.
///
/// Fixed per pipeline version; iteration is sorted so the rendered spec is
/// stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeSet<String>);

impl ExclusionSet {
    /// Creates a set from paths.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    /// Paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of excluded paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExclusionSet {
    /// Sub-trees that are unnecessary for building the monolithic library.
    fn default() -> Self {
        Self::new([
            "v8/testing/gmock",
            "v8/test/wasm-js",
            "v8/third_party/android_tools",
            "v8/third_party/catapult",
            "v8/third_party/colorama/src",
            "v8/tools/gyp",
            "v8/tools/luci-go",
        ])
    }
}

/// Value of a custom variable passed to the upstream dependency file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomVar {
    /// Boolean flag
    Bool(bool),
    /// Integer value
    Int(i64),
    /// String value
    Str(String),
}

/// One fetch-tool solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Solution {
    /// Solution name; also the checkout directory name
    pub name: String,
    /// Upstream repository URL
    pub url: String,
    /// Dependency manifest file inside the repository
    pub deps_file: String,
    /// Whether the fetch tool may move the checkout on its own; always false for us
    pub managed: bool,
    /// Sub-trees not to fetch
    pub exclusions: ExclusionSet,
    /// Variables passed through to the dependency file
    pub custom_vars: BTreeMap<String, CustomVar>,
}

impl Default for Solution {
    fn default() -> Self {
        let mut custom_vars = BTreeMap::new();
        // The host project needs the embedder-friendly build flavor
        custom_vars.insert("build_for_node".to_string(), CustomVar::Bool(true));
        Self {
            name: DEFAULT_SOLUTION_NAME.to_string(),
            url: DEFAULT_SOLUTION_URL.to_string(),
            deps_file: DEFAULT_DEPS_FILE.to_string(),
            managed: false,
            exclusions: ExclusionSet::default(),
            custom_vars,
        }
    }
}

impl Solution {
    /// Renders the `--spec` argument understood by the fetch tool.
    ///
    /// ```rust
    /// use depvend_cli::source::{ExclusionSet, Solution};
    /// use std::collections::BTreeMap;
    ///
    /// let solution = Solution {
    ///     name: "v8".into(),
    ///     url: "https://example.com/v8.git".into(),
    ///     deps_file: "DEPS".into(),
    ///     managed: false,
    ///     exclusions: ExclusionSet::new(["v8/tools/gyp"]),
    ///     custom_vars: BTreeMap::new(),
    /// };
    /// assert_eq!(
    ///     solution.render_spec(),
    ///     "solutions = [{'name': 'v8', 'url': 'https://example.com/v8.git', \
    ///      'deps_file': 'DEPS', 'managed': False, \
    ///      'custom_deps': {'v8/tools/gyp': None}, 'custom_vars': {}}]"
    /// );
    /// ```
    pub fn render_spec(&self) -> String {
        let mut out = String::from("solutions = [{");
        let _ = write!(
            out,
            "'name': {}, 'url': {}, 'deps_file': {}, 'managed': {}, ",
            py_str(&self.name),
            py_str(&self.url),
            py_str(&self.deps_file),
            py_bool(self.managed)
        );

        let excluded: Vec<String> =
            self.exclusions.iter().map(|path| format!("{}: None", py_str(path))).collect();
        let _ = write!(out, "'custom_deps': {{{}}}, ", excluded.join(", "));

        let vars: Vec<String> = self
            .custom_vars
            .iter()
            .map(|(key, value)| format!("{}: {}", py_str(key), py_value(value)))
            .collect();
        let _ = write!(out, "'custom_vars': {{{}}}", vars.join(", "));

        out.push_str("}]");
        out
    }
}

fn py_str(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

const fn py_bool(b: bool) -> &'static str {
    if b { "True" } else { "False" }
}

fn py_value(value: &CustomVar) -> String {
    match value {
        CustomVar::Bool(b) => py_bool(*b).to_string(),
        CustomVar::Int(i) => i.to_string(),
        CustomVar::Str(s) => py_str(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_solution_is_unmanaged() {
        let solution = Solution::default();
        assert!(!solution.managed);
        assert_eq!(solution.exclusions.len(), 7);
        assert!(solution.exclusions.iter().any(|p| p == "v8/tools/luci-go"));
    }

    #[test]
    fn test_default_spec_rendering() {
        let spec = Solution::default().render_spec();
        assert!(spec.starts_with("solutions = [{'name': 'v8', 'url': 'https://chromium.googlesource.com/v8/v8.git'"));
        assert!(spec.contains("'managed': False"));
        assert!(spec.contains("'v8/test/wasm-js': None, 'v8/testing/gmock': None"));
        assert!(spec.ends_with("'custom_vars': {'build_for_node': True}}]"));
    }

    #[test]
    fn test_spec_rendering_is_deterministic() {
        let a = Solution {
            exclusions: ExclusionSet::new(["b", "a", "c"]),
            ..Solution::default()
        };
        let b = Solution {
            exclusions: ExclusionSet::new(["c", "b", "a"]),
            ..Solution::default()
        };
        assert_eq!(a.render_spec(), b.render_spec());
        assert!(a.render_spec().contains("{'a': None, 'b': None, 'c': None}"));
    }

    #[test]
    fn test_quotes_are_escaped() {
        assert_eq!(py_str("it's"), r"'it\'s'");
        assert_eq!(py_str(r"C:\src"), r"'C:\\src'");
    }

    #[test]
    fn test_custom_var_kinds() {
        let mut solution = Solution::default();
        solution.custom_vars.insert("checkout_jobs".to_string(), CustomVar::Int(4));
        solution.custom_vars.insert("flavor".to_string(), CustomVar::Str("node".to_string()));
        let spec = solution.render_spec();
        assert!(spec.contains(
            "'custom_vars': {'build_for_node': True, 'checkout_jobs': 4, 'flavor': 'node'}"
        ));
    }

    #[test]
    fn test_solution_from_toml() {
        let solution: Solution = toml::from_str(
            r#"
            name = "v8"
            exclusions = ["v8/tools/gyp"]
            [custom_vars]
            build_for_node = false
            "#,
        )
        .unwrap();
        assert_eq!(solution.url, DEFAULT_SOLUTION_URL);
        assert_eq!(solution.exclusions.len(), 1);
        assert_eq!(solution.custom_vars["build_for_node"], CustomVar::Bool(false));
    }
}
