//! Prefix matching rules.
//!
//! # Responsibilities
//! - Decide whether a root-relative request path falls under a mapping
//! - Split the path into the matched prefix and the remainder
//!
//! # Design Decisions
//! - Directory targets match the prefix itself or the prefix followed by `/`
//! - File targets match the exact prefix only
//! - Plain string comparison, no regex in the hot path

/// What a mapping points at on disk, fixed when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Directory,
    File,
}

/// Match rule for one URL prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRule {
    prefix: String,
    kind: TargetKind,
}

impl PrefixRule {
    pub fn new(prefix: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            prefix: prefix.into(),
            kind,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Returns the part of `path` after the prefix when the rule matches.
    ///
    /// For directory rules the remainder is empty or starts with `/`.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        match self.kind {
            TargetKind::File => rest.is_empty().then_some(rest),
            TargetKind::Directory => (rest.is_empty() || rest.starts_with('/')).then_some(rest),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_rule() {
        let rule = PrefixRule::new("app", TargetKind::Directory);
        assert_eq!(rule.strip("app/main.js"), Some("/main.js"));
        assert_eq!(rule.strip("app"), Some(""));
        assert_eq!(rule.strip("app/"), Some("/"));
        assert!(!rule.matches("application/main.js"));
        assert!(!rule.matches("vendor/app/main.js"));
    }

    #[test]
    fn file_rule_is_exact() {
        let rule = PrefixRule::new("config.js", TargetKind::File);
        assert_eq!(rule.strip("config.js"), Some(""));
        assert!(!rule.matches("config.js/extra"));
        assert!(!rule.matches("config.json"));
    }

    #[test]
    fn nested_prefix() {
        let rule = PrefixRule::new("vendor/js", TargetKind::Directory);
        assert_eq!(rule.strip("vendor/js/lib.js"), Some("/lib.js"));
        assert!(!rule.matches("vendor/css/site.css"));
    }
}
