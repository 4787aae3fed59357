use crate::config::{AccessControlSettings, ALL_SCOPE};
use log::debug;

/// Path based access rules, loaded once from the driver at startup.
///
/// A rule ending in `/` grants the directory itself and everything below it,
/// any other rule grants exactly that file.
#[derive(Debug, Clone, Default)]
pub struct AccessControl {
    rules: AccessControlSettings,
}

impl AccessControl {
    pub fn new(rules: AccessControlSettings) -> Self {
        Self { rules }
    }

    /// Checks `path` against the global rules, then against the rules keyed by
    /// `user` if there are any.
    pub fn is_allowed(&self, path: &str, user: Option<&str>) -> bool {
        let scopes = std::iter::once(ALL_SCOPE).chain(user);
        for scope in scopes {
            if let Some(rules) = self.rules.get(scope) {
                if rules.iter().any(|rule| rule_matches(rule, path)) {
                    return true;
                }
            }
        }
        debug!("Access denied for {:?} (user {:?})", path, user);
        false
    }
}

fn rule_matches(rule: &str, path: &str) -> bool {
    match rule.strip_suffix('/') {
        Some(dir) => path.starts_with(rule) || path == dir,
        None => !rule.is_empty() && path == rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn gate(rules: &[(&str, &[&str])]) -> AccessControl {
        let mut map = HashMap::new();
        for (scope, paths) in rules {
            map.insert(
                scope.to_string(),
                paths.iter().map(|p| p.to_string()).collect(),
            );
        }
        AccessControl::new(map)
    }

    #[test]
    fn directory_rule_covers_contents_and_itself() {
        let acl = gate(&[("all", &["/pub/"])]);
        assert!(acl.is_allowed("/pub/x.txt", None));
        assert!(acl.is_allowed("/pub/deep/er/y", None));
        assert!(acl.is_allowed("/pub", None));
        assert!(!acl.is_allowed("/pubx", None));
        assert!(!acl.is_allowed("/", None));
    }

    #[test]
    fn file_rule_is_exact() {
        let acl = gate(&[("all", &["/etc/motd"])]);
        assert!(acl.is_allowed("/etc/motd", None));
        assert!(!acl.is_allowed("/etc/motd.bak", None));
        assert!(!acl.is_allowed("/etc", None));
    }

    #[test]
    fn user_scope_extends_global_rules() {
        let acl = gate(&[("all", &["/pub/"]), ("alice", &["/home/alice/"])]);
        assert!(acl.is_allowed("/home/alice/notes", Some("alice")));
        assert!(!acl.is_allowed("/home/alice/notes", Some("bob")));
        assert!(!acl.is_allowed("/home/alice/notes", None));
        assert!(acl.is_allowed("/pub/a", Some("bob")));
    }

    #[test]
    fn empty_rule_set_denies_everything() {
        let acl = AccessControl::default();
        assert!(!acl.is_allowed("/pub", None));
    }
}
