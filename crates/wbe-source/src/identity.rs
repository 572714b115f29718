//! Resource identity: deciding when two locators name the same document.
//!
//! Every cache lookup and every move/delete match goes through
//! [`UriIdentity`]. Two requests that differ only in path casing on a
//! case-insensitive root, in `.`/`..` segments, or in a trailing separator
//! map to one canonical [`Resource`].

use std::cell::RefCell;

use camino::Utf8PathBuf;
use rustc_hash::FxHashMap;

use crate::path::clean_url_path;
use crate::Resource;

/// How path casing is compared for `file` resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathCasing {
    Sensitive,
    Insensitive,
    /// Insensitive below these roots, sensitive elsewhere.
    InsensitiveUnder(Vec<Utf8PathBuf>),
}

impl PathCasing {
    /// The default for the host platform.
    #[must_use]
    pub fn platform() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            PathCasing::Insensitive
        } else {
            PathCasing::Sensitive
        }
    }
}

impl Default for PathCasing {
    fn default() -> Self {
        Self::platform()
    }
}

/// Canonicalises resources and compares them by location.
///
/// The first form of a location that is seen becomes its canonical form, so
/// `canonicalize` is idempotent and stable for the lifetime of the value.
/// Case folding is ASCII-only, which keeps byte offsets between the folded
/// and original paths identical.
#[derive(Debug, Default)]
pub struct UriIdentity {
    casing: PathCasing,
    canonical: RefCell<FxHashMap<String, Resource>>,
}

impl UriIdentity {
    #[must_use]
    pub fn new(casing: PathCasing) -> Self {
        Self {
            casing,
            canonical: RefCell::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn casing(&self) -> &PathCasing {
        &self.casing
    }

    /// Canonical form of `resource`.
    #[must_use]
    pub fn canonicalize(&self, resource: &Resource) -> Resource {
        let normalized = normalize(resource);
        let key = self.comparison_key(&normalized);
        self.canonical
            .borrow_mut()
            .entry(key)
            .or_insert(normalized)
            .clone()
    }

    /// Drop the canonical forms of `resource` and everything below it, so the
    /// next form seen becomes canonical. Used when a location is renamed,
    /// including renames that only change casing.
    pub fn forget(&self, resource: &Resource) {
        self.canonical
            .borrow_mut()
            .retain(|_, known| !self.is_equal_or_parent(known, resource));
    }

    /// Whether path casing is ignored for this resource.
    #[must_use]
    pub fn ignores_path_casing(&self, resource: &Resource) -> bool {
        if !resource.is_file() {
            return false;
        }
        match &self.casing {
            PathCasing::Sensitive => false,
            PathCasing::Insensitive => true,
            PathCasing::InsensitiveUnder(roots) => {
                let path = resource.path().to_ascii_lowercase();
                roots.iter().any(|root| {
                    let root = root.as_str().trim_end_matches('/').to_ascii_lowercase();
                    path == root || path.starts_with(&format!("{root}/"))
                })
            }
        }
    }

    #[must_use]
    pub fn is_equal(&self, a: &Resource, b: &Resource) -> bool {
        self.comparison_key(&normalize(a)) == self.comparison_key(&normalize(b))
    }

    /// `resource` is `parent` or lives somewhere below it.
    #[must_use]
    pub fn is_equal_or_parent(&self, resource: &Resource, parent: &Resource) -> bool {
        self.relative_path(parent, resource).is_some()
    }

    /// Path of `resource` relative to `parent`, using the original casing of
    /// `resource`. `Some("")` when both name the same location, `None` when
    /// `resource` is not below `parent`.
    #[must_use]
    pub fn relative_path(&self, parent: &Resource, resource: &Resource) -> Option<String> {
        if parent.scheme() != resource.scheme()
            || !parent.authority().eq_ignore_ascii_case(resource.authority())
        {
            return None;
        }

        let parent_path = clean_url_path(parent.path());
        let resource_path = clean_url_path(resource.path());
        let ignore_case = self.ignores_path_casing(resource);
        let fold = |path: &str| {
            if ignore_case {
                path.to_ascii_lowercase()
            } else {
                path.to_string()
            }
        };
        let folded_parent = fold(&parent_path);
        let folded_resource = fold(&resource_path);

        if folded_parent == folded_resource {
            return Some(String::new());
        }

        let prefix = if folded_parent.ends_with('/') {
            folded_parent
        } else {
            format!("{folded_parent}/")
        };
        if folded_resource.starts_with(&prefix) {
            return Some(resource_path[prefix.len()..].to_string());
        }
        None
    }

    fn comparison_key(&self, normalized: &Resource) -> String {
        let path = if self.ignores_path_casing(normalized) {
            normalized.path().to_ascii_lowercase()
        } else {
            normalized.path().to_string()
        };
        let query = normalized.as_url().query().unwrap_or_default();
        format!(
            "{}://{}{path}?{query}",
            normalized.scheme(),
            normalized.authority().to_ascii_lowercase()
        )
    }
}

fn normalize(resource: &Resource) -> Resource {
    if !resource.is_file() {
        return resource.clone();
    }
    let cleaned = clean_url_path(resource.path());
    if cleaned == resource.path() {
        resource.clone()
    } else {
        resource.with_path(&cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(s: &str) -> Resource {
        Resource::parse(s).unwrap()
    }

    mod canonicalize {
        use super::*;

        #[test]
        fn test_idempotent() {
            let identity = UriIdentity::new(PathCasing::Insensitive);
            for input in [
                "file:///proj/a.ts",
                "file:///Proj/./src/../A.ts",
                "file:///proj/dir/",
                "untitled:Untitled-1",
            ] {
                let once = identity.canonicalize(&resource(input));
                let twice = identity.canonicalize(&once);
                assert_eq!(once, twice, "{input}");
            }
        }

        #[test]
        fn test_case_variants_collapse_on_insensitive_root() {
            let identity = UriIdentity::new(PathCasing::Insensitive);
            let first = identity.canonicalize(&resource("file:///Proj/A.ts"));
            let second = identity.canonicalize(&resource("file:///proj/a.TS"));
            assert_eq!(first, second);
            assert_eq!(first, resource("file:///Proj/A.ts"));
        }

        #[test]
        fn test_case_variants_stay_apart_on_sensitive_root() {
            let identity = UriIdentity::new(PathCasing::Sensitive);
            let first = identity.canonicalize(&resource("file:///Proj/A.ts"));
            let second = identity.canonicalize(&resource("file:///proj/a.ts"));
            assert_ne!(first, second);
        }

        #[test]
        fn test_insensitive_under_root_only() {
            let identity =
                UriIdentity::new(PathCasing::InsensitiveUnder(vec!["/mnt/share".into()]));
            assert_eq!(
                identity.canonicalize(&resource("file:///mnt/share/Doc.txt")),
                identity.canonicalize(&resource("file:///MNT/share/doc.txt"))
            );
            assert_ne!(
                identity.canonicalize(&resource("file:///home/Doc.txt")),
                identity.canonicalize(&resource("file:///home/doc.txt"))
            );
        }

        #[test]
        fn test_forget_lets_a_new_casing_win() {
            let identity = UriIdentity::new(PathCasing::Insensitive);
            let old = identity.canonicalize(&resource("file:///proj/Dir/B.txt"));
            let sibling = identity.canonicalize(&resource("file:///proj/c.txt"));

            identity.forget(&resource("file:///proj/dir"));
            assert_eq!(
                identity.canonicalize(&resource("file:///proj/dir/b.txt")),
                resource("file:///proj/dir/b.txt")
            );
            assert_ne!(old, resource("file:///proj/dir/b.txt"));
            assert_eq!(identity.canonicalize(&resource("file:///proj/C.txt")), sibling);
        }

        #[test]
        fn test_dot_segments_and_trailing_separator() {
            let identity = UriIdentity::new(PathCasing::Sensitive);
            assert_eq!(
                identity.canonicalize(&resource("file:///proj/src/../a.ts")),
                resource("file:///proj/a.ts")
            );
            assert!(identity.is_equal(
                &resource("file:///proj/dir/"),
                &resource("file:///proj/dir")
            ));
        }
    }

    mod parents {
        use super::*;

        #[test]
        fn test_equal_or_parent() {
            let identity = UriIdentity::new(PathCasing::Sensitive);
            let parent = resource("file:///a");
            assert!(identity.is_equal_or_parent(&resource("file:///a"), &parent));
            assert!(identity.is_equal_or_parent(&resource("file:///a/b.txt"), &parent));
            assert!(!identity.is_equal_or_parent(&resource("file:///ab/b.txt"), &parent));
            assert!(!identity.is_equal_or_parent(&resource("untitled:a"), &parent));
        }

        #[test]
        fn test_root_is_parent_of_everything() {
            let identity = UriIdentity::new(PathCasing::Sensitive);
            assert_eq!(
                identity.relative_path(&resource("file:///"), &resource("file:///x/y")),
                Some("x/y".to_string())
            );
        }

        #[test]
        fn test_relative_path_keeps_original_casing() {
            let identity = UriIdentity::new(PathCasing::Insensitive);
            assert_eq!(
                identity.relative_path(&resource("file:///A"), &resource("file:///a/Sub/B.txt")),
                Some("Sub/B.txt".to_string())
            );
        }
    }
}
