use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Exclusions applied during project discovery
pub struct IgnoreFilter {
    inner: Gitignore,
}

impl IgnoreFilter {
    pub fn new(root: &Path, extra_excludes: Option<&[String]>) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        builder.add(root.join(".gitignore"));
        builder.add(root.join(".ignore"));

        let defaults = [
            // Installed gems and build output
            "vendor/", "build/", "pkg/", "tmp/", "coverage/", ".bundle/",
            ".git/", ".idea/", ".vscode/",

            // Generated or non-source Ruby files
            "*.rbc", "*.gem", "*.lock", "*.log",
        ];

        for pattern in defaults {
            builder.add_line(None, pattern).ok();
        }

        if let Some(excludes) = extra_excludes {
            for pattern in excludes {
                if let Err(e) = builder.add_line(None, pattern) {
                    tracing::warn!(pattern = %pattern, "ignoring invalid exclude pattern: {}", e);
                }
            }
        }

        Self {
            inner: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.inner.matched_path_or_any_parents(path, is_dir).is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_and_extra_excludes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let filter = IgnoreFilter::new(root, Some(&["spec/".to_string()]));

        assert!(filter.is_ignored(&root.join("vendor/bundle/x.rb"), false));
        assert!(filter.is_ignored(&root.join("spec"), true));
        assert!(filter.is_ignored(&root.join("spec/game_spec.rb"), false));
        assert!(!filter.is_ignored(&root.join("app/game.rb"), false));
    }

    #[test]
    fn test_reads_project_gitignore() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join(".gitignore"), "generated/\n").unwrap();

        let filter = IgnoreFilter::new(root, None);
        assert!(filter.is_ignored(&root.join("generated/schema.rb"), false));
        assert!(!filter.is_ignored(&root.join("app/schema.rb"), false));
    }
}
