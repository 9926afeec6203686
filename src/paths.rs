//! Path joining shared by config anchoring, discovery and the build.

use std::path::{Path, PathBuf};

/// Join a directory and a leaf path, the way `os.path.join` would.
///
/// No existence check and no normalization: `build` + `pages/a.xml` gives
/// `build/pages/a.xml`. An absolute `leaf` replaces `dir` entirely.
pub fn resolve(dir: &Path, leaf: impl AsRef<Path>) -> PathBuf {
    dir.join(leaf)
}
