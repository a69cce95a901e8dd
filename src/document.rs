//! One input file and its latest rendered fragment.

use crate::dom::Dom;
use crate::error::{BuildError, ConvertError, TreeError};
use crate::render::RenderPool;
use crate::treeify::{SectionTree, treeify};
use crate::utils::date::DateTimeUtc;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Provenance attribute: input path of a section.
pub const ATTR_SOURCE: &str = "codex-source";
/// Provenance attribute: RFC 3339 mtime of the input that produced a section.
pub const ATTR_MTIME: &str = "codex-mtime";

/// Treeified, annotated output of one conversion.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub dom: Dom,
    pub tree: SectionTree,
    /// Source mtime sampled right before the conversion started.
    pub mtime: SystemTime,
}

#[derive(Debug)]
pub struct SourceDocument {
    path: PathBuf,
    /// mtime the current container contents were built from.
    btime: Option<SystemTime>,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            btime: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current on-disk modification time.
    pub fn mtime(&self) -> Result<SystemTime, ConvertError> {
        fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|source| ConvertError::Stat {
                path: self.path.clone(),
                source,
            })
    }

    /// True when the file changed since the last successful build.
    pub fn needs_rebuild(&self) -> Result<bool, ConvertError> {
        let mtime = self.mtime()?;
        Ok(self.btime.is_none_or(|btime| mtime > btime))
    }

    /// Render, treeify and annotate the current file contents.
    pub async fn convert(&self, pool: &RenderPool) -> Result<Fragment, BuildError> {
        let mtime = self.mtime()?;
        let html = pool.render(&self.path).await?;
        Ok(self.build_fragment(&html, mtime)?)
    }

    /// CPU half of [`convert`](Self::convert): parse already-rendered HTML.
    pub fn build_fragment(&self, html: &str, mtime: SystemTime) -> Result<Fragment, TreeError> {
        let mut dom = Dom::parse_fragment(html);
        let root = dom.root();
        let tree = treeify(&mut dom, root)?;

        let source = self.path.display().to_string();
        let stamp = DateTimeUtc::from_system_time(mtime).to_rfc3339();
        for section in tree.iter() {
            dom.set_attr(section.node, ATTR_SOURCE, &source);
            dom.set_attr(section.node, ATTR_MTIME, &stamp);
        }

        Ok(Fragment { dom, tree, mtime })
    }

    /// Record that the container now shows the file as of `mtime`.
    pub fn mark_built(&mut self, mtime: SystemTime) {
        self.btime = Some(mtime);
    }
}
