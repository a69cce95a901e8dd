//! The composite document served to browsers.
//!
//! One page skeleton whose `<main>` holds a `<section class="codex-doc">`
//! container per input file. Containers are created once and refilled in
//! place, so a rebuild of one file never touches the others.

use crate::document::{ATTR_MTIME, ATTR_SOURCE, Fragment, SourceDocument};
use crate::dom::{Dom, NodeId};
use crate::embed::PAGE_HTML;
use crate::error::{BuildError, TreeError};
use crate::render::RenderPool;
use crate::utils::date::DateTimeUtc;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

pub const CONTAINER_CLASS: &str = "codex-doc";

struct Entry {
    doc: SourceDocument,
    container: NodeId,
}

pub struct CodexStore {
    dom: Dom,
    entries: Vec<Entry>,
    pool: RenderPool,
}

impl CodexStore {
    /// Parse the page template and create one empty container per input.
    pub fn assemble_skeleton(paths: &[PathBuf], pool: RenderPool) -> Result<Self, BuildError> {
        let mut dom = Dom::parse_fragment(PAGE_HTML);
        let main = dom
            .find_tag(dom.root(), "main")
            .ok_or(BuildError::Template)?;

        let mut seen = FxHashSet::default();
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            if !seen.insert(path) {
                return Err(BuildError::DuplicateInput(path.clone()));
            }
            let container = dom.create_element("section");
            dom.set_attr(container, "class", CONTAINER_CLASS);
            dom.set_attr(container, ATTR_SOURCE, &path.display().to_string());
            dom.append(main, container);
            entries.push(Entry {
                doc: SourceDocument::new(path),
                container,
            });
        }

        Ok(Self { dom, entries, pool })
    }

    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.doc.path())
    }

    /// Render every document and fill all containers.
    ///
    /// Containers are only written once every document converted.
    /// Returns the total number of sections.
    pub async fn build_all(&mut self) -> Result<usize, BuildError> {
        let mtimes = self
            .entries
            .iter()
            .map(|e| e.doc.mtime())
            .collect::<Result<Vec<_>, _>>()?;
        let paths: Vec<PathBuf> = self.sources().map(Path::to_path_buf).collect();

        let htmls = self.pool.render_all(&paths).await?;

        let fragments = self
            .entries
            .par_iter()
            .zip(htmls.par_iter())
            .zip(mtimes.par_iter())
            .map(|((entry, html), &mtime)| entry.doc.build_fragment(html, mtime))
            .collect::<Result<Vec<_>, TreeError>>()?;

        let mut total = 0;
        for (index, fragment) in fragments.into_iter().enumerate() {
            total += fragment.tree.len();
            self.fill(index, fragment);
        }
        Ok(total)
    }

    /// True when the input changed since its container was last filled.
    pub fn needs_rebuild(&self, path: &Path) -> Result<bool, BuildError> {
        let index = self.index_of(path)?;
        Ok(self.entries[index].doc.needs_rebuild()?)
    }

    /// Re-convert one document and swap its container contents.
    ///
    /// On failure the container keeps its previous contents.
    pub async fn patch(&mut self, path: &Path) -> Result<usize, BuildError> {
        let index = self.index_of(path)?;
        let fragment = self.entries[index].doc.convert(&self.pool).await?;
        let sections = fragment.tree.len();
        self.fill(index, fragment);
        Ok(sections)
    }

    /// `<!DOCTYPE html>` followed by the serialized page.
    pub fn snapshot(&self) -> String {
        format!("<!DOCTYPE html>\n{}", self.dom.to_html())
    }

    fn index_of(&self, path: &Path) -> Result<usize, BuildError> {
        self.entries
            .iter()
            .position(|e| e.doc.path() == path)
            .ok_or_else(|| BuildError::UnknownDocument(path.to_path_buf()))
    }

    fn fill(&mut self, index: usize, fragment: Fragment) {
        let container = self.entries[index].container;
        self.dom.clear_children(container);
        self.dom.import_children(container, &fragment.dom);

        let stamp = DateTimeUtc::from_system_time(fragment.mtime).to_rfc3339();
        self.dom.set_attr(container, ATTR_MTIME, &stamp);

        self.entries[index].doc.mark_built(fragment.mtime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::render::fake::{Passthrough, touch};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        paths: Vec<PathBuf>,
        renderer: Arc<Passthrough>,
        store: CodexStore,
    }

    fn fixture(docs: &[(&str, &str)]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = docs
            .iter()
            .map(|(name, html)| {
                let path = dir.path().join(name);
                fs::write(&path, html).unwrap();
                path
            })
            .collect();
        let renderer = Arc::new(Passthrough::default());
        let pool = RenderPool::new(renderer.clone(), 2);
        let store = CodexStore::assemble_skeleton(&paths, pool).unwrap();
        Fixture {
            _dir: dir,
            paths,
            renderer,
            store,
        }
    }

    fn containers(store: &CodexStore) -> Vec<NodeId> {
        store.dom.select_class(store.dom.root(), CONTAINER_CLASS)
    }

    #[tokio::test]
    async fn test_two_documents_one_container_each() {
        let mut fx = fixture(&[
            ("a.md", "<h1>MD</h1>\n<p>Hello World MD</p>\n"),
            ("b.rst", "<h1>RST</h1>\n<p>Hello World RST</p>\n"),
        ]);
        let sections = fx.store.build_all().await.unwrap();
        assert_eq!(sections, 4);

        let dom = &fx.store.dom;
        let boxes = containers(&fx.store);
        assert_eq!(boxes.len(), 2);
        for (container, path) in boxes.iter().zip(&fx.paths) {
            let source = path.display().to_string();
            assert_eq!(dom.attr(*container, ATTR_SOURCE), Some(source.as_str()));
            assert!(dom.attr(*container, ATTR_MTIME).is_some());

            let tops = dom.select_class(*container, "node-depth-0");
            assert_eq!(tops.len(), 1);
            assert_eq!(dom.attr(tops[0], ATTR_SOURCE), Some(source.as_str()));
        }
        assert_eq!(dom.select_class(dom.root(), "node").len(), 4);
    }

    #[tokio::test]
    async fn test_snapshot_is_full_document() {
        let mut fx = fixture(&[("a.md", "<h1>A</h1>")]);
        fx.store.build_all().await.unwrap();

        let html = fx.store.snapshot();
        assert!(html.starts_with("<!DOCTYPE html>\n<html"));
        assert!(html.contains("class=\"codex-doc\""));
        assert!(html.contains("<h1>A</h1>"));
    }

    #[tokio::test]
    async fn test_patch_touches_one_container() {
        let mut fx = fixture(&[("a.md", "<h1>A</h1>\n<p>x</p>"), ("b.md", "<h1>B</h1>\n<p>y</p>")]);
        fx.store.build_all().await.unwrap();
        let boxes = containers(&fx.store);
        let first_before = fx.store.dom.inner_html(boxes[0]);

        touch(&fx.paths[1], "<h1>B</h1>\n<p>changed</p>");
        assert!(fx.store.needs_rebuild(&fx.paths[1]).unwrap());
        assert!(!fx.store.needs_rebuild(&fx.paths[0]).unwrap());

        fx.store.patch(&fx.paths[1]).await.unwrap();
        assert_eq!(fx.store.dom.inner_html(boxes[0]), first_before);
        assert!(fx.store.dom.text_content(boxes[1]).contains("changed"));
        assert!(!fx.store.needs_rebuild(&fx.paths[1]).unwrap());
    }

    #[tokio::test]
    async fn test_failed_patch_keeps_previous_contents() {
        let mut fx = fixture(&[("a.md", "<h1>A</h1>")]);
        fx.store.build_all().await.unwrap();
        let before = fx.store.snapshot();

        touch(&fx.paths[0], "<h1>FAIL</h1>");
        let err = fx.store.patch(&fx.paths[0]).await.unwrap_err();
        assert!(matches!(err, BuildError::Convert(ConvertError::Failed { .. })));
        assert_eq!(fx.store.snapshot(), before);
        assert!(fx.store.needs_rebuild(&fx.paths[0]).unwrap());
    }

    #[tokio::test]
    async fn test_unchanged_documents_need_no_rebuild() {
        let mut fx = fixture(&[("a.md", "<h1>A</h1>"), ("b.md", "<h1>B</h1>")]);
        fx.store.build_all().await.unwrap();
        assert_eq!(fx.renderer.calls(), 2);

        for path in &fx.paths {
            assert!(!fx.store.needs_rebuild(path).unwrap());
        }
        assert_eq!(fx.renderer.calls(), 2);
    }

    #[tokio::test]
    async fn test_build_all_is_all_or_nothing() {
        let mut fx = fixture(&[("a.md", "<h1>A</h1>"), ("b.md", "<h1>FAIL</h1>")]);
        assert!(fx.store.build_all().await.is_err());
        for container in containers(&fx.store) {
            assert!(fx.store.dom.children(container).is_empty());
        }
    }

    #[tokio::test]
    async fn test_repeated_patches_reuse_arena_slots() {
        let mut fx = fixture(&[("a.md", "<h1>A</h1>\n<p>x</p>\n<p>y</p>")]);
        fx.store.build_all().await.unwrap();
        let live = fx.store.dom.len();

        for _ in 0..3 {
            fx.store.patch(&fx.paths[0]).await.unwrap();
        }
        assert_eq!(fx.store.dom.len(), live);
    }

    #[test]
    fn test_duplicate_input_rejected() {
        let pool = RenderPool::new(Arc::new(Passthrough::default()), 1);
        let paths = vec![PathBuf::from("a.md"), PathBuf::from("a.md")];
        let err = CodexStore::assemble_skeleton(&paths, pool).err().unwrap();
        assert!(matches!(err, BuildError::DuplicateInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let mut fx = fixture(&[("a.md", "<h1>A</h1>")]);
        let err = fx.store.patch(Path::new("other.md")).await.unwrap_err();
        assert!(matches!(err, BuildError::UnknownDocument(_)));
    }
}
