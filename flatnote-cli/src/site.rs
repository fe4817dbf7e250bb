//! Site layout: output paths, the nav tree and the generator config.
//!
//! The generated tree is rooted at the chosen root document: that document
//! becomes `index.md`, every other document lands at its path relative to
//! the root. The nav tree mirrors the document hierarchy, with siblings
//! ordered by their numeric chapter prefix (`2 Setup` before `10 Appendix`)
//! and alphabetically when no prefix is present.

use std::path::PathBuf;

use flatnote_store::Block;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// A document's hierarchical path relative to the root document: segments
/// up to (and excluding) the root's name are dropped.
///
/// `/A/B/C/D` with root `C` becomes `/C/D`. A path that never mentions the
/// root name comes back empty.
#[must_use]
pub fn root_relative_path(root_title: &str, path: &str) -> String {
    let mut relative = String::new();
    let mut keep = false;
    for segment in path.split('/') {
        if segment.is_empty() {
            continue;
        }
        if segment == root_title {
            keep = true;
        }
        if keep {
            relative.push('/');
            relative.push_str(segment);
        }
    }
    relative
}

/// Where `doc`'s flattened Markdown lands inside the `docs/` tree.
#[must_use]
pub fn output_rel_path(root: &Block, doc: &Block) -> PathBuf {
    if doc.id == root.id {
        return PathBuf::from("index.md");
    }
    let relative = root_relative_path(&root.title, &doc.path);
    if relative.is_empty() {
        // The document sits outside the root's subtree; fall back to its
        // own title so it is not lost.
        return PathBuf::from(format!("{}.md", doc.title));
    }
    PathBuf::from(format!("{}.md", relative.trim_start_matches('/')))
}

/// Leading numeric chapter components of a document name: `"1.2 Setup"`
/// yields `[1, 2]`, an unnumbered name yields nothing.
fn chapter_numbers(name: &str) -> Vec<u64> {
    let trimmed = name.trim_start();
    let prefix: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '_'))
        .collect();
    if !prefix.starts_with(|c: char| c.is_ascii_digit()) {
        return Vec::new();
    }
    prefix
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect()
}

#[derive(Debug, Default)]
struct NavNode {
    name: String,
    /// `Some` for documents, `None` for intermediate directories.
    target: Option<String>,
    children: Vec<NavNode>,
}

impl NavNode {
    fn insert(&mut self, segments: &[&str], target: String) {
        let Some((head, rest)) = segments.split_first() else {
            self.target = Some(target);
            return;
        };
        if let Some(child) = self.children.iter_mut().find(|c| c.name == *head) {
            child.insert(rest, target);
            return;
        }
        let mut node = NavNode {
            name: (*head).to_string(),
            ..NavNode::default()
        };
        node.insert(rest, target);
        self.children.push(node);
    }

    fn sort(&mut self) {
        self.children.sort_by(|a, b| {
            chapter_numbers(&a.name)
                .cmp(&chapter_numbers(&b.name))
                .then_with(|| a.name.cmp(&b.name))
        });
        for child in &mut self.children {
            child.sort();
        }
    }

    fn to_value(&self) -> Value {
        let mut mapping = Mapping::new();
        if self.children.is_empty() {
            mapping.insert(
                Value::String(self.name.clone()),
                Value::String(self.target.clone().unwrap_or_default()),
            );
        } else {
            let children: Vec<Value> = self.children.iter().map(NavNode::to_value).collect();
            mapping.insert(Value::String(self.name.clone()), Value::Sequence(children));
        }
        Value::Mapping(mapping)
    }
}

/// Build the nav entries for every document under `root`.
///
/// The root document itself is represented by the leading `Home` entry; its
/// descendants follow in hierarchy order.
#[must_use]
pub fn build_nav(root: &Block, docs: &[&Block]) -> Vec<Value> {
    let mut tree = NavNode::default();
    for doc in docs {
        if doc.id == root.id {
            continue;
        }
        let relative = root_relative_path(&root.title, &doc.path);
        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        // Skip the leading root segment: the tree hangs below the root.
        let Some(below_root) = segments.get(1..) else {
            continue;
        };
        let target = format!("{}.md", relative.trim_start_matches('/'));
        tree.insert(below_root, target);
    }
    tree.sort();

    let mut nav = Vec::with_capacity(tree.children.len() + 1);
    let mut home = Mapping::new();
    home.insert(
        Value::String("Home".to_string()),
        Value::String("index.md".to_string()),
    );
    nav.push(Value::Mapping(home));
    nav.extend(tree.children.iter().map(NavNode::to_value));
    nav
}

#[derive(Debug, Serialize)]
struct Theme {
    name: &'static str,
    language: &'static str,
    features: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct SiteConfig<'a> {
    site_name: &'a str,
    use_directory_urls: bool,
    theme: Theme,
    copyright: &'a str,
    markdown_extensions: Vec<Value>,
    nav: Vec<Value>,
}

/// Render the generator's YAML config for the site.
///
/// The `attr_list` extension is not optional: the flattened Markdown leans
/// on inline attribute syntax for image widths.
///
/// # Errors
///
/// Returns an error when the config cannot be serialized.
pub fn render_config(
    site_name: &str,
    copyright: &str,
    root: &Block,
    docs: &[&Block],
) -> anyhow::Result<String> {
    let mut toc = Mapping::new();
    let mut toc_options = Mapping::new();
    toc_options.insert(Value::String("permalink".into()), Value::Bool(true));
    toc_options.insert(Value::String("separator".into()), Value::String("_".into()));
    toc.insert(Value::String("toc".into()), Value::Mapping(toc_options));

    let config = SiteConfig {
        site_name,
        use_directory_urls: false,
        theme: Theme {
            name: "material",
            language: "en",
            features: vec!["navigation.footer", "navigation.top"],
        },
        copyright,
        markdown_extensions: vec![
            Value::String("attr_list".into()),
            Value::Mapping(toc),
            Value::String("md_in_html".into()),
        ],
        nav: build_nav(root, docs),
    };
    Ok(serde_yaml::to_string(&config)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use flatnote_store::BlockKind;
    use pretty_assertions::assert_eq;

    use super::*;

    fn doc(id: &str, title: &str, path: &str) -> Block {
        Block {
            id: id.to_string(),
            kind: BlockKind::Document,
            title: title.to_string(),
            path: path.to_string(),
            ..Block::default()
        }
    }

    #[test]
    fn root_relative_path_starts_at_the_root_name() {
        assert_eq!(root_relative_path("C", "/A/B/C/D"), "/C/D");
        assert_eq!(root_relative_path("C", "/C"), "/C");
        assert_eq!(root_relative_path("C", "/X/Y"), "");
    }

    #[test]
    fn root_document_maps_to_index() {
        let root = doc("r", "Guide", "/Guide");
        assert_eq!(output_rel_path(&root, &root), PathBuf::from("index.md"));
        let chapter = doc("c", "1 Intro", "/Guide/1 Intro");
        assert_eq!(
            output_rel_path(&root, &chapter),
            PathBuf::from("Guide/1 Intro.md")
        );
    }

    #[test]
    fn chapter_ordering_is_numeric_not_lexicographic() {
        assert!(chapter_numbers("2 Setup") < chapter_numbers("10 Appendix"));
        assert_eq!(chapter_numbers("1.2 Detail"), vec![1, 2]);
        assert!(chapter_numbers("Overview").is_empty());
    }

    #[test]
    fn nav_lists_home_first_and_sorts_chapters() {
        let root = doc("r", "Guide", "/Guide");
        let ch10 = doc("a", "10 Appendix", "/Guide/10 Appendix");
        let ch2 = doc("b", "2 Setup", "/Guide/2 Setup");
        let docs = vec![&root, &ch10, &ch2];
        let nav = build_nav(&root, &docs);
        let rendered = serde_yaml::to_string(&nav).unwrap();
        let setup = rendered.find("2 Setup").unwrap();
        let appendix = rendered.find("10 Appendix").unwrap();
        assert!(rendered.starts_with("- Home: index.md\n"));
        assert!(setup < appendix);
    }

    #[test]
    fn nested_documents_become_nested_nav_sections() {
        let root = doc("r", "Guide", "/Guide");
        let part = doc("p", "1 Part", "/Guide/1 Part");
        let leaf = doc("l", "1.1 Leaf", "/Guide/1 Part/1.1 Leaf");
        let docs = vec![&root, &part, &leaf];
        let nav = build_nav(&root, &docs);
        let rendered = serde_yaml::to_string(&nav).unwrap();
        assert!(rendered.contains("1 Part:\n"));
        assert!(rendered.contains("1.1 Leaf: Guide/1 Part/1.1 Leaf.md"));
    }

    #[test]
    fn config_always_enables_attr_list() {
        let root = doc("r", "Guide", "/Guide");
        let docs = vec![&root];
        let config = render_config("Guide", "", &root, &docs).unwrap();
        assert!(config.contains("attr_list"));
        assert!(config.contains("site_name: Guide"));
    }
}
