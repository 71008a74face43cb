//! Category tree over a document's morphs.
//!
//! Categories are delimiter-separated paths (`"Nose>Tip"`). The tree holds
//! morph indexes, not morphs, so it stays valid while values are edited.

use crate::model::MorphDocument;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryNode {
    name: String,
    path: String,
    children: Vec<CategoryNode>,
    morphs: Vec<usize>,
}

impl CategoryNode {
    fn new(name: String, path: String) -> Self {
        Self {
            name,
            path,
            ..Default::default()
        }
    }

    /// Last path segment; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full category path; empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Sub-categories in order of first appearance.
    pub fn children(&self) -> &[CategoryNode] {
        &self.children
    }

    /// Indexes into `MorphDocument::morphs` filed directly under this node.
    pub fn morphs(&self) -> &[usize] {
        &self.morphs
    }

    pub fn child(&self, name: &str) -> Option<&CategoryNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Walk `parts` below this node, creating missing categories.
    fn ensure_path(&mut self, parts: &[&str], delimiter: char) -> &mut CategoryNode {
        let Some((first, rest)) = parts.split_first() else {
            return self;
        };
        let pos = match self.children.iter().position(|c| c.name == *first) {
            Some(pos) => pos,
            None => {
                let path = if self.path.is_empty() {
                    first.to_string()
                } else {
                    format!("{}{delimiter}{first}", self.path)
                };
                self.children.push(CategoryNode::new(first.to_string(), path));
                self.children.len() - 1
            }
        };
        self.children[pos].ensure_path(rest, delimiter)
    }

    fn walk_into<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a CategoryNode)>) {
        out.push((depth, self));
        for child in &self.children {
            child.walk_into(depth + 1, out);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTree {
    root: CategoryNode,
    delimiter: char,
}

impl CategoryTree {
    pub fn build(doc: &MorphDocument, delimiter: char) -> Self {
        let mut root = CategoryNode::default();
        for (index, morph) in doc.morphs.iter().enumerate() {
            let parts = split(&morph.category, delimiter);
            root.ensure_path(&parts, delimiter).morphs.push(index);
        }
        Self { root, delimiter }
    }

    pub fn root(&self) -> &CategoryNode {
        &self.root
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Node for a full category path; `""` is the root.
    pub fn node(&self, path: &str) -> Option<&CategoryNode> {
        split(path, self.delimiter)
            .into_iter()
            .try_fold(&self.root, |node, part| node.child(part))
    }

    /// Depth-first, parents before children, with depth (root = 0).
    pub fn walk(&self) -> Vec<(usize, &CategoryNode)> {
        let mut out = Vec::new();
        self.root.walk_into(0, &mut out);
        out
    }
}

fn split(path: &str, delimiter: char) -> Vec<&str> {
    path.split(delimiter).filter(|s| !s.is_empty()).collect()
}
