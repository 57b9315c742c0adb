//! Nested file tree derived from a record's flat file paths.
//!
//! # Invariants
//! - Within one directory, sub-directories come first, then files; each group
//!   is sorted by name.
//! - A node's `path` is the `/`-joined chain of names from the root.
//! - Only directories carry `children`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNodeKind {
    File,
    Dir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    #[serde(rename = "type")]
    pub kind: FileNodeKind,
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

impl FileNode {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: FileNodeKind::File,
            name: name.into(),
            path: path.into(),
            children: None,
        }
    }

    pub fn dir(name: impl Into<String>, path: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            kind: FileNodeKind::Dir,
            name: name.into(),
            path: path.into(),
            children: Some(children),
        }
    }
}

#[derive(Default)]
struct DirBuilder {
    dirs: BTreeMap<String, DirBuilder>,
    files: Vec<String>,
}

impl DirBuilder {
    fn insert(&mut self, segments: &[&str]) {
        match segments {
            [] => {}
            [file] => self.files.push((*file).to_string()),
            [dir, rest @ ..] => self.dirs.entry((*dir).to_string()).or_default().insert(rest),
        }
    }

    fn build(self, prefix: &str) -> Vec<FileNode> {
        let join = |name: &str| {
            if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}/{name}")
            }
        };

        let mut nodes: Vec<FileNode> = self
            .dirs
            .into_iter()
            .map(|(name, dir)| {
                let path = join(&name);
                let children = dir.build(&path);
                FileNode::dir(name, path, children)
            })
            .collect();

        let mut files = self.files;
        files.sort();
        files.dedup();
        nodes.extend(files.into_iter().map(|name| {
            let path = join(&name);
            FileNode::file(name, path)
        }));
        nodes
    }
}

/// Builds the directory tree for `paths`.
///
/// Empty segments (leading, trailing or doubled `/`) are ignored.
pub fn build_file_tree<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<FileNode> {
    let mut root = DirBuilder::default();
    for path in paths {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        root.insert(&segments);
    }
    root.build("")
}

#[cfg(test)]
mod tests {
    use super::{build_file_tree, FileNode};

    #[test]
    fn nests_directories_before_files() {
        let tree = build_file_tree(["b.txt", "src/z.rs", "a.txt", "src/lib/mod.rs", "src/a.rs"]);
        assert_eq!(
            tree,
            vec![
                FileNode::dir(
                    "src",
                    "src",
                    vec![
                        FileNode::dir("lib", "src/lib", vec![FileNode::file("mod.rs", "src/lib/mod.rs")]),
                        FileNode::file("a.rs", "src/a.rs"),
                        FileNode::file("z.rs", "src/z.rs"),
                    ],
                ),
                FileNode::file("a.txt", "a.txt"),
                FileNode::file("b.txt", "b.txt"),
            ]
        );
    }

    #[test]
    fn file_nodes_omit_children_in_json() {
        let value = serde_json::to_value(build_file_tree(["docs/x.md"])).unwrap();
        assert_eq!(value[0]["type"], "dir");
        assert_eq!(value[0]["children"][0]["type"], "file");
        assert!(value[0]["children"][0].get("children").is_none());
    }

    #[test]
    fn ignores_empty_segments() {
        assert_eq!(
            build_file_tree(["/a//b.txt", ""]),
            vec![FileNode::dir("a", "a", vec![FileNode::file("b.txt", "a/b.txt")])]
        );
    }
}
