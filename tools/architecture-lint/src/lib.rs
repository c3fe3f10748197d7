//! Layering check for the hospital client crate.
//!
//! `client/src` is split into three layers, each of which may only reach a
//! subset of the crate and of the dependency graph:
//!
//! | layer      | may not reach                                                   |
//! |------------|-----------------------------------------------------------------|
//! | `domain`   | `config`, `hooks`, `outbound`; HTTP, filesystem and CLI crates   |
//! | `hooks`    | `outbound`; HTTP and filesystem crates                          |
//! | `outbound` | `hooks`; the stub-server and CLI crates                         |
//!
//! Every path in a layer's files (imports, expressions, types) is resolved to
//! its crate-level root, following `self` and `super` through file and inline
//! modules, and checked against that layer's [`Boundary`] list.
//!
//! Run it with `cargo run -p architecture-lint [-- <client dir>]`.

use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use syn::visit::{self, Visit};

/// Name the client library is imported under by its binary and tests.
pub const CLIENT_CRATE: &str = "hospital_client";

/// One of the layered top-level modules of `client/src`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Types, ports and the session service.
    Domain,
    /// Resource hooks bound by views.
    Hooks,
    /// HTTP and storage adapters.
    Outbound,
}

impl Layer {
    /// Every checked layer, in dependency order.
    pub const ALL: [Self; 3] = [Self::Domain, Self::Hooks, Self::Outbound];

    /// Directory (and module) name under `client/src`.
    pub const fn module(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Hooks => "hooks",
            Self::Outbound => "outbound",
        }
    }

    /// Layer owning a file, from its path relative to `client/src`.
    pub fn of(relative: &Utf8Path) -> Option<Self> {
        let top = relative.components().next()?.as_str();
        let top = top.strip_suffix(".rs").unwrap_or(top);
        Self::ALL.into_iter().find(|layer| layer.module() == top)
    }

    /// What this layer must not depend on.
    pub const fn boundaries(self) -> &'static [Boundary] {
        use Boundary::{Crate, Module};
        match self {
            Self::Domain => &[
                Module("config"),
                Module("hooks"),
                Module("outbound"),
                Crate("actix_web"),
                Crate("camino"),
                Crate("cap_std"),
                Crate("clap"),
                Crate("ortho_config"),
                Crate("reqwest"),
                Crate("url"),
            ],
            Self::Hooks => &[
                Module("outbound"),
                Crate("actix_web"),
                Crate("camino"),
                Crate("cap_std"),
                Crate("reqwest"),
                Crate("url"),
            ],
            Self::Outbound => &[Module("hooks"), Crate("actix_web"), Crate("clap")],
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module())
    }
}

/// A dependency a layer is not allowed to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Boundary {
    /// A top-level module of the client crate.
    Module(&'static str),
    /// An external crate, by its Rust identifier.
    Crate(&'static str),
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(name) => write!(f, "crate::{name}"),
            Self::Crate(name) => write!(f, "external crate `{name}`"),
        }
    }
}

/// A file of `client/src` reaching across a boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Finding {
    /// Path relative to `client/src`.
    pub file: Utf8PathBuf,
    /// Layer owning the file.
    pub layer: Layer,
    /// Boundary that was crossed.
    pub crossed: Boundary,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} must not depend on {}", self.file, self.layer, self.crossed)
    }
}

/// Why a lint run did not pass.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    /// The source tree could not be read.
    #[error("reading {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// A file is not valid Rust.
    #[error("parsing {file}: {message}")]
    Parse { file: Utf8PathBuf, message: String },
    /// At least one boundary was crossed.
    #[error("{} layering violation(s):\n{}", .0.len(), render(.0))]
    Violations(Vec<Finding>),
}

fn render(findings: &[Finding]) -> String {
    findings
        .iter()
        .map(|finding| format!("  {finding}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A source file, addressed relative to `client/src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to `client/src`; decides the layer.
    pub path: Utf8PathBuf,
    /// Rust source text.
    pub text: String,
}

impl SourceFile {
    /// Pair a relative path with its contents.
    pub fn new(path: impl Into<Utf8PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Read the layer directories under `<client_dir>/src` and check them.
pub fn lint_client_dir(client_dir: &Utf8Path) -> Result<(), LintError> {
    let src = client_dir.join("src");
    let root = Dir::open_ambient_dir(&src, ambient_authority()).map_err(|source| {
        LintError::Read {
            path: src.clone(),
            source,
        }
    })?;
    let mut files = Vec::new();
    for layer in Layer::ALL {
        let name = layer.module();
        if root.is_dir(name) {
            read_tree(&root, Utf8Path::new(name), &src, &mut files)?;
        }
        let flat = format!("{name}.rs");
        if root.is_file(&flat) {
            read_file(&root, Utf8Path::new(&flat), &src, &mut files)?;
        }
    }
    check(&files)
}

fn read_tree(
    root: &Dir,
    dir: &Utf8Path,
    src: &Utf8Path,
    files: &mut Vec<SourceFile>,
) -> Result<(), LintError> {
    let read_err = |source| LintError::Read {
        path: src.join(dir),
        source,
    };
    let mut names = Vec::new();
    for entry in root.read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        names.push((name, entry.file_type().map_err(read_err)?.is_dir()));
    }
    names.sort();
    for (name, is_dir) in names {
        let path = dir.join(&name);
        if is_dir {
            read_tree(root, &path, src, files)?;
        } else if path.extension() == Some("rs") {
            read_file(root, &path, src, files)?;
        }
    }
    Ok(())
}

fn read_file(
    root: &Dir,
    path: &Utf8Path,
    src: &Utf8Path,
    files: &mut Vec<SourceFile>,
) -> Result<(), LintError> {
    let text = root.read_to_string(path).map_err(|source| LintError::Read {
        path: src.join(path),
        source,
    })?;
    files.push(SourceFile::new(path, text));
    Ok(())
}

/// Check in-memory sources. Files outside the layers are ignored.
pub fn check(files: &[SourceFile]) -> Result<(), LintError> {
    let mut findings = Vec::new();
    for file in files {
        let Some(layer) = Layer::of(&file.path) else {
            continue;
        };
        let ast = syn::parse_file(&file.text).map_err(|err| LintError::Parse {
            file: file.path.clone(),
            message: err.to_string(),
        })?;
        findings.extend(
            crossings(&file.path, layer, &ast)
                .into_iter()
                .map(|crossed| Finding {
                    file: file.path.clone(),
                    layer,
                    crossed,
                }),
        );
    }
    findings.sort();
    findings.dedup();
    if findings.is_empty() {
        Ok(())
    } else {
        Err(LintError::Violations(findings))
    }
}

fn crossings(path: &Utf8Path, layer: Layer, ast: &syn::File) -> Vec<Boundary> {
    let mut roots = RootCollector::new(module_path(path));
    roots.visit_file(ast);
    let mut crossed: Vec<Boundary> = layer
        .boundaries()
        .iter()
        .copied()
        .filter(|boundary| roots.reaches(*boundary))
        .collect();
    crossed.sort();
    crossed
}

/// Module path of a file: `hooks/collection.rs` is `hooks::collection`,
/// `domain/ports/mod.rs` is `domain::ports`.
fn module_path(relative: &Utf8Path) -> Vec<String> {
    let mut segments: Vec<String> = relative
        .with_extension("")
        .components()
        .map(|part| part.as_str().to_owned())
        .collect();
    if segments.last().is_some_and(|last| last == "mod") {
        segments.pop();
    }
    segments
}

/// Where a resolved path starts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Root {
    Local(String),
    External(String),
}

struct RootCollector {
    scope: Vec<String>,
    roots: Vec<Root>,
}

impl RootCollector {
    fn new(scope: Vec<String>) -> Self {
        Self {
            scope,
            roots: Vec::new(),
        }
    }

    fn reaches(&self, boundary: Boundary) -> bool {
        let wanted = match boundary {
            Boundary::Module(name) => Root::Local(name.to_owned()),
            Boundary::Crate(name) => Root::External(name.to_owned()),
        };
        self.roots.contains(&wanted)
    }

    /// Resolve leading `crate`/`self`/`super` keywords against the current
    /// module; the first remaining segment is the root.
    fn resolve<'a>(&self, mut segments: impl Iterator<Item = &'a str>) -> Option<Root> {
        let first = segments.next()?;
        let mut module = match first {
            "crate" => Vec::new(),
            "self" => self.scope.clone(),
            "super" => parent(&self.scope),
            CLIENT_CRATE => Vec::new(),
            external => return Some(Root::External(external.to_owned())),
        };
        for segment in segments {
            match segment {
                "super" => module = parent(&module),
                "self" => {}
                name => {
                    module.push(name.to_owned());
                    break;
                }
            }
        }
        module.into_iter().next().map(Root::Local)
    }

    fn record(&mut self, segments: &[String]) {
        if let Some(root) = self.resolve(segments.iter().map(String::as_str)) {
            if !self.roots.contains(&root) {
                self.roots.push(root);
            }
        }
    }

    fn record_use(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(step) => {
                prefix.push(step.ident.to_string());
                self.record_use(&step.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(leaf) => self.record_leaf(prefix, leaf.ident.to_string()),
            syn::UseTree::Rename(leaf) => self.record_leaf(prefix, leaf.ident.to_string()),
            syn::UseTree::Glob(_) => self.record(prefix),
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use(item, prefix);
                }
            }
        }
    }

    fn record_leaf(&mut self, prefix: &[String], leaf: String) {
        let mut full = prefix.to_vec();
        full.push(leaf);
        self.record(&full);
    }
}

fn parent(module: &[String]) -> Vec<String> {
    module
        .split_last()
        .map(|(_, rest)| rest.to_vec())
        .unwrap_or_default()
}

impl<'ast> Visit<'ast> for RootCollector {
    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use(&node.tree, &mut Vec::new());
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        if node.content.is_none() {
            return;
        }
        self.scope.push(node.ident.to_string());
        visit::visit_item_mod(self, node);
        self.scope.pop();
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        // A lone identifier is a local binding or prelude name, never a crate
        // reached without an import.
        if node.segments.len() > 1 || node.leading_colon.is_some() {
            let segments: Vec<String> = node
                .segments
                .iter()
                .map(|segment| segment.ident.to_string())
                .collect();
            self.record(&segments);
        }
        visit::visit_path(self, node);
    }
}

#[cfg(test)]
mod tests;
