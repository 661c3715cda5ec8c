use crate::backend::{IdCompiler, SymbolInvocation};
use crate::CompilerError;
use respack_schema::IgnorePattern;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// In-process compiler that assigns identifiers deterministically.
///
/// Understands enough of the resource layout to stand in for aapt in tests:
/// file resources (`<type>[-qualifiers]/<name>.<ext>`), named elements of
/// `values*/*.xml`, `declare-styleable` blocks, and `@+id/` declarations in
/// XML files. Type ids start at `0x7f01` in sorted type order and entries are
/// numbered in sorted name order.
///
/// Roots are read in search order and later roots override earlier ones: a
/// `declare-styleable` redeclared under a later root replaces the earlier
/// attribute list.
#[derive(Debug, Default)]
pub struct MockCompiler;

impl MockCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl IdCompiler for MockCompiler {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn available(&self) -> bool {
        true
    }

    fn compile_symbols(&self, invocation: &SymbolInvocation) -> Result<(), CompilerError> {
        let mut symbols = Symbols::default();
        for root in &invocation.search_roots {
            collect_root(root, &invocation.ignore, &mut symbols)?;
        }

        if symbols.is_empty() {
            debug!("mock compiler: no resources, leaving no table");
            return Ok(());
        }

        fs::create_dir_all(&invocation.gen_dir)?;
        fs::write(invocation.r_txt_path(), symbols.render())?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Symbols {
    entries: BTreeMap<String, BTreeSet<String>>,
    styleables: BTreeMap<String, Vec<String>>,
}

impl Symbols {
    fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.styleables.is_empty()
    }

    fn add(&mut self, ty: &str, name: &str) {
        self.entries
            .entry(ty.to_owned())
            .or_default()
            .insert(java_name(name));
    }

    fn render(&self) -> String {
        let mut out = String::new();
        let mut attr_ids: BTreeMap<&str, u32> = BTreeMap::new();

        let mut type_id: u32 = 0x7f01;
        for (ty, names) in &self.entries {
            let mut entry: u32 = 0;
            for name in names {
                let id = (type_id << 16) | entry;
                let _ = writeln!(out, "int {ty} {name} 0x{id:08x}");
                if ty == "attr" {
                    attr_ids.insert(name, id);
                }
                entry += 1;
            }
            type_id += 1;
        }

        for (name, attrs) in &self.styleables {
            let ids: Vec<String> = attrs
                .iter()
                .map(|a| format!("0x{:08x}", attr_ids.get(a.as_str()).copied().unwrap_or(0)))
                .collect();
            if ids.is_empty() {
                let _ = writeln!(out, "int[] styleable {name} {{ }}");
            } else {
                let _ = writeln!(out, "int[] styleable {name} {{ {} }}", ids.join(", "));
            }
            for (index, attr) in attrs.iter().enumerate() {
                let _ = writeln!(out, "int styleable {name}_{} {index}", attr.replace(':', "_"));
            }
        }
        out
    }
}

fn java_name(name: &str) -> String {
    name.replace('.', "_")
}

fn collect_root(root: &Path, ignore: &IgnorePattern, out: &mut Symbols) -> Result<(), CompilerError> {
    if !root.is_dir() {
        return Err(CompilerError::ToolFailed {
            tool: "mock".to_owned(),
            status: "exit status: 1".to_owned(),
            output: format!("ERROR: resource directory '{}' does not exist\n", root.display()),
        });
    }

    let walker = WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        if ignore.is_ignored(rel) {
            continue;
        }

        let dir_name = rel
            .components()
            .next()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let ty = dir_name.split('-').next().unwrap_or_default();

        if ty == "values" {
            if file_name.ends_with(".xml") {
                collect_values(&read_text(path)?, out);
            }
            continue;
        }

        let name = file_name.split('.').next().unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        out.add(ty, name);
        if file_name.ends_with(".xml") {
            collect_ids(&read_text(path)?, out);
        }
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String, CompilerError> {
    fs::read_to_string(path).map_err(|e| CompilerError::UnreadableResource {
        path: PathBuf::from(path),
        reason: e.to_string(),
    })
}

fn collect_values(text: &str, out: &mut Symbols) {
    let mut depth = 0usize;
    let mut styleable: Option<(String, Vec<String>)> = None;

    for tag in scan_tags(text) {
        if tag.kind == TagKind::Close {
            depth = depth.saturating_sub(1);
            if depth == 1 {
                if let Some((name, attrs)) = styleable.take() {
                    out.styleables.insert(name, attrs);
                }
            }
            continue;
        }

        if depth == 1 {
            if let Some(name) = attribute(tag.attrs, "name") {
                match tag.name {
                    "declare-styleable" => {
                        if tag.kind == TagKind::SelfClosing {
                            out.styleables.insert(java_name(name), Vec::new());
                        } else {
                            styleable = Some((java_name(name), Vec::new()));
                        }
                    }
                    "item" => {
                        if let Some(ty) = attribute(tag.attrs, "type") {
                            out.add(ty, name);
                        }
                    }
                    "string-array" | "integer-array" | "array" => out.add("array", name),
                    "eat-comment" | "skip" | "public" | "java-symbol" | "add-resource" => {}
                    other => out.add(other, name),
                }
            }
        } else if depth == 2 && tag.name == "attr" {
            if let (Some((_, attrs)), Some(name)) = (styleable.as_mut(), attribute(tag.attrs, "name")) {
                attrs.push(name.to_owned());
                if !name.contains(':') {
                    out.add("attr", name);
                }
            }
        }

        if tag.kind == TagKind::Open {
            depth += 1;
        }
    }
}

fn collect_ids(text: &str, out: &mut Symbols) {
    const MARKER: &str = "@+id/";
    let mut rest = text;
    while let Some(pos) = rest.find(MARKER) {
        rest = &rest[pos + MARKER.len()..];
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(rest.len());
        if end > 0 {
            out.add("id", &rest[..end]);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Open,
    Close,
    SelfClosing,
}

#[derive(Debug)]
struct Tag<'a> {
    name: &'a str,
    attrs: &'a str,
    kind: TagKind,
}

fn scan_tags(text: &str) -> Vec<Tag<'_>> {
    let mut tags = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        rest = &rest[start..];
        if let Some(after) = rest.strip_prefix("<!--") {
            let Some(end) = after.find("-->") else { break };
            rest = &after[end + 3..];
            continue;
        }
        if let Some(after) = rest.strip_prefix("<![CDATA[") {
            let Some(end) = after.find("]]>") else { break };
            rest = &after[end + 3..];
            continue;
        }
        let Some(end) = rest.find('>') else { break };
        let body = &rest[1..end];
        rest = &rest[end + 1..];

        if body.starts_with('?') || body.starts_with('!') {
            continue;
        }
        if let Some(name) = body.strip_prefix('/') {
            tags.push(Tag {
                name: name.trim(),
                attrs: "",
                kind: TagKind::Close,
            });
            continue;
        }
        let (body, kind) = match body.strip_suffix('/') {
            Some(b) => (b, TagKind::SelfClosing),
            None => (body, TagKind::Open),
        };
        let name_end = body.find(char::is_whitespace).unwrap_or(body.len());
        tags.push(Tag {
            name: &body[..name_end],
            attrs: &body[name_end..],
            kind,
        });
    }
    tags
}

/// Value of attribute `key`. Prefixed names such as `android:name` do not
/// match `name`.
fn attribute<'a>(attrs: &'a str, key: &str) -> Option<&'a str> {
    let mut offset = 0;
    while let Some(pos) = attrs[offset..].find(key) {
        let start = offset + pos;
        offset = start + key.len();
        let standalone = attrs[..start]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);
        if !standalone {
            continue;
        }
        let Some(value) = attrs[offset..].trim_start().strip_prefix('=') else {
            continue;
        };
        let value = value.trim_start();
        let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let inner = &value[1..];
        if let Some(end) = inner.find(quote) {
            return Some(&inner[..end]);
        }
    }
    None
}
