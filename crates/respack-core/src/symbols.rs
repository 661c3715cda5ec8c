//! The identifier table (`R.txt`) model.
//!
//! Each line is `<java type> <resource type> <name> <value>`:
//!
//! ```text
//! int string app_name 0x7f020000
//! int[] styleable FancyView { 0x7f010000, 0x7f010001 }
//! int styleable FancyView_fancyColor 0
//! ```

use crate::CoreError;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaType {
    Int,
    IntArray,
}

impl JavaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::IntArray => "int[]",
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a main-table entry was declared by this target or came in through
/// a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    Local,
    Inherited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub java_type: JavaType,
    pub resource_type: String,
    pub name: String,
    pub value: String,
}

impl TableEntry {
    pub fn key(&self) -> (&str, &str) {
        (&self.resource_type, &self.name)
    }

    pub fn is_styleable(&self) -> bool {
        self.resource_type == "styleable"
    }

    /// Parsed element values of an `int[]` entry.
    pub fn array_values(&self) -> Vec<&str> {
        self.value
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}')
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    }
}

impl fmt::Display for TableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.java_type, self.resource_type, self.name, self.value
        )
    }
}

/// Canonical identifier table, in file order. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierTable {
    entries: Vec<TableEntry>,
}

fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let end = s.find(char::is_whitespace)?;
    Some((&s[..end], &s[end..]))
}

fn parse_line(line: &str) -> Option<TableEntry> {
    let (java_type, rest) = next_field(line)?;
    let (resource_type, rest) = next_field(rest)?;
    let (name, rest) = next_field(rest)?;
    let value = rest.trim();
    if value.is_empty() {
        return None;
    }
    let java_type = match java_type {
        "int" => JavaType::Int,
        "int[]" if value.starts_with('{') && value.ends_with('}') => JavaType::IntArray,
        _ => return None,
    };
    Some(TableEntry {
        java_type,
        resource_type: resource_type.to_owned(),
        name: name.to_owned(),
        value: value.to_owned(),
    })
}

impl IdentifierTable {
    pub fn new(entries: Vec<TableEntry>) -> Self {
        Self { entries }
    }

    /// Parse table text; `origin` only labels errors.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, CoreError> {
        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry = parse_line(line).ok_or_else(|| CoreError::MalformedTable {
                path: PathBuf::from(origin),
                line: idx + 1,
                content: line.to_owned(),
            })?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, resource_type: &str, name: &str) -> Option<&TableEntry> {
        self.entries
            .iter()
            .find(|e| e.resource_type == resource_type && e.name == name)
    }

    /// Classify each entry of `self` against the supplementary tables: an
    /// entry named by any of them is inherited.
    pub fn localities<'a>(
        &'a self,
        dependencies: impl IntoIterator<Item = &'a IdentifierTable>,
    ) -> Vec<(&'a TableEntry, Locality)> {
        let inherited: HashSet<(&str, &str)> = dependencies
            .into_iter()
            .flat_map(|t| t.entries.iter().map(TableEntry::key))
            .collect();
        self.entries
            .iter()
            .map(|e| {
                let locality = if inherited.contains(&e.key()) {
                    Locality::Inherited
                } else {
                    Locality::Local
                };
                (e, locality)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
int attr fancyColor 0x7f010000
int string app_name 0x7f020000

int[] styleable FancyView { 0x7f010000, 0x01010095 }
int styleable FancyView_fancyColor 0
";

    fn table(text: &str) -> IdentifierTable {
        IdentifierTable::parse(text, Path::new("R.txt")).unwrap()
    }

    #[test]
    fn parses_all_kinds() {
        let t = table(SAMPLE);
        assert_eq!(t.len(), 4);
        let arr = t.get("styleable", "FancyView").unwrap();
        assert_eq!(arr.java_type, JavaType::IntArray);
        assert_eq!(arr.array_values(), vec!["0x7f010000", "0x01010095"]);
        assert_eq!(t.get("string", "app_name").unwrap().value, "0x7f020000");
    }

    #[test]
    fn display_round_trips_line() {
        let t = table(SAMPLE);
        assert_eq!(
            t.entries()[2].to_string(),
            "int[] styleable FancyView { 0x7f010000, 0x01010095 }"
        );
    }

    #[test]
    fn empty_table_is_valid() {
        assert!(table("").is_empty());
        assert!(table("\n\n").is_empty());
    }

    #[test]
    fn empty_array_value() {
        let t = table("int[] styleable Empty { }\n");
        assert!(t.entries()[0].array_values().is_empty());
    }

    #[test]
    fn malformed_lines_are_reported() {
        for bad in [
            "int string app_name",
            "long string x 0x1",
            "int[] styleable X 0x1",
            "garbage",
        ] {
            let err = IdentifierTable::parse(&format!("int id ok 0x7f010000\n{bad}\n"), Path::new("gen/R.txt"))
                .unwrap_err();
            match err {
                CoreError::MalformedTable { line, path, .. } => {
                    assert_eq!(line, 2);
                    assert_eq!(path, PathBuf::from("gen/R.txt"));
                }
                other => panic!("unexpected error for {bad:?}: {other}"),
            }
        }
    }

    #[test]
    fn locality_follows_dependency_membership() {
        let main = table("int string mine 0x7f010000\nint string theirs 0x7f010001\n");
        let dep = table("int string theirs 0x0\nint string unknown 0x0\n");
        let localities: Vec<_> = main
            .localities([&dep])
            .into_iter()
            .map(|(e, l)| (e.name.as_str(), l))
            .collect();
        assert_eq!(
            localities,
            vec![("mine", Locality::Local), ("theirs", Locality::Inherited)]
        );
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("R.txt");
        fs::write(&path, SAMPLE).unwrap();
        assert_eq!(IdentifierTable::load(&path).unwrap(), table(SAMPLE));
    }
}
