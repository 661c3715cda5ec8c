use crate::symbols::{IdentifierTable, JavaType, Locality, TableEntry};
use crate::CoreError;
use respack_schema::PackageName;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How `R.java` fields are exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RJavaOptions {
    /// Emit inherited entries in the target's `R`, and make every field
    /// non-final.
    pub export_all_resources: bool,
    /// The same, restricted to `styleable` entries.
    pub export_all_styleables: bool,
    /// Emit `onResourcesLoaded(int)` so ids can be rebased at runtime.
    pub on_resources_loaded: bool,
}

impl RJavaOptions {
    /// Options used by `prepare`: everything exported, hook only for shared
    /// resource targets.
    pub fn for_prepare(shared_resources: bool) -> Self {
        Self {
            export_all_resources: true,
            export_all_styleables: true,
            on_resources_loaded: shared_resources,
        }
    }

    fn exported(self, entry: &TableEntry) -> bool {
        self.export_all_resources || (self.export_all_styleables && entry.is_styleable())
    }

    fn is_final(self, entry: &TableEntry) -> bool {
        !self.exported(entry)
    }

    fn is_visible(self, entry: &TableEntry, locality: Locality) -> bool {
        locality == Locality::Local || self.exported(entry)
    }
}

/// A supplementary table naming the entries one dependency package owns.
#[derive(Debug, Clone)]
pub struct DependencyTable {
    pub package: PackageName,
    pub table: IdentifierTable,
}

impl DependencyTable {
    pub fn load(package: PackageName, path: &Path) -> Result<Self, CoreError> {
        Ok(Self {
            package,
            table: IdentifierTable::load(path)?,
        })
    }
}

/// Write one `<package path>/R.java` per package under `out_dir`.
///
/// Dependency packages get the main-table entries their own table names;
/// names the main table lacks are skipped. The target package, if any, gets
/// the main-table entries visible under `options`, replacing a dependency of
/// the same name. Returns the written files, sorted by package.
pub fn create_r_java_files(
    out_dir: &Path,
    package: Option<&PackageName>,
    main: &IdentifierTable,
    dependencies: &[DependencyTable],
    options: RJavaOptions,
) -> Result<Vec<PathBuf>, CoreError> {
    let index: HashMap<(&str, &str), &TableEntry> =
        main.entries().iter().map(|e| (e.key(), e)).collect();

    let mut by_package: BTreeMap<&PackageName, Vec<&TableEntry>> = BTreeMap::new();
    for dep in dependencies {
        if by_package.contains_key(&dep.package) {
            return Err(CoreError::DuplicatePackage(dep.package.to_string()));
        }
        let mut entries = Vec::with_capacity(dep.table.len());
        for entry in dep.table.entries() {
            match index.get(&entry.key()) {
                Some(found) => entries.push(*found),
                None => warn!(
                    "{}: {} {} is not in the main identifier table, skipping",
                    dep.package, entry.resource_type, entry.name
                ),
            }
        }
        by_package.insert(&dep.package, entries);
    }

    match package {
        Some(package) => {
            let visible = main
                .localities(dependencies.iter().map(|d| &d.table))
                .into_iter()
                .filter(|(e, locality)| options.is_visible(e, *locality))
                .map(|(e, _)| e)
                .collect();
            by_package.insert(package, visible);
        }
        None => debug!("no package for this target; emitting dependency R.java files only"),
    }

    let mut written = Vec::with_capacity(by_package.len());
    for (package, entries) in by_package {
        let dir = out_dir.join(package.to_source_dir());
        fs::create_dir_all(&dir)?;
        let path = dir.join("R.java");
        fs::write(&path, render_r_java(package, &entries, options))?;
        written.push(path);
    }
    Ok(written)
}

fn title(resource_type: &str) -> String {
    let mut chars = resource_type.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Default)]
struct TypeFields<'a> {
    finals: Vec<&'a TableEntry>,
    non_finals: Vec<&'a TableEntry>,
}

/// Render `R.java`: one nested class per resource type in sorted order, final
/// fields before non-final ones, each in table order.
pub fn render_r_java(package: &PackageName, entries: &[&TableEntry], options: RJavaOptions) -> String {
    let mut types: BTreeMap<&str, TypeFields<'_>> = BTreeMap::new();
    for &entry in entries {
        let fields = types.entry(entry.resource_type.as_str()).or_default();
        if options.is_final(entry) {
            fields.finals.push(entry);
        } else {
            fields.non_finals.push(entry);
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "/* AUTO-GENERATED FILE.  DO NOT MODIFY. */");
    let _ = writeln!(out);
    let _ = writeln!(out, "package {package};");
    let _ = writeln!(out);
    let _ = writeln!(out, "public final class R {{");
    if options.on_resources_loaded {
        let _ = writeln!(out, "    private static boolean sResourcesDidLoad;");
    }

    for (ty, fields) in &types {
        let _ = writeln!(out, "    public static final class {ty} {{");
        for e in &fields.finals {
            let _ = writeln!(
                out,
                "        public static final {} {} = {};",
                e.java_type, e.name, e.value
            );
        }
        for e in &fields.non_finals {
            let _ = writeln!(out, "        public static {} {} = {};", e.java_type, e.name, e.value);
        }
        let _ = writeln!(out, "    }}");
    }

    if options.on_resources_loaded {
        render_on_resources_loaded(&mut out, &types);
    }
    let _ = writeln!(out, "}}");
    out
}

fn render_on_resources_loaded(out: &mut String, types: &BTreeMap<&str, TypeFields<'_>>) {
    let _ = writeln!(out, "    public static void onResourcesLoaded(int packageId) {{");
    let _ = writeln!(out, "        if (sResourcesDidLoad) {{");
    let _ = writeln!(out, "            return;");
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "        sResourcesDidLoad = true;");
    let _ = writeln!(out, "        int packageIdTransform = (packageId ^ 0x7f) << 24;");
    for ty in types.keys() {
        let _ = writeln!(out, "        onResourcesLoaded{}(packageIdTransform);", title(ty));
    }
    let _ = writeln!(out, "    }}");

    for (ty, fields) in types {
        let _ = writeln!(
            out,
            "    private static void onResourcesLoaded{}(int packageIdTransform) {{",
            title(ty)
        );
        // Styleable ints are attribute indices, not ids.
        for e in fields
            .non_finals
            .iter()
            .filter(|e| e.java_type == JavaType::Int && !e.is_styleable())
        {
            let _ = writeln!(out, "        {ty}.{} ^= packageIdTransform;", e.name);
        }
        for e in fields
            .non_finals
            .iter()
            .filter(|e| e.java_type == JavaType::IntArray && !e.array_values().is_empty())
        {
            let _ = writeln!(
                out,
                "        for (int i = 0; i < {ty}.{name}.length; ++i) {{\n            {ty}.{name}[i] ^= packageIdTransform;\n        }}",
                name = e.name
            );
        }
        let _ = writeln!(out, "    }}");
    }
}
