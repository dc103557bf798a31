//! Minimal CLI: catalogs → describe → descriptor graph, plus lookups over an
//! emitted graph.
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::index::DescriptorIndex;
use crate::model::TypeRef;
use crate::options::DescribeOptions;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// describe validation-constraint metadata of a type graph as a serializable descriptor graph
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// describe the root types and everything they reach
    Describe(DescribeOut),
    /// print one type (or one of its properties) from an emitted descriptor graph
    Lookup(LookupArgs),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (one catalog document per line)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select the catalog inside each document (e.g. /validation/catalog)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is one catalog document
    #[arg(long)]
    jq_expr: Option<String>,

    /// do not preload the standard javax.validation constraint declarations
    #[arg(long, default_value_t = false)]
    no_builtins: bool,

    /// One or more catalog inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// root type: a qualified name, or a JSON shape such as '{"array": "com.acme.Item"}'
    #[arg(long = "root", short, num_args = 1.., required = true)]
    roots: Vec<String>,

    /// JSON file with describe options (opaqueNamespaces, namespaceRenames, defaultGroup)
    #[arg(long)]
    options: Option<PathBuf>,

    /// extra opaque namespace prefix, e.g. `org.thirdparty.`
    #[arg(long = "opaque")]
    opaque: Vec<String>,

    /// single-line output
    #[arg(long)]
    compact: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct LookupArgs {
    /// descriptor graph previously written by `describe`
    #[arg(long)]
    descriptors: PathBuf,

    /// flattened type name, e.g. `Person` or `Array,Item`
    #[arg(long = "type")]
    type_key: String,

    /// narrow to one property of the type
    #[arg(long)]
    property: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_catalog(&self) -> Result<Catalog> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let documents = source_paths
            .par_iter()
            .map(|path| self.load_documents(path))
            .collect::<Result<Vec<_>>>()?;

        let mut catalog = if self.no_builtins { Catalog::new() } else { Catalog::with_builtin_constraints() };
        for (path, docs) in source_paths.iter().zip(documents) {
            for doc in docs {
                catalog
                    .merge_value(doc)
                    .with_context(|| format!("invalid catalog document in {}", path.display()))?;
            }
        }
        Ok(catalog)
    }

    fn load_documents(&self, source_path: &Path) -> Result<Vec<Value>> {
        let source_path_str = source_path.to_string_lossy();
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read source file {source_path_str}"))?;
        let values = if self.ndjson {
            source
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str::<Value>)
                .collect::<Result<Vec<_>, _>>()
        } else {
            serde_json::from_str::<Value>(&source).map(|v| vec![v])
        };
        let values = values.with_context(|| format!("failed to parse JSON source file {source_path_str}"))?;

        let mut out = Vec::with_capacity(values.len());
        for value in values {
            let value = match self.json_pointer.as_deref() {
                None => value,
                Some(pointer) => value
                    .pointer(pointer)
                    .cloned()
                    .with_context(|| format!("JSON pointer {pointer} selects nothing in {source_path_str}"))?,
            };
            match self.jq_expr.as_deref() {
                None => out.push(value),
                Some(jq_expr) => {
                    let result = crate::jq_exec::run_jaq(jq_expr, &value).with_context(|| {
                        format!("failed to apply jq expression to source file {source_path_str}")
                    })?;
                    out.extend(result);
                }
            }
        }
        Ok(out)
    }
}

impl DescribeOut {
    fn options(&self) -> Result<DescribeOptions> {
        let mut options = match &self.options {
            None => DescribeOptions::default(),
            Some(path) => {
                let src = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read options file {}", path.display()))?;
                crate::path_de::from_str_with_path::<DescribeOptions>(&src)
                    .with_context(|| format!("invalid options file {}", path.display()))?
            }
        };
        options.opaque_namespaces.extend(self.opaque.iter().cloned());
        Ok(options)
    }

    fn roots(&self) -> Result<Vec<TypeRef>> {
        self.roots.iter().map(|raw| parse_root(raw)).collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Describe(target) => {
                let options = target.options()?;
                let mut catalog = target.input_settings.load_catalog()?;
                catalog.set_library_namespaces(options.opaque_namespaces.iter().cloned());
                let roots = target.roots()?;
                tracing::info!(roots = roots.len(), "describing");

                let descriptors = crate::describe::describe(&catalog, &roots, &options)?;
                let src = crate::describe::to_json(&descriptors, !target.compact)?;
                write_output(target.out.as_deref(), &src)
            }
            Command::Lookup(target) => {
                let src = std::fs::read_to_string(&target.descriptors)
                    .with_context(|| format!("failed to read {}", target.descriptors.display()))?;
                let index = DescriptorIndex::from_json_str(&src)?;
                let found = match target.property.as_deref() {
                    None => index.type_descriptor(&target.type_key).map(serde_json::to_value),
                    Some(property) => index
                        .property_descriptor(&target.type_key, property)
                        .map(serde_json::to_value),
                };
                let Some(found) = found else {
                    bail!("no descriptor for `{}` in {}", target.type_key, target.descriptors.display());
                };
                println!("{}", serde_json::to_string_pretty(&found?)?);
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn parse_root(raw: &str) -> Result<TypeRef> {
    if raw.trim_start().starts_with('{') {
        serde_json::from_str(raw).with_context(|| format!("invalid root shape `{raw}`"))
    } else {
        Ok(TypeRef::class(raw))
    }
}

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{src}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
