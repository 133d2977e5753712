//! Minimal CLI: load serialized type graphs → (schema | check)
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::config::Config;
use crate::convert;
use crate::frontend;
use crate::graph::TypeGraph;
use crate::prefilter;
use crate::schema::DraftVersion;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert serialized type graphs into JSON Schema documents
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert each input graph and emit the schema document
    Schema(SchemaOut),
    /// dry-run conversion, reporting a per-file verdict
    Check(CheckRun),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// jq filter applied to each input document before graph decoding
    /// (e.g. '.payload.graph' to unwrap a tool envelope)
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct ConvertSettings {
    /// target draft: 4, 6, 7, 2019-09 or 2020-12
    #[arg(long, default_value = "2020-12", value_parser = parse_draft)]
    draft: DraftVersion,

    /// tag namespaces tried for property names, in order
    #[arg(long = "name-tag", num_args = 1..)]
    name_tag: Vec<String>,
}

impl ConvertSettings {
    fn to_config(&self) -> Config {
        let mut config = Config::default().with_draft(self.draft);
        if !self.name_tag.is_empty() {
            config.field_name_tag = self.name_tag.clone();
        }
        config
    }
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    convert_settings: ConvertSettings,

    /// output .json file (stdout if omitted; single input only)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckRun {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    convert_settings: ConvertSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Load every input into a labeled graph. A jq filter that yields N
    /// values turns one file into N graphs.
    fn load_graphs(&self) -> Result<Vec<(String, TypeGraph)>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut graphs = Vec::new();
        for source_path in source_paths {
            let label = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file `{label}`"))?;
            let document = serde_json::from_str::<serde_json::Value>(&source)
                .with_context(|| format!("failed to parse JSON source file `{label}`"))?;

            match self.jq_expr.as_ref() {
                None => {
                    let graph = frontend::graph_from_value(document)
                        .with_context(|| format!("invalid type graph in `{label}`"))?;
                    graphs.push((label, graph));
                }
                Some(jq_expr) => {
                    let values = prefilter::apply(jq_expr, &document).with_context(|| {
                        format!("failed to apply jq expression to `{label}`")
                    })?;
                    let multiple = values.len() > 1;
                    for (i, value) in values.into_iter().enumerate() {
                        let sub_label = if multiple {
                            format!("{label}#{i}")
                        } else {
                            label.clone()
                        };
                        let graph = frontend::graph_from_value(value)
                            .with_context(|| format!("invalid type graph in `{sub_label}`"))?;
                        graphs.push((sub_label, graph));
                    }
                }
            }
        }
        Ok(graphs)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let config = target.convert_settings.to_config();
                let graphs = target.input_settings.load_graphs()?;

                if target.out.is_some() && graphs.len() > 1 {
                    bail!("--out takes exactly one input graph, got {}", graphs.len());
                }

                for (label, graph) in &graphs {
                    let document = convert::build_document(&config, graph)
                        .with_context(|| format!("conversion failed for `{label}`"))?;
                    let rendered = if target.compact {
                        serde_json::to_string(&document)?
                    } else {
                        serde_json::to_string_pretty(&document)?
                    };
                    if let Some(out) = target.out.as_ref() {
                        if let Some(parent) = out.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::write(out, &rendered)?;
                    } else {
                        println!("{rendered}");
                    }
                }
                Ok(())
            }
            Command::Check(target) => {
                let config = target.convert_settings.to_config();
                let graphs = target.input_settings.load_graphs()?;
                let mut failures = 0usize;
                for (label, graph) in &graphs {
                    match convert::build_document(&config, graph) {
                        Ok(_) => println!("{} {label}", "ok".green()),
                        Err(error) => {
                            failures += 1;
                            println!("{} {label}: {error}", "fail".red());
                        }
                    }
                }
                if failures > 0 {
                    bail!("{failures} of {} graph(s) failed to convert", graphs.len());
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn parse_draft(raw: &str) -> std::result::Result<DraftVersion, String> {
    match raw {
        "4" | "04" | "draft-04" => Ok(DraftVersion::Draft04),
        "6" | "06" | "draft-06" => Ok(DraftVersion::Draft06),
        "7" | "07" | "draft-07" => Ok(DraftVersion::Draft07),
        "2019-09" => Ok(DraftVersion::Draft201909),
        "2020-12" => Ok(DraftVersion::Draft202012),
        other => {
            // Full meta-schema URIs are accepted too.
            for draft in [
                DraftVersion::Draft04,
                DraftVersion::Draft06,
                DraftVersion::Draft07,
                DraftVersion::Draft201909,
                DraftVersion::Draft202012,
            ] {
                if draft.uri() == other {
                    return Ok(draft);
                }
            }
            Err(format!("unknown draft `{other}`"))
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
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
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(anyhow!("glob pattern matched no files: {pattern}"));
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_flag_accepts_short_forms_and_uris() {
        assert_eq!(parse_draft("7").unwrap(), DraftVersion::Draft07);
        assert_eq!(parse_draft("2019-09").unwrap(), DraftVersion::Draft201909);
        assert_eq!(
            parse_draft("http://json-schema.org/draft-04/schema#").unwrap(),
            DraftVersion::Draft04
        );
        assert!(parse_draft("5").is_err());
    }

    #[test]
    fn name_tag_override_lands_in_config() {
        let settings = ConvertSettings {
            draft: DraftVersion::Draft202012,
            name_tag: vec!["yaml".into(), "json".into()],
        };
        assert_eq!(settings.to_config().field_name_tag, vec!["yaml", "json"]);

        let default_settings = ConvertSettings {
            draft: DraftVersion::Draft202012,
            name_tag: vec![],
        };
        assert_eq!(default_settings.to_config().field_name_tag, vec!["json"]);
    }
}
