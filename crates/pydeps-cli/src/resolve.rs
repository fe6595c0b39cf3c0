//! Resolve command - print the dependency closure of a package.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use pydeps_pm::metadata::MetadataFailurePolicy;
use pydeps_pm::{merge_specs, Config, InMemoryIndex, MergedSpec, ResolverOptions, Revisit, Session};
use pydeps_semver::{Spec, Version};

use crate::config;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Package name, or a requirement such as "requests>=2.0,<3.0"
    #[arg(value_name = "REQUIREMENT")]
    pub requirement: String,

    /// Exact version to resolve when REQUIREMENT is a bare name
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Resolve against a JSON table of "name-version": [requirements]
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Print one merged entry per package instead of the raw walk
    #[arg(long)]
    pub merge: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Expand each package at most once
    #[arg(long)]
    pub once: bool,

    /// Pick the lowest matching version instead of the highest
    #[arg(long)]
    pub prefer_lowest: bool,

    /// Base URL of the package index
    #[arg(long, value_name = "URL")]
    pub index_url: Option<String>,

    /// Directory for downloaded archives
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Python interpreter used to generate package metadata
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,

    /// Fail when package metadata cannot be generated
    #[arg(long)]
    pub strict_metadata: bool,

    /// Disable progress output
    #[arg(long)]
    pub no_progress: bool,

    /// Configuration file (defaults to ./pydeps.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct SpecOutput {
    name: String,
    extras: Vec<String>,
    predicates: Vec<String>,
    source: Option<String>,
}

impl From<&Spec> for SpecOutput {
    fn from(spec: &Spec) -> Self {
        Self {
            name: spec.name().to_string(),
            extras: spec.extras().to_vec(),
            predicates: spec.preds().iter().map(|p| p.to_string()).collect(),
            source: spec.source().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
struct MergedOutput {
    name: String,
    extras: Vec<String>,
    predicates: Vec<String>,
    sources: Vec<String>,
    satisfiable: bool,
}

impl From<&MergedSpec> for MergedOutput {
    fn from(merged: &MergedSpec) -> Self {
        let spec = SpecOutput::from(&merged.spec);
        Self {
            name: spec.name,
            extras: spec.extras,
            predicates: spec.predicates,
            sources: merged.sources.clone(),
            satisfiable: merged.is_satisfiable(),
        }
    }
}

pub async fn execute(args: ResolveArgs) -> Result<i32> {
    let root = root_spec(&args.requirement, args.version.as_deref())?;

    let mut config = config::load(args.config.as_deref())?;
    apply_flags(&mut config, &args);

    let session = match &args.fixture {
        Some(path) => {
            let index = InMemoryIndex::from_file(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            Session::in_memory(config, index)
        }
        None => Session::remote(config).context("Failed to set up the package index")?,
    };

    let revisit = if args.once { Revisit::Once } else { Revisit::PerPath };
    let resolver = session.resolver(ResolverOptions::default().revisit(revisit));

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        pb.set_message(format!("Resolving {}", root));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let result = resolver.resolve_all(&root).await;
    progress.finish_and_clear();
    let specs = result.with_context(|| format!("Failed to resolve {}", root))?;

    match (args.format, args.merge) {
        (OutputFormat::Json, false) => {
            let output: Vec<SpecOutput> = specs.iter().map(SpecOutput::from).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        (OutputFormat::Json, true) => {
            let output: Vec<MergedOutput> = merge_specs(&specs).iter().map(MergedOutput::from).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        (OutputFormat::Text, _) if specs.is_empty() => {
            println!("{} {} has no dependencies", style("Info:").cyan(), root);
        }
        (OutputFormat::Text, false) => {
            for spec in &specs {
                println!("{}", text_line(&spec.to_string(), spec.source().unwrap_or("-")));
            }
        }
        (OutputFormat::Text, true) => {
            for merged in merge_specs(&specs) {
                let line = text_line(&merged.spec.to_string(), &merged.sources.join(", "));
                if merged.is_satisfiable() {
                    println!("{}", line);
                } else {
                    println!("{}  {}", line, style("conflicting predicates").yellow());
                }
            }
        }
    }

    Ok(0)
}

fn text_line(spec: &str, from: &str) -> String {
    format!("{}  {}", style(spec).bold(), style(format!("(from {})", from)).dim())
}

/// Build the root spec: a bare name pinned to VERSION, or a full requirement
fn root_spec(requirement: &str, version: Option<&str>) -> Result<Spec> {
    let spec: Spec = requirement
        .parse()
        .with_context(|| format!("Invalid requirement \"{}\"", requirement))?;

    match version {
        Some(version) => {
            if !spec.preds().is_empty() {
                bail!("Give either VERSION or version predicates in \"{}\", not both", requirement);
            }
            let version = Version::parse(version)
                .with_context(|| format!("Invalid version \"{}\"", version))?;
            Ok(Spec::pinned(spec.name(), &version))
        }
        None if spec.preds().is_empty() => {
            bail!("VERSION is required when \"{}\" has no version predicates", requirement)
        }
        None => Ok(spec),
    }
}

fn apply_flags(config: &mut Config, args: &ResolveArgs) {
    if let Some(url) = &args.index_url {
        config.index_url = url.clone();
    }
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = dir.clone();
    }
    if let Some(python) = &args.python {
        config.python = python.clone();
    }
    if args.prefer_lowest {
        config.prefer_lowest = true;
    }
    if args.strict_metadata {
        config.on_metadata_failure = MetadataFailurePolicy::Fail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(requirement: &str, version: Option<&str>) -> ResolveArgs {
        ResolveArgs {
            requirement: requirement.to_string(),
            version: version.map(str::to_string),
            fixture: None,
            merge: false,
            format: OutputFormat::Text,
            once: false,
            prefer_lowest: false,
            index_url: None,
            cache_dir: None,
            python: None,
            strict_metadata: false,
            no_progress: true,
            config: None,
        }
    }

    #[test]
    fn test_root_spec_pinned() {
        let spec = root_spec("Flask", Some("0.9")).unwrap();
        assert_eq!(spec.to_string(), "Flask==0.9");
        assert_eq!(spec.pinned_version(), Some(&Version::parse("0.9").unwrap()));
    }

    #[test]
    fn test_root_spec_requirement() {
        let spec = root_spec("requests>=2.0,<3.0", None).unwrap();
        assert_eq!(spec.preds().len(), 2);
    }

    #[test]
    fn test_root_spec_rejects_ambiguous_input() {
        assert!(root_spec("flask", None).is_err());
        assert!(root_spec("flask>=0.9", Some("1.0")).is_err());
        assert!(root_spec("flask", Some("latest")).is_err());
        assert!(root_spec("flask ~= 0.9", None).is_err());
    }

    #[test]
    fn test_apply_flags() {
        let mut config = Config::default();
        let mut resolve = args("flask", Some("0.9"));
        resolve.index_url = Some("https://mirror.example.org/simple/".to_string());
        resolve.python = Some("python3.12".to_string());
        resolve.prefer_lowest = true;
        resolve.strict_metadata = true;

        apply_flags(&mut config, &resolve);
        assert_eq!(config.index_url, "https://mirror.example.org/simple/");
        assert_eq!(config.python, "python3.12");
        assert!(config.prefer_lowest);
        assert_eq!(config.on_metadata_failure, MetadataFailurePolicy::Fail);
    }

    #[tokio::test]
    async fn test_execute_with_fixture() {
        let temp = TempDir::new().unwrap();
        let fixture = temp.path().join("index.json");
        std::fs::write(
            &fixture,
            r#"{"foo-0.1": ["bar", "qux"], "bar-0.2": ["qux>0.1"], "qux-0.1": [], "qux-0.2": []}"#,
        )
        .unwrap();
        let config_file = temp.path().join("pydeps.toml");
        std::fs::write(&config_file, "").unwrap();

        let mut resolve = args("foo", Some("0.1"));
        resolve.fixture = Some(fixture);
        resolve.config = Some(config_file);
        resolve.merge = true;
        resolve.format = OutputFormat::Json;

        assert_eq!(execute(resolve).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_execute_missing_package_fails() {
        let temp = TempDir::new().unwrap();
        let fixture = temp.path().join("index.json");
        std::fs::write(&fixture, r#"{"foo-0.1": ["absent"]}"#).unwrap();
        let config_file = temp.path().join("pydeps.toml");
        std::fs::write(&config_file, "").unwrap();

        let mut resolve = args("foo", Some("0.1"));
        resolve.fixture = Some(fixture);
        resolve.config = Some(config_file);

        assert!(execute(resolve).await.is_err());
    }
}
