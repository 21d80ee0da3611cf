//! CLI front door helpers.
//!
//! Provides the operations behind the `tugdts` subcommands:
//! - [`collect_inputs`] / [`load_tree`] - read declaration files into a bundle
//! - [`build_processors`] / [`process_tree`] - run the configured processors
//! - [`graph_json`] - serializable inheritance graph
//!
//! ## Error Handling
//!
//! All functions return `Result<T, DtsError>`. Logging during processing
//! goes through the caller's [`Logger`].

use std::fs;
use std::path::{Path, PathBuf};

use tugdts_ast::nodes::DeclarationTree;
use tugdts_ast::parser::parse_bundle;
use tugdts_ast::visitor::{filter_by_tags, synthesize_implements_imports};
use tugdts_core::error::DtsError;
use tugdts_core::log::Logger;
use tugdts_core::output::FileSummary;
use tugdts_graph::{
    build_graph, run_pipeline, GraphJson, GraphKinds, InheritDocProcessor, PipelineOptions,
    PipelineOutcome, Processor, TransformProcessor,
};
use walkdir::WalkDir;

use crate::config::DtsConfig;
use crate::error_bridges::walkdir_error;

/// Suffix of the files picked up when walking a directory.
pub const DECLARATION_SUFFIX: &str = ".d.ts";

// ============================================================================
// Inputs
// ============================================================================

/// Expand `inputs` into a file list.
///
/// Files are kept as given, in order. Directories are walked for
/// `*.d.ts` files, sorted by path.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, DtsError> {
    if inputs.is_empty() {
        return Err(DtsError::invalid_args("no input files given"));
    }
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.map_err(walkdir_error)?;
                let is_declaration = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(DECLARATION_SUFFIX));
                if entry.file_type().is_file() && is_declaration {
                    found.push(entry.into_path());
                }
            }
            if found.is_empty() {
                tracing::warn!("no {} files under {}", DECLARATION_SUFFIX, input.display());
            }
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            return Err(DtsError::FileNotFound {
                path: input.display().to_string(),
            });
        }
    }
    Ok(files)
}

/// Read and parse `files` into one bundle, in order.
pub fn load_tree(files: &[PathBuf]) -> Result<DeclarationTree, DtsError> {
    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let text = fs::read_to_string(path).map_err(|e| DtsError::io(path.display(), e))?;
        sources.push((display_name(path), text));
    }
    Ok(parse_bundle(sources)?)
}

fn display_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ============================================================================
// Processing
// ============================================================================

/// Which processors to run, after merging config and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    pub filter_tags: Vec<String>,
    pub implements_imports: bool,
    pub inherit_doc: bool,
    pub kinds: GraphKinds,
}

impl ProcessOptions {
    /// Options from configuration alone.
    pub fn from_config(config: &DtsConfig) -> Result<Self, DtsError> {
        Ok(ProcessOptions {
            filter_tags: config.filter_tags.clone(),
            implements_imports: config.implements_imports,
            inherit_doc: config.inherit_doc,
            kinds: config.graph_kinds()?,
        })
    }

    /// Apply command-line flags. Flags only ever enable processors; tags
    /// are added to the configured ones.
    pub fn with_flags(
        mut self,
        filter_tags: &[String],
        implements_imports: bool,
        inherit_doc: bool,
    ) -> Self {
        for tag in filter_tags {
            if !self.filter_tags.contains(tag) {
                self.filter_tags.push(tag.clone());
            }
        }
        self.implements_imports |= implements_imports;
        self.inherit_doc |= inherit_doc;
        self
    }
}

/// Processors in run order: tag filter, import synthesizer, inheritDoc.
pub fn build_processors(options: &ProcessOptions) -> Result<Vec<Box<dyn Processor>>, DtsError> {
    let mut processors: Vec<Box<dyn Processor>> = Vec::new();
    if !options.filter_tags.is_empty() {
        let filter = filter_by_tags(&options.filter_tags)?;
        processors.push(Box::new(TransformProcessor::new(filter)));
    }
    if options.implements_imports {
        processors.push(Box::new(TransformProcessor::new(
            synthesize_implements_imports(),
        )));
    }
    if options.inherit_doc {
        processors.push(Box::new(InheritDocProcessor::new()));
    }
    Ok(processors)
}

/// Run the configured processors over `tree`.
///
/// The inheritance graph is only built when a processor needs it.
pub fn process_tree(
    tree: DeclarationTree,
    options: &ProcessOptions,
    logger: &dyn Logger,
) -> Result<PipelineOutcome, DtsError> {
    let mut processors = build_processors(options)?;
    let pipeline = PipelineOptions {
        build_graph: processors.iter().any(|p| p.requires_graph()),
        kinds: options.kinds.clone(),
    };
    Ok(run_pipeline(tree, &mut processors, &pipeline, logger)?)
}

/// JSON form of the inheritance graph of `tree`.
pub fn graph_json(tree: &DeclarationTree, kinds: &GraphKinds) -> GraphJson {
    build_graph(tree, kinds).to_json()
}

/// Per-file statement counts, in bundle order.
pub fn file_summaries(tree: &DeclarationTree) -> Vec<FileSummary> {
    tree.files
        .iter()
        .map(|file| FileSummary {
            name: file.name.clone(),
            statements: file.statements.len(),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tugdts_ast::render_tree;
    use tugdts_core::log::MemoryLogger;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    fn options() -> ProcessOptions {
        ProcessOptions::from_config(&DtsConfig::default()).unwrap()
    }

    #[test]
    fn test_collect_inputs_walks_directories() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.d.ts", "");
        write(dir.path(), "nested/a.d.ts", "");
        write(dir.path(), "notes.ts", "");
        let files = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["b.d.ts", "nested/a.d.ts"]);
    }

    #[test]
    fn test_collect_inputs_errors() {
        assert!(matches!(
            collect_inputs(&[]).unwrap_err(),
            DtsError::InvalidArguments { .. }
        ));
        let dir = TempDir::new().unwrap();
        let err = collect_inputs(&[dir.path().join("missing.d.ts")]).unwrap_err();
        assert!(matches!(err, DtsError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_tree_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "bad.d.ts", "declare const a: number;\n/* never closed\n");
        let err = load_tree(&[path]).unwrap_err();
        match err {
            DtsError::Parse { snippet, .. } => assert!(snippet.is_some()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_flags_extend_config() {
        let config = DtsConfig {
            filter_tags: vec!["internal".to_string()],
            ..DtsConfig::default()
        };
        let options = ProcessOptions::from_config(&config)
            .unwrap()
            .with_flags(&["internal".to_string(), "beta".to_string()], false, true);
        assert_eq!(options.filter_tags, vec!["internal", "beta"]);
        assert!(options.inherit_doc);
        assert!(!options.implements_imports);
        let names: Vec<String> = build_processors(&options)
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["filter-by-tags", "inherit-doc"]);
    }

    #[test]
    fn test_blank_filter_tag_is_invalid() {
        let options = options().with_flags(&["@".to_string()], false, false);
        let err = build_processors(&options).err().unwrap();
        assert!(matches!(err, DtsError::InvalidArguments { .. }));
    }

    #[test]
    fn test_process_tree_runs_all_processors() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "index.d.ts",
            "/** @internal */\nexport declare const secret: string;\n\
             declare class Base {\n    run(n: number): void;\n}\n\
             /** @inheritDoc */\n\
             declare class Impl extends Base {\n    run(n: any): void;\n}\n",
        );
        let tree = load_tree(&[path]).unwrap();
        let options = options().with_flags(&["internal".to_string()], true, true);
        let logger = MemoryLogger::new();
        let outcome = process_tree(tree, &options, &logger).unwrap();
        assert!(outcome.is_complete());
        assert!(outcome.graph.is_some());
        let text = render_tree(&outcome.tree);
        assert!(!text.contains("secret"));
        assert!(text.contains("declare class Impl extends Base {\n    run(n: number): void;\n}\n"));
        assert_eq!(file_summaries(&outcome.tree)[0].statements, 2);
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn test_graph_only_built_when_needed() {
        let tree = DeclarationTree::default();
        let logger = MemoryLogger::new();
        let outcome = process_tree(tree, &options(), &logger).unwrap();
        assert!(outcome.graph.is_none());
    }
}
