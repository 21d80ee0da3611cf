//! Sequential processor pipeline over one declaration tree.
//!
//! A run validates its configuration, then runs each [`Processor`] in order
//! against the same tree. Every processor that requires the inheritance
//! graph gets one freshly built from the tree as it stands when it runs,
//! so processors that edit the tree can precede graph consumers freely.
//! The first processor error aborts the rest of the run; mutations made by
//! earlier processors are kept in the returned tree.

use std::fmt;

use thiserror::Error;
use tugdts_ast::nodes::DeclarationTree;
use tugdts_ast::visitor::TreeTransformer;
use tugdts_core::error::DtsError;
use tugdts_core::log::Logger;
use tugdts_core::output::AbortInfo;

use crate::builder::{build_graph, GraphKinds, InheritanceGraph};

// ============================================================================
// Errors
// ============================================================================

/// Failure raised by a processor while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    #[error("inheritance graph is not available")]
    MissingGraph,
    #[error("{message}")]
    Failed { message: String },
}

impl ProcessorError {
    pub fn failed(message: impl Into<String>) -> Self {
        ProcessorError::Failed {
            message: message.into(),
        }
    }
}

/// Invalid pipeline configuration, reported before any processor runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("processor `{processor}` (#{index}) requires the inheritance graph, but graph building is disabled")]
    GraphRequired { processor: String, index: usize },
}

impl From<PipelineError> for DtsError {
    fn from(err: PipelineError) -> Self {
        DtsError::invalid_args(err.to_string())
    }
}

// ============================================================================
// Processors
// ============================================================================

/// What a processor gets to work with.
pub struct ProcessorContext<'a> {
    pub tree: &'a mut DeclarationTree,
    /// Present when the run built the graph.
    pub graph: Option<&'a InheritanceGraph>,
    pub logger: &'a dyn Logger,
}

impl fmt::Debug for ProcessorContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorContext")
            .field("statements", &self.tree.statement_count())
            .field("graph", &self.graph.is_some())
            .finish()
    }
}

/// One pipeline step.
pub trait Processor {
    /// Identifier used in logs and abort reports.
    fn name(&self) -> &str;

    /// Whether [`ProcessorContext::graph`] must be present.
    fn requires_graph(&self) -> bool {
        false
    }

    fn process(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError>;
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn requires_graph(&self) -> bool {
        (**self).requires_graph()
    }

    fn process(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
        (**self).process(ctx)
    }
}

/// Runs a [`TreeTransformer`] as a pipeline step.
#[derive(Debug)]
pub struct TransformProcessor<T> {
    transformer: T,
}

impl<T: TreeTransformer> TransformProcessor<T> {
    pub fn new(transformer: T) -> Self {
        TransformProcessor { transformer }
    }

    pub fn into_inner(self) -> T {
        self.transformer
    }
}

impl<T: TreeTransformer> Processor for TransformProcessor<T> {
    fn name(&self) -> &str {
        self.transformer.name()
    }

    fn process(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
        let tree = std::mem::take(ctx.tree);
        *ctx.tree = self.transformer.transform(tree);
        Ok(())
    }
}

/// A processor built from a closure.
pub struct FnProcessor<F> {
    name: String,
    requires_graph: bool,
    f: F,
}

/// Wrap `f` as a processor named `name`.
pub fn processor_fn<F>(name: impl Into<String>, requires_graph: bool, f: F) -> FnProcessor<F>
where
    F: FnMut(&mut ProcessorContext<'_>) -> Result<(), ProcessorError>,
{
    FnProcessor {
        name: name.into(),
        requires_graph,
        f,
    }
}

impl<F> Processor for FnProcessor<F>
where
    F: FnMut(&mut ProcessorContext<'_>) -> Result<(), ProcessorError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn requires_graph(&self) -> bool {
        self.requires_graph
    }

    fn process(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
        (self.f)(ctx)
    }
}

impl<F> fmt::Debug for FnProcessor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProcessor")
            .field("name", &self.name)
            .field("requires_graph", &self.requires_graph)
            .finish()
    }
}

// ============================================================================
// Running
// ============================================================================

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Build the inheritance graph. Without a graph-consuming processor it
    /// is built before the first processor.
    pub build_graph: bool,
    /// Declaration kinds that become graph vertices.
    pub kinds: GraphKinds,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            build_graph: true,
            kinds: GraphKinds::default(),
        }
    }
}

/// The processor that stopped a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortedRun {
    pub processor: String,
    pub index: usize,
    pub error: ProcessorError,
}

impl From<&AbortedRun> for AbortInfo {
    fn from(run: &AbortedRun) -> Self {
        AbortInfo {
            processor: run.processor.clone(),
            index: run.index,
            message: run.error.to_string(),
        }
    }
}

impl From<AbortedRun> for DtsError {
    fn from(run: AbortedRun) -> Self {
        DtsError::ProcessingAborted {
            processor: run.processor,
            index: run.index,
            message: run.error.to_string(),
        }
    }
}

/// Result of a run that passed validation.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub tree: DeclarationTree,
    pub graph: Option<InheritanceGraph>,
    /// Set when a processor failed and the rest of the run was skipped.
    pub aborted: Option<AbortedRun>,
}

impl PipelineOutcome {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}

/// Run `processors` over `tree` in order.
///
/// # Returns
///
/// * `Ok(outcome)` - The run finished or was aborted by a processor; see
///   [`PipelineOutcome::aborted`].
/// * `Err(PipelineError)` - The configuration is invalid. No processor ran
///   and `tree` was dropped untouched.
pub fn run_pipeline(
    tree: DeclarationTree,
    processors: &mut [Box<dyn Processor>],
    options: &PipelineOptions,
    logger: &dyn Logger,
) -> Result<PipelineOutcome, PipelineError> {
    if !options.build_graph {
        if let Some((index, processor)) = processors
            .iter()
            .enumerate()
            .find(|(_, processor)| processor.requires_graph())
        {
            return Err(PipelineError::GraphRequired {
                processor: processor.name().to_string(),
                index,
            });
        }
    }

    let mut tree = tree;
    let consumes_graph = processors.iter().any(|processor| processor.requires_graph());
    let mut graph = (options.build_graph && !consumes_graph)
        .then(|| build_logged_graph(&tree, &options.kinds, logger));

    let mut aborted = None;
    for (index, processor) in processors.iter_mut().enumerate() {
        if processor.requires_graph() {
            graph = Some(build_logged_graph(&tree, &options.kinds, logger));
        }
        logger.verbose(&format!("running processor `{}` (#{})", processor.name(), index));
        let mut ctx = ProcessorContext {
            tree: &mut tree,
            graph: graph.as_ref(),
            logger,
        };
        if let Err(error) = processor.process(&mut ctx) {
            logger.error(&format!(
                "processor `{}` (#{}) failed: {}; skipping remaining processors",
                processor.name(),
                index,
                error
            ));
            aborted = Some(AbortedRun {
                processor: processor.name().to_string(),
                index,
                error,
            });
            break;
        }
    }

    Ok(PipelineOutcome {
        tree,
        graph,
        aborted,
    })
}

fn build_logged_graph(
    tree: &DeclarationTree,
    kinds: &GraphKinds,
    logger: &dyn Logger,
) -> InheritanceGraph {
    let graph = build_graph(tree, kinds);
    logger.verbose(&format!(
        "inheritance graph: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    ));
    graph
}
