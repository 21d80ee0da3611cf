//! Inheritance graph and processing pipeline for tugdts.
//!
//! - [`build_graph`] records `parent -> child` heritage edges between the
//!   top-level declarations of a tree.
//! - [`InheritanceGraph::depth_first`] and
//!   [`InheritanceGraph::breadth_first`] walk it from every root.
//! - [`propagate_inherited_signatures`] copies ancestor parameter types into
//!   `@inheritDoc` members.
//! - [`run_pipeline`] runs a list of [`Processor`]s over one tree.
//!
//! ```
//! use tugdts_ast::{parse_source, render_file, DeclarationTree};
//! use tugdts_core::log::MemoryLogger;
//! use tugdts_graph::{run_pipeline, InheritDocProcessor, PipelineOptions, Processor};
//!
//! let text = "declare class A {\n    f(x: number): void;\n}\n\
//!             /** @inheritDoc */\n\
//!             declare class B extends A {\n    f(x: any): void;\n}\n";
//! let tree = DeclarationTree::single(parse_source("a.d.ts", text).unwrap());
//! let mut processors: Vec<Box<dyn Processor>> = vec![Box::new(InheritDocProcessor::new())];
//! let logger = MemoryLogger::new();
//! let outcome = run_pipeline(tree, &mut processors, &PipelineOptions::default(), &logger).unwrap();
//! assert!(render_file(&outcome.tree.files[0]).ends_with("    f(x: number): void;\n}\n"));
//! ```

pub mod builder;
pub mod inherit_doc;
pub mod pipeline;
pub mod traversal;

pub use builder::{
    build_graph, EdgeKind, GraphKinds, InheritanceGraph, NodePath, NodeRegistry, Vertex,
    VertexType,
};
pub use inherit_doc::{
    propagate_inherited_signatures, InheritDocProcessor, PropagationReport, INHERIT_DOC_TAG,
    MAX_ANCESTOR_DEPTH,
};
pub use pipeline::{
    processor_fn, run_pipeline, AbortedRun, FnProcessor, PipelineError, PipelineOptions,
    PipelineOutcome, Processor, ProcessorContext, ProcessorError, TransformProcessor,
};
pub use traversal::{EdgeJson, GraphJson, TraversalOptions, VertexJson, Visit};
