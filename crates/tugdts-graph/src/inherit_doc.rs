//! `@inheritDoc` parameter type propagation.
//!
//! A method or constructor tagged `@inheritDoc` (or declared in a class
//! whose own comment carries the tag) takes its parameter types from the
//! nearest ancestor class declaring a compatible member:
//!
//! ```text
//! declare class Base { foo(a: number, b: string): void; }
//! /** @inheritDoc */
//! declare class Child extends Base { foo(a: any, b: any): void; }
//! ```
//!
//! rewrites `Child.foo` to `foo(a: number, b: string): void`.
//!
//! # Matching
//!
//! - Constructors match the first ancestor constructor with the same number
//!   of parameters.
//! - Methods match ancestor methods with the same name and static-ness, and
//!   the same number of parameters.
//! - The first ancestor with a match wins; later ancestors are not read.
//! - Members still unmatched at the end of the chain are reported in one
//!   warning per class.
//! - A class-level tag only covers members some ancestor declares. Members
//!   new to the class are left alone and only noted at verbose level.

use std::collections::HashSet;
use std::ops::ControlFlow;

use tugdts_ast::comments::parse_leading_comments;
use tugdts_ast::nodes::{DeclarationTree, Node, NodeKind, NodeType};
use tugdts_core::log::Logger;

use crate::builder::{InheritanceGraph, NodePath, NodeRegistry, VertexType};
use crate::pipeline::{Processor, ProcessorContext, ProcessorError};
use crate::traversal::TraversalOptions;

/// Tag marking a member (or every member of a class) as inheriting its
/// signature. Compared ignoring ASCII case.
pub const INHERIT_DOC_TAG: &str = "inheritDoc";

/// Maximum number of ancestors read for one class.
pub const MAX_ANCESTOR_DEPTH: usize = 64;

/// Summary of one propagation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Classes reached below a root.
    pub classes_visited: usize,
    /// `Class.member` for each member matched to an ancestor.
    pub resolved: Vec<String>,
    /// `Class.member` for each unmatched member that carries its own tag
    /// or that some ancestor declares.
    pub unresolved: Vec<String>,
    /// Parameter types overwritten.
    pub rewritten_params: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MemberKey {
    Constructor,
    Method { name: String, is_static: bool },
}

impl MemberKey {
    fn of(node: &Node) -> Option<Self> {
        match &node.kind {
            NodeKind::Constructor(_) => Some(MemberKey::Constructor),
            NodeKind::Method(_) => Some(MemberKey::Method {
                name: node.name()?.to_string(),
                is_static: node.modifiers.is_static,
            }),
            NodeKind::Class(_)
            | NodeKind::Interface(_)
            | NodeKind::Function(_)
            | NodeKind::Variable(_)
            | NodeKind::TypeAlias(_)
            | NodeKind::Property(_)
            | NodeKind::Parameter(_)
            | NodeKind::Import(_)
            | NodeKind::Namespace(_)
            | NodeKind::Raw(_) => None,
        }
    }

    fn label(&self) -> &str {
        match self {
            MemberKey::Constructor => "constructor",
            MemberKey::Method { name, .. } => name,
        }
    }
}

/// A tagged member still waiting for an ancestor match.
#[derive(Debug)]
struct Pending {
    /// Index in the class's children.
    member: usize,
    key: MemberKey,
    arity: usize,
    /// Tagged on the member itself rather than through its class.
    explicit: bool,
    /// Some ancestor declares the same member, whatever its arity.
    declared: bool,
}

/// Parameter types of one ancestor member.
#[derive(Debug)]
struct AncestorMember {
    key: MemberKey,
    param_types: Vec<Option<String>>,
}

/// Propagate inherited parameter types through every class below a root
/// of `graph`.
///
/// `graph` must have been built from `tree`. Declarations that moved since
/// then are skipped with a warning.
pub fn propagate_inherited_signatures(
    tree: &mut DeclarationTree,
    graph: &InheritanceGraph,
    logger: &dyn Logger,
) -> PropagationReport {
    let mut classes: Vec<String> = Vec::new();
    let _ = graph.depth_first(
        |visit| {
            if visit.depth > 0 {
                classes.push(visit.vertex.id.clone());
            }
            ControlFlow::Continue(())
        },
        TraversalOptions::filtered([VertexType::Node(NodeType::Class)]),
    );

    let mut report = PropagationReport::default();
    for name in &classes {
        propagate_class(tree, graph.registry(), name, logger, &mut report);
    }
    logger.verbose(&format!(
        "inheritDoc: {} classes, {} members resolved, {} unresolved, {} parameter types rewritten",
        report.classes_visited,
        report.resolved.len(),
        report.unresolved.len(),
        report.rewritten_params
    ));
    report
}

fn propagate_class(
    tree: &mut DeclarationTree,
    registry: &NodeRegistry,
    name: &str,
    logger: &dyn Logger,
    report: &mut PropagationReport,
) {
    report.classes_visited += 1;
    let Some(path) = registry.get(name) else {
        return;
    };
    let Some(class) = resolve_class(tree, path, name) else {
        logger.warn(&format!(
            "skipping `{}`: declaration changed since the inheritance graph was built",
            name
        ));
        return;
    };

    let source = tree.files[path.file].text.as_str();
    let class_level = has_inherit_tag(class, source);
    let mut pending: Vec<Pending> = class
        .children
        .iter()
        .enumerate()
        .filter_map(|(member, child)| {
            let key = MemberKey::of(child)?;
            let explicit = has_inherit_tag(child, source);
            (class_level || explicit).then(|| Pending {
                member,
                key,
                arity: child.arity(),
                explicit,
                declared: false,
            })
        })
        .collect();
    if pending.is_empty() {
        return;
    }

    let mut seen: HashSet<String> = HashSet::from([name.to_string()]);
    let mut next = extends_parent(class);
    let mut depth = 0;
    while !pending.is_empty() {
        let Some(ancestor_name) = next.take() else {
            break;
        };
        if !seen.insert(ancestor_name.clone()) {
            logger.warn(&format!(
                "`{}`: cyclic heritage through `{}`; stopping ancestor walk",
                name, ancestor_name
            ));
            break;
        }
        depth += 1;
        if depth > MAX_ANCESTOR_DEPTH {
            logger.warn(&format!(
                "`{}`: more than {} ancestors; stopping ancestor walk",
                name, MAX_ANCESTOR_DEPTH
            ));
            break;
        }
        let Some(ancestor_path) = registry.get(&ancestor_name) else {
            break;
        };
        let Some(ancestor) = ancestor_path.resolve(tree) else {
            logger.warn(&format!(
                "skipping ancestor `{}` of `{}`: declaration changed since the inheritance graph was built",
                ancestor_name, name
            ));
            break;
        };
        if ancestor.name() != Some(ancestor_name.as_str()) || ancestor.node_type() != NodeType::Class {
            break;
        }

        let members = ancestor_members(ancestor);
        next = extends_parent(ancestor);

        let mut matches: Vec<(usize, Vec<Option<String>>)> = Vec::new();
        pending.retain_mut(|item| match match_member(item, &members) {
            Some(param_types) => {
                matches.push((item.member, param_types.to_vec()));
                report
                    .resolved
                    .push(format!("{}.{}", name, item.key.label()));
                false
            }
            None => {
                item.declared |= members.iter().any(|candidate| candidate.key == item.key);
                log_arity_mismatch(item, &members, name, &ancestor_name, logger);
                true
            }
        });

        if let Some(class) = path.resolve_mut(tree) {
            for (member, param_types) in matches {
                if let Some(node) = class.children.get_mut(member) {
                    report.rewritten_params += copy_param_types(node, &param_types);
                }
            }
        }
    }

    let (unresolved, undeclared): (Vec<Pending>, Vec<Pending>) = pending
        .into_iter()
        .partition(|item| item.explicit || item.declared);
    if !undeclared.is_empty() {
        let labels: Vec<&str> = undeclared.iter().map(|item| item.key.label()).collect();
        logger.verbose(&format!(
            "`{}`: no ancestor declares {}; left as is",
            name,
            labels.join(", ")
        ));
    }
    if !unresolved.is_empty() {
        let labels: Vec<&str> = unresolved.iter().map(|item| item.key.label()).collect();
        logger.warn(&format!(
            "`{}`: no ancestor signature found for {}",
            name,
            labels.join(", ")
        ));
        report.unresolved.extend(
            labels
                .iter()
                .map(|label| format!("{}.{}", name, label)),
        );
    }
}

/// The class at `path`, provided it is still the class named `name`.
fn resolve_class<'t>(tree: &'t DeclarationTree, path: NodePath, name: &str) -> Option<&'t Node> {
    let node = path.resolve(tree)?;
    (node.name() == Some(name) && node.node_type() == NodeType::Class).then_some(node)
}

fn has_inherit_tag(node: &Node, source: &str) -> bool {
    parse_leading_comments(node, source)
        .last_parsed
        .is_some_and(|block| block.has_tag_ignore_case(INHERIT_DOC_TAG))
}

/// Declared `extends` parent of a class, type arguments stripped.
fn extends_parent(node: &Node) -> Option<String> {
    let clause = node.heritage()?.extends.first()?;
    clause
        .is_resolvable()
        .then(|| clause.base_name().to_string())
}

fn ancestor_members(ancestor: &Node) -> Vec<AncestorMember> {
    ancestor
        .children
        .iter()
        .filter_map(|child| {
            Some(AncestorMember {
                key: MemberKey::of(child)?,
                param_types: child
                    .params()
                    .map(|param| param.param_type().map(str::to_string))
                    .collect(),
            })
        })
        .collect()
}

/// Parameter types of the first ancestor member matching `item`.
fn match_member<'m>(item: &Pending, members: &'m [AncestorMember]) -> Option<&'m [Option<String>]> {
    members
        .iter()
        .filter(|candidate| candidate.key == item.key)
        .find(|candidate| candidate.param_types.len() == item.arity)
        .map(|candidate| candidate.param_types.as_slice())
}

/// Report an ancestor that declares `item` with a different arity.
///
/// Constructor mismatches are warnings; method mismatches are verbose
/// only, since a later ancestor may still match.
fn log_arity_mismatch(
    item: &Pending,
    members: &[AncestorMember],
    class: &str,
    ancestor: &str,
    logger: &dyn Logger,
) {
    let arities: Vec<String> = members
        .iter()
        .filter(|candidate| candidate.key == item.key)
        .map(|candidate| candidate.param_types.len().to_string())
        .collect();
    if arities.is_empty() {
        return;
    }
    let message = format!(
        "`{}.{}` takes {} parameter(s) but `{}` declares it with {}",
        class,
        item.key.label(),
        item.arity,
        ancestor,
        arities.join(" or ")
    );
    match item.key {
        MemberKey::Constructor => logger.warn(&message),
        MemberKey::Method { .. } => logger.verbose(&message),
    }
}

/// Overwrite differing parameter types of `member`; returns the count.
///
/// Untyped ancestor parameters leave the descendant's type alone.
fn copy_param_types(member: &mut Node, param_types: &[Option<String>]) -> usize {
    let mut rewritten = 0;
    for (param, ancestor_type) in member.params_mut().zip(param_types) {
        let Some(ancestor_type) = ancestor_type else {
            continue;
        };
        if param.param_type() != Some(ancestor_type.as_str()) {
            param.set_param_type(Some(ancestor_type.clone()));
            rewritten += 1;
        }
    }
    rewritten
}

/// Pipeline step running [`propagate_inherited_signatures`].
#[derive(Debug, Default)]
pub struct InheritDocProcessor {
    last_report: Option<PropagationReport>,
}

impl InheritDocProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report of the most recent run.
    pub fn last_report(&self) -> Option<&PropagationReport> {
        self.last_report.as_ref()
    }
}

impl Processor for InheritDocProcessor {
    fn name(&self) -> &str {
        "inherit-doc"
    }

    fn requires_graph(&self) -> bool {
        true
    }

    fn process(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
        let graph = ctx.graph.ok_or(ProcessorError::MissingGraph)?;
        let report = propagate_inherited_signatures(ctx.tree, graph, ctx.logger);
        self.last_report = Some(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_graph, GraphKinds};
    use tugdts_ast::codegen::render_tree;
    use tugdts_ast::parser::parse_source;
    use tugdts_core::log::{LogLevel, MemoryLogger};

    fn run(text: &str) -> (String, MemoryLogger, PropagationReport) {
        let mut tree = DeclarationTree::single(parse_source("t.d.ts", text).unwrap());
        let graph = build_graph(&tree, &GraphKinds::default());
        let logger = MemoryLogger::new();
        let report = propagate_inherited_signatures(&mut tree, &graph, &logger);
        (render_tree(&tree), logger, report)
    }

    #[test]
    fn copies_types_from_parent() {
        let (out, logger, report) = run(
            "declare class Base {\n    foo(a: number, b: string): void;\n}\n\
             /** @inheritDoc */\n\
             declare class Child extends Base {\n    foo(a: any, b: any): void;\n}\n",
        );
        assert!(out.contains("    foo(a: number, b: string): void;\n}\n"));
        assert!(!out.contains("any"));
        assert!(logger.warnings().is_empty());
        assert_eq!(report.resolved, vec!["Child.foo"]);
        assert_eq!(report.rewritten_params, 2);
    }

    #[test]
    fn arity_mismatch_leaves_member_and_warns_once() {
        let (out, logger, report) = run(
            "declare class Base {\n    foo(a: number, b: string): void;\n}\n\
             declare class Child extends Base {\n    /** @inheritDoc */\n    foo(x: any): void;\n}\n",
        );
        assert!(out.contains("foo(x: any): void;"));
        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("foo"));
        assert!(logger.count(LogLevel::Verbose) > 0);
        assert_eq!(report.unresolved, vec!["Child.foo"]);
    }

    #[test]
    fn first_match_across_levels() {
        let (out, logger, _) = run(
            "declare class A {\n    foo(n: number): void;\n}\n\
             declare class B extends A {\n    bar(): void;\n}\n\
             declare class C extends B {\n    /** @inheritdoc */\n    foo(n: any): void;\n}\n",
        );
        assert!(out.contains("declare class C extends B {\n    /** @inheritdoc */\n    foo(n: number): void;"));
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn nearest_ancestor_wins() {
        let (out, _, _) = run(
            "declare class A {\n    foo(n: number): void;\n}\n\
             declare class B extends A {\n    foo(n: string): void;\n}\n\
             /** @inheritDoc */\n\
             declare class C extends B {\n    foo(n: any): void;\n}\n",
        );
        assert!(out.contains("declare class C extends B {\n    foo(n: string): void;"));
    }

    #[test]
    fn constructors_match_by_arity() {
        let (out, logger, _) = run(
            "declare class Base {\n    constructor(a: number);\n    constructor(a: number, b: string);\n}\n\
             declare class Child extends Base {\n    /** @inheritDoc */\n    constructor(a: any, b: any);\n}\n",
        );
        assert!(out.contains("declare class Child extends Base {\n    /** @inheritDoc */\n    constructor(a: number, b: string);"));
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn constructor_arity_mismatch_warns_and_stays_pending() {
        let (out, logger, report) = run(
            "declare class Base {\n    constructor(a: number);\n}\n\
             declare class Child extends Base {\n    /** @inheritDoc */\n    constructor(a: any, b: any);\n}\n",
        );
        assert!(out.contains("constructor(a: any, b: any);"));
        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Child.constructor"));
        assert!(warnings[1].contains("constructor"));
        assert_eq!(report.unresolved, vec!["Child.constructor"]);
    }

    #[test]
    fn static_and_instance_methods_do_not_match() {
        let (out, logger, _) = run(
            "declare class Base {\n    static foo(a: number): void;\n}\n\
             declare class Child extends Base {\n    /** @inheritDoc */\n    foo(a: any): void;\n}\n",
        );
        assert!(out.contains("foo(a: any): void;"));
        assert_eq!(logger.warnings().len(), 1);
    }

    #[test]
    fn untagged_members_untouched() {
        let (out, logger, report) = run(
            "declare class Base {\n    foo(a: number): void;\n}\n\
             declare class Child extends Base {\n    foo(a: any): void;\n}\n",
        );
        assert!(out.contains("foo(a: any): void;"));
        assert!(logger.records().iter().all(|r| r.level == LogLevel::Verbose));
        assert_eq!(report.classes_visited, 1);
    }

    #[test]
    fn classes_below_an_interface_are_roots() {
        let (_, logger, report) = run(
            "interface Shape {\n    foo(a: number): void;\n}\n\
             declare class Child extends Shape {\n    /** @inheritDoc */\n    foo(a: any): void;\n}\n\
             declare class Grand extends Child {\n    /** @inheritDoc */\n    foo(a: string): void;\n}\n",
        );
        // Child sits below an interface, so it is a root and is skipped;
        // Grand resolves from Child.
        assert_eq!(report.resolved, vec!["Grand.foo"]);
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn propagation_is_idempotent() {
        let text = "declare class Base {\n    foo(a: number): void;\n}\n\
             /** @inheritDoc */\n\
             declare class Child extends Base {\n    foo(a: any): void;\n}\n";
        let mut tree = DeclarationTree::single(parse_source("t.d.ts", text).unwrap());
        let graph = build_graph(&tree, &GraphKinds::default());
        let logger = MemoryLogger::new();
        propagate_inherited_signatures(&mut tree, &graph, &logger);
        let once = tree.clone();
        let report = propagate_inherited_signatures(&mut tree, &graph, &logger);
        assert_eq!(tree, once);
        assert_eq!(report.rewritten_params, 0);
    }

    #[test]
    fn cyclic_heritage_is_bounded() {
        let text = "declare class A extends B {\n    /** @inheritDoc */\n    foo(a: any): void;\n}\n\
                    declare class B extends A {}\n";
        let mut tree = DeclarationTree::single(parse_source("t.d.ts", text).unwrap());
        let graph = build_graph(&tree, &GraphKinds::default());
        let logger = MemoryLogger::new();
        let mut report = PropagationReport::default();
        propagate_class(&mut tree, graph.registry(), "A", &logger, &mut report);
        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("cyclic"));
        assert_eq!(report.unresolved, vec!["A.foo"]);
    }

    #[test]
    fn stale_registry_entries_are_skipped() {
        let text = "declare class Base {\n    foo(a: number): void;\n}\n\
             /** @inheritDoc */\n\
             declare class Child extends Base {\n    foo(a: any): void;\n}\n";
        let mut tree = DeclarationTree::single(parse_source("t.d.ts", text).unwrap());
        let graph = build_graph(&tree, &GraphKinds::default());
        tree.files[0].statements.remove(0);
        let logger = MemoryLogger::new();
        let report = propagate_inherited_signatures(&mut tree, &graph, &logger);
        assert_eq!(logger.warnings().len(), 1);
        assert!(logger.warnings()[0].contains("Child"));
        assert!(report.resolved.is_empty());
    }

    #[test]
    fn processor_requires_graph() {
        let mut tree = DeclarationTree::default();
        let logger = MemoryLogger::new();
        let mut processor = InheritDocProcessor::new();
        assert!(processor.requires_graph());
        let mut ctx = ProcessorContext {
            tree: &mut tree,
            graph: None,
            logger: &logger,
        };
        assert_eq!(
            processor.process(&mut ctx),
            Err(ProcessorError::MissingGraph)
        );
        assert!(processor.last_report().is_none());
    }

    #[test]
    fn class_level_tag_skips_members_new_to_the_class() {
        let (out, logger, report) = run(
            "declare class Base {\n    foo(a: number): void;\n}\n\
             /** @inheritDoc */\n\
             declare class Child extends Base {\n    foo(a: any): void;\n    extra(b: any): void;\n}\n",
        );
        assert!(out.contains("    foo(a: number): void;\n    extra(b: any): void;\n}\n"));
        assert!(logger.warnings().is_empty());
        assert!(logger.messages(LogLevel::Verbose).iter().any(|m| m.contains("extra")));
        assert_eq!(report.resolved, vec!["Child.foo"]);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn member_tag_on_a_new_member_still_warns() {
        let (_, logger, report) = run(
            "declare class Base {\n    foo(a: number): void;\n}\n\
             declare class Child extends Base {\n    /** @inheritDoc */\n    extra(b: any): void;\n}\n",
        );
        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("extra"));
        assert_eq!(report.unresolved, vec!["Child.extra"]);
    }
}
