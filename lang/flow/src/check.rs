use crate::{
    cfg::{CfgNode, ControlFlowGraph},
    err::*,
    frame::FlowFrame,
    graph::DataFlowGraph,
    lifetime::*,
    predicate::Predicate,
};
use helix_syntax::{arena::*, fmt::*, ty::*};
use helix_utils::prelude::*;
use indexmap::{IndexMap, IndexSet};

/* --------------------------------- Output --------------------------------- */

/// An allocation site and the roots lexically visible at it.
#[derive(Clone, Debug)]
pub struct Allocation {
    pub lifetime: LifetimeId,
    pub allowed: CoContext<LifetimeId>,
    pub span: Span,
}

/// A `region [name] { .. }` block.
#[derive(Clone, Debug)]
pub struct RegionScope {
    pub root: LifetimeId,
    pub name: String,
    /// region the block was opened in; receives the panic on unwind
    pub parent: LifetimeId,
}

/// An `async { .. }` block.
#[derive(Clone, Debug)]
pub struct AsyncScope {
    pub root: LifetimeId,
    pub name: String,
    /// nearest enclosing heap region; owns the environment and the task
    pub heap: LifetimeId,
    /// enclosing variables the body refers to, copied by value
    pub captures: Vec<(String, Type)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuntimeRootKind {
    /// bound after an `if` whose branches disagree
    Merge,
    /// bound before a `loop` for a variable the body reassigns
    Loop,
}

/// A root whose region is only known at run time: the innermost of
/// `candidates`, picked with `region_min`.
#[derive(Clone, Debug)]
pub struct RuntimeRoot {
    pub lifetime: LifetimeId,
    pub kind: RuntimeRootKind,
    pub name: String,
    pub candidates: Vec<LifetimeId>,
    /// roots visible where the root is bound
    pub allowed: CoContext<LifetimeId>,
    /// scope region used when no candidate exists
    pub fallback: LifetimeId,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct FlowTables {
    pub bounds: ArenaAssoc<ExprId, LifetimeBounds>,
    pub allocations: ArenaAssoc<ExprId, Allocation>,
    pub regions: ArenaAssoc<ExprId, RegionScope>,
    pub asyncs: ArenaAssoc<ExprId, AsyncScope>,
    /// runtime roots bound at an `if` or `loop`, in creation order
    pub runtime_sites: ArenaAssoc<ExprId, Vec<LifetimeId>>,
    pub runtime_roots: ArenaAssoc<LifetimeId, RuntimeRoot>,
    /// C expression naming each root's region
    pub region_names: ArenaAssoc<LifetimeId, String>,
    pub cfgs: ArenaAssoc<FuncId, ControlFlowGraph>,
}

/// Everything the C generator needs from the analysis.
#[derive(Debug, derive_more::Deref, derive_more::DerefMut)]
pub struct FlowOut {
    pub graph: DataFlowGraph,
    #[deref]
    #[deref_mut]
    pub tables: FlowTables,
}

impl FlowOut {
    pub fn region_name(&self, root: &LifetimeId) -> Option<&str> {
        self.region_names.get(root).map(String::as_str)
    }

    /// Lifetime bounds of `id` rendered for dumps.
    pub fn annotate(&self, id: &ExprId) -> Option<String> {
        let bounds = self.bounds.get(id)?;
        let show = |l: &LifetimeId| self.graph.lifetimes[l].to_string();
        match (bounds.rvalue.is_none(), bounds.lvalue.is_none()) {
            | (true, true) => None,
            | (false, true) => Some(show(&bounds.rvalue)),
            | (true, false) => Some(format!("_ : {}", show(&bounds.lvalue))),
            | (false, false) => {
                Some(format!("{} : {}", show(&bounds.rvalue), show(&bounds.lvalue)))
            }
        }
    }
}

/* --------------------------------- Checker -------------------------------- */

#[derive(Clone, Debug)]
pub enum FlowTask {
    Function(String),
    Expr(ExprId),
}

pub struct FlowChecker<'p> {
    pub program: &'p Program,
    /// call stack for debugging the checker
    pub stack: im::Vector<FlowTask>,
    counter: usize,
    tables: FlowTables,
    cfg: ControlFlowGraph,
    /// current program point; `None` after `return` or `break`
    point: Option<CfgNode>,
    /// heads of the enclosing loops
    loops: Vec<CfgNode>,
}

impl<'p> FlowChecker<'p> {
    pub fn new(program: &'p Program) -> Self {
        FlowChecker {
            program,
            stack: im::Vector::new(),
            counter: 0,
            tables: FlowTables::default(),
            cfg: ControlFlowGraph::new(),
            point: None,
            loops: Vec::new(),
        }
    }
}

impl CompilerPass for FlowChecker<'_> {
    type Out = FlowOut;
    type Error = FlowError;
    fn run(mut self) -> Result<FlowOut> {
        let mut graph = DataFlowGraph::new();
        self.tables.region_names.insert(LifetimeId::HEAP, "heap".to_string());
        let funcs: Vec<_> = self.program.functions.iter().map(|(id, _)| id).collect();
        for func in funcs {
            if let Err(err) = self.check_function(func, &mut graph) {
                log::debug!("flow check failed: {}", err);
                Err(err)?
            }
        }
        log::debug!("{} lifetimes, {} edges", graph.lifetimes.len(), graph.edges().count());
        Ok(FlowOut { graph, tables: self.tables })
    }
}

mod impl_checker {
    use super::*;

    impl<'p> FlowChecker<'p> {
        /// Restore the task stack after `with`, however it exits.
        #[inline]
        pub(crate) fn guarded<R>(&mut self, with: impl FnOnce(&mut Self) -> R) -> R {
            let stack = self.stack.clone();
            let res = with(self);
            self.stack = stack;
            res
        }

        pub(crate) fn fresh(&mut self) -> usize {
            let n = self.counter;
            self.counter += 1;
            n
        }

        pub(crate) fn carries_region(&self, id: &ExprId) -> bool {
            self.program.ty(id).carries_region(&self.program.structs)
        }

        pub(crate) fn temp(
            &mut self, frame: &mut FlowFrame, prefix: &str, role: LifetimeRole,
        ) -> LifetimeId {
            let n = self.fresh();
            let path = frame.scope.append(format!("{prefix}{n}"));
            frame.graph.intern(Lifetime::new(path, role, LifetimeOrigin::TempValue))
        }

        /// A fresh value lifetime for the variable at `path`.
        pub(crate) fn next_version(frame: &mut FlowFrame, path: &IdentifierPath) -> LifetimeId {
            let base =
                frame.graph.intern(Lifetime::alias(path.clone(), LifetimeOrigin::LocalValue));
            frame.graph.increment_version(base)
        }

        pub(crate) fn name_region(&mut self, root: LifetimeId, name: impl Into<String>) {
            self.tables.region_names.insert(root, name.into());
        }

        /// Lifetime of field `field` of a value living at `parent`, linked on
        /// first use.
        pub(crate) fn member(
            frame: &mut FlowFrame, parent: LifetimeId, field: &str,
        ) -> LifetimeId {
            if parent.is_none() {
                return LifetimeId::NONE;
            }
            if let Some(member) = frame.graph.get_member_lifetimes(parent, field).first() {
                return *member;
            }
            let Lifetime { path, origin, version, .. } = frame.graph.lifetimes[&parent].clone();
            let member = frame.graph.intern(Lifetime {
                path: path.append(field),
                role: LifetimeRole::Alias,
                origin,
                version,
            });
            frame.graph.add_member(parent, member);
            frame.graph.add_stored(member, parent);
            member
        }

        /// Reject writing `value` into storage owned by `target` when some
        /// region of the value may be freed before the target's.
        pub(crate) fn check_store(
            frame: &FlowFrame, value: LifetimeId, target: LifetimeId, span: &Span,
        ) -> Result<()> {
            let graph = &*frame.graph;
            let targets = graph.get_dominant_roots(target);
            for assigned in graph.get_dominant_roots(value) {
                for target in targets.iter() {
                    if assigned != *target && !graph.does_outlive(assigned, *target) {
                        log::debug!(
                            "unsafe store of {} into {}",
                            graph.lifetimes[&assigned],
                            graph.lifetimes[target]
                        );
                        Err(FlowError::UnsafeMemoryStore { span: span.clone() })?
                    }
                }
            }
            Ok(())
        }

        pub(crate) fn record_runtime_root(&mut self, site: ExprId, root: RuntimeRoot) {
            let lifetime = root.lifetime;
            log::trace!("runtime root {} over {} candidates", root.name, root.candidates.len());
            self.name_region(lifetime, root.name.clone());
            self.tables.runtime_roots.insert(lifetime, root);
            match self.tables.runtime_sites.get_mut(&site) {
                | Some(sites) => sites.push(lifetime),
                | None => self.tables.runtime_sites.insert(site, vec![lifetime]),
            }
        }

        /// Join the lifetimes flowing out of sibling branches.
        ///
        /// Mutually equivalent values stay a single alias; anything else gets
        /// a fresh merge root that every branch value is stored into. With a
        /// `location` the merged value is also stored there.
        pub(crate) fn join(
            &mut self, frame: &mut FlowFrame, site: ExprId, values: Vec<LifetimeId>,
            location: Option<LifetimeId>,
        ) -> LifetimeId {
            let values: IndexSet<_> = values.into_iter().filter(|v| !v.is_none()).collect();
            let graph = &*frame.graph;
            let equivalent = values.iter().all(|a| {
                values.iter().all(|b| {
                    a == b || (graph.does_outlive(*a, *b) && graph.does_outlive(*b, *a))
                })
            });
            if values.is_empty() {
                return LifetimeId::NONE;
            }
            if values.len() == 1 {
                return values[0];
            }
            if equivalent {
                let alias = self.temp(frame, "$join", LifetimeRole::Alias);
                for value in values {
                    frame.graph.add_assignment(value, alias);
                }
                return alias;
            }
            let mut candidates = IndexSet::new();
            for value in values.iter() {
                candidates.extend(frame.graph.get_dominant_roots(*value));
            }
            let name = format!("$merge_region{}", self.fresh());
            let merge = frame
                .graph
                .intern(Lifetime::root(frame.scope.append(&name), LifetimeOrigin::TempValue));
            for value in values {
                frame.graph.add_stored(value, merge);
            }
            if let Some(location) = location {
                frame.graph.add_stored(merge, location);
            }
            let root = RuntimeRoot {
                lifetime: merge,
                kind: RuntimeRootKind::Merge,
                name,
                candidates: candidates.into_iter().collect(),
                allowed: frame.roots.clone(),
                fallback: frame.scope_root,
                span: self.program.span(&site),
            };
            self.record_runtime_root(site, root);
            frame.add_root(merge);
            merge
        }

        pub(crate) fn edge(&mut self, to: &CfgNode, predicate: Predicate) {
            if let Some(from) = self.point.clone() {
                self.cfg.add_edge(from, to.clone(), predicate);
            }
        }

        /// Move to `to` from `entry`, if `entry` is reachable at all.
        pub(crate) fn branch(
            &mut self, entry: &Option<CfgNode>, to: &CfgNode, predicate: Predicate,
        ) {
            self.point = entry.clone();
            self.edge(to, predicate);
            if entry.is_some() {
                self.point = Some(to.clone());
            }
        }

        pub(crate) fn resume_at(&mut self, node: CfgNode) {
            self.point = self.cfg.has_predecessors(&node).then_some(node);
        }

        pub(crate) fn check_function(
            &mut self, func: FuncId, graph: &mut DataFlowGraph,
        ) -> Result<()> {
            let program = self.program;
            let Function { name, params, ret, body, .. } = &program.functions[&func];
            self.guarded(|checker| {
                checker.stack.push_back(FlowTask::Function(name.clone()));
                log::trace!("checking function {}", name);
                let scope = IdentifierPath::new(name.clone());
                let mut frame = FlowFrame::new(graph, scope.clone());
                for (param, ty) in params {
                    if !ty.carries_region(&program.structs) {
                        frame.declare(param, LifetimeBounds::none());
                        continue;
                    }
                    let path = scope.append(param);
                    let value =
                        frame.graph.intern(Lifetime::root(path.clone(), LifetimeOrigin::Other));
                    let location =
                        frame.graph.intern(Lifetime::alias(path, LifetimeOrigin::LocalLocation));
                    frame.graph.add_stored(value, LifetimeId::HEAP);
                    frame.graph.add_stored(location, LifetimeId::HEAP);
                    frame.graph.add_stored(value, location);
                    frame.add_root(value);
                    checker.name_region(value, "heap");
                    frame.declare(param, LifetimeBounds::new(value, location));
                }

                checker.cfg = ControlFlowGraph::new();
                checker.point = Some(CfgNode::Start);
                checker.loops.clear();

                let result = body.flow(checker, &mut frame)?;
                if checker.point.is_some() {
                    let trailing = !program.ty(body).is_void() && !ret.is_void();
                    if trailing {
                        frame.graph.add_stored(result.rvalue, LifetimeId::HEAP);
                    }
                    if trailing || ret.is_void() {
                        checker.edge(&CfgNode::End, Predicate::tt());
                    }
                }
                let cfg = std::mem::take(&mut checker.cfg);
                let returns = cfg.always_returns(&CfgNode::Start);
                checker.tables.cfgs.insert(func, cfg);
                if !ret.is_void() && !returns {
                    Err(FlowError::MissingReturn { function: name.clone() })?
                }
                Ok(())
            })
        }
    }
}

/* ---------------------------------- Flow ---------------------------------- */

pub trait Flow {
    type Out;
    fn flow(&self, checker: &mut FlowChecker, frame: &mut FlowFrame) -> Result<Self::Out> {
        self.flow_inner(checker, frame)
    }
    fn flow_inner(&self, checker: &mut FlowChecker, frame: &mut FlowFrame) -> Result<Self::Out>;
}

impl<T: Flow> Flow for Option<T> {
    type Out = Option<T::Out>;
    fn flow_inner(&self, checker: &mut FlowChecker, frame: &mut FlowFrame) -> Result<Self::Out> {
        self.as_ref().map(|x| x.flow(checker, frame)).transpose()
    }
}

/// Bindings a nested scope changed that its parent can still see.
fn propagate(frame: &mut FlowFrame, changed: Vec<(IdentifierPath, LifetimeBounds)>) {
    for (path, bounds) in changed {
        frame.rebind(path, bounds);
    }
}

impl Flow for ExprId {
    type Out = LifetimeBounds;

    fn flow(&self, checker: &mut FlowChecker, frame: &mut FlowFrame) -> Result<Self::Out> {
        checker.guarded(|checker| {
            checker.stack.push_back(FlowTask::Expr(*self));
            let bounds = self.flow_inner(checker, frame)?;
            checker.tables.bounds.insert(*self, bounds);
            Ok(bounds)
        })
    }

    fn flow_inner(&self, checker: &mut FlowChecker, frame: &mut FlowFrame) -> Result<Self::Out> {
        let program = checker.program;
        let span = program.span(self);
        let none = LifetimeBounds::none();
        match program.kind(self) {
            | ExprKind::Void | ExprKind::Word(_) | ExprKind::Bool(_) => Ok(none),
            | ExprKind::Var(name) => match frame.lookup(name) {
                | Some((_, bounds)) => Ok(bounds),
                | None => Err(FlowError::UnboundVariable { name: name.clone(), span }),
            },
            | ExprKind::Binary(_, a, b) => {
                a.flow(checker, frame)?;
                b.flow(checker, frame)?;
                Ok(none)
            }
            | ExprKind::New(init) => {
                let init = init.flow(checker, frame)?;
                let alloc = checker.temp(frame, "$new", LifetimeRole::Alias);
                if let Some(region) = frame.pinned {
                    frame.graph.add_assignment(alloc, region);
                }
                if let Some(init) = init {
                    frame.graph.add_stored(init.rvalue, alloc);
                }
                let allowed = frame.roots.clone();
                let allocation = Allocation { lifetime: alloc, allowed, span };
                checker.tables.allocations.insert(*self, allocation);
                Ok(LifetimeBounds::value(alloc))
            }
            | ExprKind::Deref(pointer) => {
                let pointer = pointer.flow(checker, frame)?;
                let mut rvalue = LifetimeId::NONE;
                if checker.carries_region(self) && !pointer.rvalue.is_none() {
                    rvalue = checker.temp(frame, "$deref", LifetimeRole::Alias);
                    frame.graph.add_stored(rvalue, pointer.rvalue);
                }
                Ok(LifetimeBounds::new(rvalue, pointer.rvalue))
            }
            | ExprKind::Member(target, field) => {
                let bounds = target.flow(checker, frame)?;
                // members of a pointee live where the pointer points
                let lvalue = match program.ty(target).pointee() {
                    | Some(_) => bounds.rvalue,
                    | None => bounds.lvalue,
                };
                let mut rvalue = LifetimeId::NONE;
                if checker.carries_region(self) {
                    rvalue = FlowChecker::member(frame, bounds.rvalue, field);
                }
                Ok(LifetimeBounds::new(rvalue, lvalue))
            }
            | ExprKind::StructLit(_, fields) => {
                let mut values = Vec::new();
                for (field, value) in fields {
                    values.push((field, value.flow(checker, frame)?));
                }
                if !checker.carries_region(self) {
                    return Ok(none);
                }
                // top-level fields with a pointer somewhere below them
                let carrying: IndexSet<String> = (program.ty(self))
                    .region_members(&IdentifierPath::root(), &program.structs)
                    .into_iter()
                    .filter_map(|path| path.segments().first().cloned())
                    .collect();
                let value = checker.temp(frame, "$struct", LifetimeRole::Alias);
                for (field, bounds) in values {
                    if bounds.rvalue.is_none() || !carrying.contains(field.as_str()) {
                        continue;
                    }
                    let member = FlowChecker::member(frame, value, field);
                    frame.graph.add_assignment(bounds.rvalue, member);
                }
                Ok(LifetimeBounds::value(value))
            }
            | ExprKind::If(cond, then, els) => {
                cond.flow(checker, frame)?;
                let n = checker.fresh();
                let predicate = Predicate::atom(cond.ugly(&Formatter::new(program)));
                let node = |frame: &FlowFrame, name: &str| {
                    CfgNode::Scope(frame.scope.append(format!("{name}{n}")))
                };
                let (then_node, else_node, join) =
                    (node(frame, "$then"), node(frame, "$else"), node(frame, "$join"));
                let before = frame.locals.clone();
                let entry = checker.point.clone();

                checker.branch(&entry, &then_node, predicate.clone());
                let (then_bounds, then_changed) = {
                    let mut child = frame.child(format!("$then{n}"));
                    let bounds = then.flow(checker, &mut child)?;
                    (bounds, child.changed_since(&before))
                };
                checker.edge(&join, Predicate::tt());

                checker.branch(&entry, &else_node, predicate.negate());
                let (else_bounds, else_changed) = match els {
                    | Some(els) => {
                        let mut child = frame.child(format!("$else{n}"));
                        let bounds = els.flow(checker, &mut child)?;
                        (bounds, child.changed_since(&before))
                    }
                    | None => (none, Vec::new()),
                };
                checker.edge(&join, Predicate::tt());
                checker.resume_at(join);

                let result = match els {
                    | Some(_) => {
                        let values = vec![then_bounds.rvalue, else_bounds.rvalue];
                        LifetimeBounds::value(checker.join(frame, *self, values, None))
                    }
                    | None => none,
                };

                let then_changed: IndexMap<_, _> = then_changed.into_iter().collect();
                let else_changed: IndexMap<_, _> = else_changed.into_iter().collect();
                let paths: IndexSet<_> =
                    then_changed.keys().chain(else_changed.keys()).cloned().collect();
                for path in paths {
                    let Some(old) = before.get(&path).copied() else { continue };
                    let left = then_changed.get(&path).copied().unwrap_or(old);
                    let right = else_changed.get(&path).copied().unwrap_or(old);
                    let values = vec![left.rvalue, right.rvalue];
                    let merged = checker.join(frame, *self, values, Some(old.lvalue));
                    frame.rebind(path, LifetimeBounds::new(merged, old.lvalue));
                }
                Ok(result)
            }
            | ExprKind::Block(stmts) => {
                let n = checker.fresh();
                let before = frame.locals.clone();
                let (last, changed, roots) = {
                    let mut child = frame.child(format!("$block{n}"));
                    let mut last = none;
                    for stmt in stmts {
                        last = stmt.flow(checker, &mut child)?;
                    }
                    (last, child.changed_since(&before), child.roots.clone())
                };
                propagate(frame, changed);
                frame.roots = roots;
                Ok(last)
            }
            | ExprKind::VarDecl(name, init) => {
                let init_bounds = init.flow(checker, frame)?;
                if !checker.carries_region(init) {
                    frame.declare(name, none);
                    return Ok(none);
                }
                let path = frame.path_of(name);
                let mut location = frame
                    .graph
                    .intern(Lifetime::alias(path.clone(), LifetimeOrigin::LocalLocation));
                let mut value =
                    frame.graph.intern(Lifetime::alias(path.clone(), LifetimeOrigin::LocalValue));
                if frame.locals.contains_key(&path) {
                    // shadowed in the same scope
                    location = frame.graph.increment_version(location);
                    value = frame.graph.increment_version(value);
                }
                frame.graph.add_stored(location, frame.scope_root);
                frame.graph.add_assignment(init_bounds.rvalue, value);
                frame.graph.add_stored(value, location);
                frame.declare(name, LifetimeBounds::new(value, location));
                Ok(none)
            }
            | ExprKind::Assign(place, value) => {
                let value = value.flow(checker, frame)?;
                match program.kind(place) {
                    | ExprKind::Var(name) => {
                        let Some((path, old)) = frame.lookup(name) else {
                            return Err(FlowError::UnboundVariable { name: name.clone(), span });
                        };
                        checker.tables.bounds.insert(*place, old);
                        if value.rvalue.is_none() || old.lvalue.is_none() {
                            return Ok(none);
                        }
                        FlowChecker::check_store(frame, value.rvalue, old.lvalue, &span)?;
                        let new = FlowChecker::next_version(frame, &path);
                        frame.graph.add_stored(new, old.lvalue);
                        frame.graph.add_stored(value.rvalue, old.lvalue);
                        frame.graph.add_assignment(value.rvalue, new);
                        frame.rebind(path, LifetimeBounds::new(new, old.lvalue));
                    }
                    | ExprKind::Deref(_) | ExprKind::Member(_, _) => {
                        let target = place.flow(checker, frame)?;
                        if !value.rvalue.is_none() {
                            FlowChecker::check_store(frame, value.rvalue, target.lvalue, &span)?;
                            frame.graph.add_stored(value.rvalue, target.lvalue);
                            frame.graph.add_stored(value.rvalue, target.rvalue);
                        }
                    }
                    | _ => Err(FlowError::NotAPlace { span })?,
                }
                Ok(none)
            }
            | ExprKind::Return(value) => {
                if let Some(value) = value.flow(checker, frame)? {
                    frame.graph.add_stored(value.rvalue, LifetimeId::HEAP);
                }
                checker.edge(&CfgNode::End, Predicate::tt());
                checker.point = None;
                Ok(none)
            }
            | ExprKind::Loop(body) => {
                let n = checker.fresh();
                let head = CfgNode::Scope(frame.scope.append(format!("$loop{n}")));
                let exit = CfgNode::Scope(frame.scope.append(format!("$loop_exit{n}")));

                // variables the body reassigns get a root standing for
                // whichever value they hold on the current iteration
                let mut modified = IndexMap::new();
                for id in program.descendants(body) {
                    let ExprKind::Assign(place, _) = program.kind(&id) else { continue };
                    let ExprKind::Var(name) = program.kind(place) else { continue };
                    if let Some((path, bounds)) = frame.lookup(name) {
                        if !bounds.rvalue.is_none() {
                            modified.entry(path).or_insert(bounds);
                        }
                    }
                }
                let mut iteration = Vec::new();
                for (path, old) in modified {
                    let name = format!("$loop_region{}", checker.fresh());
                    let root = frame
                        .graph
                        .intern(Lifetime::root(
                            frame.scope.append(&name),
                            LifetimeOrigin::TempValue,
                        ));
                    let candidates = frame.graph.get_dominant_roots(old.rvalue);
                    frame.graph.add_stored(old.rvalue, root);
                    frame.graph.add_stored(root, old.lvalue);
                    let runtime = RuntimeRoot {
                        lifetime: root,
                        kind: RuntimeRootKind::Loop,
                        name,
                        candidates,
                        allowed: frame.roots.clone(),
                        fallback: frame.scope_root,
                        span: span.clone(),
                    };
                    checker.record_runtime_root(*self, runtime);
                    iteration.push((path, LifetimeBounds::new(root, old.lvalue)));
                }

                let before = frame.locals.clone();
                checker.edge(&head, Predicate::tt());
                if checker.point.is_some() {
                    checker.point = Some(head.clone());
                }
                checker.cfg.add_continuation(head.clone(), exit.clone());
                checker.loops.push(head.clone());
                let changed = {
                    let mut child = frame.child(format!("$loop{n}"));
                    for (path, bounds) in iteration {
                        child.add_root(bounds.rvalue);
                        child.rebind(path, bounds);
                    }
                    body.flow(checker, &mut child)?;
                    child.changed_since(&before)
                };
                checker.edge(&head, Predicate::tt());
                checker.loops.pop();
                checker.resume_at(exit);

                for (path, bounds) in changed {
                    let post = FlowChecker::next_version(frame, &path);
                    frame.graph.add_assignment(bounds.rvalue, post);
                    frame.rebind(path, LifetimeBounds::new(post, bounds.lvalue));
                }
                Ok(none)
            }
            | ExprKind::Break => {
                let Some(head) = checker.loops.last().cloned() else {
                    return Err(FlowError::BreakOutsideLoop { span });
                };
                if let Some(exit) = checker.cfg.get_continuation(&head).cloned() {
                    checker.edge(&exit, Predicate::tt());
                }
                checker.point = None;
                Ok(none)
            }
            | ExprKind::Region(name, body) => {
                let n = checker.fresh();
                let cname = match name {
                    | Some(name) => format!("${name}{n}"),
                    | None => format!("$anon_region_{n}"),
                };
                let path = frame.scope.append(&cname);
                let root = frame.graph.intern(Lifetime::root(path, LifetimeOrigin::Other));
                // the enclosing region is created first and deleted last
                frame.graph.add_stored(frame.scope_root, root);
                let scope = RegionScope { root, name: cname.clone(), parent: frame.scope_root };
                checker.tables.regions.insert(*self, scope);
                checker.name_region(root, cname.clone());

                let before = frame.locals.clone();
                let (bounds, changed) = {
                    let mut child = frame.child(&cname);
                    child.scope_root = root;
                    child.add_root(root);
                    if let Some(name) = name {
                        child.regions += (name.clone(), root);
                    }
                    let bounds = body.flow(checker, &mut child)?;
                    (bounds, child.changed_since(&before))
                };
                propagate(frame, changed);
                Ok(LifetimeBounds::value(bounds.rvalue))
            }
            | ExprKind::From(name, body) => {
                let Some(region) = frame.regions.get(name.as_str()).copied() else {
                    return Err(FlowError::UnboundRegion { name: name.clone(), span });
                };
                let n = checker.fresh();
                let before = frame.locals.clone();
                let (bounds, changed, roots) = {
                    let mut child = frame.child(format!("$from{n}"));
                    child.pinned = Some(region);
                    let bounds = body.flow(checker, &mut child)?;
                    (bounds, child.changed_since(&before), child.roots.clone())
                };
                propagate(frame, changed);
                frame.roots = roots;
                Ok(bounds)
            }
            | ExprKind::Async(body) => {
                let n = checker.fresh();
                let cname = format!("$async_region{n}");
                let path = frame.scope.append(&cname);
                let root = frame.graph.intern(Lifetime::root(path, LifetimeOrigin::Other));
                let heap = frame.heap_root;
                frame.graph.add_stored(heap, root);

                let mut captures = IndexMap::new();
                for id in program.descendants(body) {
                    if let ExprKind::Var(name) = program.kind(&id) {
                        if let Some((_, bounds)) = frame.lookup(name) {
                            captures.entry(name.clone()).or_insert_with(|| {
                                (program.ty(&id).clone(), bounds.rvalue, program.span(&id))
                            });
                        }
                    }
                }
                // the environment lives in the heap region, so every captured
                // pointer is a store into it
                for (_, value, at) in captures.values() {
                    if value.is_none() {
                        continue;
                    }
                    FlowChecker::check_store(frame, *value, heap, at)?;
                    frame.graph.add_stored(*value, root);
                    log::trace!("async capture of {}", frame.graph.lifetimes[value]);
                }
                let mut captures: Vec<_> =
                    captures.into_iter().map(|(name, (ty, _, _))| (name, ty)).collect();
                captures.sort_by(|(a, _), (b, _)| a.cmp(b));
                let scope = AsyncScope { root, name: cname.clone(), heap, captures };
                checker.tables.asyncs.insert(*self, scope);
                checker.name_region(root, cname.clone());

                // the task may outlive every lexical region of its creator
                let graph = &*frame.graph;
                let roots: CoContext<_> = (frame.roots.iter())
                    .filter(|r| **r == heap || graph.does_outlive(**r, heap))
                    .copied()
                    .collect();

                let point = checker.point.replace(CfgNode::Scope(frame.scope.append(&cname)));
                let loops = std::mem::take(&mut checker.loops);
                let res = {
                    let mut child = frame.child(&cname);
                    child.scope_root = root;
                    child.roots = roots + root;
                    child.pinned = None;
                    body.flow(checker, &mut child)
                };
                checker.point = point;
                checker.loops = loops;
                res?;
                Ok(none)
            }
            | ExprKind::Invoke(_, args) => {
                for arg in args {
                    arg.flow(checker, frame)?;
                }
                if !checker.carries_region(self) {
                    return Ok(none);
                }
                // the callee allocates its result in the heap it is handed
                let result = checker.temp(frame, "$call", LifetimeRole::Root);
                let heap = (checker.tables.region_names.get(&frame.heap_root).cloned())
                    .unwrap_or_else(|| "heap".to_string());
                checker.name_region(result, heap);
                frame.add_root(result);
                Ok(LifetimeBounds::value(result))
            }
        }
    }
}
