use crate::{err::*, runtime::*, syntax::*};
use helix_flow::{FlowOut, LifetimeId, RuntimeRoot};
use helix_syntax::{arena::*, ty::*};
use helix_utils::prelude::*;
use indexmap::IndexSet;
use std::fmt::Write;

/// Knobs the driver forwards from its configuration.
#[derive(Clone, Debug)]
pub struct EmitOptions {
    /// included first, as `#include "<runtime_header>"`
    pub runtime_header: String,
    pub line_comments: bool,
    pub prelude: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            runtime_header: "helix_runtime.h".to_string(),
            line_comments: true,
            prelude: true,
        }
    }
}

pub trait Emit {
    type Out;
    fn emit(&self, em: &mut Emitter) -> Result<Self::Out>;
}

/// State of the C function currently being written.
struct FnContext {
    cname: String,
    ret: Type,
    stmts: Vec<CStmt>,
    /// source variable to C variable
    names: ImMap<String, String>,
    used: IndexSet<String>,
    /// regions created in this function and not yet deleted, innermost last
    open_regions: Vec<String>,
    /// `open_regions` depth at each enclosing loop
    loop_marks: Vec<usize>,
    regions_used: IndexSet<String>,
    regions_declared: IndexSet<String>,
}

impl FnContext {
    fn new(cname: impl Into<String>, ret: Type) -> Self {
        FnContext {
            cname: cname.into(),
            ret,
            stmts: Vec::new(),
            names: ImMap::new(),
            used: IndexSet::new(),
            open_regions: Vec::new(),
            loop_marks: Vec::new(),
            regions_used: IndexSet::new(),
            regions_declared: IndexSet::new(),
        }
    }
}

pub struct Emitter<'e> {
    pub program: &'e Program,
    pub flow: &'e FlowOut,
    pub options: EmitOptions,
    unit: CUnit,
    ctx: FnContext,
    counter: usize,
    /// C names of every region, kept clear of variable names
    reserved: IndexSet<String>,
}

impl<'e> Emitter<'e> {
    pub fn new(program: &'e Program, flow: &'e FlowOut) -> Self {
        let reserved = flow.region_names.iter().map(|(_, name)| name.clone()).collect();
        Emitter {
            program,
            flow,
            options: EmitOptions::default(),
            unit: CUnit::default(),
            ctx: FnContext::new("", Type::Void),
            counter: 0,
            reserved,
        }
    }

    pub fn with_options(mut self, options: EmitOptions) -> Self {
        self.options = options;
        self
    }
}

impl CompilerPass for Emitter<'_> {
    type Out = CUnit;
    type Error = CodegenError;
    fn run(mut self) -> Result<CUnit> {
        self.unit.includes.push(format!("\"{}\"", self.options.runtime_header));
        if self.options.prelude {
            self.unit.includes.extend(SYSTEM_HEADERS.iter().map(|h| h.to_string()));
            self.unit.prelude = prelude();
        }
        let program = self.program;
        for (_, decl) in program.structs.iter() {
            let fields = (decl.fields.iter())
                .map(|field| (self.ctype(&field.ty), field.name.clone()))
                .collect();
            self.unit.structs.push(CStruct { name: decl.name.clone(), fields });
        }
        for (func, _) in program.functions.iter() {
            func.emit(&mut self)?;
        }
        log::debug!(
            "emitted {} functions and {} async lambdas",
            self.unit.functions.len(),
            self.unit.lambdas.len()
        );
        Ok(self.unit)
    }
}

impl CUnit {
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        write!(out, "{}", self)?;
        Ok(out)
    }
}

pub fn function_cname(name: &str) -> String {
    format!("${name}")
}

mod impl_emitter {
    use super::*;

    impl Emitter<'_> {
        pub(crate) fn push(&mut self, stmt: CStmt) {
            self.ctx.stmts.push(stmt);
        }

        pub(crate) fn line_comment(&mut self, span: &Span, what: impl std::fmt::Display) {
            if self.options.line_comments && !span.is_dummy() {
                self.push(CStmt::Comment(format!("Line {}: {}", span.start.line, what)));
            }
        }

        /// A C identifier based on `base` that is unused in this function.
        pub(crate) fn fresh(&mut self, base: &str) -> String {
            let mut name = base.to_string();
            while self.ctx.used.contains(&name) || self.reserved.contains(&name) {
                name = format!("{}{}", base, self.counter);
                self.counter += 1;
            }
            self.ctx.used.insert(name.clone());
            name
        }

        pub(crate) fn temp(&mut self, prefix: &str) -> String {
            let name = format!("{}{}", prefix, self.counter);
            self.counter += 1;
            self.fresh(&name)
        }

        /// Introduce the C variable for source variable `name`.
        pub(crate) fn bind(&mut self, name: &str) -> String {
            let cname = self.fresh(&format!("${name}"));
            self.ctx.names += (name.to_string(), cname.clone());
            cname
        }

        pub(crate) fn lookup(&self, name: &str) -> Result<String> {
            (self.ctx.names.get(name).cloned())
                .ok_or_else(|| CodegenError::UnknownVariable(name.to_string()))
        }

        pub(crate) fn ctype(&self, ty: &Type) -> CType {
            match ty {
                | Type::Void => CType::named("int"),
                | Type::Word => CType::named("int64_t"),
                | Type::Bool => CType::named("_Bool"),
                | Type::Pointer(inner) => CType::pointer(self.ctype(inner)),
                | Type::Struct(name) => CType::Struct(name.clone()),
            }
        }

        pub(crate) fn ret_ctype(&self, ty: &Type) -> CType {
            match ty {
                | Type::Void => CType::named("void"),
                | _ => self.ctype(ty),
            }
        }

        /// Emit into a fresh statement list; source names bound inside do
        /// not leak out.
        pub(crate) fn nested<T>(
            &mut self, with: impl FnOnce(&mut Self) -> Result<T>,
        ) -> Result<(Vec<CStmt>, T)> {
            let outer = std::mem::take(&mut self.ctx.stmts);
            let names = self.ctx.names.clone();
            let res = with(self);
            self.ctx.names = names;
            let inner = std::mem::replace(&mut self.ctx.stmts, outer);
            Ok((inner, res?))
        }

        /// Like [`Self::nested`] but writing to the current statement list.
        pub(crate) fn scoped<T>(&mut self, with: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
            let names = self.ctx.names.clone();
            let res = with(self);
            self.ctx.names = names;
            res
        }

        /// Bind a non-void value to a temporary so it is read right away.
        pub(crate) fn settle(&mut self, ty: &Type, value: CExpr, prefix: &str) -> CExpr {
            if ty.is_void() {
                return CExpr::unit();
            }
            let name = self.temp(prefix);
            self.push(CStmt::decl(self.ctype(ty), name.clone(), Some(value)));
            CExpr::Var(name)
        }

        pub(crate) fn region_name(&mut self, root: &LifetimeId) -> Result<String> {
            let flow = self.flow;
            let Some(name) = flow.region_name(root) else {
                let lifetime = flow.graph.lifetimes[root].to_string();
                return Err(CodegenError::UnknownRegion(lifetime));
            };
            self.ctx.regions_used.insert(name.to_string());
            Ok(name.to_string())
        }

        pub(crate) fn region(&mut self, root: &LifetimeId) -> Result<CExpr> {
            Ok(CExpr::Var(self.region_name(root)?))
        }

        /// `region_min` over several regions, innermost wins.
        pub(crate) fn fold_min(&mut self, roots: &[LifetimeId]) -> Result<Option<CExpr>> {
            let regions = roots.iter().map(|root| self.region(root)).collect::<Result<Vec<_>>>()?;
            Ok(regions.into_iter().reduce(|acc, r| CExpr::call(REGION_MIN, vec![acc, r])))
        }

        /// Whether the candidates of `root` all exist where it is bound.
        pub(crate) fn bindable(root: &RuntimeRoot) -> bool {
            root.candidates.iter().all(|c| root.allowed.contains(c))
        }

        /// `root` itself when visible, otherwise the visible roots a runtime
        /// root is picked from. Candidates always predate their runtime
        /// root, so the expansion terminates.
        fn visible_candidates(
            &self, root: LifetimeId, allowed: &CoContext<LifetimeId>,
        ) -> Option<Vec<LifetimeId>> {
            if allowed.contains(&root) {
                return Some(vec![root]);
            }
            let runtime = self.flow.runtime_roots.get(&root)?;
            let mut visible = Vec::new();
            for candidate in runtime.candidates.iter() {
                visible.extend(self.visible_candidates(*candidate, allowed)?);
            }
            Some(visible)
        }

        /// The region an allocation of `lifetime` goes to, or `None` for
        /// the stack.
        ///
        /// Runtime roots that are not visible here are replaced by their
        /// candidates when those are; whatever root is still not visible
        /// after maximization makes the allocation fail.
        pub(crate) fn select_region(
            &mut self, lifetime: LifetimeId, allowed: &CoContext<LifetimeId>, span: &Span,
        ) -> Result<Option<CExpr>> {
            let flow = self.flow;
            let graph = &flow.graph;
            let mut roots = IndexSet::new();
            for root in graph.get_outlived_lifetimes(lifetime) {
                if root == lifetime || !graph.is_root(&root) {
                    continue;
                }
                match self.visible_candidates(root, allowed) {
                    | Some(visible) => roots.extend(visible),
                    | None => {
                        roots.insert(root);
                    }
                }
            }
            let roots = graph.maximize(roots);
            for root in roots.iter() {
                let unbound = flow.runtime_roots.get(root).is_some_and(|rt| !Self::bindable(rt));
                if !allowed.contains(root) || unbound {
                    log::debug!(
                        "allocation at {} depends on {}, which is not available",
                        span,
                        graph.lifetimes[root]
                    );
                    return Err(CodegenError::LifetimeInferenceFailed { span: span.clone() });
                }
            }
            match roots.as_slice() {
                | [] => Ok(None),
                | [root] => {
                    let region = self.region(root)?;
                    log::trace!("allocation at {} lives in {}", span, region);
                    Ok(Some(region))
                }
                | _ => {
                    log::debug!(
                        "allocation at {} picks among {} regions at run time",
                        span,
                        roots.len()
                    );
                    let Some(folded) = self.fold_min(&roots)? else { return Ok(None) };
                    let name = self.temp("$region_min_");
                    self.line_comment(span, "region calculation");
                    self.push(CStmt::decl(CType::region(), name.clone(), Some(folded)));
                    Ok(Some(CExpr::Var(name)))
                }
            }
        }

        /// Bind the runtime roots recorded at `site`.
        pub(crate) fn bind_runtime_roots(&mut self, site: &ExprId) -> Result<()> {
            let flow = self.flow;
            let Some(roots) = flow.runtime_sites.get(site) else { return Ok(()) };
            for lifetime in roots {
                let Some(root) = flow.runtime_roots.get(lifetime) else {
                    return Err(CodegenError::MissingBounds(*site));
                };
                if !Self::bindable(root) {
                    log::debug!("{} cannot be bound at {}", root.name, root.span);
                    continue;
                }
                let value = match root.candidates.as_slice() {
                    | [] => self.region(&root.fallback)?,
                    | candidates => match self.fold_min(candidates)? {
                        | Some(value) => value,
                        | None => self.region(&root.fallback)?,
                    },
                };
                self.push(CStmt::decl(CType::region(), root.name.clone(), Some(value)));
                self.ctx.regions_declared.insert(root.name.clone());
            }
            Ok(())
        }

        /// `region_delete` for every region opened since depth `mark`.
        pub(crate) fn close_regions(&mut self, mark: usize) {
            let open: Vec<_> = self.ctx.open_regions[mark..].iter().rev().cloned().collect();
            for region in open {
                self.push(CStmt::Expr(CExpr::call(REGION_DELETE, vec![CExpr::Var(region)])));
            }
        }

        /// The guarded creation of `region`: on a panic unwinding into this
        /// frame the region is deleted before `on_panic` runs.
        pub(crate) fn open_region(&mut self, region: &str, buffer: &str, on_panic: CStmt) {
            let delete = CStmt::Expr(CExpr::call(REGION_DELETE, vec![CExpr::var(region)]));
            self.push(CStmt::decl(CType::region(), region, Some(CExpr::unit())));
            self.push(CStmt::decl(CType::named("jmp_buf"), buffer, None));
            self.push(CStmt::If {
                cond: CExpr::binary(
                    "!=",
                    CExpr::unit(),
                    CExpr::call("setjmp", vec![CExpr::var(buffer)]),
                ),
                then: vec![delete, on_panic],
                els: vec![],
            });
            let create = CExpr::call(REGION_CREATE, vec![CExpr::var(buffer).address_of()]);
            self.push(CStmt::Assign(CExpr::var(region), create));
            self.ctx.regions_declared.insert(region.to_string());
        }
    }
}

impl<T: Emit> Emit for Option<T> {
    type Out = Option<T::Out>;
    fn emit(&self, em: &mut Emitter) -> Result<Self::Out> {
        self.as_ref().map(|x| x.emit(em)).transpose()
    }
}

impl Emit for FuncId {
    type Out = ();
    fn emit(&self, em: &mut Emitter) -> Result<()> {
        let program = em.program;
        let Function { name, params, ret, body, .. } = &program.functions[self];
        let cname = function_cname(name);
        em.ctx = FnContext::new(cname.clone(), ret.clone());
        em.ctx.used.insert("env".to_string());
        em.ctx.regions_declared.insert("heap".to_string());

        let mut cparams = vec![(CType::void_ptr(), "env".to_string())];
        for (param, ty) in params {
            let cparam = em.bind(param);
            cparams.push((em.ctype(ty), cparam));
        }
        let heap = CExpr::var("env").cast(CType::region());
        em.push(CStmt::decl(CType::region(), "heap", Some(heap)));

        let value = body.emit(em)?;
        if !ret.is_void() && !program.ty(body).is_void() {
            em.push(CStmt::Return(Some(value)));
        }

        let ctx = std::mem::replace(&mut em.ctx, FnContext::new("", Type::Void));
        let ret = em.ret_ctype(ret);
        em.unit.functions.push(CFunction {
            is_static: false,
            ret,
            name: cname,
            params: cparams,
            body: ctx.stmts,
        });
        Ok(())
    }
}

impl Emit for ExprId {
    type Out = CExpr;
    fn emit(&self, em: &mut Emitter) -> Result<CExpr> {
        let program = em.program;
        let flow = em.flow;
        let ty = program.ty(self);
        let span = program.span(self);
        match program.kind(self) {
            | ExprKind::Void => Ok(CExpr::unit()),
            | ExprKind::Word(n) => Ok(CExpr::Int(*n)),
            | ExprKind::Bool(b) => Ok(CExpr::Int(*b as i64)),
            | ExprKind::Var(name) => Ok(CExpr::Var(em.lookup(name)?)),
            | ExprKind::New(init) => {
                let init = init.emit(em)?;
                let Some(alloc) = flow.allocations.get(self) else {
                    return Err(CodegenError::MissingBounds(*self));
                };
                let inner = em.ctype(ty.pointee().unwrap_or(&Type::Void));
                let region = em.select_region(alloc.lifetime, &alloc.allowed, &span)?;
                let name = em.temp("$new");
                em.line_comment(&span, format_args!("new {}", inner));
                let pointer = match region {
                    | Some(region) => {
                        let size = CExpr::SizeOf(inner.clone());
                        CExpr::call(REGION_ALLOC, vec![region, size])
                            .cast(CType::pointer(inner.clone()))
                    }
                    | None => {
                        let slot = em.temp("$stack");
                        em.push(CStmt::decl(inner.clone(), slot.clone(), None));
                        CExpr::Var(slot).address_of()
                    }
                };
                em.push(CStmt::decl(CType::pointer(inner), name.clone(), Some(pointer)));
                if let Some(init) = init {
                    em.push(CStmt::Assign(CExpr::var(&name).deref(), init));
                }
                Ok(CExpr::Var(name))
            }
            | ExprKind::Deref(pointer) => Ok(pointer.emit(em)?.deref()),
            | ExprKind::Member(target, field) => {
                let target_ty = program.ty(target);
                let target = target.emit(em)?;
                Ok(match target_ty.pointee() {
                    | Some(_) => target.deref().member(field),
                    | None => target.member(field),
                })
            }
            | ExprKind::StructLit(name, fields) => {
                let values = (fields.iter())
                    .map(|(field, e)| e.emit(em).map(|value| (field, value)))
                    .collect::<Result<Vec<_>>>()?;
                let temp = em.temp("$struct");
                em.push(CStmt::decl(CType::Struct(name.clone()), temp.clone(), None));
                for (field, value) in values {
                    em.push(CStmt::Assign(CExpr::var(&temp).member(field), value));
                }
                Ok(CExpr::Var(temp))
            }
            | ExprKind::Binary(op, a, b) => {
                let a = a.emit(em)?;
                let b = b.emit(em)?;
                Ok(CExpr::binary(binop(op), a, b))
            }
            | ExprKind::If(cond, then, els) => {
                let cond = cond.emit(em)?;
                let result = match (els, ty.is_void()) {
                    | (Some(_), false) => {
                        let temp = em.temp("$if_temp");
                        em.push(CStmt::decl(em.ctype(ty), temp.clone(), None));
                        Some(temp)
                    }
                    | _ => None,
                };
                let branch = |em: &mut Emitter, arm: &ExprId| {
                    em.nested(|em| {
                        let value = arm.emit(em)?;
                        if let Some(temp) = &result {
                            if !program.ty(arm).is_void() {
                                em.push(CStmt::Assign(CExpr::var(temp), value));
                            }
                        }
                        Ok(())
                    })
                    .map(|(stmts, ())| stmts)
                };
                let then = branch(em, then)?;
                let els = match els {
                    | Some(els) => branch(em, els)?,
                    | None => Vec::new(),
                };
                em.line_comment(&span, "if");
                em.push(CStmt::If { cond, then, els });
                em.bind_runtime_roots(self)?;
                Ok(result.map(CExpr::Var).unwrap_or_else(CExpr::unit))
            }
            | ExprKind::Block(stmts) => em.scoped(|em| {
                let mut last = CExpr::unit();
                for stmt in stmts {
                    last = stmt.emit(em)?;
                }
                Ok(last)
            }),
            | ExprKind::VarDecl(name, init) => {
                let value = init.emit(em)?;
                let cty = em.ctype(program.ty(init));
                let cname = em.bind(name);
                em.line_comment(&span, format_args!("var {}", name));
                em.push(CStmt::decl(cty, cname, Some(value)));
                Ok(CExpr::unit())
            }
            | ExprKind::Assign(place, value) => {
                let value = value.emit(em)?;
                let place = place.emit(em)?;
                em.push(CStmt::Assign(place, value));
                Ok(CExpr::unit())
            }
            | ExprKind::Return(value) => {
                let value = value.emit(em)?;
                let value = match value {
                    | Some(value) if !em.ctx.ret.is_void() => {
                        let ret = em.ctx.ret.clone();
                        if em.ctx.open_regions.is_empty() {
                            Some(value)
                        } else {
                            Some(em.settle(&ret, value, "$ret_temp"))
                        }
                    }
                    | _ => None,
                };
                em.close_regions(0);
                em.push(CStmt::Return(value));
                Ok(CExpr::unit())
            }
            | ExprKind::Loop(body) => {
                em.bind_runtime_roots(self)?;
                em.ctx.loop_marks.push(em.ctx.open_regions.len());
                let res = em.nested(|em| body.emit(em));
                em.ctx.loop_marks.pop();
                let (body, _) = res?;
                em.line_comment(&span, "loop");
                em.push(CStmt::Loop(body));
                Ok(CExpr::unit())
            }
            | ExprKind::Break => {
                let mark = em.ctx.loop_marks.last().copied().unwrap_or(0);
                em.close_regions(mark);
                em.push(CStmt::Break);
                Ok(CExpr::unit())
            }
            | ExprKind::Region(_, body) => {
                let Some(scope) = flow.regions.get(self) else {
                    return Err(CodegenError::MissingBounds(*self));
                };
                let parent = em.region(&scope.parent)?;
                let buffer = em.temp("jump_buffer_");
                em.line_comment(&span, format_args!("region {}", scope.name));
                let propagate = CStmt::Expr(CExpr::call(REGION_PANIC, vec![parent]));
                em.open_region(&scope.name, &buffer, propagate);
                em.ctx.open_regions.push(scope.name.clone());
                let res = em.scoped(|em| body.emit(em));
                em.ctx.open_regions.pop();
                let value = em.settle(ty, res?, "$region_value");
                em.push(CStmt::Expr(CExpr::call(REGION_DELETE, vec![CExpr::var(&scope.name)])));
                Ok(value)
            }
            | ExprKind::From(_, body) => em.scoped(|em| body.emit(em)),
            | ExprKind::Async(body) => {
                let Some(scope) = flow.asyncs.get(self) else {
                    return Err(CodegenError::MissingBounds(*self));
                };
                let captures = (scope.captures.iter())
                    .map(|(name, ty)| {
                        em.lookup(name).map(|cname| (name.clone(), cname, em.ctype(ty)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let heap = em.region_name(&scope.heap)?;
                let n = em.counter;
                em.counter += 1;
                let lambda = format!("{}$async{}", em.ctx.cname, n);
                let env_name = format!("$async_env{}", n);
                let env = CType::Struct(env_name.clone());

                // the body runs in its own C function
                let outer = std::mem::replace(&mut em.ctx, FnContext::new(&lambda, Type::Void));
                em.ctx.used.insert("environment".to_string());
                for (name, cname, _) in captures.iter() {
                    em.ctx.names += (name.clone(), cname.clone());
                    em.ctx.used.insert(cname.clone());
                }
                let res: Result<()> = (|| {
                    let buffer = em.temp("async_jump_buffer_");
                    em.open_region(&scope.name, &buffer, CStmt::Return(None));
                    em.ctx.open_regions.push(scope.name.clone());
                    body.emit(em)?;
                    em.ctx.open_regions.pop();
                    em.push(CStmt::Expr(CExpr::call(REGION_DELETE, vec![CExpr::var(&scope.name)])));
                    Ok(())
                })();
                let inner = std::mem::replace(&mut em.ctx, outer);
                res?;

                let mut free = IndexSet::from([heap.clone()]);
                free.extend(inner.regions_used.difference(&inner.regions_declared).cloned());
                log::trace!("{} frees over {:?}", lambda, free);
                em.ctx.regions_used.extend(free.iter().cloned());

                let mut fields: Vec<_> =
                    captures.iter().map(|(_, cname, cty)| (cty.clone(), cname.clone())).collect();
                fields.extend(free.iter().map(|region| (CType::region(), region.clone())));

                let unpacked = CExpr::var("environment").cast(CType::pointer(env.clone()));
                let mut lambda_body = vec![
                    CStmt::decl(CType::pointer(env.clone()), "environment_temp", Some(unpacked)),
                    CStmt::Comment("Unpack the closure environment".to_string()),
                ];
                for (cty, field) in fields.iter() {
                    let value = CExpr::var("environment_temp").deref().member(field);
                    lambda_body.push(CStmt::decl(cty.clone(), field.clone(), Some(value)));
                }
                lambda_body.push(CStmt::Empty);
                lambda_body.extend(inner.stmts);
                em.unit.lambdas.push(CFunction {
                    is_static: true,
                    ret: CType::named("void"),
                    name: lambda.clone(),
                    params: vec![(CType::void_ptr(), "environment".to_string())],
                    body: lambda_body,
                });
                em.unit.structs.push(CStruct { name: env_name, fields: fields.clone() });

                // pack the environment in the heap and hand the task over
                em.line_comment(&span, "async");
                let env_ptr = em.temp("$closure_env");
                let size = CExpr::SizeOf(env.clone());
                let alloc = CExpr::call(REGION_ALLOC, vec![CExpr::var(&heap), size])
                    .cast(CType::pointer(env.clone()));
                em.push(CStmt::decl(CType::pointer(env), env_ptr.clone(), Some(alloc)));
                for (_, field) in fields {
                    let slot = CExpr::var(&env_ptr).deref().member(&field);
                    em.push(CStmt::Assign(slot, CExpr::Var(field)));
                }
                let spawn = CExpr::call(
                    REGION_ASYNC,
                    vec![CExpr::var(&heap), CExpr::var(&lambda).address_of(), CExpr::var(&env_ptr)],
                );
                em.push(CStmt::Expr(spawn));
                Ok(CExpr::unit())
            }
            | ExprKind::Invoke(function, args) => {
                let mut cargs = vec![em.region(&LifetimeId::HEAP)?];
                for arg in args {
                    cargs.push(arg.emit(em)?);
                }
                let call = CExpr::call(function_cname(function), cargs);
                if ty.is_void() {
                    em.push(CStmt::Expr(call));
                    return Ok(CExpr::unit());
                }
                Ok(em.settle(ty, call, "$call"))
            }
        }
    }
}

fn binop(op: &helix_syntax::tree::BinOp) -> &'static str {
    use helix_syntax::tree::BinOp;
    match op {
        | BinOp::Add => "+",
        | BinOp::Sub => "-",
        | BinOp::Mul => "*",
        | BinOp::Div => "/",
        | BinOp::Lt => "<",
        | BinOp::Le => "<=",
        | BinOp::Eq => "==",
        | BinOp::Ne => "!=",
        | BinOp::And => "&&",
        | BinOp::Or => "||",
    }
}

#[cfg(test)]
mod tests;
