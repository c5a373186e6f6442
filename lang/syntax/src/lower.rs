use crate::{arena::*, err::*, tree::*, ty::*};
use helix_utils::prelude::*;
use std::{path::PathBuf, sync::Arc};

/// Flatten a nested node into the program arena.
pub trait Lower {
    type Out;
    fn lower(self, lowerer: &mut Lowerer) -> Result<Self::Out>;
}

/// Stateful lowering pass from [`Module`] to [`Program`].
pub struct Lowerer {
    pub module: Module,
    pub path: Option<Arc<PathBuf>>,
    pub program: Program,
}

impl Lowerer {
    pub fn new(module: Module) -> Self {
        Self { module, path: None, program: Program::default() }
    }
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(Arc::new(path.into()));
        self
    }
    fn span(&self, span: Span) -> Span {
        match &self.path {
            | Some(path) => span.with_path(path.clone()),
            | None => span,
        }
    }
    fn check_type(&self, ty: &Type) -> Result<()> {
        match ty {
            | Type::Void | Type::Word | Type::Bool => Ok(()),
            | Type::Pointer(inner) => self.check_type(inner),
            | Type::Struct(name) if self.program.structs.contains_key(name) => Ok(()),
            | Type::Struct(name) => Err(LowerError::UnknownStruct(name.clone())),
        }
    }
}

impl CompilerPass for Lowerer {
    type Out = Program;
    type Error = LowerError;
    fn run(mut self) -> Result<Program> {
        let Module { structs, functions } = std::mem::take(&mut self.module);
        for decl in structs {
            if self.program.structs.contains_key(&decl.name) {
                Err(LowerError::DuplicateStruct(decl.name.clone()))?
            }
            self.program.structs.insert(decl.name.clone(), decl);
        }
        let fields: Vec<_> = (self.program.structs.values())
            .flat_map(|decl| decl.fields.iter().map(|f| f.ty.clone()))
            .collect();
        for ty in fields.iter() {
            self.check_type(ty)?;
        }
        for func in functions {
            if self.program.function_named(&func.name).is_some() {
                Err(LowerError::DuplicateFunction(func.name.clone()))?
            }
            func.lower(&mut self)?;
        }
        log::trace!("lowered {} expressions", self.program.exprs.len());
        Ok(self.program)
    }
}

impl Lower for FunctionDecl {
    type Out = FuncId;
    fn lower(self, lowerer: &mut Lowerer) -> Result<Self::Out> {
        let FunctionDecl { name, params, ret, body, span } = self;
        for Param { ty, .. } in params.iter() {
            lowerer.check_type(ty)?;
        }
        lowerer.check_type(&ret)?;
        let body = body.lower(lowerer)?;
        let params = params.into_iter().map(|Param { name, ty }| (name, ty)).collect();
        let span = lowerer.span(span);
        Ok(lowerer.program.functions.alloc(Function { name, params, ret, body, span }))
    }
}

impl<T> Lower for Box<T>
where
    T: Lower,
{
    type Out = T::Out;
    fn lower(self, lowerer: &mut Lowerer) -> Result<Self::Out> {
        (*self).lower(lowerer)
    }
}

impl<T> Lower for Option<T>
where
    T: Lower,
{
    type Out = Option<T::Out>;
    fn lower(self, lowerer: &mut Lowerer) -> Result<Self::Out> {
        self.map(|x| x.lower(lowerer)).transpose()
    }
}

impl<T> Lower for Vec<T>
where
    T: Lower,
{
    type Out = Vec<T::Out>;
    fn lower(self, lowerer: &mut Lowerer) -> Result<Self::Out> {
        self.into_iter().map(|x| x.lower(lowerer)).collect()
    }
}

impl Lower for Term {
    type Out = ExprId;
    fn lower(self, lowerer: &mut Lowerer) -> Result<Self::Out> {
        let Term { kind, ty, span } = self;
        lowerer.check_type(&ty)?;
        let kind = match kind {
            | TermKind::Void => ExprKind::Void,
            | TermKind::Word(n) => ExprKind::Word(n),
            | TermKind::Bool(b) => ExprKind::Bool(b),
            | TermKind::Var(name) => ExprKind::Var(name),
            | TermKind::New(init) => ExprKind::New(init.lower(lowerer)?),
            | TermKind::Deref(e) => ExprKind::Deref(e.lower(lowerer)?),
            | TermKind::Member(e, field) => ExprKind::Member(e.lower(lowerer)?, field),
            | TermKind::StructLit(name, fields) => {
                if !lowerer.program.structs.contains_key(&name) {
                    Err(LowerError::UnknownStruct(name.clone()))?
                }
                let fields = (fields.into_iter())
                    .map(|(f, t)| Ok((f, t.lower(lowerer)?)))
                    .collect::<Result<_>>()?;
                ExprKind::StructLit(name, fields)
            }
            | TermKind::Binary(op, a, b) => {
                ExprKind::Binary(op, a.lower(lowerer)?, b.lower(lowerer)?)
            }
            | TermKind::If(c, t, f) => {
                ExprKind::If(c.lower(lowerer)?, t.lower(lowerer)?, f.lower(lowerer)?)
            }
            | TermKind::Block(stmts) => ExprKind::Block(stmts.lower(lowerer)?),
            | TermKind::VarDecl(name, e) => ExprKind::VarDecl(name, e.lower(lowerer)?),
            | TermKind::Assign(a, b) => ExprKind::Assign(a.lower(lowerer)?, b.lower(lowerer)?),
            | TermKind::Return(e) => ExprKind::Return(e.lower(lowerer)?),
            | TermKind::Loop(e) => ExprKind::Loop(e.lower(lowerer)?),
            | TermKind::Break => ExprKind::Break,
            | TermKind::Region(name, e) => ExprKind::Region(name, e.lower(lowerer)?),
            | TermKind::From(name, e) => ExprKind::From(name, e.lower(lowerer)?),
            | TermKind::Async(e) => ExprKind::Async(e.lower(lowerer)?),
            | TermKind::Invoke(f, args) => ExprKind::Invoke(f, args.lower(lowerer)?),
        };
        let id = lowerer.program.exprs.alloc(Expr { kind, ty });
        let span = lowerer.span(span);
        lowerer.program.spans.insert(id, span);
        Ok(id)
    }
}
