use crate::{tree::BinOp, ty::*};
use helix_utils::prelude::*;

new_key_type! {
    pub struct ExprId;
    pub struct FuncId;
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Void,
    Word(i64),
    Bool(bool),
    Var(String),
    New(Option<ExprId>),
    Deref(ExprId),
    Member(ExprId, String),
    StructLit(String, Vec<(String, ExprId)>),
    Binary(BinOp, ExprId, ExprId),
    If(ExprId, ExprId, Option<ExprId>),
    Block(Vec<ExprId>),
    VarDecl(String, ExprId),
    Assign(ExprId, ExprId),
    Return(Option<ExprId>),
    Loop(ExprId),
    Break,
    Region(Option<String>, ExprId),
    From(String, ExprId),
    Async(ExprId),
    Invoke(String, Vec<ExprId>),
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<(String, Type)>,
    pub ret: Type,
    pub body: ExprId,
    pub span: Span,
}

/// Arena-backed program; every expression is addressed by its [`ExprId`].
#[derive(Debug, Default)]
pub struct Program {
    pub exprs: ArenaDense<ExprId, Expr>,
    pub spans: ArenaAssoc<ExprId, Span>,
    pub structs: StructTable,
    pub functions: ArenaDense<FuncId, Function>,
}

impl Program {
    pub fn kind(&self, id: &ExprId) -> &ExprKind {
        &self.exprs[id].kind
    }
    pub fn ty(&self, id: &ExprId) -> &Type {
        &self.exprs[id].ty
    }
    pub fn span(&self, id: &ExprId) -> Span {
        self.spans.get(id).cloned().unwrap_or_default()
    }
    pub fn function_named(&self, name: &str) -> Option<FuncId> {
        self.functions.iter().find(|(_, f)| f.name == name).map(|(id, _)| id)
    }

    /// Direct subexpressions, in evaluation order.
    pub fn children(&self, id: &ExprId) -> Vec<ExprId> {
        match self.kind(id) {
            | ExprKind::Void
            | ExprKind::Word(_)
            | ExprKind::Bool(_)
            | ExprKind::Var(_)
            | ExprKind::Break => vec![],
            | ExprKind::New(init) => init.iter().cloned().collect(),
            | ExprKind::Deref(e)
            | ExprKind::Member(e, _)
            | ExprKind::VarDecl(_, e)
            | ExprKind::Loop(e)
            | ExprKind::Region(_, e)
            | ExprKind::From(_, e)
            | ExprKind::Async(e) => vec![*e],
            | ExprKind::StructLit(_, fields) => fields.iter().map(|(_, e)| *e).collect(),
            | ExprKind::Binary(_, a, b) | ExprKind::Assign(a, b) => vec![*a, *b],
            | ExprKind::If(c, t, f) => [*c, *t].into_iter().chain(f.iter().cloned()).collect(),
            | ExprKind::Block(stmts) => stmts.clone(),
            | ExprKind::Return(e) => e.iter().cloned().collect(),
            | ExprKind::Invoke(_, args) => args.clone(),
        }
    }

    /// Every expression under `id`, `id` included, in pre-order.
    pub fn descendants(&self, id: &ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut stack = vec![*id];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(&id).into_iter().rev());
        }
        out
    }
}
