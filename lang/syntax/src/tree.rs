//! Nested form of the typed tree, as exchanged with the front end.

use crate::ty::*;
use helix_utils::prelude::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub structs: Vec<StructDecl>,
    pub functions: Vec<FunctionDecl>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    pub ret: Type,
    pub body: Term,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Eq,
    Ne,
    And,
    Or,
}

/// A typed term; `ty` is the return type the checker assigned to it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Term {
    pub kind: TermKind,
    pub ty: Type,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TermKind {
    Void,
    Word(i64),
    Bool(bool),
    Var(String),
    /// `new T` with an optional initial value
    New(Option<Box<Term>>),
    Deref(Box<Term>),
    Member(Box<Term>, String),
    StructLit(String, Vec<(String, Term)>),
    Binary(BinOp, Box<Term>, Box<Term>),
    If(Box<Term>, Box<Term>, Option<Box<Term>>),
    Block(Vec<Term>),
    VarDecl(String, Box<Term>),
    Assign(Box<Term>, Box<Term>),
    Return(Option<Box<Term>>),
    Loop(Box<Term>),
    Break,
    Region(Option<String>, Box<Term>),
    From(String, Box<Term>),
    Async(Box<Term>),
    Invoke(String, Vec<Term>),
}

/* ------------------------------ Constructors ------------------------------ */

impl Term {
    pub fn new(kind: TermKind, ty: Type) -> Self {
        Term { kind, ty, span: Span::dummy() }
    }
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
    pub fn at_line(self, line: usize) -> Self {
        self.at(Span::line(line))
    }

    pub fn void() -> Self {
        Term::new(TermKind::Void, Type::Void)
    }
    pub fn word(n: i64) -> Self {
        Term::new(TermKind::Word(n), Type::Word)
    }
    pub fn bool(b: bool) -> Self {
        Term::new(TermKind::Bool(b), Type::Bool)
    }
    pub fn var(name: impl Into<String>, ty: Type) -> Self {
        Term::new(TermKind::Var(name.into()), ty)
    }
    pub fn alloc(inner: Type) -> Self {
        Term::new(TermKind::New(None), Type::pointer(inner))
    }
    pub fn alloc_with(init: Term) -> Self {
        let ty = Type::pointer(init.ty.clone());
        Term::new(TermKind::New(Some(Box::new(init))), ty)
    }
    pub fn deref(ptr: Term) -> Self {
        let ty = ptr.ty.pointee().cloned().unwrap_or(Type::Void);
        Term::new(TermKind::Deref(Box::new(ptr)), ty)
    }
    pub fn member(target: Term, field: impl Into<String>, ty: Type) -> Self {
        Term::new(TermKind::Member(Box::new(target), field.into()), ty)
    }
    pub fn struct_lit(name: impl Into<String>, fields: Vec<(&str, Term)>) -> Self {
        let name = name.into();
        let fields = fields.into_iter().map(|(f, t)| (f.to_owned(), t)).collect();
        Term::new(TermKind::StructLit(name.clone(), fields), Type::Struct(name))
    }
    pub fn binary(op: BinOp, lhs: Term, rhs: Term) -> Self {
        let ty = match op {
            | BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => Type::Word,
            | _ => Type::Bool,
        };
        Term::new(TermKind::Binary(op, Box::new(lhs), Box::new(rhs)), ty)
    }
    pub fn if_then(cond: Term, then: Term) -> Self {
        Term::new(TermKind::If(Box::new(cond), Box::new(then), None), Type::Void)
    }
    pub fn if_else(cond: Term, then: Term, els: Term) -> Self {
        let ty = then.ty.clone();
        Term::new(TermKind::If(Box::new(cond), Box::new(then), Some(Box::new(els))), ty)
    }
    pub fn block(stmts: Vec<Term>) -> Self {
        let ty = stmts.last().map(|t| t.ty.clone()).unwrap_or(Type::Void);
        Term::new(TermKind::Block(stmts), ty)
    }
    pub fn var_decl(name: impl Into<String>, value: Term) -> Self {
        Term::new(TermKind::VarDecl(name.into(), Box::new(value)), Type::Void)
    }
    pub fn assign(target: Term, value: Term) -> Self {
        Term::new(TermKind::Assign(Box::new(target), Box::new(value)), Type::Void)
    }
    pub fn ret(value: Option<Term>) -> Self {
        Term::new(TermKind::Return(value.map(Box::new)), Type::Void)
    }
    pub fn loop_(body: Term) -> Self {
        Term::new(TermKind::Loop(Box::new(body)), Type::Void)
    }
    pub fn break_() -> Self {
        Term::new(TermKind::Break, Type::Void)
    }
    pub fn region(name: Option<&str>, body: Term) -> Self {
        let ty = body.ty.clone();
        Term::new(TermKind::Region(name.map(str::to_owned), Box::new(body)), ty)
    }
    pub fn from_region(region: impl Into<String>, body: Term) -> Self {
        let ty = body.ty.clone();
        Term::new(TermKind::From(region.into(), Box::new(body)), ty)
    }
    pub fn async_(body: Term) -> Self {
        Term::new(TermKind::Async(Box::new(body)), Type::Void)
    }
    pub fn invoke(function: impl Into<String>, args: Vec<Term>, ty: Type) -> Self {
        Term::new(TermKind::Invoke(function.into(), args), ty)
    }
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, params: Vec<(&str, Type)>, ret: Type, body: Term) -> Self {
        let params =
            params.into_iter().map(|(name, ty)| Param { name: name.to_owned(), ty }).collect();
        FunctionDecl { name: name.into(), params, ret, body, span: Span::dummy() }
    }
}
