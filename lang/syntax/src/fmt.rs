//! The formatter traits.

use crate::{arena::*, tree::BinOp, ty::*};
use pretty::RcDoc;

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>)]
pub trait Ugly<'a, Fmter> {
    fn ugly(&self, f: &'a Fmter) -> String;
}

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>)]
pub trait Pretty<'a, Fmter> {
    fn pretty(&self, f: &'a Fmter) -> RcDoc<'a>;
}

/// Annotation attached to an expression when pretty printing, e.g. its
/// lifetime bounds.
pub type Annotate<'a> = dyn Fn(&ExprId) -> Option<String> + 'a;

pub struct Formatter<'a> {
    pub program: &'a Program,
    annotate: Option<&'a Annotate<'a>>,
}

impl<'a> Formatter<'a> {
    pub fn new(program: &'a Program) -> Self {
        Formatter { program, annotate: None }
    }
    pub fn annotated(program: &'a Program, annotate: &'a Annotate<'a>) -> Self {
        Formatter { program, annotate: Some(annotate) }
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for Type {
    fn ugly(&self, f: &'a Formatter) -> String {
        match self {
            | Type::Void => format!("void"),
            | Type::Word => format!("word"),
            | Type::Bool => format!("bool"),
            | Type::Pointer(inner) => format!("*{}", inner.ugly(f)),
            | Type::Struct(name) => name.clone(),
        }
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for BinOp {
    fn ugly(&self, _f: &'a Formatter) -> String {
        match self {
            | BinOp::Add => "+",
            | BinOp::Sub => "-",
            | BinOp::Mul => "*",
            | BinOp::Div => "/",
            | BinOp::Lt => "<",
            | BinOp::Le => "<=",
            | BinOp::Eq => "==",
            | BinOp::Ne => "!=",
            | BinOp::And => "and",
            | BinOp::Or => "or",
        }
        .to_string()
    }
}

/// One-line rendering, nested blocks elided; used in diagnostics and logs.
impl<'a> Ugly<'a, Formatter<'a>> for ExprId {
    fn ugly(&self, f: &'a Formatter) -> String {
        match f.program.kind(self) {
            | ExprKind::Void => format!("void"),
            | ExprKind::Word(n) => format!("{n}"),
            | ExprKind::Bool(b) => format!("{b}"),
            | ExprKind::Var(x) => x.clone(),
            | ExprKind::New(None) => format!("new {}", self.pointee(f)),
            | ExprKind::New(Some(init)) => format!("new {}", init.ugly(f)),
            | ExprKind::Deref(e) => format!("*{}", e.ugly(f)),
            | ExprKind::Member(e, field) => format!("{}.{}", e.ugly(f), field),
            | ExprKind::StructLit(name, fields) => {
                let fields: Vec<_> =
                    fields.iter().map(|(n, e)| format!("{} = {}", n, e.ugly(f))).collect();
                format!("new {} {{ {} }}", name, fields.join(", "))
            }
            | ExprKind::Binary(op, a, b) => format!("({} {} {})", a.ugly(f), op.ugly(f), b.ugly(f)),
            | ExprKind::If(c, _, _) => format!("if {} ..", c.ugly(f)),
            | ExprKind::Block(_) => format!("{{ .. }}"),
            | ExprKind::VarDecl(x, e) => format!("var {} = {}", x, e.ugly(f)),
            | ExprKind::Assign(a, b) => format!("{} = {}", a.ugly(f), b.ugly(f)),
            | ExprKind::Return(None) => format!("return"),
            | ExprKind::Return(Some(e)) => format!("return {}", e.ugly(f)),
            | ExprKind::Loop(_) => format!("loop .."),
            | ExprKind::Break => format!("break"),
            | ExprKind::Region(Some(name), _) => format!("region {} ..", name),
            | ExprKind::Region(None, _) => format!("region .."),
            | ExprKind::From(name, _) => format!("from {} do ..", name),
            | ExprKind::Async(_) => format!("async .."),
            | ExprKind::Invoke(func, args) => {
                let args: Vec<_> = args.iter().map(|a| a.ugly(f)).collect();
                format!("{}({})", func, args.join(", "))
            }
        }
    }
}

impl ExprId {
    fn pointee(&self, f: &Formatter) -> String {
        let ty = f.program.ty(self);
        ty.pointee().map(|ty| ty.ugly(f)).unwrap_or_else(|| ty.ugly(f))
    }
}

impl<'a> Pretty<'a, Formatter<'a>> for ExprId {
    fn pretty(&self, f: &'a Formatter) -> RcDoc<'a> {
        let nested = |head: String, body: &ExprId| {
            RcDoc::text(head)
                .append(RcDoc::space())
                .append(body.pretty(f))
        };
        let doc = match f.program.kind(self) {
            | ExprKind::Block(stmts) => RcDoc::text("{")
                .append(
                    RcDoc::concat(
                        stmts.iter().map(|s| RcDoc::line().append(s.pretty(f)).append(";")),
                    )
                    .nest(4),
                )
                .append(RcDoc::line())
                .append(RcDoc::text("}"))
                .group(),
            | ExprKind::If(c, t, e) => {
                let doc = nested(format!("if {} then", c.ugly(f)), t);
                match e {
                    | Some(e) => doc.append(RcDoc::space()).append(nested(format!("else"), e)),
                    | None => doc,
                }
            }
            | ExprKind::VarDecl(x, e) => nested(format!("var {} =", x), e),
            | ExprKind::Loop(body) => nested(format!("loop"), body),
            | ExprKind::Region(Some(name), body) => nested(format!("region {}", name), body),
            | ExprKind::Region(None, body) => nested(format!("region"), body),
            | ExprKind::From(name, body) => nested(format!("from {} do", name), body),
            | ExprKind::Async(body) => nested(format!("async"), body),
            | _ => RcDoc::text(self.ugly(f)),
        };
        match f.annotate.and_then(|annotate| annotate(self)) {
            | Some(note) => doc.append(RcDoc::text(format!(" /* {} */", note))),
            | None => doc,
        }
    }
}

impl<'a> Pretty<'a, Formatter<'a>> for FuncId {
    fn pretty(&self, f: &'a Formatter) -> RcDoc<'a> {
        let func = &f.program.functions[self];
        let params: Vec<_> =
            func.params.iter().map(|(x, ty)| format!("{}: {}", x, ty.ugly(f))).collect();
        RcDoc::text(format!("func {}({}) -> {} ", func.name, params.join(", "), func.ret.ugly(f)))
            .append(func.body.pretty(f))
    }
}

impl Program {
    /// Render every function with `width` columns.
    pub fn pretty_print(&self, f: &Formatter, width: usize) -> String {
        let mut s = String::new();
        for (id, _) in self.functions.iter() {
            let mut buf = Vec::new();
            if id.pretty(f).render(width, &mut buf).is_ok() {
                s += &String::from_utf8_lossy(&buf);
                s += "\n";
            }
        }
        s
    }
}
