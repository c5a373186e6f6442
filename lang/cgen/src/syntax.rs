//! The fragment of C the emitter produces.

use std::fmt;

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum CType {
    Named(String),
    Pointer(Box<CType>),
    Struct(String),
}

impl CType {
    pub fn named(name: impl Into<String>) -> Self {
        CType::Named(name.into())
    }
    pub fn pointer(inner: CType) -> Self {
        CType::Pointer(Box::new(inner))
    }
    pub fn region() -> Self {
        CType::pointer(CType::named("Region"))
    }
    pub fn void_ptr() -> Self {
        CType::pointer(CType::named("void"))
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum CExpr {
    Var(String),
    Int(i64),
    Unsigned(u64),
    Call(String, Vec<CExpr>),
    Binary(String, Box<CExpr>, Box<CExpr>),
    Deref(Box<CExpr>),
    AddressOf(Box<CExpr>),
    Member(Box<CExpr>, String),
    Cast(CType, Box<CExpr>),
    SizeOf(CType),
}

impl CExpr {
    pub fn var(name: impl Into<String>) -> Self {
        CExpr::Var(name.into())
    }
    /// The value of a `void` expression.
    pub fn unit() -> Self {
        CExpr::Unsigned(0)
    }
    pub fn call(function: impl Into<String>, args: Vec<CExpr>) -> Self {
        CExpr::Call(function.into(), args)
    }
    pub fn binary(op: impl Into<String>, lhs: CExpr, rhs: CExpr) -> Self {
        CExpr::Binary(op.into(), Box::new(lhs), Box::new(rhs))
    }
    pub fn deref(self) -> Self {
        CExpr::Deref(Box::new(self))
    }
    pub fn address_of(self) -> Self {
        CExpr::AddressOf(Box::new(self))
    }
    pub fn member(self, field: impl Into<String>) -> Self {
        CExpr::Member(Box::new(self), field.into())
    }
    pub fn cast(self, ty: CType) -> Self {
        CExpr::Cast(ty, Box::new(self))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CStmt {
    Decl { ty: CType, name: String, init: Option<CExpr> },
    Assign(CExpr, CExpr),
    Expr(CExpr),
    If { cond: CExpr, then: Vec<CStmt>, els: Vec<CStmt> },
    /// `while (1) { .. }`
    Loop(Vec<CStmt>),
    Break,
    Return(Option<CExpr>),
    Comment(String),
    Empty,
}

impl CStmt {
    pub fn decl(ty: CType, name: impl Into<String>, init: Option<CExpr>) -> Self {
        CStmt::Decl { ty, name: name.into(), init }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CStruct {
    pub name: String,
    pub fields: Vec<(CType, String)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CFunction {
    pub is_static: bool,
    pub ret: CType,
    pub name: String,
    pub params: Vec<(CType, String)>,
    pub body: Vec<CStmt>,
}

/// A complete translation unit, rendered section by section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CUnit {
    pub includes: Vec<String>,
    pub prelude: Vec<String>,
    pub structs: Vec<CStruct>,
    pub functions: Vec<CFunction>,
    /// bodies of `async` blocks
    pub lambdas: Vec<CFunction>,
}

impl CUnit {
    pub fn function(&self, name: &str) -> Option<&CFunction> {
        self.functions.iter().chain(self.lambdas.iter()).find(|f| f.name == name)
    }
}

/* --------------------------------- Display -------------------------------- */

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            | CType::Named(name) => write!(f, "{}", name),
            | CType::Pointer(inner) => write!(f, "{}*", inner),
            | CType::Struct(name) => write!(f, "struct {}", name),
        }
    }
}

fn comma_separated<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for CExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            | CExpr::Var(name) => write!(f, "{}", name),
            | CExpr::Int(n) => write!(f, "{}", n),
            | CExpr::Unsigned(n) => write!(f, "{}U", n),
            | CExpr::Call(function, args) => write!(f, "{}({})", function, comma_separated(args)),
            | CExpr::Binary(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
            | CExpr::Deref(inner) => write!(f, "(*{})", inner),
            | CExpr::AddressOf(inner) => write!(f, "(&{})", inner),
            | CExpr::Member(target, field) => write!(f, "({}.{})", target, field),
            | CExpr::Cast(ty, inner) => write!(f, "({}){}", ty, inner),
            | CExpr::SizeOf(ty) => write!(f, "sizeof({})", ty),
        }
    }
}

const INDENT: &str = "    ";

fn write_block(f: &mut fmt::Formatter, stmts: &[CStmt], level: usize) -> fmt::Result {
    for stmt in stmts {
        stmt.fmt_at(f, level)?;
        writeln!(f)?;
    }
    Ok(())
}

impl CStmt {
    fn fmt_at(&self, f: &mut fmt::Formatter, level: usize) -> fmt::Result {
        let indent = INDENT.repeat(level);
        match self {
            | CStmt::Decl { ty, name, init: None } => write!(f, "{indent}{ty} {name};"),
            | CStmt::Decl { ty, name, init: Some(init) } => {
                write!(f, "{indent}{ty} {name} = {init};")
            }
            | CStmt::Assign(place, value) => write!(f, "{indent}{place} = {value};"),
            | CStmt::Expr(e) => write!(f, "{indent}{e};"),
            | CStmt::If { cond, then, els } => {
                writeln!(f, "{indent}if ({cond}) {{")?;
                write_block(f, then, level + 1)?;
                write!(f, "{indent}}}")?;
                if !els.is_empty() {
                    writeln!(f)?;
                    writeln!(f, "{indent}else {{")?;
                    write_block(f, els, level + 1)?;
                    write!(f, "{indent}}}")?;
                }
                Ok(())
            }
            | CStmt::Loop(body) => {
                writeln!(f, "{indent}while (1) {{")?;
                write_block(f, body, level + 1)?;
                write!(f, "{indent}}}")
            }
            | CStmt::Break => write!(f, "{indent}break;"),
            | CStmt::Return(None) => write!(f, "{indent}return;"),
            | CStmt::Return(Some(e)) => write!(f, "{indent}return {e};"),
            | CStmt::Comment(text) => write!(f, "{indent}// {text}"),
            | CStmt::Empty => Ok(()),
        }
    }
}

impl fmt::Display for CStmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_at(f, 0)
    }
}

impl CStruct {
    pub fn prototype(&self) -> String {
        format!("struct {};", self.name)
    }
}

impl fmt::Display for CStruct {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "struct {} {{", self.name)?;
        for (ty, name) in self.fields.iter() {
            writeln!(f, "{INDENT}{ty} {name};")?;
        }
        write!(f, "}};")
    }
}

impl CFunction {
    fn signature(&self) -> String {
        let params: Vec<_> = self.params.iter().map(|(ty, name)| format!("{ty} {name}")).collect();
        let storage = if self.is_static { "static " } else { "" };
        format!("{storage}{} {}({})", self.ret, self.name, params.join(", "))
    }
    pub fn prototype(&self) -> String {
        format!("{};", self.signature())
    }
}

impl fmt::Display for CFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} {{", self.signature())?;
        write_block(f, &self.body, 1)?;
        write!(f, "}}")
    }
}

impl fmt::Display for CUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut sections: Vec<Vec<String>> = Vec::new();
        sections.push(self.includes.iter().map(|h| format!("#include {}", h)).collect());
        sections.push(self.prelude.clone());
        sections.push(self.structs.iter().map(CStruct::prototype).collect());
        sections.extend(self.structs.iter().map(|s| vec![s.to_string()]));
        sections.push(self.functions.iter().map(CFunction::prototype).collect());
        sections.push(self.lambdas.iter().map(CFunction::prototype).collect());
        sections.extend(self.functions.iter().map(|func| vec![func.to_string()]));
        sections.extend(self.lambdas.iter().map(|func| vec![func.to_string()]));
        let sections: Vec<_> = sections.into_iter().filter(|s| !s.is_empty()).collect();
        for (i, section) in sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for line in section {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}
