//! The stages a module passes through on its way to C.

use crate::err::Result;
use helix_cgen::{EmitOptions, Emitter, syntax::CUnit};
use helix_flow::{FlowChecker, FlowOut};
use helix_syntax::{ExprId, Formatter, Lowerer, Program, tree::Module};
use helix_utils::prelude::*;
use std::path::{Path, PathBuf};

/// A typed module as delivered by the front end.
#[derive(Debug)]
pub struct Source {
    pub path: Option<PathBuf>,
    pub module: Module,
}

impl Source {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::trace!("loading {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let module = serde_json::from_str(&text)?;
        Ok(Source { path: Some(path.to_path_buf()), module })
    }
    pub fn from_module(module: Module) -> Self {
        Source { path: None, module }
    }
    pub fn lower(self) -> Result<Lowered> {
        let Source { path, module } = self;
        let mut lowerer = Lowerer::new(module);
        if let Some(path) = &path {
            lowerer = lowerer.with_path(path.clone());
        }
        let program = lowerer.run()?;
        log::debug!("lowered {} expressions", program.exprs.len());
        Ok(Lowered { path, program })
    }
}

#[derive(Debug)]
pub struct Lowered {
    pub path: Option<PathBuf>,
    pub program: Program,
}

impl Lowered {
    pub fn check(self) -> Result<Checked> {
        let Lowered { path, program } = self;
        let flow = FlowChecker::new(&program).run()?;
        Ok(Checked { path, program, flow })
    }
}

/// A program whose lifetimes are resolved.
#[derive(Debug)]
pub struct Checked {
    pub path: Option<PathBuf>,
    pub program: Program,
    pub flow: FlowOut,
}

impl Checked {
    pub fn emit(&self, options: EmitOptions) -> Result<CUnit> {
        Ok(Emitter::new(&self.program, &self.flow).with_options(options).run()?)
    }
    pub fn compile(&self, options: EmitOptions) -> Result<String> {
        Ok(self.emit(options)?.render()?)
    }
    /// The program annotated with the lifetime bounds of every expression,
    /// followed by the roots picked at run time.
    pub fn dump(&self, width: usize) -> String {
        let annotate = |id: &ExprId| self.flow.annotate(id);
        let f = Formatter::annotated(&self.program, &annotate);
        let mut s = self.program.pretty_print(&f, width);
        let mut roots: Vec<_> = self.flow.runtime_roots.iter().map(|(_, root)| root).collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name));
        for root in roots {
            let candidates: Vec<_> = (root.candidates.iter())
                .map(|c| self.flow.region_name(c).unwrap_or("?").to_string())
                .collect();
            s += &format!(
                "// {:?} {} = region_min({}) at {}\n",
                root.kind,
                root.name,
                candidates.join(", "),
                root.span
            );
        }
        s
    }
}
