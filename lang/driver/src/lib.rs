//! The helix build pipeline: a typed module is lowered, flow-checked for
//! region safety, and emitted as C against the region runtime.

pub mod conf;
pub mod err;
pub mod pack;


pub use conf::Conf;
pub use err::*;
pub use pack::{Checked, Lowered, Source};

use helix_cgen::EmitOptions;
use sculptor::{FileIO, ProjectInfo};
use std::path::Path;

pub struct BuildSystem {
    /// configuration
    pub conf: Conf,
}

impl Default for BuildSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildSystem {
    /// Load the user configuration, falling back to (and saving) the
    /// defaults when there is none.
    pub fn new() -> Self {
        let path = Conf::config_dir().join("helix.toml");
        let file_conf = FileIO::new(path.clone());
        let conf = file_conf.load().unwrap_or_else(|_| {
            log::warn!("Using default configuration; suppose to find one at `{}`.", path.display());
            let conf: Conf = Default::default();
            if let Err(err) = file_conf.save(&conf) {
                log::warn!("Could not save the default configuration: {}", err);
            }
            conf
        });
        Self { conf }
    }
    pub fn with_conf(conf: Conf) -> Self {
        Self { conf }
    }
    pub fn options(&self) -> EmitOptions {
        let Conf { runtime_header, emit_line_comments, emit_prelude } = self.conf.clone();
        EmitOptions { runtime_header, line_comments: emit_line_comments, prelude: emit_prelude }
    }
}

impl BuildSystem {
    pub fn check(&self, source: Source) -> Result<Checked> {
        source.lower()?.check()
    }
    pub fn compile(&self, source: Source) -> Result<String> {
        self.check(source)?.compile(self.options())
    }
    pub fn check_file(&self, path: impl AsRef<Path>) -> Result<Checked> {
        self.check(Source::load(path)?)
    }
    pub fn build_file(&self, path: impl AsRef<Path>) -> Result<String> {
        self.compile(Source::load(path)?)
    }
    pub fn dump_file(&self, path: impl AsRef<Path>, width: usize) -> Result<String> {
        Ok(self.check_file(path)?.dump(width))
    }
}
