pub mod cli;

pub use cli::{Cli, Commands};

use helix_driver::{BuildSystem, Result};

/// Run one command, returning what it would print.
pub fn execute(command: Commands, build: &mut BuildSystem) -> Result<Vec<String>> {
    let mut out = Vec::new();
    match command {
        | Commands::Check { files, .. } => {
            for file in files {
                let checked = build.check_file(&file)?;
                out.push(format!(
                    "{}: {} allocations, {} runtime regions",
                    file.display(),
                    checked.flow.allocations.len(),
                    checked.flow.runtime_roots.len()
                ));
            }
        }
        | Commands::Build {
            files,
            out_dir,
            runtime_header,
            no_line_comments,
            no_prelude,
            ..
        } => {
            if let Some(header) = runtime_header {
                build.conf.runtime_header = header;
            }
            build.conf.emit_line_comments &= !no_line_comments;
            build.conf.emit_prelude &= !no_prelude;
            for file in files {
                let c = build.build_file(&file)?;
                match &out_dir {
                    | Some(dir) => {
                        std::fs::create_dir_all(dir)?;
                        let stem = file.file_stem().map(|s| s.to_string_lossy().into_owned());
                        let stem = stem.unwrap_or_else(|| "out".to_string());
                        let target = dir.join(format!("{}.c", stem));
                        std::fs::write(&target, c)?;
                        log::info!("wrote {}", target.display());
                        out.push(format!("{}", target.display()));
                    }
                    | None => out.push(c),
                }
            }
        }
        | Commands::Dump { files, width, .. } => {
            for file in files {
                out.push(build.dump_file(&file, width)?);
            }
        }
    }
    Ok(out)
}
