//! The `shc toolchain` commands.

use std::error::Error;
use std::path::{Path, PathBuf};

use shc_toolchain::{compiler_binary, DxcVersion, LocalReleaseSource, ReleaseSource};

use crate::settings::load_settings;
use crate::{GlobalArgs, ListArgs};

/// Lists the compiler installations under the toolchain directory, newest
/// first.
pub fn list(args: &ListArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let dir = match &args.dir {
        Some(dir) => PathBuf::from(dir),
        None => load_settings(global)?.compiler.toolchain_dir.ok_or(
            "no toolchain directory: pass --dir or set compiler.toolchain_dir in shc.toml",
        )?,
    };

    let installed = installations(&dir)?;
    if installed.is_empty() {
        eprintln!("no dxc installations in {}", dir.display());
    }
    for (version, binary) in &installed {
        println!("{version}\t{}", binary.display());
    }
    Ok(0)
}

/// Installed versions under `dir` with their compiler binaries.
fn installations(dir: &Path) -> Result<Vec<(DxcVersion, PathBuf)>, Box<dyn Error>> {
    let mut source = LocalReleaseSource::new(dir);
    let versions = source.versions()?;
    Ok(versions
        .into_iter()
        .map(|version| (version, compiler_binary(&source.installation_dir(version))))
        .collect())
}
