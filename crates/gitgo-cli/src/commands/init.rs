use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use gitgo_repository::Repository;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to create the repository in (defaults to the current directory)
    directory: Option<PathBuf>,
}

pub fn run(args: &InitArgs) -> Result<i32> {
    let target = match &args.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let repo = Repository::init(&target)?;

    let display =
        std::fs::canonicalize(repo.git_dir()).unwrap_or_else(|_| repo.git_dir().to_path_buf());
    println!("Initialized empty Gitgo repository in {}", display.display());

    Ok(0)
}
