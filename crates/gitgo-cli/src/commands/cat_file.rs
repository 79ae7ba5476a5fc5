use std::io::{self, Write};

use anyhow::{bail, Result};
use clap::Args;
use gitgo_hash::ObjectId;
use gitgo_repository::Repository;

#[derive(Args)]
pub struct CatFileArgs {
    /// Object id to print
    oid: String,
}

pub fn run(args: &CatFileArgs, repo: &Repository) -> Result<i32> {
    let oid = ObjectId::from_hex(&args.oid)
        .map_err(|_| anyhow::anyhow!("not a valid object name '{}'", args.oid))?;

    let Some((_obj_type, payload)) = repo.odb().read_raw(&oid)? else {
        bail!("object not found: {}", oid.to_hex());
    };

    io::stdout().write_all(&payload)?;
    Ok(0)
}
