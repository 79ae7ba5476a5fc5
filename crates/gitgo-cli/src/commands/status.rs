use anyhow::{bail, Result};
use gitgo_index::Index;
use gitgo_repository::Repository;

pub fn run(repo: &Repository) -> Result<i32> {
    let Some(mut index) = Index::hold_for_update(repo.index_path())? else {
        bail!(
            "unable to create '{}': file exists",
            repo.index_path().with_extension("lock").display()
        );
    };

    let status = gitgo_status::scan(&mut index, repo.root())?;
    print!("{}", status.render());

    index.write_update()?;
    Ok(0)
}
