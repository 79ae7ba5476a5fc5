pub mod add;
pub mod cat_file;
pub mod commit;
pub mod init;
pub mod status;

use anyhow::Result;
use clap::Subcommand;
use gitgo_repository::Repository;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty gitgo repository
    Init(init::InitArgs),
    /// Add file contents to the index
    Add(add::AddArgs),
    /// Record changes to the repository
    Commit,
    /// Print the content of a repository object
    CatFile(cat_file::CatFileArgs),
    /// Show the working tree status
    Status,
    /// Print usage information
    Help,
}

pub fn run(command: &Commands) -> Result<i32> {
    if let Commands::Init(args) = command {
        return init::run(args);
    }
    if let Commands::Help = command {
        print_help();
        return Ok(0);
    }

    let root = std::env::current_dir()?;
    let repo = Repository::open(&root)?;

    match command {
        Commands::Init(_) | Commands::Help => unreachable!(),
        Commands::Add(args) => add::run(args, &repo),
        Commands::Commit => commit::run(&repo),
        Commands::CatFile(args) => cat_file::run(args, &repo),
        Commands::Status => status::run(&repo),
    }
}

fn print_help() {
    use clap::CommandFactory;
    print!("{}", crate::Cli::command().render_help());
}
