use anyhow::Result;
use clap::{Parser, Subcommand};
use rit::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "rit",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A git-compatible storage engine",
    long_about = "A reimplementation of git's storage layer: loose objects, \
    the binary staging index, trees, refs, and diffing. \
    On-disk artifacts are byte-identical to git's.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the SHA of the object to be specified."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object SHA to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash an object and optionally write it to the object database",
        long_about = "This command hashes an object file and can write it to the object database. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "write-tree",
        about = "Write the staged tree objects and print the root tree SHA",
        long_about = "This command builds tree objects from the index and writes them to the \
        object database, printing the root tree SHA."
    )]
    WriteTree,
    #[command(
        name = "ls-tree",
        about = "List the contents of a tree object",
        long_about = "This command lists the entries of a tree object, or, with --recursive, \
        every file under it with its full path."
    )]
    LsTree {
        #[arg(short, long, help = "Recurse into subtrees")]
        recursive: bool,
        #[arg(index = 1, default_value = "HEAD", help = "The tree-ish revision to list")]
        revision: String,
    },
    #[command(
        name = "update-ref",
        about = "Create, update, or delete a ref",
        long_about = "This command points a ref at an object, creating the ref if needed, \
        or deletes it with --delete."
    )]
    UpdateRef {
        #[arg(short, long, help = "Delete the ref instead of updating it")]
        delete: bool,
        #[arg(index = 1, help = "The ref path, e.g. refs/heads/main")]
        r#ref: String,
        #[arg(index = 2, required_unless_present = "delete", help = "The object SHA")]
        sha: Option<String>,
    },
    #[command(
        name = "rev-parse",
        about = "Resolve a revision to a full object SHA",
        long_about = "This command resolves a revision (SHA, abbreviated SHA, HEAD, or ref \
        name) to a full object SHA."
    )]
    RevParse {
        #[arg(index = 1, help = "The revision to resolve")]
        revision: String,
    },
    #[command(
        name = "add",
        about = "Stage files for the next commit",
        long_about = "This command stores blobs for the given files and records them in the \
        index. Directories are expanded recursively."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit in the repository with the specified commit message."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "diff",
        about = "Show content changes",
        long_about = "This command shows changes between the index and the working tree, or, \
        with --cached, between HEAD and the index."
    )]
    Diff {
        #[arg(long, help = "Compare HEAD against the index")]
        cached: bool,
    },
}

fn open_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => {
            let repository = match path {
                Some(path) => Repository::new(path, Box::new(std::io::stdout()))?,
                None => open_repository()?,
            };

            repository.init()?
        }
        Commands::CatFile { sha } => open_repository()?.cat_file(sha)?,
        Commands::HashObject { write, file } => open_repository()?.hash_object(file, *write)?,
        Commands::WriteTree => open_repository()?.write_tree()?,
        Commands::LsTree {
            recursive,
            revision,
        } => open_repository()?.ls_tree(revision, *recursive)?,
        Commands::UpdateRef { delete, r#ref, sha } => {
            let repository = open_repository()?;
            match (delete, sha) {
                (true, _) => repository.delete_ref(r#ref)?,
                (false, Some(sha)) => repository.update_ref(r#ref, sha)?,
                (false, None) => anyhow::bail!("update-ref requires an object SHA"),
            }
        }
        Commands::RevParse { revision } => open_repository()?.rev_parse(revision)?,
        Commands::Add { paths } => open_repository()?.add(paths)?,
        Commands::Commit { message } => open_repository()?.commit(message.as_str())?,
        Commands::Diff { cached } => open_repository()?.diff(*cached)?,
    }

    Ok(())
}
