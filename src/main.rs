use anyhow::Result;
use clap::{Parser, Subcommand};
use gitkit::areas::repository::Repository;
use gitkit::artifacts::objects::object_type::ObjectType;
use gitkit::telemetry;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gitkit",
    version = "0.1.0",
    about = "A git-compatible content-addressable storage engine",
    long_about = "gitkit reads and writes repositories in git's on-disk format: \
    loose objects, the index, references, status and checkout. \
    Set GITKIT_LOG (e.g. GITKIT_LOG=debug) to see what it does under the hood.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
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
        long_about = "This command initializes a new repository in the current directory or at the specified path. \
        The path must not exist yet or be an empty directory."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(name = "add", about = "Add file contents to the index")]
    Add {
        #[arg(required = true, help = "Files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "rm", about = "Remove files from the worktree and the index")]
    Rm {
        #[arg(long, help = "Only remove the files from the index")]
        cached: bool,
        #[arg(required = true, help = "Files to remove")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Record the index as a new commit",
        long_about = "This command creates a new commit in the repository with the specified commit message. \
        The author is read from GIT_AUTHOR_NAME / GIT_AUTHOR_EMAIL or from the user's git config."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status {
        #[arg(long, help = "Give the output in an easy-to-parse format")]
        porcelain: bool,
    },
    #[command(
        name = "checkout",
        about = "Write a commit or tree into an empty directory"
    )]
    Checkout {
        #[arg(index = 1, help = "The commit or tree to check out")]
        commit: String,
        #[arg(index = 2, help = "The empty (or missing) directory to write to")]
        path: PathBuf,
    },
    #[command(name = "tag", about = "List tags or create one")]
    Tag {
        #[arg(short = 'a', help = "Create an annotated tag object")]
        annotate: bool,
        #[arg(short, long, help = "The tag message (implies -a)")]
        message: Option<String>,
        #[arg(index = 1, help = "The new tag's name")]
        name: Option<String>,
        #[arg(index = 2, default_value = "HEAD", help = "The object the tag points to")]
        object: String,
    },
    #[command(
        name = "cat-file",
        visible_alias = "cat-object",
        about = "Print the content of an object",
        long_about = "This command prints the raw payload of an object of the given type, \
        or a human-readable rendering of any object with -p."
    )]
    CatFile {
        #[arg(short = 'p', value_name = "OBJECT", help = "Pretty-print the object")]
        pretty: Option<String>,
        #[arg(index = 1, required_unless_present = "pretty", help = "Expected object type")]
        object_type: Option<String>,
        #[arg(index = 2, required_unless_present = "pretty", help = "The object to print")]
        object: Option<String>,
    },
    #[command(
        name = "hash-object",
        about = "Hash an object and optionally write it to the object database",
        long_about = "This command hashes a file as an object of the given type and can write it to the object database. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(short = 't', default_value = "blob", help = "The object type")]
        object_type: String,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree object")]
    LsTree {
        #[arg(short, help = "Recurse into subtrees")]
        recursive: bool,
        #[arg(index = 1, help = "The tree-ish to list")]
        tree: String,
    },
    #[command(name = "show-ref", visible_alias = "show-refs", about = "List references")]
    ShowRef,
    #[command(name = "rev-parse", about = "Resolve a name to an object id")]
    RevParse {
        #[arg(long = "type", help = "Peel the object to this type")]
        object_type: Option<String>,
        #[arg(index = 1, help = "The name to resolve")]
        name: String,
    },
    #[command(name = "branch", about = "List branches or create one")]
    Branch {
        #[arg(index = 1, help = "The new branch's name")]
        name: Option<String>,
        #[arg(index = 2, help = "The commit the branch starts at (default HEAD)")]
        start: Option<String>,
    },
    #[command(name = "log", about = "Show commit history")]
    Log {
        #[arg(index = 1, help = "The commit to start from (default HEAD)")]
        commit: Option<String>,
    },
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;

    if let Commands::Init { path } = &cli.command {
        let path = path.clone().unwrap_or(pwd);
        let repository = Repository::init(&path, Box::new(std::io::stdout()))?;
        repository.writer().flush()?;
        return Ok(());
    }

    let repository = Repository::find(&pwd, Box::new(std::io::stdout()))?;
    run(&repository, cli.command)?;
    repository.writer().flush()?;

    Ok(())
}

fn run(repository: &Repository, command: Commands) -> Result<()> {
    match command {
        Commands::Init { .. } => anyhow::bail!("init cannot run inside a located repository"),
        Commands::Add { paths } => repository.add(&paths)?,
        Commands::Rm { cached, paths } => repository.rm(&paths, cached)?,
        Commands::Commit { message } => {
            repository.commit(&message)?;
        }
        Commands::Status { porcelain } => repository.status(porcelain)?,
        Commands::Checkout { commit, path } => repository.checkout(&commit, &path)?,
        Commands::Tag {
            annotate,
            message,
            name,
            object,
        } => match name {
            Some(name) => {
                let annotated = annotate || message.is_some();
                repository.create_tag(&name, &object, annotated, message.as_deref())?;
            }
            None => repository.list_tags()?,
        },
        Commands::CatFile {
            pretty,
            object_type,
            object,
        } => match (pretty, object_type, object) {
            (Some(object), _, _) => repository.pretty_print(&object)?,
            (None, Some(object_type), Some(object)) => {
                repository.cat_file(ObjectType::try_from(object_type.as_str())?, &object)?
            }
            _ => anyhow::bail!("cat-file needs <type> <object> or -p <object>"),
        },
        Commands::HashObject {
            write,
            object_type,
            file,
        } => repository.hash_object(&file, ObjectType::try_from(object_type.as_str())?, write)?,
        Commands::LsTree { recursive, tree } => repository.ls_tree(&tree, recursive)?,
        Commands::ShowRef => repository.show_ref()?,
        Commands::RevParse { object_type, name } => {
            let object_type = object_type
                .map(|object_type| ObjectType::try_from(object_type.as_str()))
                .transpose()?;
            repository.rev_parse(&name, object_type)?
        }
        Commands::Branch { name, start } => match name {
            Some(name) => repository.branch(&name, start.as_deref())?,
            None => repository.list_branches()?,
        },
        Commands::Log { commit } => repository.log(commit.as_deref())?,
    }

    Ok(())
}
