use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use vds_repo::{
    ExpectedId, HistoryOptions, LogicalPath, Object, Repository, Signature, WriteRequest,
};
use vds_server::{ServerConfig, VdsServer};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_ref())?;
    if let Some(repo) = &cli.repo {
        config.repo_path = repo.clone();
    }
    let ctx = Session { config, format: cli.format };

    match cli.command {
        Command::Init => cmd_init(&ctx),
        Command::Cat(args) => cmd_cat(&ctx, args),
        Command::Ls(args) => cmd_ls(&ctx, args),
        Command::Log(args) => cmd_log(&ctx, args),
        Command::Put(args) => cmd_put(&ctx, args),
        Command::Serve(args) => cmd_serve(ctx, args),
    }
}

struct Session {
    config: ServerConfig,
    format: OutputFormat,
}

impl Session {
    fn open(&self) -> anyhow::Result<Repository> {
        Repository::open(&self.config.repo_path, self.config.repo.clone())
            .with_context(|| format!("opening {}", self.config.repo_path.display()))
    }

    fn json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn parse_path(raw: &str) -> anyhow::Result<LogicalPath> {
    // Accept `docs/a.md` as shorthand for `/docs/a.md`.
    let raw = if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{raw}")
    };
    Ok(LogicalPath::parse(&raw)?)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(ctx: &Session) -> anyhow::Result<()> {
    let root = &ctx.config.repo_path;
    Repository::init(root, ctx.config.repo.clone())
        .with_context(|| format!("initializing {}", root.display()))?;
    if ctx.json() {
        print_json(&json!({ "path": root }))
    } else {
        println!(
            "{} Initialized empty repository in {}",
            "✓".green().bold(),
            root.display().to_string().bold()
        );
        Ok(())
    }
}

fn cmd_cat(ctx: &Session, args: CatArgs) -> anyhow::Result<()> {
    let repo = ctx.open()?;
    let path = parse_path(&args.path)?;
    if ctx.json() {
        return print_json(&repo.view(&path, args.at, false)?);
    }
    match repo.resolve(&path, args.at)?.object {
        Object::Blob(blob) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&blob.data)?;
            stdout.flush()?;
            Ok(())
        }
        Object::Tree(_) => bail!("{} is a directory (use `vds ls`)", path.as_directory()),
    }
}

fn cmd_ls(ctx: &Session, args: LsArgs) -> anyhow::Result<()> {
    let repo = ctx.open()?;
    let path = parse_path(&args.path)?;
    let entries = repo.list(&path, args.at)?;
    if ctx.json() {
        return print_json(&entries);
    }
    for entry in &entries {
        let id = entry.id.short_hex().dimmed();
        if entry.is_dir {
            println!("{id}  {}", format!("{}/", entry.name).blue().bold());
        } else {
            println!("{id}  {}", entry.name);
        }
    }
    Ok(())
}

fn cmd_log(ctx: &Session, args: LogArgs) -> anyhow::Result<()> {
    let repo = ctx.open()?;
    let path = parse_path(&args.path)?;
    let options = HistoryOptions {
        limit: args.limit,
        ..repo.config().history_options()
    };
    let history = repo.history(&path, args.at, Some(options))?;
    if ctx.json() {
        return print_json(&history);
    }
    if history.entries.is_empty() {
        println!("No history for {path}.");
        return Ok(());
    }
    for entry in &history.entries {
        println!(
            "{}  {}  {} <{}>",
            entry.commit.short_hex().yellow().bold(),
            entry.when.format("%Y-%m-%d %H:%M:%S %z").to_string().dimmed(),
            entry.author.name,
            entry.author.email,
        );
        println!("    {}", entry.message);
    }
    if history.truncated {
        println!("{}", "(history truncated: step budget exhausted)".dimmed());
    }
    Ok(())
}

fn expected_for(args: &PutArgs) -> ExpectedId {
    match (args.expect, args.force) {
        (Some(id), _) => ExpectedId::ExpectId(id),
        (None, true) => ExpectedId::Unchecked,
        (None, false) => ExpectedId::ExpectAbsent,
    }
}

fn read_content(source: &str) -> anyhow::Result<Vec<u8>> {
    let mut content = Vec::new();
    if source == "-" {
        std::io::stdin().lock().read_to_end(&mut content)?;
    } else {
        content = std::fs::read(source).with_context(|| format!("reading {source}"))?;
    }
    Ok(content)
}

fn cmd_put(ctx: &Session, args: PutArgs) -> anyhow::Result<()> {
    let repo = ctx.open()?;
    let path = parse_path(&args.path)?;
    let content = read_content(&args.file)?;

    let mut request = WriteRequest::new(path.clone(), content).expect(expected_for(&args));
    if let Some(message) = &args.message {
        request = request.message(message.clone());
    }
    if args.author_name.is_some() || args.author_email.is_some() {
        let defaults = &repo.config().default_author;
        let author = Signature::now(
            args.author_name.clone().unwrap_or_else(|| defaults.name.clone()),
            args.author_email.clone().unwrap_or_else(|| defaults.email.clone()),
        )?;
        request = request.author(author);
    }

    let outcome = repo.write(&request)?;
    tracing::debug!(attempts = outcome.attempts, "write committed");
    if ctx.json() {
        print_json(&outcome)
    } else {
        println!(
            "{} Wrote {} ({}) in commit {}",
            "✓".green().bold(),
            path.to_string().bold(),
            outcome.id.short_hex().cyan(),
            outcome.commit.short_hex().yellow(),
        );
        Ok(())
    }
}

fn cmd_serve(ctx: Session, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ctx.config;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.cors |= args.cors;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(VdsServer::new(config).serve())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn put_args(argv: &[&str]) -> PutArgs {
        let mut full = vec!["vds", "put", "/a", "f"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Put(args) => args,
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn put_defaults_to_create_only() {
        assert_eq!(expected_for(&put_args(&[])), ExpectedId::ExpectAbsent);
        assert_eq!(expected_for(&put_args(&["--expect-absent"])), ExpectedId::ExpectAbsent);
        assert_eq!(expected_for(&put_args(&["--force"])), ExpectedId::Unchecked);

        let id = vds_types::ObjectId::from_hash([9; 32]);
        let hex = id.to_hex();
        assert_eq!(
            expected_for(&put_args(&["--expect", hex.as_str()])),
            ExpectedId::ExpectId(id)
        );
    }

    #[test]
    fn relative_paths_are_rooted() {
        assert_eq!(parse_path("docs/a.md").unwrap(), parse_path("/docs/a.md").unwrap());
        assert!(parse_path("../etc").is_err());
    }

    #[test]
    fn config_file_and_repo_flag() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("vds.toml");
        std::fs::write(&file, "repo_path = \"/srv/wiki\"\n").unwrap();
        let config = load_config(Some(&file)).unwrap();
        assert_eq!(config.repo_path, PathBuf::from("/srv/wiki"));
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn init_put_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.repo_path = dir.path().join("repo");
        let ctx = Session { config, format: OutputFormat::Json };
        cmd_init(&ctx).unwrap();

        let source = dir.path().join("page.md");
        std::fs::write(&source, "# Page").unwrap();
        let mut args = put_args(&["-m", "first"]);
        args.file = source.display().to_string();
        args.path = "/wiki/page.md".into();
        cmd_put(&ctx, args).unwrap();

        let repo = ctx.open().unwrap();
        let path = parse_path("/wiki/page.md").unwrap();
        match repo.resolve(&path, None).unwrap().object {
            Object::Blob(blob) => assert_eq!(blob.data, b"# Page"),
            other => panic!("expected blob, got {other:?}"),
        }
        let history = repo.history(&path, None, None).unwrap();
        assert_eq!(history.entries[0].message, "first");

        // a second create-only write conflicts
        let mut again = put_args(&[]);
        again.file = source.display().to_string();
        again.path = "/wiki/page.md".into();
        assert!(cmd_put(&ctx, again).is_err());
    }
}
