//! asksql — explore a SQLite database in plain words
//!
//! # Usage
//!
//! ```bash
//! # Translate and run
//! asksql -d library.sqlite ask show books under 20
//!
//! # Translate only, against a schema snapshot
//! asksql --schema-file library.json ask find rowling in author --dry-run
//!
//! # Direct query box
//! asksql -d library.sqlite sql "SELECT * FROM Book LIMIT 3"
//! ```

use anyhow::Context;
use asksql::prelude::*;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "asksql")]
#[command(version)]
#[command(about = "Ask a SQLite database in plain words", long_about = None)]
#[command(after_help = "EXAMPLES:
    asksql -d library.sqlite ask show all books
    asksql -d library.sqlite ask books under 20 sort by title
    asksql -d library.sqlite ask how many authors
    asksql -d library.sqlite sql 'SELECT * FROM Book LIMIT 3'
    asksql -d library.sqlite schema --json > library.json")]
struct Cli {
    /// SQLite file or sqlite: URL
    #[arg(short, long, env = "ASKSQL_DATABASE", global = true)]
    database: Option<String>,

    /// JSON schema snapshot, used when no database is given
    #[arg(long, global = true)]
    schema_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Configuration file (default: <config dir>/asksql/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a free-text request and run it
    Ask {
        /// The request, e.g. "newest orders"
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,

        /// Don't execute, just show the generated SQL
        #[arg(long)]
        dry_run: bool,
    },
    /// Run SQL directly
    Sql {
        query: String,

        /// Allow statements that modify the database
        #[arg(long)]
        allow_write: bool,
    },
    /// Show tables, columns and foreign keys
    Schema {
        /// Print a JSON snapshot usable with --schema-file
        #[arg(long)]
        json: bool,
    },
    /// Preview the newest rows of a table
    Peek { table: String },
    /// Interactive mode
    Repl,
}

/// A loaded database (or snapshot) and the translator over its schema.
struct Session {
    db: Option<Database>,
    translator: Translator,
    format: OutputFormat,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ASKSQL_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let Some(command) = &cli.command else {
        println!("{}", "asksql — ask your database in plain words".cyan().bold());
        println!();
        println!("Usage: asksql [OPTIONS] <COMMAND>");
        println!();
        println!("Try: asksql --help");
        return Ok(());
    };

    let allow_write = matches!(command, Commands::Sql { allow_write: true, .. });
    let session = Session::open(&cli, &config, allow_write).await?;

    match command {
        Commands::Ask { words, dry_run } => session.ask(&words.join(" "), *dry_run, cli.verbose).await,
        Commands::Sql { query, allow_write } => session.sql(query, *allow_write).await,
        Commands::Schema { json: true } => {
            println!("{}", session.translator.schema().to_json()?);
            Ok(())
        }
        Commands::Schema { json: false } => {
            show_schema(session.translator.schema());
            Ok(())
        }
        Commands::Peek { table } => {
            let sql = session
                .translator
                .schema()
                .quick_select(table)
                .with_context(|| format!("No table named '{}'", table))?;
            session.run_sql(&sql).await
        }
        Commands::Repl => session.repl().await,
    }
}

impl Session {
    async fn open(cli: &Cli, config: &Config, allow_write: bool) -> anyhow::Result<Self> {
        let format = cli.format.or(config.format).unwrap_or_default();
        let target = cli.database.clone().or_else(|| config.database.clone());

        if let Some(target) = target {
            let options = DatabaseOptions {
                read_only: !allow_write,
                max_connections: config.max_connections.unwrap_or(1),
            };
            let db = Database::connect(&target, options).await?;
            let schema = db.schema().await?;
            return Ok(Self {
                db: Some(db),
                translator: Translator::with_schema(schema),
                format,
            });
        }

        let schema = match cli.schema_file.as_ref().or(config.schema_file.as_ref()) {
            Some(path) => Schema::from_json_file(path)?,
            None => Schema::new(),
        };
        Ok(Self {
            db: None,
            translator: Translator::with_schema(schema),
            format,
        })
    }

    async fn ask(&self, request: &str, dry_run: bool, verbose: bool) -> anyhow::Result<()> {
        if verbose {
            println!("{} {}", "Input:".dimmed(), request.yellow());
        }

        let sql = self.translator.translate(request);
        println!("{}", "Generated SQL:".green().bold());
        println!("{}", sql.white());

        if dry_run {
            return Ok(());
        }
        ensure_read_only(&sql)?;
        if self.db.is_none() {
            println!();
            println!(
                "{}",
                "⚠ No database. Use --database or set ASKSQL_DATABASE".yellow()
            );
            return Ok(());
        }

        println!();
        self.run_sql(&sql).await
    }

    async fn sql(&self, query: &str, allow_write: bool) -> anyhow::Result<()> {
        let db = self.database()?;

        if !allow_write || is_read_only(query) {
            ensure_read_only(query)?;
            return self.run_sql(query).await;
        }

        let affected = db.execute(query).await?;
        println!("{} {} rows affected", "✓".green(), affected);
        Ok(())
    }

    async fn run_sql(&self, sql: &str) -> anyhow::Result<()> {
        let output = self.database()?.fetch_all(sql).await?;
        format_output(&output, self.format)?;
        Ok(())
    }

    fn database(&self) -> anyhow::Result<&Database> {
        self.db
            .as_ref()
            .context("No database. Use --database or set ASKSQL_DATABASE")
    }

    async fn repl(&self) -> anyhow::Result<()> {
        println!("{}", "asksql — interactive mode".cyan().bold());
        println!(
            "{}",
            "Type a request, ':sql <query>', ':schema', or ':quit'.".dimmed()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{}", "ask> ".cyan().bold());
            std::io::Write::flush(&mut std::io::stdout())?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();

            let result = match line {
                "" => continue,
                ":quit" | ":q" | "exit" => break,
                ":schema" => {
                    show_schema(self.translator.schema());
                    Ok(())
                }
                _ => match line.strip_prefix(":sql ") {
                    Some(query) => self.sql(query, false).await,
                    None => self.ask(line, false, false).await,
                },
            };

            if let Err(e) = result {
                eprintln!("{} {:#}", "Could not run that query:".red(), e);
            }
            println!();
        }

        Ok(())
    }
}

fn format_output(output: &QueryOutput, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output.records())?);
        }
        OutputFormat::Table => {
            if output.rows.is_empty() {
                println!("{}", "(no results)".dimmed());
            } else {
                print_table(output);
            }
            println!();
            println!(
                "{} row(s) returned in {:.2} ms",
                output.rows.len().to_string().cyan(),
                output.elapsed.as_secs_f64() * 1000.0
            );
        }
    }
    Ok(())
}

fn print_table(output: &QueryOutput) {
    let cells: Vec<Vec<String>> = output
        .rows
        .iter()
        .map(|row| row.iter().map(val_to_string).collect())
        .collect();

    // Calculate column widths
    let mut widths: Vec<usize> = output.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header: Vec<String> = output
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:width$}", c, width = *w))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", sep.join("─┼─").dimmed());

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:width$}", v, width = *w))
            .collect();
        println!("{}", line.join(" │ "));
    }
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}

fn show_schema(schema: &Schema) {
    if schema.is_empty() {
        println!("{}", "(no tables)".dimmed());
        return;
    }

    for table in schema.tables() {
        println!("{}", table.name.cyan().bold());
        for col in &table.columns {
            let col_type = if col.col_type.is_empty() { "?" } else { col.col_type.as_str() };
            let key = if col.primary_key { "PK".yellow().to_string() } else { String::new() };
            println!("  {:24} {:16} {}", col.name.white(), col_type.dimmed(), key);
        }
        for fk in &table.foreign_keys {
            println!(
                "  {} {} → {}.{}",
                "FK".magenta(),
                fk.column,
                fk.target_table.cyan(),
                fk.target_column
            );
        }
        println!();
    }
}
