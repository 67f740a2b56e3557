//! Kiln CLI
//!
//! Rule-based static site compiler for a blog.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Kiln.
#[derive(Parser)]
#[command(
    name = "kiln",
    version,
    about = "A rule-based static site compiler for blogs"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "kiln.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Compile the site into the output directory
    Build {
        /// Output directory (defaults to build.output_dir)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Keep existing files in the output directory
        #[arg(long)]
        no_clean: bool,
    },
    /// Compile everything without writing, reporting errors and conflicts
    Check,
    /// Print the output path of every content item
    Routes,
    /// Create a new draft article
    New {
        /// Article slug, e.g. my-first-post
        slug: String,
        /// Article title (derived from the slug by default)
        #[arg(short, long)]
        title: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    kiln::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { output, no_clean } => {
            kiln::cmd::build::run(&cli.config, output.as_deref(), no_clean)?;
        }
        Commands::Check => {
            kiln::cmd::check::run(&cli.config)?;
        }
        Commands::Routes => {
            kiln::cmd::routes::run(&cli.config)?;
        }
        Commands::New { slug, title } => {
            kiln::cmd::new::run(&cli.config, &slug, title.as_deref())?;
        }
    }

    Ok(())
}
