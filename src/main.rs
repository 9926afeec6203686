use buildsite::config::{self, CONFIG_FILENAME};
use buildsite::output;
use buildsite::site::{self, BuildOptions, SiteError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for command-line usage errors (sysexits `EX_USAGE`).
const USAGE_EXIT_CODE: u8 = 64;

#[derive(Parser)]
#[command(name = "buildsite")]
#[command(version, about = "Build a static HTML site from XML pages with XSLT")]
#[command(long_about = "\
Build a static HTML site from XML pages with XSLT

The build is driven by build_config.xml:

  build_config.xml
  build/
  ├── site.xml          # <site><page href=\"a.xml\"/>...</site>
  ├── a.xml             # <page dest=\"a.html\">...</page>
  └── chapters/one.xml  # hrefs are relative to the build directory
  tools/xslt/
  ├── site2html.xsl     # site.xml → dist/index.html
  └── page2html.xsl     # every page → dist/<dest>

Both stylesheets receive $srcdir and $destdir, set to the absolute build
directory.

Exit status: 1 config, 2 index, 3 page discovery, 4 page transform,
5 cleaning dist, 6 writing the report, 64 bad command line.

Run 'buildsite gen-config' to print a documented build_config.xml.")]
struct Cli {
    /// Build config file; relative paths inside it resolve against its directory
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Log every stylesheet compile and page lookup
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the index and every page (the default)
    Build {
        /// Empty the dist directory first
        #[arg(long)]
        clean: bool,
    },
    /// Load the config and discover pages without transforming anything
    Check {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock build_config.xml with every element documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version come through here too
            return if err.use_stderr() {
                ExitCode::from(USAGE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // --verbose enables DEBUG, otherwise use RUST_LOG or default to INFO
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), SiteError> {
    match cli.command {
        None => build(cli, false),
        Some(Command::Build { clean }) => build(cli, clean),
        Some(Command::Check { json }) => {
            let (config, pages) = site::check_site(&cli.config)?;
            if json {
                let text = output::format_check_json(&config, &pages).map_err(SiteError::Report)?;
                println!("{text}");
            } else {
                output::print_check_output(&config, &pages);
            }
            Ok(())
        }
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_xml());
            Ok(())
        }
    }
}

fn build(cli: &Cli, clean: bool) -> Result<(), SiteError> {
    let report = site::run(&cli.config, &BuildOptions { clean })?;
    output::print_build_output(&report);
    Ok(())
}
