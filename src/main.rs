use clap::{Parser, Subcommand};
use image_consts::config::{self, Environment, ImportStyle, Options, ResolvedOptions};
use image_consts::generate;
use image_consts::output;
use image_consts::scan;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "image-consts")]
#[command(about = "Generate a constants module for the images in an asset directory")]
#[command(long_about = "\
Generate a constants module for the images in an asset directory

Every png, jpg, jpeg, gif, svg and webp file under the image directory gets a
constant named after its path, and the generated module exports them all:

  src/assets/images/
  ├── logo.png                     → LOGO_PNG
  ├── logo@2x.png                  → LOGO_AT_2X_PNG
  └── icons/
      └── sub-folder/
          └── my@icon.svg          → ICONS_SUB_FOLDER_MY_AT_ICON_SVG

  // src/assets/r.ts
  import LOGO_PNG from './images/logo.png'
  ...
  const R = { LOGO_PNG, ... }
  export default R

The module is only rewritten when its content changes.
Settings can also live in image-consts.toml in the project root;
run 'image-consts gen-config' to print a documented one.")]
#[command(version)]
struct Cli {
    /// Project root; relative dir/dts are resolved against it [default: cwd]
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Image directory [default: src/assets/images]
    #[arg(long, global = true)]
    dir: Option<String>,

    /// Generated module path [default: src/assets/r.ts]
    #[arg(long, global = true)]
    dts: Option<String>,

    /// Reference style used in the generated module [default: import]
    #[arg(long, value_enum, global = true)]
    import_style: Option<ImportStyle>,

    /// Debounce window for watching, in milliseconds [default: 200]
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

/// Shared watch toggle for the `run` command.
#[derive(clap::Args, Clone)]
struct WatchArgs {
    /// Keep watching after generating
    #[arg(long, overrides_with = "no_watch")]
    watch: bool,
    /// Generate once and exit
    #[arg(long)]
    no_watch: bool,
}

impl WatchArgs {
    fn as_option(&self) -> Option<bool> {
        match (self.watch, self.no_watch) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate the module once
    Generate,
    /// Generate, then regenerate on every change until interrupted
    Watch,
    /// Generate, then watch unless disabled (off when NODE_ENV=production)
    Run(WatchArgs),
    /// Print the constants that would be generated, without writing
    List {
        /// Print the map as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock image-consts.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let run_watch = match &cli.command {
        Command::Run(args) => args.as_option(),
        _ => None,
    };
    let options = Options {
        root: cli.root,
        dir: cli.dir,
        dts: cli.dts,
        watch: run_watch,
        import_style: cli.import_style,
        debounce_ms: cli.debounce_ms,
    };

    match cli.command {
        Command::Generate => {
            let resolved = resolve(&options)?;
            let generation = generate::generate_once(&resolved)?;
            output::print_outcome(
                generation.outcome,
                generation.constants.len(),
                &resolved.dts,
                &resolved.root,
            );
        }
        Command::Watch => {
            let resolved = resolve(&options)?;
            let generation = generate::generate_once(&resolved)?;
            output::print_outcome(
                generation.outcome,
                generation.constants.len(),
                &resolved.dts,
                &resolved.root,
            );
            generate::watch_images(&resolved)?.wait();
        }
        Command::Run(_) => {
            let resolved = resolve(&options)?;
            if let Some(handle) = generate::run_generator(&resolved)? {
                handle.wait();
            }
        }
        Command::List { json } => {
            let resolved = resolve(&options)?;
            let constants = scan::build_constants_map(&resolved.dir);
            if json {
                println!("{}", serde_json::to_string_pretty(&constants)?);
            } else {
                output::print_constants(&constants, &resolved.dir);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Merge flags over the config file and read the environment once.
fn resolve(options: &Options) -> Result<ResolvedOptions, Box<dyn std::error::Error>> {
    let env = Environment::capture()?;
    Ok(options.resolve(&env)?)
}
