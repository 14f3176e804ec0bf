use aurget::config::{Config, DEFAULT_AUR_URL, DEFAULT_PACMAN_CONF};
use aurget::manager::Helper;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "aurget", version, about = "Fetch AUR snapshots and their missing dependencies")]
struct Cli {
    /// Download targets; pass twice to also fetch AUR dependencies
    #[arg(short = 'd', long, action = ArgAction::Count)]
    download: u8,

    #[arg(short = 'i', long)]
    info: bool,

    #[arg(short = 's', long)]
    search: bool,

    /// List installed packages not found in any sync repository
    #[arg(short = 'f', long)]
    foreign: bool,

    /// Directory to download into (defaults to the current directory)
    #[arg(short = 't', long)]
    target: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_PACMAN_CONF)]
    config: PathBuf,

    #[arg(long, default_value = DEFAULT_AUR_URL)]
    aur_url: String,

    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    #[arg(short = 'q', long)]
    quiet: bool,

    targets: Vec<String>,
}

impl Cli {
    fn to_config(&self) -> Config {
        Config {
            download_dir: self.target.clone(),
            pacman_conf: self.config.clone(),
            aur_url: self.aur_url.clone(),
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.to_config();

    env_logger::builder()
        .filter_level(config.log_level())
        .format_timestamp(None)
        .init();

    let helper = Helper::new(config)?;

    if cli.foreign {
        for (name, version) in helper.foreign() {
            if cli.quiet {
                println!("{}", name);
            } else {
                println!("{} {}", name, version);
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    if cli.targets.is_empty() {
        println!("No targets specified (use -d, -i, -s or -f)");
        return Ok(ExitCode::FAILURE);
    }

    if cli.search {
        for pkg in &helper.search(&cli.targets) {
            println!("aur/{} {} ({})", pkg.name, pkg.version, pkg.num_votes);
            if !cli.quiet {
                println!("    {}", pkg.description.as_deref().unwrap_or_default());
            }
        }
    } else if cli.info {
        for pkg in helper.info(&cli.targets) {
            println!("{:<14} {}", "Name", pkg.name);
            println!("{:<14} {}", "Version", pkg.version);
            println!("{:<14} {}", "URL", pkg.url.as_deref().unwrap_or("None"));
            for kind in aurdeps::DepKind::ALL {
                let deps: Vec<&str> = pkg.deps(kind).iter().map(String::as_str).collect();
                let shown = if deps.is_empty() { "None".to_string() } else { deps.join("  ") };
                println!("{:<14} {}", kind, shown);
            }
            println!("{:<14} {}", "Votes", pkg.num_votes);
            println!("{:<14} {}", "Description", pkg.description.as_deref().unwrap_or_default());
            println!();
        }
    } else if cli.download > 0 {
        let failed = helper.download(&cli.targets, cli.download > 1)?;
        if failed > 0 {
            return Ok(ExitCode::FAILURE);
        }
    } else {
        println!("No operation specified (use -d, -i, -s or -f)");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
