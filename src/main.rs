use clap::Parser;
use miette::Result;
use plantree::cli::{helpers::find_workspace, Cli, Commands};
use plantree::core::{logging, Config};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let workspace_dir = find_workspace(&global).ok().map(|ws| ws.dir());
    let config = Config::load(workspace_dir.as_deref());
    logging::init(global.verbose, config.log_level());
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    match cli.command {
        Commands::Init(args) => plantree::cli::commands::init::run(args, &global),
        Commands::Validate(args) => plantree::cli::commands::validate::run(args, &global),
        Commands::Tree(cmd) => plantree::cli::commands::tree::run(cmd, &global),
        Commands::Mtype(cmd) => plantree::cli::commands::mtype::run(cmd, &global),
        Commands::Unit(cmd) => plantree::cli::commands::unit::run(cmd, &global),
        Commands::Cond(cmd) => plantree::cli::commands::cond::run(cmd, &global),
        Commands::Event(cmd) => plantree::cli::commands::event::run(cmd, &global),
        Commands::Completions(args) => plantree::cli::commands::completions::run(args),
    }
}
