use std::{
    error::Error,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tracing::warn;
use tracing_subscriber::EnvFilter;

use unitops::{
    action::{ActionRequest, ActionRunner},
    cli::{Cli, Commands, parse_args},
    install::UnitInstaller,
    journal::Journal,
    logs,
    template::TemplateVars,
};

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();
    init_logging(&args);

    let abort = Arc::new(AtomicBool::new(false));
    register_signal_handler(Arc::clone(&abort))?;

    match args.command {
        Commands::Install {
            service,
            template,
            install_dir,
            app,
        } => {
            let vars = TemplateVars { install_dir, app };
            UnitInstaller::new().install(&service, &template, &vars)?;
        }
        Commands::Remove { service } => {
            let runner = ActionRunner::new(Arc::clone(&abort));
            UnitInstaller::new().remove(&service, &runner)?;
        }
        Commands::Run {
            service,
            action,
            line_match,
            log_path,
            timeout,
            length,
        } => {
            let request = ActionRequest {
                service,
                action,
                line_match,
                log_source: log_path,
                timeout_secs: timeout,
                error_log_lines: length,
            };
            ActionRunner::new(Arc::clone(&abort)).run(&request)?;
        }
        Commands::Logs {
            service,
            log_path,
            lines,
        } => {
            logs::show_logs(&Journal::default(), &service, log_path.as_deref(), lines)?;
        }
    }

    Ok(())
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Wires Ctrl-C to the abort flag, so an interrupted readiness wait still
/// cancels its follower before the process exits.
fn register_signal_handler(abort: Arc<AtomicBool>) -> Result<(), Box<dyn Error>> {
    ctrlc::set_handler(move || {
        warn!("Interrupt received; aborting wait");
        abort.store(true, Ordering::SeqCst);
    })?;

    Ok(())
}
