//! A small command line front-end over a ToaruConf configuration.
//!
//! This does not manage any windows. It loads a configuration the same
//! way a host would, and answers the same queries a host would ask,
//! so a config can be checked and poked at before it is used for real.

use std::env;
use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt as logger, fmt::format::FmtSpan, EnvFilter};

use toaruconf::util::spawn::SpawnExecutor;
use toaruconf::{
    ActionDescriptor, ActionExecutionError, ConfigSource, Engine, EventKind, HookContext, WindowMetadata, WindowType,
};

/// Command line arguments.
#[derive(Parser, Debug)]
#[clap(author, about, version, max_term_width = 80)]
struct Options {
    /// Path to the configuration file.
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate the configuration.
    Check,
    /// List every key and mouse binding.
    Keys,
    /// Resolve the placement properties of a window.
    Resolve(WindowArgs),
    /// Print the actions bound to a lifecycle event.
    Dispatch {
        /// The event, e.g. `startup_once` or `client-new`.
        event: String,
        /// Run the actions: spawn commands and print everything else.
        #[clap(long)]
        run: bool,
        #[clap(flatten)]
        window: WindowArgs,
    },
}

/// A window described on the command line.
#[derive(Args, Debug)]
struct WindowArgs {
    /// A WM_CLASS component; may be given more than once.
    #[clap(long = "class")]
    class: Vec<String>,
    /// The window title.
    #[clap(long)]
    title: Option<String>,
    /// Whether the window is transient for another window.
    #[clap(long)]
    transient: bool,
    /// The window type, e.g. `dialog` or `utility`.
    #[clap(long = "type")]
    window_type: Option<String>,
}

impl WindowArgs {
    fn is_empty(&self) -> bool {
        self.class.is_empty() && self.title.is_none() && !self.transient && self.window_type.is_none()
    }

    fn metadata(&self) -> Result<WindowMetadata, Box<dyn Error + Send + Sync>> {
        let mut window = WindowMetadata::new()
            .with_class(self.class.iter().cloned())
            .with_transient(self.transient);
        if let Some(title) = &self.title {
            window = window.with_title(title.as_str());
        }
        if let Some(ty) = &self.window_type {
            let ty: WindowType = ty.parse().map_err(|_| format!("unknown window type `{}`", ty))?;
            window = window.with_type(ty);
        }
        Ok(window)
    }
}

fn default_config_path() -> PathBuf {
    let base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_default();
    base.join("toaruconf").join("config.toml")
}

pub fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // set up the logger
    logger::fmt()
        // only log enter and exit
        .with_span_events(FmtSpan::ACTIVE)
        // RUST_LOG, or warnings only
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        // don't use timestamps
        .without_time()
        // log to stderr so stdout stays parseable
        .with_writer(std::io::stderr)
        // register as global
        .try_init()?;

    let options = Options::parse();
    let path = options.config.unwrap_or_else(default_config_path);
    let engine = Engine::load(ConfigSource::file(&path))?;
    info!("loaded {}", path.display());

    match options.command {
        Command::Check => {
            let registry = engine.snapshot();
            println!(
                "{}: ok ({} keys, {} mouse bindings, {} groups, {} layouts, {} rules, {} hooks, {} screens)",
                path.display(),
                registry.keybindings().count(),
                registry.mousebindings().count(),
                registry.groups().len(),
                registry.layouts().len(),
                registry.rules().len(),
                registry.hooks().len(),
                registry.screens().len(),
            );
        }
        Command::Keys => {
            let registry = engine.snapshot();
            for binding in registry.keybindings() {
                println!("{:<24} {:<36} {}", binding.bind, binding.action, binding.description);
            }
            for binding in registry.mousebindings() {
                match &binding.start {
                    Some(start) => println!("{:<24} {} (start: {})", binding.bind, binding.action, start),
                    None => println!("{:<24} {}", binding.bind, binding.action),
                }
            }
        }
        Command::Resolve(window) => {
            let props = engine.resolve(&window.metadata()?);
            println!("floating: {}", props.floating);
            println!("group: {}", props.group.as_deref().unwrap_or("-"));
        }
        Command::Dispatch { event, run, window } => {
            let kind = EventKind::parse(&event).ok_or_else(|| format!("unknown event `{}`", event))?;
            let ctx = if window.is_empty() {
                HookContext::default()
            } else {
                HookContext::with_window(window.metadata()?)
            };

            if run {
                let mut executor = SpawnExecutor::new(|action: &ActionDescriptor| -> Result<(), ActionExecutionError> {
                    println!("host: {}", action);
                    Ok(())
                });
                let errors = engine.run_event(&mut executor, kind, &ctx);
                if !errors.is_empty() {
                    return Err(format!("{} action(s) failed", errors.len()).into());
                }
            } else {
                for action in engine.dispatch(kind, &ctx) {
                    println!("{}", action);
                }
            }
        }
    }

    Ok(())
}
