//! BoxArt desktop viewer - Main entry point

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::Result;
    use clap::Parser;
    use std::path::PathBuf;
    use tracing::{info, Level};
    use tracing_subscriber::FmtSubscriber;

    use boxart_core::{Platform, ViewerConfig};

    #[derive(Parser, Debug)]
    #[command(name = "boxart")]
    #[command(about = "Interactive 3D viewer and customizer for game box art")]
    #[command(version)]
    struct Args {
        /// Path to configuration file
        #[arg(short, long, default_value = "boxart.toml")]
        config: PathBuf,

        /// Front art (file path or data URL)
        #[arg(long)]
        front: Option<String>,

        /// Back art, defaults to the front art
        #[arg(long)]
        back: Option<String>,

        /// Spine art, defaults to the front art
        #[arg(long)]
        spine: Option<String>,

        /// Platform (xbox, xbox360, playstation, pc, standard)
        #[arg(short, long)]
        platform: Option<Platform>,

        /// Open the customizer on startup
        #[arg(long)]
        customize: bool,

        /// Directory for saved customizations
        #[arg(long, default_value = "boxart-data")]
        data_dir: PathBuf,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,
    }

    impl Args {
        fn apply_to(self, config: &mut ViewerConfig) {
            if let Some(front) = self.front {
                config.front = Some(front);
            }
            if let Some(back) = self.back {
                config.back = Some(back);
            }
            if let Some(spine) = self.spine {
                config.spine = Some(spine);
            }
            if let Some(platform) = self.platform {
                config.platform = platform;
            }
            if self.customize {
                config.open_customizer = true;
            }
        }
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();

        // Initialize logging
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        info!("BoxArt v{}", env!("CARGO_PKG_VERSION"));

        let mut config = ViewerConfig::load(&args.config)?;
        let data_dir = args.data_dir.clone();
        args.apply_to(&mut config);

        let repository = boxart_web::storage::open_repository(&config.storage_key, &data_dir)?;

        boxart_web::run(config, repository);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

// The browser build starts from the library's wasm entry point
#[cfg(target_arch = "wasm32")]
fn main() {}
