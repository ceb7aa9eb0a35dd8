use clap::Parser;
use regex_sweep::config::toml_config::TomlConfig;
use regex_sweep::core::ConfigProvider;
use regex_sweep::utils::error::ErrorSeverity;
use regex_sweep::utils::{logger, validation::Validate};
use regex_sweep::{LocalStorage, SweepEngine, SweepPipeline};

#[derive(Parser)]
#[command(name = "toml-sweep")]
#[command(about = "Run regex timing experiments described in a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sweep.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show the experiments without measuring anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置，日誌初始化前只能用 eprintln
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(if args.verbose { Some("debug") } else { config.log_level() });
    } else {
        logger::init_cli_logger(args.verbose || config.log_level() == Some("debug"));
    }

    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No measurements will be taken");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = SweepPipeline::new(LocalStorage::default(), config);
    let engine = SweepEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(_) => {}
        Err(e) if e.severity() == ErrorSeverity::Low => {
            tracing::info!("📭 {}, stopping", e);
        }
        Err(e) => {
            tracing::error!(
                "❌ Sweep failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    for exp in config.experiments()? {
        println!("🧪 {}", exp.name);
        println!("  Workload: {} ({})", exp.workload.name(), exp.workload.describe());
        println!("  Engine: {}  Mode: {}", exp.engine, exp.mode);

        let sizes: Vec<String> = exp.sweep.sizes().map(|n| n.to_string()).collect();
        println!("  Sizes: {} [{}]", sizes.len(), sizes.join(", "));
        println!("  Repetitions: {}", exp.repetitions);
        if let Some(first) = exp.sweep.sizes().next() {
            println!("  First pattern: {}", exp.workload.pattern(first));
        }
        if exp.include_compile {
            println!("  ⏱️ Compile time included in samples");
        }
        if let Some(budget) = exp.budget {
            println!("  ⏱️ Stops once a size averages over {:?}", budget);
        }
        println!();
    }

    println!("💾 Output Configuration:");
    println!("  Format: {:?}", config.output_format());
    println!("  Destination: {}", config.output_path().unwrap_or("stdout"));

    println!();
    println!("✅ Dry run analysis complete.");

    Ok(())
}
