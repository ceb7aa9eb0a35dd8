use clap::Parser;
use regex_sweep::utils::error::ErrorSeverity;
use regex_sweep::utils::{logger, validation::Validate};
use regex_sweep::{CliConfig, LocalStorage, SweepEngine, SweepPipeline};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting regex-sweep CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = SweepPipeline::new(LocalStorage::default(), config);
    let engine = SweepEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(destination) => {
            tracing::info!("✅ Sweep completed, report in {}", destination);
        }
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
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
