mod commands;
mod formatters;

use ns_engine::infrastructure::SupervisorConfig;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let cmd = args[1].as_str();
    if matches!(cmd, "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let config = SupervisorConfig::from_env();
    init_logging(&config.log_level);

    let config = match config.validate() {
        Ok(()) => config,
        Err(e) if tolerates_setup_errors(cmd) => {
            eprintln!("[WARN] {}", e);
            config.for_teardown()
        }
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            std::process::exit(1);
        }
    };

    let stack = match commands::Stack::from_config(&config) {
        Ok(stack) => stack,
        Err(e) if tolerates_setup_errors(cmd) => {
            eprintln!("[WARN] {}", e);
            return Ok(());
        }
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            std::process::exit(1);
        }
    };

    // Dispatch to command handlers
    match cmd {
        "start" => commands::handle_start(&stack, &args).await?,
        "stop" => commands::handle_stop(&stack, &args).await?,
        "restart" => commands::handle_restart(&stack, &args).await?,
        "status" => commands::handle_status(&stack, &args).await?,
        "test" => commands::handle_test(&stack, &args).await?,
        "stats" => commands::handle_stats(&stack, &args).await?,
        _ => {
            eprintln!("unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}

/// `stop` exits 0 whatever the configuration looks like
fn tolerates_setup_errors(cmd: &str) -> bool {
    cmd == "stop"
}

/// Engine logs go to stderr so they never mix with command output
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_usage() {
    eprintln!("News stack supervisor");
    eprintln!();
    eprintln!("Usage: newsctl <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  start      Start the collector and the agent (exit 1 on failure)");
    eprintln!("  stop       Stop both services and sweep orphans (always exit 0)");
    eprintln!("  restart    Stop, then start");
    eprintln!("  status     Show PID, liveness and health of each service");
    eprintln!("  test       Run the smoke test (exit 0 iff every step passes)");
    eprintln!("  stats      Show collector statistics");
    eprintln!("  help       Show this message");
    eprintln!();
    eprintln!("Environment Variables:");
    eprintln!("  NS_BASE_DIR            Service scripts and working directory (default: .)");
    eprintln!("  NS_RUN_DIR             PID files, relative to NS_BASE_DIR (default: run)");
    eprintln!("  NS_LOG_DIR             Service logs, relative to NS_BASE_DIR (default: logs)");
    eprintln!("  NS_PYTHON              Interpreter (default: python3)");
    eprintln!("  NS_COLLECTOR_PORT      Collector port (default: 8001)");
    eprintln!("  NS_AGENT_PORT          Agent port (default: 8002)");
    eprintln!("  NS_LLM_URL             LLM runtime readiness URL (default: http://localhost:1234/v1/models)");
    eprintln!("  NS_READY_TIMEOUT_SECS  Readiness wait per service (default: 30)");
    eprintln!("  NS_POLL_INTERVAL_MS    Delay between readiness probes (default: 500)");
    eprintln!("  NS_PROBE_TIMEOUT_SECS  Timeout of one health probe (default: 5)");
    eprintln!("  NS_STOP_TIMEOUT_SECS   Grace period before SIGKILL (default: 10)");
    eprintln!("  NS_LOG_LEVEL           Log filter, falls back to RUST_LOG (default: warn)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stop_tolerates_setup_errors() {
        assert!(tolerates_setup_errors("stop"));
        for cmd in ["start", "restart", "status", "test", "stats", "bogus"] {
            assert!(!tolerates_setup_errors(cmd), "{}", cmd);
        }
    }

    #[test]
    fn test_stop_builds_from_clashing_ports() {
        let mut config = SupervisorConfig::default();
        config.agent_port = config.collector_port;
        assert!(config.validate().is_err());

        let stack = commands::Stack::from_config(&config.for_teardown()).unwrap();
        assert_eq!(stack.specs.len(), 2);
    }
}
