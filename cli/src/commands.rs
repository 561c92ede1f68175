use crate::formatters::{
    format_health, format_outcome, format_pass, format_pid, format_system_time,
};
use ns_engine::constants::smoke;
use ns_engine::domain::ports::{HealthProbe, ServiceClient};
use ns_engine::domain::{
    ProcessSupervisor, ServiceHandle, ServiceSpec, SmokeTestRunner, StartError, StopReport,
};
use ns_engine::infrastructure::{
    default_services, dependency, FilePidStore, ProcfsScanner, SupervisorConfig,
    TokioProcessExecutor, UreqHealthProbe, UreqServiceClient,
};
use std::sync::Arc;
use std::time::Duration;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Real adapters wired for one CLI invocation
pub struct Stack {
    pub specs: Vec<ServiceSpec>,
    supervisor: ProcessSupervisor,
    probe: Arc<dyn HealthProbe>,
    client: Arc<dyn ServiceClient>,
}

impl Stack {
    pub fn from_config(config: &SupervisorConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let specs = default_services(config)?;
        let probe: Arc<dyn HealthProbe> = Arc::new(UreqHealthProbe::new());

        let supervisor = ProcessSupervisor::new(
            Arc::new(TokioProcessExecutor::new()),
            Arc::new(FilePidStore::from_specs(config.run_path(), &specs)),
            probe.clone(),
            Arc::new(ProcfsScanner::new()),
        )
        .with_dependency(dependency(config))
        .with_readiness(config.readiness_policy())
        .with_stop_timeout(config.stop_timeout());

        Ok(Self {
            specs,
            supervisor,
            probe,
            client: Arc::new(UreqServiceClient::new()),
        })
    }
}

fn reject_extra_args(args: &[String], usage: &str) -> bool {
    if args.len() > 2 {
        eprintln!("usage: newsctl {}", usage);
        return true;
    }
    false
}

fn print_started(handles: &[ServiceHandle]) {
    for handle in handles {
        println!("[OK] {} started", handle.spec.name());
        println!("  PID:     {}", handle.pid);
        println!("  URL:     {}", handle.spec.base_url());
        println!("  Log:     {}", handle.spec.log_path().display());
        println!("  Started: {}", format_system_time(handle.started_at));
    }
}

fn print_start_error(stack: &Stack, err: &StartError) {
    eprintln!("[ERROR] {}", err);
    match err {
        StartError::DependencyUnavailable { url, .. } => {
            eprintln!("  Make sure the LLM runtime is running and answers {}", url);
        }
        StartError::AlreadyRunning { .. } => {
            eprintln!("  Run 'newsctl stop' or 'newsctl restart' first");
        }
        _ => {
            if let Some(spec) = err
                .failed_service()
                .and_then(|name| stack.specs.iter().find(|s| s.name() == name))
            {
                eprintln!("  See {}", spec.log_path().display());
            }
        }
    }
}

fn print_stop_report(report: &StopReport) {
    if report.is_noop() {
        println!("Nothing was running");
        return;
    }

    for entry in &report.entries {
        println!(
            "{:<16}  {:<8}  {}",
            entry.service,
            format_pid(entry.pid),
            format_outcome(&entry.outcome)
        );
    }
    for orphan in &report.orphans {
        println!(
            "{:<16}  {:<8}  orphan terminated",
            orphan.service, orphan.pid
        );
    }
}

pub async fn handle_start(stack: &Stack, args: &[String]) -> CliResult {
    if reject_extra_args(args, "start") {
        return Ok(());
    }

    match stack.supervisor.start(&stack.specs).await {
        Ok(handles) => {
            print_started(&handles);
            Ok(())
        }
        Err(e) => {
            print_start_error(stack, &e);
            std::process::exit(1);
        }
    }
}

/// Always exits 0: stop reports problems but never fails
pub async fn handle_stop(stack: &Stack, args: &[String]) -> CliResult {
    if reject_extra_args(args, "stop") {
        return Ok(());
    }

    let report = stack.supervisor.stop(&stack.specs).await;
    print_stop_report(&report);
    Ok(())
}

pub async fn handle_restart(stack: &Stack, args: &[String]) -> CliResult {
    if reject_extra_args(args, "restart") {
        return Ok(());
    }

    match stack.supervisor.restart(&stack.specs).await {
        Ok((report, handles)) => {
            print_stop_report(&report);
            println!();
            print_started(&handles);
            Ok(())
        }
        Err(e) => {
            print_start_error(stack, &e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_status(stack: &Stack, args: &[String]) -> CliResult {
    if reject_extra_args(args, "status") {
        return Ok(());
    }

    let statuses = stack.supervisor.status(&stack.specs).await;

    println!(
        "{:<16}  {:<8}  {:<5}  {:<7}  {:<24}",
        "NAME", "PID", "ALIVE", "HEALTH", "URL"
    );
    println!(
        "{:-<16}  {:-<8}  {:-<5}  {:-<7}  {:-<24}",
        "", "", "", "", ""
    );
    for status in &statuses {
        println!(
            "{:<16}  {:<8}  {:<5}  {:<7}  {:<24}",
            status.service,
            format_pid(status.pid),
            if status.alive { "yes" } else { "no" },
            format_health(status.health),
            status.url
        );
    }

    println!();
    Ok(())
}

pub async fn handle_test(stack: &Stack, args: &[String]) -> CliResult {
    if reject_extra_args(args, "test") {
        return Ok(());
    }

    let runner = SmokeTestRunner::new(stack.probe.clone(), stack.client.clone());
    let report = runner.run(&stack.specs).await?;

    for step in &report.steps {
        println!(
            "[{}] {:<24}  {}",
            format_pass(step.passed),
            step.step_name,
            step.detail
        );
    }

    if !report.highlights.is_empty() {
        println!();
        println!("Top news");
        println!("─────────────────────────────────────────");
        for (i, highlight) in report.highlights.iter().enumerate() {
            println!("{}. {}", i + 1, highlight);
        }
    }

    println!();
    if report.all_passed() {
        println!("[OK] All {} checks passed", report.steps.len());
        Ok(())
    } else {
        if let Some(step) = report.failed_step() {
            eprintln!("[ERROR] {} failed: {}", step.step_name, step.detail);
        }
        std::process::exit(1);
    }
}

pub async fn handle_stats(stack: &Stack, args: &[String]) -> CliResult {
    if reject_extra_args(args, "stats") {
        return Ok(());
    }

    let collector = stack.specs.first().ok_or("no services configured")?;
    let timeout = Duration::from_secs(smoke::DEFAULT_HEALTH_TIMEOUT_SECS);

    match stack.client.stats(collector, timeout).await {
        Ok(body) => {
            match body.get("total_news").and_then(|v| v.as_u64()) {
                Some(total) => println!("Total news:         {}", total),
                None => println!("{}", serde_json::to_string_pretty(&body)?),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            std::process::exit(1);
        }
    }
}
