//! siteaudit CLI — operator interface to the audit pipeline.

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use siteaudit::audit::HeadlessAuditor;
use siteaudit::cache::Cache;
use siteaudit::config::Config;
use siteaudit::db::Db;
use siteaudit::http::{AppState, router};
use siteaudit::intake::IntakeService;
use siteaudit::model::{JobId, JobStatus};
use siteaudit::notify::{NoopNotifier, Notifier, WebhookNotifier};
use siteaudit::status::StatusService;
use siteaudit::telemetry::{TelemetryConfig, init_telemetry};
use siteaudit::worker::Worker;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "siteaudit", about = "Asynchronous website-audit pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (intake + status reads)
    Serve,
    /// Run the audit worker loop
    Worker,
    /// Submit an audit job from the command line
    Submit {
        /// Target site
        site: String,
        /// Contact address for the report
        contact: String,
    },
    /// Show a job
    Show {
        /// Job ID
        id: uuid::Uuid,
    },
    /// List recent jobs
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
        /// Maximum jobs to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cmd_serve().await,
        Command::Worker => cmd_worker().await,
        Command::Submit { site, contact } => {
            let (config, db) = connect().await?;
            let intake = IntakeService::new(Arc::new(db), config.worker.queue.clone());
            let id = intake.submit(&site, &contact).await?;
            println!("Created job {}", id.0);
            Ok(())
        }
        Command::Show { id } => {
            let (_config, db) = connect().await?;
            cmd_show(&db, JobId(id)).await
        }
        Command::List { status, limit } => {
            let (_config, db) = connect().await?;
            cmd_list(&db, status, limit).await
        }
    }
}

async fn connect() -> anyhow::Result<(Config, Db)> {
    let config = Config::from_env()?;
    let db = Db::connect(config.database_url.expose_secret()).await?;
    db.migrate().await?;
    db.create_queue(&config.worker.queue).await?;
    Ok((config, db))
}

fn make_notifier(config: &Config) -> Arc<dyn Notifier> {
    match &config.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => Arc::new(NoopNotifier),
    }
}

async fn cmd_serve() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "siteaudit-api".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let db = Db::connect(config.database_url.expose_secret()).await?;
    db.migrate().await?;
    db.create_queue(&config.worker.queue).await?;
    let db = Arc::new(db);

    let cache = Cache::connect(config.redis_url.expose_secret()).await?;
    let notifier = make_notifier(&config);

    let state = AppState {
        db: Arc::clone(&db),
        intake: Arc::new(IntakeService::new(
            Arc::clone(&db),
            config.worker.queue.clone(),
        )),
        status: Arc::new(StatusService::new(
            db,
            cache,
            notifier,
            config.public_base_url.clone(),
            config.cache_ttl_secs,
        )),
        status_max_age_secs: config.status_max_age_secs,
    };

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!(addr = %config.http_addr, "http api listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}

async fn cmd_worker() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "siteaudit-worker".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let db = Db::connect(config.database_url.expose_secret()).await?;
    db.migrate().await?;

    let notifier = make_notifier(&config);
    let worker = Worker::new(
        Arc::new(db),
        Arc::new(HeadlessAuditor),
        notifier,
        config.worker.clone(),
    );

    let handle = worker.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        handle.shutdown();
    });

    worker.run().await?;
    Ok(())
}

async fn cmd_show(db: &Db, id: JobId) -> anyhow::Result<()> {
    let job = db.get_job(id).await?;

    println!("ID:        {}", job.id.0);
    println!("Site:      {}", job.site);
    println!("Contact:   {}", job.contact);
    println!("Status:    {}", job.status);
    println!("Created:   {}", job.created_at);
    if let Some(finished) = job.finished_at {
        println!("Finished:  {finished}");
    }
    if let Some(ref message) = job.error_message {
        println!("Error:     {message}");
    }
    if let Some(ref result) = job.result {
        println!("---");
        println!("URL:       {}", result.audited_url);
        println!("Perf:      {:.2}", result.scores.performance);
        println!("A11y:      {:.2}", result.scores.accessibility);
        println!("SEO:       {:.2}", result.scores.seo);
        println!("Duration:  {}ms", result.duration_ms);
        for chk in &result.checks {
            println!(
                "  [{:>4.0}%] {} {}",
                chk.score * 100.0,
                chk.title,
                chk.detail.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

async fn cmd_list(db: &Db, status: Option<String>, limit: i64) -> anyhow::Result<()> {
    let status_filter: Option<JobStatus> = match status {
        Some(s) => Some(
            s.parse()
                .map_err(|_| anyhow::anyhow!("invalid status: {s}"))?,
        ),
        None => None,
    };

    let jobs = db.list_jobs(status_filter, limit).await?;

    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    println!(
        "{:<8}  {:<10}  {:<30}  {:<24}  CREATED",
        "ID", "STATUS", "SITE", "CONTACT"
    );
    println!("{}", "-".repeat(100));

    for job in &jobs {
        let short_id = &job.id.0.to_string()[..8];
        let site: String = job.site.chars().take(30).collect();
        println!(
            "{:<8}  {:<10}  {:<30}  {:<24}  {}",
            short_id,
            job.status.to_string(),
            site,
            job.contact,
            job.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!("\n{} job(s)", jobs.len());
    Ok(())
}
