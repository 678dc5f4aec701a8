use clap::Parser;
use colored::*;
use std::env;
use tracing::{info, warn, Level};
use tracing_subscriber::{
    field::RecordFields,
    fmt::{self, time::ChronoUtc, FormatFields},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use database_layer::seed;
use hospital_server::{config::DEFAULT_CONFIG_FILE, create_app, HospitalServer, ServerConfig};

/// Kingdom Hospital HTTP Server
#[derive(Parser, Debug)]
#[command(name = "hospital-server")]
#[command(about = "Hospital back office HTTP API server")]
struct Args {
    /// Server bind address (overrides the configuration file)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides the configuration file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.verbose)?;

    let mut config = ServerConfig::load(&args.config)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let address = config.bind_address();

    info!("🏥 {}", "Starting Kingdom Hospital HTTP Server".bright_cyan());
    info!("📋 Version: {}", env!("CARGO_PKG_VERSION").bright_white());
    info!("🌐 Bind address: {}", address.bright_yellow());

    let server = HospitalServer::new(config).await?;
    info!("🗄️  Store: {}", server.store_kind().bright_white());

    if server.config.seed.enabled {
        let report = seed::run(&server.repositories, &server.config.seed_options()).await?;
        info!(
            specialties = report.specialties,
            medicaments = report.medicaments,
            demo = report.demo_loaded,
            "🌱 {}",
            "Seed data checked".bright_green()
        );
    } else {
        warn!("Seeding disabled");
    }

    let database = server.database.clone();
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("🚀 {}", format!("Kingdom Hospital running on http://{}", address).bright_green());
    info!("📋 {}", format!("Health check available at: http://{}/health", address).bright_blue());
    info!("📋 {}", format!("API available at: http://{}/api", address).bright_blue());
    info!("📖 {}", format!("Swagger UI: http://{}/docs", address).bright_blue());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(database) = database {
        database.close().await;
    }
    info!("👋 {}", "Server stopped".bright_cyan());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // Check if we're in development or production
    let is_development =
        env::var("HOSPITAL_ENV").unwrap_or_else(|_| "development".to_string()) == "development";
    let use_colors = env::var("NO_COLOR").is_err() && atty::is(atty::Stream::Stdout);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "hospital_server={level},database_layer={level},tower_http=info,sqlx=warn,hyper=info"
        )
        .into()
    });

    if is_development && use_colors {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(true)
                    .event_format(ColoredFormatter)
                    .fmt_fields(ColoredFieldFormatter),
            )
            .try_init()?;

        print_startup_banner();
    } else {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()?;
    }

    Ok(())
}

fn print_startup_banner() {
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║                    🏥 KINGDOM HOSPITAL                       ║".bright_cyan());
    println!("{}", "║           Specialties · Doctors · Patients · Ordonnances     ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}

// Custom colored formatter for development
struct ColoredFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ColoredFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        write!(
            writer,
            "{} ",
            chrono::Utc::now().format("%H:%M:%S%.3f").to_string().bright_black()
        )?;

        let level_str = match *metadata.level() {
            Level::TRACE => "TRACE".bright_purple(),
            Level::DEBUG => "DEBUG".bright_blue(),
            Level::INFO => " INFO".bright_green(),
            Level::WARN => " WARN".bright_yellow(),
            Level::ERROR => "ERROR".bright_red(),
        };
        write!(writer, "[{}] ", level_str)?;

        if let Some(target) = metadata.target().split("::").last() {
            write!(writer, "{:<15} ", target.bright_cyan())?;
        }

        ctx.format_fields(writer.by_ref(), event)?;

        // File and line for debug/trace
        if metadata.level() >= &Level::DEBUG {
            if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
                let file_short = file.rsplit('/').next().unwrap_or(file);
                write!(
                    writer,
                    " {}",
                    format!("({}:{})", file_short, line).bright_black()
                )?;
            }
        }

        writeln!(writer)
    }
}

// Custom field formatter for colored output
struct ColoredFieldFormatter;

impl<'a> tracing_subscriber::fmt::FormatFields<'a> for ColoredFieldFormatter {
    fn format_fields<R: RecordFields>(
        &self,
        writer: tracing_subscriber::fmt::format::Writer<'a>,
        fields: R,
    ) -> std::fmt::Result {
        let mut visitor = ColoredFieldVisitor {
            writer,
            is_first: true,
            result: Ok(()),
        };
        fields.record(&mut visitor);
        visitor.result
    }
}

struct ColoredFieldVisitor<'a> {
    writer: tracing_subscriber::fmt::format::Writer<'a>,
    is_first: bool,
    result: std::fmt::Result,
}

impl ColoredFieldVisitor<'_> {
    fn write_field(&mut self, name: &str, value: &str) {
        if self.result.is_err() {
            return;
        }
        self.result = if name == "message" {
            write!(self.writer, "{}", value.white().bold())
        } else {
            write!(
                self.writer,
                "{}{}={}",
                if self.is_first { "" } else { " " },
                name.bright_yellow(),
                value.bright_white()
            )
        };
        self.is_first = false;
    }
}

impl tracing::field::Visit for ColoredFieldVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // Messages arrive as format_args!, whose Debug output is the plain text
        self.write_field(field.name(), &format!("{:?}", value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.write_field(field.name(), value);
    }
}
