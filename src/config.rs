use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "jobboard", about = "Job board listings portal")]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Run database migrations on startup
    #[arg(long, env = "RUN_MIGRATIONS", default_value = "true")]
    pub run_migrations: bool,

    /// Session lifetime in hours (0 = sessions never expire)
    #[arg(long, env = "SESSION_TTL_HOURS", default_value = "72")]
    pub session_ttl_hours: i64,
}
