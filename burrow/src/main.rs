use anyhow::{Context, Result};
use burrow_core::conf::{CorsSpec, HttpsSpec, ServerOptions};
use burrow_core::logging::{TracingRequestLogger, init_logging};
use burrow_core::server::Server;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "burrow", version, about = "burrow: static HTTP(S) file server")]
struct Cli {
    /// Document root (defaults to the config file value, then `.`)
    root: Option<PathBuf>,

    /// TOML file with server options; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    #[arg(short = 'a', long, default_value = "0.0.0.0")]
    address: String,

    /// Cache max-age in seconds; negative disables caching
    #[arg(short, long, allow_negative_numbers = true)]
    cache: Option<i64>,

    /// Do not render directory listings
    #[arg(long)]
    no_show_dir: bool,

    /// Do not serve index.html for directories
    #[arg(long)]
    no_auto_index: bool,

    /// Serve .gz representations
    #[arg(short, long)]
    gzip: bool,

    /// Serve .br representations
    #[arg(short, long)]
    brotli: bool,

    /// Compress eligible files on the fly when no sibling exists
    #[arg(long)]
    compress: bool,

    /// Default extension for extensionless paths
    #[arg(short, long)]
    ext: Option<String>,

    /// Answer /robots.txt with a disallow-all body
    #[arg(short, long)]
    robots: bool,

    /// Serve and list dotfiles
    #[arg(long)]
    dotfiles: bool,

    /// Enable CORS, optionally with a comma separated Allow-Headers list
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    cors: Option<String>,

    /// Upstream origin for requests that cannot be served from disk
    #[arg(short = 'P', long)]
    proxy: Option<String>,

    /// Upstream timeout in seconds
    #[arg(long)]
    proxy_timeout: Option<u64>,

    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Serve over TLS (requires --cert and --key)
    #[arg(short = 'S', long, requires_all = ["cert", "key"])]
    tls: bool,

    #[arg(short = 'C', long)]
    cert: Option<PathBuf>,

    #[arg(short = 'K', long)]
    key: Option<PathBuf>,

    /// Include client addresses in request logs
    #[arg(long)]
    log_ip: bool,

    /// Worker threads
    #[arg(long)]
    threads: Option<usize>,
}

impl Cli {
    /// Applies flags over `opts` (file values or defaults).
    fn merge_into(self, mut opts: ServerOptions) -> ServerOptions {
        if let Some(root) = self.root {
            opts.root = root;
        }
        if let Some(cache) = self.cache {
            opts.cache = cache;
        }
        if self.no_show_dir {
            opts.show_dir = false;
        }
        if self.no_auto_index {
            opts.auto_index = false;
        }
        opts.gzip |= self.gzip;
        opts.brotli |= self.brotli;
        opts.compress |= self.compress;
        opts.robots |= self.robots;
        opts.show_dotfiles |= self.dotfiles;
        opts.log_ip |= self.log_ip;

        if self.ext.is_some() {
            opts.ext = self.ext;
        }
        if let Some(cors) = self.cors {
            opts.cors = if cors.trim().is_empty() {
                CorsSpec::Enabled(true)
            } else {
                CorsSpec::Headers(cors)
            };
        }
        if self.proxy.is_some() {
            opts.proxy = self.proxy;
        }
        if let Some(timeout) = self.proxy_timeout {
            opts.proxy_timeout = timeout;
        }
        if self.username.is_some() {
            opts.username = self.username;
        }
        if self.password.is_some() {
            opts.password = self.password;
        }
        if self.tls {
            if let (Some(cert), Some(key)) = (self.cert, self.key) {
                opts.https = Some(HttpsSpec { cert, key });
            }
        }
        if self.threads.is_some() {
            opts.threads = self.threads;
        }
        opts
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "burrow failed to start");
        eprintln!("burrow: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let base = match &cli.config {
        Some(path) => ServerOptions::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerOptions::default(),
    };

    let port = cli.port;
    let address = cli.address.clone();
    let options = cli.merge_into(base);
    let scheme = scheme(&options);

    let server = Server::create(options)
        .context("invalid server options")?
        .with_logger(Arc::new(TracingRequestLogger));

    server.listen(port, &address, |addr| {
        println!("burrow serving on {scheme}://{addr}");
    })
}

/// TLS may come from flags or from the config file's `https` table.
fn scheme(options: &ServerOptions) -> &'static str {
    if options.https.is_some() { "https" } else { "http" }
}
