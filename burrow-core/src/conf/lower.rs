use crate::conf::error::ConfigError;
use crate::conf::runtime::{
    CachePolicy, CompressionConfig, CorsPolicy, Credentials, ProxyTarget, ServerConfig, TlsConfig,
};
use crate::conf::types::{CorsSpec, HttpsSpec, ServerOptions};
use http::HeaderValue;
use std::path::Path;
use std::time::Duration;

/// Environment variable consulted when `username` is absent from the options.
pub const USERNAME_ENV: &str = "BURROW_USERNAME";
/// Environment variable consulted when `password` is absent from the options.
pub const PASSWORD_ENV: &str = "BURROW_PASSWORD";

impl ServerConfig {
    /// Lower caller options into the runtime configuration, reading credential
    /// fallbacks from the process environment.
    pub fn from_options(opts: ServerOptions) -> Result<Self, ConfigError> {
        Self::from_options_with_env(opts, |key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_options`] with an explicit environment lookup.
    pub fn from_options_with_env<F>(opts: ServerOptions, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lower_root(&opts.root)?;
        let credentials = lower_credentials(opts.username, opts.password, &env);
        let cors = lower_cors(&opts.cors)?;
        let default_ext = lower_extension(opts.ext)?;
        let tls = opts.https.as_ref().map(lower_tls).transpose()?;
        let proxy = opts
            .proxy
            .as_deref()
            .map(|url| lower_proxy(url, opts.proxy_timeout))
            .transpose()?;

        if HeaderValue::from_str(&opts.default_content_type).is_err()
            || opts.default_content_type.is_empty()
        {
            return Err(ConfigError::InvalidContentType {
                value: opts.default_content_type,
            });
        }

        Ok(ServerConfig {
            root,
            cache: CachePolicy::from_seconds(opts.cache),
            show_dir: opts.show_dir,
            auto_index: opts.auto_index,
            compression: CompressionConfig {
                enable_gzip: opts.gzip,
                enable_brotli: opts.brotli,
                on_the_fly: opts.compress,
                ..CompressionConfig::default()
            },
            default_ext,
            robots: opts.robots,
            show_dotfiles: opts.show_dotfiles,
            cors,
            proxy,
            credentials,
            tls,
            log_ip: opts.log_ip,
            threads: opts.threads,
            default_content_type: opts.default_content_type,
        })
    }
}

fn lower_root(root: &Path) -> Result<std::path::PathBuf, ConfigError> {
    let canonical = root
        .canonicalize()
        .map_err(|source| ConfigError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        })?;

    if !canonical.is_dir() {
        return Err(ConfigError::RootNotDirectory { path: canonical });
    }

    Ok(canonical)
}

fn lower_credentials<F>(
    username: Option<String>,
    password: Option<String>,
    env: &F,
) -> Option<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let username = username.or_else(|| env(USERNAME_ENV));
    let password = password.or_else(|| env(PASSWORD_ENV));

    // Auth is active as soon as either half is present.
    if username.is_none() && password.is_none() {
        return None;
    }

    Some(Credentials {
        username: username.unwrap_or_default(),
        password: password.unwrap_or_default(),
    })
}

fn lower_cors(spec: &CorsSpec) -> Result<CorsPolicy, ConfigError> {
    match spec {
        CorsSpec::Enabled(false) => Ok(CorsPolicy::Disabled),
        CorsSpec::Enabled(true) => Ok(CorsPolicy::AllowAny {
            allow_headers: None,
        }),
        CorsSpec::Headers(raw) => {
            let list = raw
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .collect::<Vec<_>>()
                .join(", ");

            if list.is_empty() {
                return Ok(CorsPolicy::AllowAny {
                    allow_headers: None,
                });
            }

            let value = HeaderValue::from_str(&list).map_err(|_| {
                ConfigError::InvalidCorsHeaders {
                    headers: raw.clone(),
                }
            })?;

            Ok(CorsPolicy::AllowAny {
                allow_headers: Some(value),
            })
        }
    }
}

fn lower_extension(ext: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(ext) = ext else {
        return Ok(None);
    };

    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.contains(['/', '\\', '\0']) || trimmed.contains("..") {
        return Err(ConfigError::InvalidExtension { ext });
    }

    Ok(Some(trimmed.to_string()))
}

fn lower_tls(spec: &HttpsSpec) -> Result<TlsConfig, ConfigError> {
    // Fail at startup rather than at bind time.
    for path in [&spec.cert, &spec.key] {
        std::fs::File::open(path).map_err(|source| ConfigError::TlsFile {
            path: path.clone(),
            source,
        })?;
    }

    Ok(TlsConfig {
        cert: spec.cert.clone(),
        key: spec.key.clone(),
    })
}

fn lower_proxy(raw: &str, timeout_secs: u64) -> Result<ProxyTarget, ConfigError> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::invalid_proxy(raw, e.to_string()))?;

    let use_tls = match url.scheme() {
        "http" => false,
        "https" => true,
        other => {
            return Err(ConfigError::invalid_proxy(
                raw,
                format!("unsupported scheme '{other}'"),
            ));
        }
    };

    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::invalid_proxy(raw, "missing host"))?
        .to_string();

    let port = url
        .port_or_known_default()
        .ok_or_else(|| ConfigError::invalid_proxy(raw, "missing port"))?;

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::invalid_proxy(
            raw,
            "query and fragment are not allowed",
        ));
    }

    let base_path = url.path().trim_end_matches('/').to_string();

    if timeout_secs == 0 {
        return Err(ConfigError::invalid_proxy(raw, "timeout must be positive"));
    }

    Ok(ProxyTarget {
        use_tls,
        host,
        port,
        base_path,
        timeout: Duration::from_secs(timeout_secs),
    })
}
