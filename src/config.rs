/*!
Client configuration from the environment.

- `DOCKER_HOST`: `unix:///path`, `tcp://host[:port]` (port 2375 when omitted), `http://...`
  or `https://...`
  (default `unix:///var/run/docker.sock`)
- `DOCKER_API_VERSION`: Engine API version, with or without a leading `v`
- `DOCKER_CLIENT_TIMEOUT`: transport read/write timeout in seconds; unset or `0` means none
*/

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::{DockerError, Result};
use crate::http::DEFAULT_TCP_PORT;

pub const DEFAULT_SOCKET: &str = "/var/run/docker.sock";

/// API version used when `DOCKER_API_VERSION` is unset. Baked in by build.rs when
/// `DOCKER_FACADE_DEFAULT_API_VERSION` is set at build time.
pub const DEFAULT_API_VERSION: &str = match option_env!("DOCKER_FACADE_API_VERSION") {
    Some(v) => v,
    None => "1.45",
};

/// Where the daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerHost {
    Unix(PathBuf),
    /// Plain HTTP; `tcp://` is normalized to `http://`.
    Tcp(Url),
    Https(Url),
}

impl DockerHost {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(DockerError::Config("unix:// host without a socket path".to_string()));
            }
            return Ok(DockerHost::Unix(PathBuf::from(path)));
        }
        let (normalized, https) = if let Some(rest) = s.strip_prefix("tcp://") {
            (format!("http://{rest}"), false)
        } else if s.starts_with("http://") {
            (s.to_string(), false)
        } else if s.starts_with("https://") {
            (s.to_string(), true)
        } else {
            return Err(DockerError::Config(format!(
                "unsupported DOCKER_HOST {s:?} (expected unix://, tcp://, http:// or https://)"
            )));
        };
        let mut url = Url::parse(&normalized)
            .map_err(|e| DockerError::Config(format!("invalid DOCKER_HOST {s:?}: {e}")))?;
        if url.host_str().is_none() {
            return Err(DockerError::Config(format!("DOCKER_HOST {s:?} has no host")));
        }
        // `tcp://` is not a special scheme, so its port survives parsing even when it is 80.
        if s.starts_with("tcp://") {
            let explicit = Url::parse(s).ok().and_then(|u| u.port());
            url.set_port(Some(explicit.unwrap_or(DEFAULT_TCP_PORT)))
                .map_err(|_| DockerError::Config(format!("DOCKER_HOST {s:?} cannot carry a port")))?;
        }
        Ok(if https {
            DockerHost::Https(url)
        } else {
            DockerHost::Tcp(url)
        })
    }
}

impl FromStr for DockerHost {
    type Err = DockerError;

    fn from_str(s: &str) -> Result<Self> {
        DockerHost::parse(s)
    }
}

impl fmt::Display for DockerHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockerHost::Unix(p) => write!(f, "unix://{}", p.display()),
            DockerHost::Tcp(u) | DockerHost::Https(u) => write!(f, "{u}"),
        }
    }
}

impl Default for DockerHost {
    fn default() -> Self {
        DockerHost::Unix(PathBuf::from(DEFAULT_SOCKET))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: DockerHost,
    /// Without the leading `v`, e.g. `1.45`.
    pub api_version: String,
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DockerHost::default(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Config::default();

        if let Some(host) = get("DOCKER_HOST") {
            cfg.host = DockerHost::parse(&host)?;
        }
        if let Some(ver) = get("DOCKER_API_VERSION") {
            cfg.api_version = normalize_version(&ver)?;
        }
        if let Some(secs) = get("DOCKER_CLIENT_TIMEOUT") {
            let secs: u64 = secs.parse().map_err(|_| {
                DockerError::Config(format!("DOCKER_CLIENT_TIMEOUT must be whole seconds, got {secs:?}"))
            })?;
            cfg.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(cfg)
    }
}

/// Accepts `1.45` or `v1.45`; returns `1.45`.
pub fn normalize_version(v: &str) -> Result<String> {
    let v = v.strip_prefix('v').unwrap_or(v);
    let ok = v.split('.').count() == 2 && v.split('.').all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    if ok {
        Ok(v.to_string())
    } else {
        Err(DockerError::Config(format!("DOCKER_API_VERSION must look like 1.45, got {v:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c.host, DockerHost::Unix(PathBuf::from("/var/run/docker.sock")));
        assert_eq!(c.api_version, DEFAULT_API_VERSION);
        assert_eq!(c.timeout, None);
    }

    #[test]
    fn test_host_variants() {
        assert_eq!(
            DockerHost::parse("unix:///run/user/1000/docker.sock").unwrap(),
            DockerHost::Unix(PathBuf::from("/run/user/1000/docker.sock"))
        );
        match DockerHost::parse("tcp://10.0.0.5:2375").unwrap() {
            DockerHost::Tcp(u) => assert_eq!(u.as_str(), "http://10.0.0.5:2375/"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            DockerHost::parse("https://docker.example.com:2376").unwrap(),
            DockerHost::Https(_)
        ));
        assert!(DockerHost::parse("ssh://user@host").is_err());
        assert!(DockerHost::parse("unix://").is_err());
    }

    #[test]
    fn test_tcp_without_port_uses_docker_port() {
        let host = DockerHost::parse("tcp://127.0.0.1").unwrap();
        let DockerHost::Tcp(url) = host else {
            panic!("expected Tcp, got {host:?}");
        };
        assert_eq!(url.as_str(), "http://127.0.0.1:2375/");
        let addrs = url.socket_addrs(|| None).unwrap();
        assert_eq!(addrs[0].port(), DEFAULT_TCP_PORT);

        let DockerHost::Tcp(url) = DockerHost::parse("tcp://127.0.0.1:80").unwrap() else {
            panic!("expected Tcp");
        };
        assert_eq!(url.socket_addrs(|| None).unwrap()[0].port(), 80);

        let DockerHost::Tcp(url) = DockerHost::parse("http://127.0.0.1").unwrap() else {
            panic!("expected Tcp");
        };
        assert_eq!(url.port_or_known_default(), Some(80));
    }

    #[test]
    fn test_version_and_timeout() {
        let c = cfg(&[("DOCKER_API_VERSION", "v1.41"), ("DOCKER_CLIENT_TIMEOUT", "30")]).unwrap();
        assert_eq!(c.api_version, "1.41");
        assert_eq!(c.timeout, Some(Duration::from_secs(30)));

        let c = cfg(&[("DOCKER_CLIENT_TIMEOUT", "0")]).unwrap();
        assert_eq!(c.timeout, None);

        assert!(matches!(
            cfg(&[("DOCKER_CLIENT_TIMEOUT", "soon")]),
            Err(DockerError::Config(_))
        ));
        assert!(cfg(&[("DOCKER_API_VERSION", "latest")]).is_err());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let c = cfg(&[("DOCKER_HOST", "   ")]).unwrap();
        assert_eq!(c.host, DockerHost::default());
    }
}
