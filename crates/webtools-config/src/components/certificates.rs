//! Certificate locations for TLS-intercepting proxies
//!
//! When both files exist, the system bundle and the proxy CA are concatenated
//! and handed to lynx through `SSL_CERT_FILE`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// mitmproxy's CA certificate, relative to the home directory
pub const DEFAULT_PROXY_CA: &str = "~/.mitmproxy/mitmproxy-ca-cert.pem";

pub const DEFAULT_SYSTEM_BUNDLE: &str = "/etc/ssl/cert.pem";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificatesConfig {
    pub proxy_ca: PathBuf,
    pub system_bundle: PathBuf,
}

impl CertificatesConfig {
    /// Proxy CA path with a leading `~` expanded
    #[must_use]
    pub fn proxy_ca_path(&self) -> PathBuf {
        expand_home(&self.proxy_ca)
    }

    /// System bundle path with a leading `~` expanded
    #[must_use]
    pub fn system_bundle_path(&self) -> PathBuf {
        expand_home(&self.system_bundle)
    }
}

impl Default for CertificatesConfig {
    fn default() -> Self {
        Self {
            proxy_ca: PathBuf::from(DEFAULT_PROXY_CA),
            system_bundle: PathBuf::from(DEFAULT_SYSTEM_BUNDLE),
        }
    }
}

/// Expand a leading `~` component to the user's home directory.
///
/// Paths without `~`, or when no home directory is known, come back unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
