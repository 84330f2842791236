//! Process environment construction for lynx invocations
//!
//! Each call gets its own copy of the ambient environment. When a
//! TLS-intercepting proxy CA is present next to the system bundle, the two are
//! concatenated into a per-call temporary file and exposed as `SSL_CERT_FILE`.
//! A configured proxy is exported as `http_proxy` and `https_proxy`.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;
use webtools_config::{CertificatesConfig, WebToolsConfig};

pub const SSL_CERT_FILE: &str = "SSL_CERT_FILE";
pub const HTTP_PROXY: &str = "http_proxy";
pub const HTTPS_PROXY: &str = "https_proxy";

type EnvMap = BTreeMap<OsString, OsString>;

/// Where the base environment comes from
#[derive(Debug, Clone, Default)]
pub enum AmbientEnvironment {
    /// The current process environment, read at build time
    #[default]
    Process,
    /// A fixed set of variables
    Fixed(EnvMap),
}

impl AmbientEnvironment {
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self::Fixed(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn snapshot(&self) -> EnvMap {
        match self {
            Self::Process => std::env::vars_os().collect(),
            Self::Fixed(vars) => vars.clone(),
        }
    }
}

/// Environment for a single subprocess call.
///
/// Owns the combined certificate bundle, if one was written; the file is
/// removed when this value is dropped.
#[derive(Debug)]
pub struct ProcessEnvironment {
    vars: EnvMap,
    cert_bundle: Option<NamedTempFile>,
}

impl ProcessEnvironment {
    fn new(vars: EnvMap, cert_bundle: Option<NamedTempFile>) -> Self {
        Self { vars, cert_bundle }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(OsStr::new(key))
    }

    pub fn vars(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Copy of the variables, independent of the bundle's lifetime
    #[must_use]
    pub fn to_map(&self) -> EnvMap {
        self.vars.clone()
    }

    #[must_use]
    pub fn cert_bundle_path(&self) -> Option<&Path> {
        self.cert_bundle.as_ref().map(NamedTempFile::path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Builds [`ProcessEnvironment`]s from shared, read-only configuration
#[derive(Debug, Clone)]
pub struct EnvironmentBuilder {
    proxy: Option<String>,
    certificates: CertificatesConfig,
    ambient: AmbientEnvironment,
}

impl EnvironmentBuilder {
    #[must_use]
    pub fn new(proxy: Option<String>, certificates: CertificatesConfig) -> Self {
        Self {
            proxy,
            certificates,
            ambient: AmbientEnvironment::Process,
        }
    }

    #[must_use]
    pub fn from_config(config: &WebToolsConfig) -> Self {
        Self::new(
            config.proxy_url().map(str::to_string),
            config.certificates.clone(),
        )
    }

    #[must_use]
    pub fn with_ambient(mut self, ambient: AmbientEnvironment) -> Self {
        self.ambient = ambient;
        self
    }

    #[must_use]
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Ambient environment plus certificate bundle and proxy variables.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the certificate files cannot be
    /// read or the bundle cannot be written.
    pub fn build(&self) -> io::Result<ProcessEnvironment> {
        let mut vars = self.ambient.snapshot();

        let cert_bundle = self.write_cert_bundle()?;
        if let Some(bundle) = &cert_bundle {
            debug!("Using combined certificate bundle {}", bundle.path().display());
            vars.insert(SSL_CERT_FILE.into(), bundle.path().as_os_str().to_owned());
        }

        if let Some(proxy) = &self.proxy {
            vars.insert(HTTP_PROXY.into(), proxy.into());
            vars.insert(HTTPS_PROXY.into(), proxy.into());
        }

        Ok(ProcessEnvironment::new(vars, cert_bundle))
    }

    /// [`build`](Self::build) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build); a panicked build task is reported as
    /// an I/O error.
    pub async fn prepare(&self) -> io::Result<ProcessEnvironment> {
        let builder = self.clone();
        tokio::task::spawn_blocking(move || builder.build())
            .await
            .map_err(io::Error::other)?
    }

    /// Unmodified copy of the ambient environment: no bundle, no proxy
    #[must_use]
    pub fn ambient(&self) -> ProcessEnvironment {
        ProcessEnvironment::new(self.ambient.snapshot(), None)
    }

    fn write_cert_bundle(&self) -> io::Result<Option<NamedTempFile>> {
        let proxy_ca = self.certificates.proxy_ca_path();
        let system_bundle = self.certificates.system_bundle_path();
        if !proxy_ca.exists() || !system_bundle.exists() {
            return Ok(None);
        }

        let contents = combined_bundle(&system_bundle, &proxy_ca)?;
        let mut file = tempfile::Builder::new()
            .prefix("mcp-combined-certs-")
            .suffix(".pem")
            .tempfile()?;
        file.write_all(&contents)?;
        file.flush()?;
        Ok(Some(file))
    }
}

/// System bundle bytes followed by proxy CA bytes
///
/// # Errors
///
/// Returns the I/O error from reading either file.
pub fn combined_bundle(system_bundle: &Path, proxy_ca: &Path) -> io::Result<Vec<u8>> {
    let mut contents = std::fs::read(system_bundle)?;
    contents.extend(std::fs::read(proxy_ca)?);
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SYSTEM_PEM: &str = "-----BEGIN CERTIFICATE-----\nSYSTEM\n-----END CERTIFICATE-----\n";
    const PROXY_PEM: &str = "-----BEGIN CERTIFICATE-----\nMITM\n-----END CERTIFICATE-----\n";

    fn cert_fixture() -> (TempDir, CertificatesConfig) {
        let dir = TempDir::new().unwrap();
        let system = dir.path().join("cert.pem");
        let proxy = dir.path().join("mitmproxy-ca-cert.pem");
        std::fs::write(&system, SYSTEM_PEM).unwrap();
        std::fs::write(&proxy, PROXY_PEM).unwrap();
        let config = CertificatesConfig {
            proxy_ca: proxy,
            system_bundle: system,
        };
        (dir, config)
    }

    fn missing_certs() -> CertificatesConfig {
        CertificatesConfig {
            proxy_ca: PathBuf::from("/nonexistent/mitmproxy-ca-cert.pem"),
            system_bundle: PathBuf::from("/nonexistent/cert.pem"),
        }
    }

    fn ambient() -> AmbientEnvironment {
        AmbientEnvironment::fixed([("PATH", "/usr/bin:/bin"), ("HOME", "/home/test")])
    }

    #[test]
    fn test_passes_ambient_through_unchanged() {
        let builder = EnvironmentBuilder::new(None, missing_certs()).with_ambient(ambient());
        let env = builder.build().unwrap();

        assert_eq!(env.get("PATH"), Some(OsStr::new("/usr/bin:/bin")));
        assert_eq!(env.get("HOME"), Some(OsStr::new("/home/test")));
        assert_eq!(env.len(), 2);
        assert!(env.cert_bundle_path().is_none());
        assert!(!env.contains(SSL_CERT_FILE));
    }

    #[test]
    fn test_proxy_sets_both_variables() {
        let builder = EnvironmentBuilder::new(Some("http://localhost:8080".to_string()), missing_certs())
            .with_ambient(ambient());
        let env = builder.build().unwrap();

        assert_eq!(env.get(HTTP_PROXY), Some(OsStr::new("http://localhost:8080")));
        assert_eq!(env.get(HTTPS_PROXY), Some(OsStr::new("http://localhost:8080")));
    }

    #[test]
    fn test_bundle_written_when_both_certs_exist() {
        let (_dir, certs) = cert_fixture();
        let builder = EnvironmentBuilder::new(None, certs).with_ambient(ambient());
        let env = builder.build().unwrap();

        let bundle = env.cert_bundle_path().unwrap().to_path_buf();
        assert_eq!(env.get(SSL_CERT_FILE), Some(bundle.as_os_str()));

        let contents = std::fs::read_to_string(&bundle).unwrap();
        assert_eq!(contents, format!("{SYSTEM_PEM}{PROXY_PEM}"));
    }

    #[test]
    fn test_bundle_removed_with_environment() {
        let (_dir, certs) = cert_fixture();
        let builder = EnvironmentBuilder::new(None, certs).with_ambient(ambient());
        let env = builder.build().unwrap();
        let bundle = env.cert_bundle_path().unwrap().to_path_buf();
        assert!(bundle.exists());

        drop(env);
        assert!(!bundle.exists());
    }

    #[test]
    fn test_bundle_skipped_when_proxy_ca_missing() {
        let (_dir, mut certs) = cert_fixture();
        certs.proxy_ca = PathBuf::from("/nonexistent/mitmproxy-ca-cert.pem");
        let builder = EnvironmentBuilder::new(None, certs).with_ambient(ambient());
        let env = builder.build().unwrap();

        assert!(env.cert_bundle_path().is_none());
        assert!(!env.contains(SSL_CERT_FILE));
    }

    #[test]
    fn test_bundle_skipped_when_system_bundle_missing() {
        let (_dir, mut certs) = cert_fixture();
        certs.system_bundle = PathBuf::from("/nonexistent/cert.pem");
        let builder = EnvironmentBuilder::new(None, certs).with_ambient(ambient());

        assert!(!builder.build().unwrap().contains(SSL_CERT_FILE));
    }

    #[test]
    fn test_repeated_builds_produce_identical_bundles() {
        let (_dir, certs) = cert_fixture();
        let builder = EnvironmentBuilder::new(None, certs).with_ambient(ambient());

        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        let first_bytes = std::fs::read(first.cert_bundle_path().unwrap()).unwrap();
        let second_bytes = std::fs::read(second.cert_bundle_path().unwrap()).unwrap();

        assert_eq!(first_bytes, second_bytes);
        // concurrent calls never share a bundle file
        assert_ne!(first.cert_bundle_path(), second.cert_bundle_path());
    }

    #[test]
    fn test_ambient_copy_has_no_overrides() {
        let (_dir, certs) = cert_fixture();
        let builder = EnvironmentBuilder::new(Some("http://localhost:8080".to_string()), certs)
            .with_ambient(ambient());
        let env = builder.ambient();

        assert!(!env.contains(HTTP_PROXY));
        assert!(!env.contains(HTTPS_PROXY));
        assert!(!env.contains(SSL_CERT_FILE));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_ambient_keeps_preexisting_proxy_variables() {
        let builder = EnvironmentBuilder::new(Some("http://mitm:8080".to_string()), missing_certs())
            .with_ambient(AmbientEnvironment::fixed([("http_proxy", "http://corp:3128")]));

        assert_eq!(
            builder.build().unwrap().get(HTTP_PROXY),
            Some(OsStr::new("http://mitm:8080"))
        );
        assert_eq!(
            builder.ambient().get(HTTP_PROXY),
            Some(OsStr::new("http://corp:3128"))
        );
    }

    #[test]
    fn test_unreadable_cert_propagates_error() {
        let dir = TempDir::new().unwrap();
        // a directory exists but cannot be read as a file
        let certs = CertificatesConfig {
            proxy_ca: dir.path().to_path_buf(),
            system_bundle: dir.path().to_path_buf(),
        };
        let builder = EnvironmentBuilder::new(None, certs).with_ambient(ambient());

        assert!(builder.build().is_err());
    }

    #[tokio::test]
    async fn test_prepare_writes_bundle_off_runtime() {
        let (_dir, certs) = cert_fixture();
        let builder = EnvironmentBuilder::new(Some("http://localhost:8080".to_string()), certs)
            .with_ambient(ambient());
        let env = builder.prepare().await.unwrap();

        let bundle = env.cert_bundle_path().unwrap();
        assert_eq!(
            std::fs::read_to_string(bundle).unwrap(),
            format!("{SYSTEM_PEM}{PROXY_PEM}")
        );
        assert_eq!(env.get(HTTPS_PROXY), Some(OsStr::new("http://localhost:8080")));
    }

    #[tokio::test]
    async fn test_prepare_propagates_read_error() {
        let dir = TempDir::new().unwrap();
        let certs = CertificatesConfig {
            proxy_ca: dir.path().to_path_buf(),
            system_bundle: dir.path().to_path_buf(),
        };
        let builder = EnvironmentBuilder::new(None, certs).with_ambient(ambient());

        assert!(builder.prepare().await.is_err());
    }

    #[test]
    #[serial]
    fn test_process_ambient_reads_current_environment() {
        std::env::set_var("WEBTOOLS_ENV_TEST", "present");
        let builder = EnvironmentBuilder::new(None, missing_certs());
        let env = builder.build().unwrap();
        std::env::remove_var("WEBTOOLS_ENV_TEST");

        assert_eq!(env.get("WEBTOOLS_ENV_TEST"), Some(OsStr::new("present")));
    }
}
