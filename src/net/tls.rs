//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::TlsSetting;

/// Certificate used when TLS is switched on without explicit material,
/// resolved against the working directory.
pub const DEFAULT_CERT_PATH: &str = "ssl/server.crt";
/// Private key used when TLS is switched on without explicit material.
pub const DEFAULT_KEY_PATH: &str = "ssl/server.key";

/// Error type for TLS material loading.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Certificate file not found: {0:?}")]
    CertificateMissing(PathBuf),

    #[error("Private key file not found: {0:?}")]
    KeyMissing(PathBuf),

    #[error("Invalid TLS material: {0}")]
    Invalid(#[from] std::io::Error),
}

/// Build the rustls config for a TLS setting, `None` when TLS is off.
pub async fn load_tls_config(setting: &TlsSetting) -> Result<Option<RustlsConfig>, TlsError> {
    match setting {
        TlsSetting::Toggle(false) => Ok(None),
        TlsSetting::Toggle(true) => {
            load_pem_files(Path::new(DEFAULT_CERT_PATH), Path::new(DEFAULT_KEY_PATH))
                .await
                .map(Some)
        }
        TlsSetting::Files {
            cert_path,
            key_path,
        } => load_pem_files(cert_path, key_path).await.map(Some),
        TlsSetting::Pem { cert, key } => {
            let config =
                RustlsConfig::from_pem(cert.as_bytes().to_vec(), key.as_bytes().to_vec()).await?;
            Ok(Some(config))
        }
    }
}

/// Load TLS configuration from certificate and key files.
pub async fn load_pem_files(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    if !cert_path.exists() {
        return Err(TlsError::CertificateMissing(cert_path.to_path_buf()));
    }
    if !key_path.exists() {
        return Err(TlsError::KeyMissing(key_path.to_path_buf()));
    }

    tracing::debug!(
        cert = %cert_path.display(),
        key = %key_path.display(),
        "Loading TLS material"
    );
    Ok(RustlsConfig::from_pem_file(cert_path, key_path).await?)
}
