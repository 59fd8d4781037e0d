//! Downloading `.torrent` files over HTTP(S).

use super::error::MetainfoError;
use super::torrent::Metainfo;
use crate::constants::{FETCH_CONNECT_TIMEOUT, FETCH_TIMEOUT, MAX_METAINFO_SIZE, USER_AGENT};
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Settings for [`fetch_to_file`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub connect_timeout: Duration,
    /// Limit for the whole request, body included.
    pub timeout: Duration,
    /// Largest body accepted, in bytes.
    pub max_size: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: FETCH_CONNECT_TIMEOUT,
            timeout: FETCH_TIMEOUT,
            max_size: MAX_METAINFO_SIZE,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Downloads a torrent file, decodes it, and stores it at `dest`.
///
/// The body is decoded before anything is written, and the file is written
/// to a sibling `.part` path that is renamed into place once complete. On
/// failure the partial copy is removed and an existing file at `dest` is
/// left untouched.
///
/// # Errors
///
/// Returns [`MetainfoError::Fetch`] if the request fails or the server
/// answers with an error status, [`MetainfoError::TooLarge`] if the body
/// exceeds `config.max_size`, any decode error of
/// [`Metainfo::from_bytes`], or an I/O error while writing.
pub async fn fetch_to_file(
    url: &str,
    dest: impl AsRef<Path>,
    config: &FetchConfig,
) -> Result<Metainfo, MetainfoError> {
    let dest = dest.as_ref();
    debug!("Fetching torrent from {}", url);

    let data = download(url, config).await?;
    let metainfo = Metainfo::decode_blocking(data.clone()).await?;

    let part = part_path(dest);
    if let Err(e) = write_and_rename(&part, dest, &data).await {
        if let Err(cleanup) = tokio::fs::remove_file(&part).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", part.display(), cleanup);
            }
        }
        return Err(e);
    }

    debug!(
        "Fetched {} ({} bytes) to {}",
        url,
        data.len(),
        dest.display()
    );
    Ok(metainfo)
}

async fn download(url: &str, config: &FetchConfig) -> Result<Bytes, MetainfoError> {
    let fetch_err = |source| MetainfoError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(fetch_err)?;

    let mut response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fetch_err)?;

    let limit = config.max_size;
    if let Some(size) = response.content_length() {
        if size > limit {
            return Err(MetainfoError::TooLarge { size, limit });
        }
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = response.chunk().await.map_err(fetch_err)? {
        let size = (body.len() + chunk.len()) as u64;
        if size > limit {
            return Err(MetainfoError::TooLarge { size, limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

async fn write_and_rename(part: &Path, dest: &Path, data: &[u8]) -> Result<(), MetainfoError> {
    tokio::fs::write(part, data).await?;
    tokio::fs::rename(part, dest).await?;
    Ok(())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_path_is_sibling() {
        let part = part_path(Path::new("/tmp/dl/a.torrent"));
        assert_eq!(part, Path::new("/tmp/dl/a.torrent.part"));
    }

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.max_size, MAX_METAINFO_SIZE);
        assert!(config.user_agent.starts_with("torrent-metainfo/"));
    }

    #[tokio::test]
    async fn test_unreachable_host_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.torrent");
        let config = FetchConfig {
            connect_timeout: Duration::from_millis(200),
            timeout: Duration::from_millis(500),
            ..FetchConfig::default()
        };

        // Port 9 on loopback (discard) is expected to refuse connections.
        let result = fetch_to_file("http://127.0.0.1:9/x.torrent", &dest, &config).await;
        assert!(matches!(result, Err(MetainfoError::Fetch { .. })));
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            fetch_to_file("not a url", dir.path().join("x"), &FetchConfig::default()).await;
        assert!(matches!(result, Err(MetainfoError::Fetch { .. })));
    }
}
