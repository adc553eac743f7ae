use crate::http::HttpClient;
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Path a download is streamed into before it is moved to `path`.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Streams a package artifact from `url` into `path`.
///
/// The body goes to `<path>.part` first and is renamed once it is complete;
/// a download that fails midway removes the partial file.
#[tracing::instrument(skip(runtime, path, http_client))]
pub async fn download_file<R: Runtime>(
    runtime: &R,
    url: &str,
    path: &Path,
    http_client: &HttpClient,
) -> Result<u64> {
    info!("Downloading {}...", url);

    let part_path = partial_path(path);
    let mut created = false;
    let result = http_client
        .download_file(url, || {
            let file = runtime.create_file(&part_path).with_context(|| {
                format!("Failed to create package file at {}", part_path.display())
            })?;
            created = true;
            Ok(file)
        })
        .await
        .with_context(|| format!("Failed to download {}", url));

    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            if created {
                if let Err(cleanup) = runtime.remove_file(&part_path) {
                    warn!("Failed to clean up {}: {:#}", part_path.display(), cleanup);
                }
            }
            return Err(e);
        }
    };

    runtime.rename(&part_path, path)?;

    info!("Saved {} bytes to {}", bytes, path.display());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::services::build_http_client;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use reqwest::Client;
    use std::io::Write;
    use std::time::Duration;

    /// Writer that accepts nothing, like a full disk.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("No space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("out/foo.1.0.0.nupkg")),
            PathBuf::from("out/foo.1.0.0.nupkg.part")
        );
    }

    #[tokio::test]
    async fn test_download_file() {
        // --- Setup Mock Server ---
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flat/foo/1.0.0/foo.1.0.0.nupkg")
            .with_status(200)
            .with_body("nupkg bytes")
            .create_async()
            .await;

        // --- Setup Runtime ---
        let mut runtime = MockRuntime::new();
        runtime
            .expect_create_file()
            .with(eq(PathBuf::from("foo.1.0.0.nupkg.part")))
            .returning(|_| Ok(Box::new(std::io::sink())));

        // Complete download is moved into place
        runtime
            .expect_rename()
            .with(
                eq(PathBuf::from("foo.1.0.0.nupkg.part")),
                eq(PathBuf::from("foo.1.0.0.nupkg")),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        // --- Execute ---
        let http_client = HttpClient::new(Client::new());
        let result = download_file(
            &runtime,
            &format!("{}/flat/foo/1.0.0/foo.1.0.0.nupkg", server.url()),
            Path::new("foo.1.0.0.nupkg"),
            &http_client,
        )
        .await;

        // --- Verify ---
        mock.assert_async().await;
        assert_eq!(result.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_download_file_not_found() {
        // --- Setup Mock Server ---
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flat/foo/9.9.9/foo.9.9.9.nupkg")
            .with_status(404)
            .create_async()
            .await;

        // No expectations: creating or removing a file would panic
        let runtime = MockRuntime::new();

        // --- Execute ---
        let http_client = HttpClient::new(Client::new());
        let url = format!("{}/flat/foo/9.9.9/foo.9.9.9.nupkg", server.url());
        let result = download_file(&runtime, &url, Path::new("foo.9.9.9.nupkg"), &http_client).await;

        // --- Verify ---
        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains(&url));
    }

    #[tokio::test]
    async fn test_download_file_create_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/a.nupkg")
            .with_status(200)
            .with_body("x")
            .create_async()
            .await;

        // Nothing was created, so nothing is removed
        let mut runtime = MockRuntime::new();
        runtime
            .expect_create_file()
            .returning(|_| Err(anyhow::anyhow!("Permission denied")));

        let http_client = HttpClient::new(Client::new());
        let result = download_file(
            &runtime,
            &format!("{}/a.nupkg", server.url()),
            Path::new("out/a.nupkg"),
            &http_client,
        )
        .await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to create package file"));
        assert!(message.contains("Permission denied"));
    }

    #[tokio::test]
    async fn test_download_file_write_error_removes_partial_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/b.nupkg")
            .with_status(200)
            .with_body("package body")
            .create_async()
            .await;

        let mut runtime = MockRuntime::new();
        runtime
            .expect_create_file()
            .with(eq(PathBuf::from("out/b.nupkg.part")))
            .returning(|_| Ok(Box::new(FullDisk)));
        runtime
            .expect_remove_file()
            .with(eq(PathBuf::from("out/b.nupkg.part")))
            .times(1)
            .returning(|_| Ok(()));
        runtime.expect_rename().never();

        let http_client = HttpClient::new(Client::new());
        let result = download_file(
            &runtime,
            &format!("{}/b.nupkg", server.url()),
            Path::new("out/b.nupkg"),
            &http_client,
        )
        .await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("No space left on device"));
    }

    #[tokio::test]
    async fn test_download_file_stalled_body_leaves_nothing_behind() {
        // --- Setup Mock Server ---
        // Sends part of the body, then stalls past the client timeout
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/flat/slow/1.0.0/slow.1.0.0.nupkg")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(&[0u8; 4096])?;
                w.flush()?;
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(b"tail")
            })
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.1.0.0.nupkg");

        // --- Execute ---
        let http_client = build_http_client(Duration::from_secs(1)).unwrap();
        let result = download_file(
            &RealRuntime,
            &format!("{}/flat/slow/1.0.0/slow.1.0.0.nupkg", server.url()),
            &path,
            &http_client,
        )
        .await;

        // --- Verify ---
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("timed out"));
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }
}
