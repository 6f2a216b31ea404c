use crate::buffer::BufferTable;
use crate::error::{JunctionError, Result};
use crate::platform::PlatformSpec;
use futures_util::StreamExt;
use image::RgbImage;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const MAX_ASSET_BYTES: usize = 32 * 1024 * 1024;

/// Longest error body kept in `FetchFailed`.
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Remote(String),
    Local(PathBuf),
}

impl AssetSource {
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            AssetSource::Remote(trimmed.to_string())
        } else {
            AssetSource::Local(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for AssetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetSource::Remote(url) => write!(f, "{}", url),
            AssetSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Template and offset table for one platform, decoded and ready to use.
#[derive(Debug)]
pub struct PlatformAssets {
    pub spec: PlatformSpec,
    pub template: RgbImage,
    pub buffers: BufferTable,
}

pub struct AssetClient {
    client: reqwest::Client,
    max_bytes: usize,
    cache: Mutex<HashMap<String, Arc<PlatformAssets>>>,
}

impl AssetClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            max_bytes: MAX_ASSET_BYTES,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Caps the size of remote downloads.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub async fn fetch_bytes(&self, source: &AssetSource) -> Result<Vec<u8>> {
        match source {
            AssetSource::Local(path) => {
                debug!("Reading asset from {}", path.display());
                Ok(tokio::fs::read(path).await?)
            }
            AssetSource::Remote(url) => {
                debug!("Fetching asset from {}", url);
                let response = self.client.get(url).send().await?;

                let status = response.status();
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    let body: String = text.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
                    warn!("Failed to retrieve {}: HTTP {}: {}", url, status, body);
                    return Err(JunctionError::FetchFailed {
                        url: url.clone(),
                        status: status.as_u16(),
                        body,
                    });
                }

                let mut body = Vec::new();
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    if body.len() + chunk.len() > self.max_bytes {
                        return Err(JunctionError::AssetTooLarge {
                            location: url.clone(),
                            limit: self.max_bytes,
                        });
                    }
                    body.extend_from_slice(&chunk);
                }
                debug!("Fetched {} bytes from {}", body.len(), url);
                Ok(body)
            }
        }
    }

    pub async fn fetch_template(&self, source: &AssetSource) -> Result<RgbImage> {
        let bytes = self.fetch_bytes(source).await?;
        Ok(image::load_from_memory(&bytes)?.to_rgb8())
    }

    pub async fn fetch_buffer_table(&self, source: &AssetSource) -> Result<BufferTable> {
        let bytes = self.fetch_bytes(source).await?;
        BufferTable::from_reader(bytes.as_slice())
    }

    /// Loads a platform once per session; later calls return the cached copy.
    pub async fn load_platform(&self, spec: &PlatformSpec) -> Result<Arc<PlatformAssets>> {
        if let Some(assets) = self.cache.lock().await.get(&spec.code) {
            return Ok(assets.clone());
        }

        info!("Loading assets for platform {}", spec.code);
        let template = self
            .fetch_template(&AssetSource::parse(&spec.template))
            .await?;
        let buffers = self
            .fetch_buffer_table(&AssetSource::parse(&spec.buffer_table))
            .await?;

        if template.dimensions() != spec.canvas {
            warn!(
                "Template for {} is {}x{}, expected {}x{}; using the template's size",
                spec.code,
                template.width(),
                template.height(),
                spec.canvas.0,
                spec.canvas.1
            );
        }
        info!(
            "Platform {} ready: {} product types",
            spec.code,
            buffers.entries().len()
        );

        let assets = Arc::new(PlatformAssets {
            spec: spec.clone(),
            template,
            buffers,
        });
        self.cache
            .lock()
            .await
            .insert(spec.code.clone(), assets.clone());
        Ok(assets)
    }

    pub async fn invalidate(&self, code: &str) {
        self.cache.lock().await.remove(code);
    }
}

impl Default for AssetClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::HorizontalAlign;
    use image::Rgb;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response and returns its URL.
    async fn serve_once(status_line: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&body).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}/asset", addr)
    }

    fn direct_client() -> AssetClient {
        AssetClient {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            ..AssetClient::new()
        }
    }

    fn local_spec(dir: &std::path::Path, canvas: (u32, u32)) -> PlatformSpec {
        let template_path = dir.join("template.png");
        RgbImage::from_pixel(60, 40, Rgb([240, 240, 240]))
            .save(&template_path)
            .unwrap();
        let table_path = dir.join("buffer.csv");
        std::fs::write(&table_path, "product,buffer1,buffer2\nBag,5,30\n").unwrap();

        PlatformSpec {
            code: "TST".to_string(),
            name: "Test".to_string(),
            template: template_path.to_string_lossy().to_string(),
            buffer_table: table_path.to_string_lossy().to_string(),
            canvas,
            archive_suffix: "Test".to_string(),
            horizontal_align: HorizontalAlign::Center,
        }
    }

    #[test]
    fn test_asset_source_parse() {
        assert_eq!(
            AssetSource::parse(" https://example.com/a.jpg "),
            AssetSource::Remote("https://example.com/a.jpg".to_string())
        );
        assert_eq!(
            AssetSource::parse("assets/a.jpg"),
            AssetSource::Local(PathBuf::from("assets/a.jpg"))
        );
    }

    #[tokio::test]
    async fn test_load_local_platform_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let spec = local_spec(dir.path(), (60, 40));
        let client = AssetClient::new();

        let first = client.load_platform(&spec).await.unwrap();
        assert_eq!(first.template.dimensions(), (60, 40));
        assert_eq!(first.buffers.lookup("Bag").unwrap().target_height, 30);

        let second = client.load_platform(&spec).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        client.invalidate("TST").await;
        let third = client.load_platform(&spec).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[tokio::test]
    async fn test_canvas_mismatch_keeps_real_template() {
        let dir = tempfile::tempdir().unwrap();
        let spec = local_spec(dir.path(), (525, 338));
        let assets = AssetClient::new().load_platform(&spec).await.unwrap();
        assert_eq!(assets.template.dimensions(), (60, 40));
    }

    #[tokio::test]
    async fn test_missing_local_asset() {
        let client = AssetClient::new();
        let err = client
            .fetch_template(&AssetSource::parse("/definitely/not/here.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, JunctionError::IoError(_)));
    }

    #[tokio::test]
    async fn test_remote_table_is_fetched() {
        let url = serve_once("200 OK", b"product,buffer1,buffer2\nBag,5,30\n".to_vec()).await;
        let table = direct_client()
            .fetch_buffer_table(&AssetSource::parse(&url))
            .await
            .unwrap();
        assert_eq!(table.lookup("Bag").unwrap().top_offset, 5);
    }

    #[tokio::test]
    async fn test_remote_error_carries_status_and_body() {
        let url = serve_once("404 Not Found", b"no such template".to_vec()).await;
        let err = direct_client()
            .fetch_bytes(&AssetSource::parse(&url))
            .await
            .unwrap_err();
        match err {
            JunctionError::FetchFailed {
                url: failed,
                status,
                body,
            } => {
                assert_eq!(failed, url);
                assert_eq!(status, 404);
                assert_eq!(body, "no such template");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remote_download_over_limit_fails() {
        let url = serve_once("200 OK", vec![b'x'; 4096]).await;
        let err = direct_client()
            .with_max_bytes(1024)
            .fetch_bytes(&AssetSource::parse(&url))
            .await
            .unwrap_err();
        assert!(matches!(err, JunctionError::AssetTooLarge { limit: 1024, .. }));
    }
}
