use anyhow::{Context, Result, bail};
use image::RgbaImage;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::debug;

use crate::source::ImageSource;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Lazily built HTTP client shared by every fetch. The blocking client owns
/// a runtime thread and a connection pool, so one is enough.
#[derive(Clone, Debug, Default)]
pub struct HttpClient {
    inner: Arc<OnceLock<reqwest::blocking::Client>>,
}

impl HttpClient {
    fn get(&self) -> Result<&reqwest::blocking::Client> {
        if let Some(client) = self.inner.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(self.inner.get_or_init(|| client))
    }

    #[cfg(test)]
    fn is_built(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// Loads and decodes one image into RGBA8, either over HTTP(S) or from disk.
pub fn fetch_image(source: &ImageSource, http: &HttpClient) -> Result<RgbaImage> {
    match source {
        ImageSource::Url(url) => {
            let response = http
                .get()?
                .get(url)
                .send()
                .with_context(|| format!("request for {url} failed"))?;
            let status = response.status();
            if !status.is_success() {
                bail!("request for {url} returned {status}");
            }
            let bytes = response
                .bytes()
                .with_context(|| format!("failed to read body of {url}"))?;
            debug!(%url, bytes = bytes.len(), "image downloaded");
            decode_image(&bytes).with_context(|| format!("failed to decode {url}"))
        }
        ImageSource::Path(path) => {
            let image = image::open(path)
                .with_context(|| format!("failed to open image {}", path.display()))?;
            Ok(image.to_rgba8())
        }
    }
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes).context("unrecognised image data")?;
    Ok(image.to_rgba8())
}
