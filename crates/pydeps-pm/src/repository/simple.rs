use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use log::debug;
use pydeps_semver::{normalize_name, Spec};
use regex::Regex;
use url::Url;

use super::{Artifact, Repository};
use crate::archive::ArchiveFormat;
use crate::http::HttpClient;
use crate::Result;

lazy_static! {
    static ref ANCHOR_REGEX: Regex =
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#).unwrap();
}

/// Client for a PEP 503 "simple" repository such as `https://pypi.org/simple/`.
///
/// Only source distributions in a format [`crate::archive`] can unpack are
/// offered as candidates; wheels and installers are skipped.
pub struct SimpleRepository {
    index_url: Url,
    http: Arc<HttpClient>,
}

impl SimpleRepository {
    pub fn new(index_url: Url, http: Arc<HttpClient>) -> Self {
        Self { index_url, http }
    }

    /// URL of the project page, `<index>/<normalized-name>/`
    pub fn project_url(&self, name: &str) -> Result<Url> {
        Ok(self.index_url.join(&format!("{}/", normalize_name(name)))?)
    }
}

#[async_trait]
impl Repository for SimpleRepository {
    async fn find_candidates(&self, spec: &Spec) -> Result<Vec<Artifact>> {
        let page_url = self.project_url(spec.name())?;
        let html = self.http.get_text(&page_url).await?;
        let candidates = parse_project_page(&page_url, &html, &spec.key());
        debug!("{} candidate archives for {}", candidates.len(), spec.name());
        Ok(candidates)
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        self.http.download(url).await
    }
}

/// Extract the source archives for `project` from a simple project page.
pub(crate) fn parse_project_page(page_url: &Url, html: &str, project: &str) -> Vec<Artifact> {
    let mut artifacts = Vec::new();

    for caps in ANCHOR_REGEX.captures_iter(html) {
        let href = caps[1].replace("&amp;", "&");
        let url = match page_url.join(&href) {
            Ok(url) => url,
            Err(e) => {
                debug!("Skipping link {}: {}", href, e);
                continue;
            }
        };

        let text = caps[2].trim();
        let artifact = if text.is_empty() || text.contains('<') {
            match Artifact::from_url(url) {
                Some(artifact) => artifact,
                None => continue,
            }
        } else {
            Artifact::new(url, text)
        };

        if ArchiveFormat::from_filename(&artifact.filename).is_none() {
            debug!("Skipping {}: not a source archive", artifact.filename);
            continue;
        }

        let belongs_to_project = artifact
            .name_and_version()
            .map(|(name, _)| normalize_name(name) == project)
            .unwrap_or(false);
        if !belongs_to_project {
            debug!("Skipping {}: file name does not match {}", artifact.filename, project);
            continue;
        }

        artifacts.push(artifact);
    }

    artifacts
}
