use std::sync::Arc;

use log::debug;
use url::Url;

use crate::cache::ArtifactStore;
use crate::config::Config;
use crate::http::HttpClient;
use crate::index::{InMemoryIndex, PackageIndex, RemoteIndex};
use crate::metadata::EggInfoGenerator;
use crate::policy::Policy;
use crate::repository::SimpleRepository;
use crate::resolver::{Resolver, ResolverOptions};
use crate::Result;

/// One resolution session: a configuration plus the index it built.
///
/// The index owns the lookup caches, so everything resolved through the
/// same session shares them and a new session starts cold.
pub struct Session {
    pub config: Config,
    index: Arc<dyn PackageIndex>,
}

impl Session {
    /// Create a session that resolves against the configured package
    /// repository
    pub fn remote(config: Config) -> Result<Self> {
        let index_url = parse_index_url(&config.index_url)?;
        debug!("Using index {}", index_url);
        debug!("Storing archives in {}", config.cache_dir.display());

        let http = Arc::new(HttpClient::new(config.download_timeout())?);
        let repository = Arc::new(SimpleRepository::new(index_url, http));
        let store = ArtifactStore::new(config.cache_dir.clone());
        let generator = Arc::new(EggInfoGenerator::new(
            config.python.clone(),
            config.metadata_timeout(),
        ));

        let index = RemoteIndex::new(repository, store, generator)
            .with_policy(policy(&config))
            .on_metadata_failure(config.on_metadata_failure);

        Ok(Self {
            config,
            index: Arc::new(index),
        })
    }

    /// Create a session over a fixed package table
    pub fn in_memory(config: Config, index: InMemoryIndex) -> Self {
        let index = index.with_policy(policy(&config));
        Self {
            config,
            index: Arc::new(index),
        }
    }

    pub fn index(&self) -> &dyn PackageIndex {
        self.index.as_ref()
    }

    pub fn resolver(&self, options: ResolverOptions) -> Resolver<'_> {
        Resolver::with_options(self.index.as_ref(), options)
    }
}

fn policy(config: &Config) -> Policy {
    Policy::new().prefer_lowest(config.prefer_lowest)
}

/// Parse the index URL, making sure relative joins stay below it
fn parse_index_url(raw: &str) -> Result<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{}/", raw))?)
    }
}
