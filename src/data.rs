use crate::config::AppConfig;
use crate::error::FetchError;
use crate::topology::Topology;
use crate::types::{EducationRecord, RegionFeature};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Url(s.to_string())
        } else if let Some(path) = s.strip_prefix("file://") {
            Source::Path(PathBuf::from(path))
        } else {
            Source::Path(PathBuf::from(s))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Both datasets, ready to be joined.
#[derive(Debug)]
pub struct Datasets {
    pub records: Vec<EducationRecord>,
    pub features: Vec<RegionFeature>,
}

/// Retrieves the education records and the county topology concurrently.
///
/// Fails as soon as either source is unreachable or malformed; there is no
/// partial result.
pub async fn load(config: &AppConfig) -> Result<Datasets, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch.timeout_secs))
        .build()
        .map_err(|e| FetchError::Unreachable {
            source_id: "http client".to_string(),
            reason: e.to_string(),
        })?;

    let education = Source::parse(&config.input.education);
    let counties = Source::parse(&config.input.counties);
    info!(%education, %counties, "Loading datasets");

    let (records, topology) = tokio::try_join!(
        fetch_json::<Vec<EducationRecord>>(&client, &education),
        fetch_json::<Topology>(&client, &counties),
    )?;

    let features = topology
        .features(&config.input.topology_object)
        .map_err(|error| FetchError::Topology {
            source_id: counties.to_string(),
            error,
        })?;

    info!(records = records.len(), features = features.len(), "Loaded datasets");
    Ok(Datasets { records, features })
}

async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    source: &Source,
) -> Result<T, FetchError> {
    let bytes = fetch_bytes(client, source).await?;
    debug!(%source, bytes = bytes.len(), "Fetched source");
    serde_json::from_slice(&bytes).map_err(|error| FetchError::Malformed {
        source_id: source.to_string(),
        error,
    })
}

async fn fetch_bytes(client: &reqwest::Client, source: &Source) -> Result<Vec<u8>, FetchError> {
    match source {
        Source::Url(url) => {
            let unreachable = |e: reqwest::Error| FetchError::Unreachable {
                source_id: url.clone(),
                reason: e.to_string(),
            };
            let response = client.get(url).send().await.map_err(unreachable)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    source_id: url.clone(),
                    status: status.as_u16(),
                });
            }
            let body = response.bytes().await.map_err(unreachable)?;
            Ok(body.to_vec())
        }
        Source::Path(path) => tokio::fs::read(path).await.map_err(|error| FetchError::Io {
            source_id: path.display().to_string(),
            error,
        }),
    }
}
