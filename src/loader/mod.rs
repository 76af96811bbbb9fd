//! Loading mapping documents from a local directory or remote endpoints.
//!
//! The loader itself is configured with a small JSON document:
//!
//! ```json
//! {
//!   "local_directory": "configs/",
//!   "configs": [{ "uri": "https://example.com/drift.json", "file_name": "drift.json" }]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{AccountInterner, ProgramMapConfig};
use crate::error::LoadError;

#[cfg(feature = "http")]
use crate::http::{ConfigHttp, RetryPolicy};

/// A remote mapping document and the file name it is cached under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigResource {
    pub uri: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLoader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_directory: Option<PathBuf>,
    #[serde(default)]
    pub configs: Vec<ConfigResource>,
}

impl ConfigLoader {
    pub fn new(local_directory: Option<PathBuf>, configs: Vec<ConfigResource>) -> Self {
        Self {
            local_directory,
            configs,
        }
    }

    pub fn from_json(data: &[u8]) -> Result<Self, LoadError> {
        serde_json::from_slice(data).map_err(|source| LoadError::Json {
            origin: "loader config".to_string(),
            source,
        })
    }

    fn directory(&self) -> Result<&Path, LoadError> {
        self.local_directory
            .as_deref()
            .ok_or(LoadError::MissingLocalDirectory)
    }

    /// Parse every `*.json` file under `local_directory`, recursively, in path order.
    pub fn load_local_configs(&self) -> Result<Vec<ProgramMapConfig>, LoadError> {
        let dir = self.directory()?;
        if !dir.is_dir() {
            return Err(LoadError::NotADirectory(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        collect_json_files(dir, &mut files)?;
        files.sort();

        let mut interner = AccountInterner::new();
        let configs = files
            .iter()
            .map(|path| {
                let data = fs::read(path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                parse_document(&data, &path.display().to_string(), &mut interner)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            directory = %dir.display(),
            configs = configs.len(),
            interned = interner.len(),
            "Loaded local mapping configs"
        );
        Ok(configs)
    }

    /// Fetch every remote resource concurrently and parse the results in
    /// declaration order.
    ///
    /// With `cache_files` each raw body is also written to
    /// `local_directory/file_name`, so a later [`Self::load_local_configs`]
    /// can start without network access.
    #[cfg(feature = "http")]
    pub async fn load_remote_configs(
        &self,
        client: &ConfigHttp,
        cache_files: bool,
        retry: &RetryPolicy,
    ) -> Result<Vec<ProgramMapConfig>, LoadError> {
        if self.configs.is_empty() {
            return Ok(Vec::new());
        }
        let cache_dir = if cache_files {
            Some(self.directory()?)
        } else {
            None
        };

        let bodies = futures_util::future::try_join_all(
            self.configs
                .iter()
                .map(|resource| client.get_bytes(&resource.uri, retry)),
        )
        .await?;

        let mut interner = AccountInterner::new();
        let mut configs = Vec::with_capacity(bodies.len());
        for (resource, body) in self.configs.iter().zip(&bodies) {
            configs.push(parse_document(body, &resource.uri, &mut interner)?);

            if let Some(dir) = cache_dir {
                let path = dir.join(&resource.file_name);
                fs::write(&path, body).map_err(|source| LoadError::Io { path, source })?;
            }
        }

        tracing::debug!(
            configs = configs.len(),
            interned = interner.len(),
            cached = cache_files,
            "Loaded remote mapping configs"
        );
        Ok(configs)
    }
}

fn parse_document(
    data: &[u8],
    origin: &str,
    interner: &mut AccountInterner,
) -> Result<ProgramMapConfig, LoadError> {
    ProgramMapConfig::from_json(data, interner).map_err(|err| match err {
        LoadError::Json { source, .. } => LoadError::Json {
            origin: origin.to_string(),
            source,
        },
        other => other,
    })
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}
