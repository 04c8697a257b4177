use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

use crate::error::StartupError;

/// Column list as exported next to the model: either a bare array or a
/// meta object carrying the authoritative input order.
#[derive(Deserialize)]
#[serde(untagged)]
enum MetaJson {
    List(Vec<String>),
    Meta {
        feat_list: Vec<String>,
        in_dim: Option<usize>,
    },
}

/// Ordered feature names the trained model expects. Immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Result<Self, StartupError> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(StartupError::Invalid {
                    what: "feature schema",
                    reason: format!("duplicate feature name {name:?}"),
                });
            }
        }
        Ok(Self { names, index })
    }

    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let meta_txt = fs::read_to_string(path).map_err(|source| StartupError::Read {
            what: "feature schema",
            path: path.to_path_buf(),
            source,
        })?;
        let meta: MetaJson = serde_json::from_str(&meta_txt).map_err(|source| StartupError::Parse {
            what: "feature schema",
            path: path.to_path_buf(),
            source,
        })?;

        let feat_list = match meta {
            MetaJson::List(names) => names,
            MetaJson::Meta { feat_list, in_dim } => {
                if let Some(in_dim) = in_dim.filter(|d| *d != feat_list.len()) {
                    tracing::warn!(
                        "meta.in_dim ({}) != feat_list.len() ({}); using feat_list.len()",
                        in_dim,
                        feat_list.len()
                    );
                }
                feat_list
            }
        };
        Self::new(feat_list)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}
