//! Key-value store port and its two backends.
//!
//! Paths are `/`-joined strings rooted at [`ROOT`]; the bucket key is the
//! first segment below the root and the raw item key the second. Each
//! primitive is atomic for its own path only.

use crate::bucket::BucketKey;
use crate::errors::StoreError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, error};

pub const ROOT: &str = "wasteItems";

pub fn bucket_path(bucket: &BucketKey) -> String {
    format!("{ROOT}/{bucket}")
}

pub fn item_path(bucket: &BucketKey, raw_key: &str) -> String {
    format!("{ROOT}/{bucket}/{raw_key}")
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        Ok(self.get(path).await?.is_some())
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(path).await
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(path, value).await
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        (**self).remove(path).await
    }

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        (**self).exists(path).await
    }
}

/// JSON document tree kept in memory and, when opened from a file, written
/// back after every mutation.
///
/// Mirrors the hosted database's tree semantics: setting `null` removes a
/// path, and objects left empty by a removal disappear with it. A mutation
/// only becomes visible once the file write succeeded.
pub struct LocalStore {
    path: Option<PathBuf>,
    root: Mutex<Value>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            root: Mutex::new(Value::Object(Map::new())),
        }
    }

    /// Opens a file-backed store. A missing or unreadable file starts empty.
    pub async fn open(path: PathBuf) -> Self {
        let root = load_document(&path).await;
        Self {
            path: Some(path),
            root: Mutex::new(root),
        }
    }

    async fn persist(&self, root: &Value) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let payload = serde_json::to_vec_pretty(root)
            .map_err(|err| StoreError::data_shape(&path.display().to_string(), err.to_string()))?;
        fs::write(path, payload).await?;
        Ok(())
    }
}

async fn load_document(path: &Path) -> Value {
    let empty = Value::Object(Map::new());
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => {
                error!("ledger file {} is not a json object", path.display());
                empty
            }
            Err(err) => {
                error!("failed to parse ledger file: {err}");
                empty
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => empty,
        Err(err) => {
            error!("failed to read ledger file: {err}");
            empty
        }
    }
}

fn lookup<'a>(root: &'a Value, segs: &[&str]) -> Option<&'a Value> {
    let mut node = root;
    for seg in segs {
        node = node.as_object()?.get(*seg)?;
    }
    if node.is_null() { None } else { Some(node) }
}

fn insert(root: &mut Value, segs: &[&str], value: Value) {
    let Some((last, parents)) = segs.split_last() else {
        *root = value;
        return;
    };
    let mut node = root;
    for seg in parents {
        node = object_mut(node)
            .entry(seg.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    object_mut(node).insert(last.to_string(), value);
}

/// Replaces a leaf with an empty object so children can be added below it.
fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

/// Removes the path and prunes parents left empty. Returns whether `node`
/// itself ended up empty.
fn delete(node: &mut Value, segs: &[&str]) -> bool {
    let Some((first, rest)) = segs.split_first() else {
        return true;
    };
    let Value::Object(map) = node else {
        return false;
    };
    let child_empty = match map.get_mut(*first) {
        Some(child) => rest.is_empty() || delete(child, rest),
        None => false,
    };
    if child_empty {
        map.remove(*first);
    }
    map.is_empty()
}

#[async_trait]
impl KeyValueStore for LocalStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let root = self.root.lock().await;
        Ok(lookup(&root, &segments(path)).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        if value.is_null() {
            return self.remove(path).await;
        }
        let mut root = self.root.lock().await;
        let mut next = root.clone();
        insert(&mut next, &segments(path), value);
        self.persist(&next).await?;
        *root = next;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let segs = segments(path);
        let mut root = self.root.lock().await;
        let next = if segs.is_empty() {
            Value::Object(Map::new())
        } else {
            let mut next = root.clone();
            delete(&mut next, &segs);
            next
        };
        self.persist(&next).await?;
        *root = next;
        Ok(())
    }
}

/// Hosted realtime database spoken to over its REST interface
/// (`<base>/<path>.json`).
pub struct RealtimeDbStore {
    client: Client,
    base: Url,
    auth: Option<String>,
}

impl RealtimeDbStore {
    pub fn new(base_url: &str, auth: Option<String>) -> Result<Self, StoreError> {
        let base = Url::parse(base_url)
            .map_err(|err| StoreError::Connectivity(format!("invalid store url {base_url}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Connectivity(format!(
                "store url {base_url} cannot hold a path"
            )));
        }
        Ok(Self {
            client: Client::new(),
            base,
            auth,
        })
    }

    fn url_for(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let segs = segments(path);
        if let Ok(mut out) = url.path_segments_mut() {
            out.pop_if_empty();
            match segs.split_last() {
                Some((last, parents)) => {
                    out.extend(parents.iter().copied());
                    out.push(&format!("{last}.json"));
                }
                None => {
                    out.push(".json");
                }
            }
        }
        if let Some(auth) = &self.auth {
            url.query_pairs_mut().append_pair("auth", auth);
        }
        url
    }
}

fn connectivity(err: reqwest::Error) -> StoreError {
    StoreError::Connectivity(err.to_string())
}

fn check_status(path: &str, response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(StoreError::Connectivity(format!("{path}: store answered {status}")))
    }
}

#[async_trait]
impl KeyValueStore for RealtimeDbStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .client
            .get(self.url_for(path))
            .send()
            .await
            .map_err(connectivity)?;
        let value: Value = check_status(path, response)?
            .json()
            .await
            .map_err(|err| StoreError::data_shape(path, err.to_string()))?;
        debug!(path, "store get");
        Ok(if value.is_null() { None } else { Some(value) })
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url_for(path))
            .json(&value)
            .send()
            .await
            .map_err(connectivity)?;
        check_status(path, response)?;
        debug!(path, "store set");
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url_for(path))
            .send()
            .await
            .map_err(connectivity)?;
        check_status(path, response)?;
        debug!(path, "store remove");
        Ok(())
    }
}
