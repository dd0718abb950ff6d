use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use tracing::debug;

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "mlb_edge";
const CACHE_FILE: &str = "http_cache.json";

pub const DEFAULT_TTL_SECS: u64 = 3600;
/// Entries older than this (or the TTL, if longer) are dropped on load.
pub const MAX_ENTRY_AGE_SECS: u64 = 2 * 24 * 3600;
/// Writes buffered in memory before the file is rewritten.
const SAVE_EVERY: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HttpCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
    #[serde(skip)]
    unsaved: usize,
}

impl HttpCacheFile {
    fn prune(&mut self, now: u64, max_age_secs: u64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_sub(e.fetched_at) <= max_age_secs);
        before - self.entries.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

/// URL-keyed response cache with a freshness window.
///
/// Entries younger than `ttl_secs` are served without touching the network.
/// Older entries are revalidated with conditional headers so an unchanged
/// upstream answers 304 and only the timestamp moves.
pub struct HttpCache {
    ttl_secs: u64,
    path: Option<PathBuf>,
    file: Mutex<Option<HttpCacheFile>>,
}

impl HttpCache {
    /// Cache backed by the per-user cache directory.
    pub fn persistent(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            path: cache_path(),
            file: Mutex::new(None),
        }
    }

    pub fn in_memory(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            path: None,
            file: Mutex::new(None),
        }
    }

    pub fn with_path(ttl_secs: u64, path: PathBuf) -> Self {
        Self {
            ttl_secs,
            path: Some(path),
            file: Mutex::new(None),
        }
    }

    pub fn fetch(&self, client: &Client, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let key = cache_key(url, query);
        let now = now_secs();
        let cached_entry = self.entry(&key);

        if let Some(entry) = cached_entry.as_ref() {
            if is_fresh(entry.fetched_at, now, self.ttl_secs) {
                debug!(url = %key, "http cache hit");
                return Ok(entry.body.clone());
            }
        }

        let mut req = client.get(url).query(query);
        if let Some(entry) = cached_entry.as_ref() {
            if let Some(etag) = entry.etag.as_ref() {
                req = req.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = entry.last_modified.as_ref() {
                req = req.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        let resp = req.send().context("request failed")?;
        let status = resp.status();
        let headers = resp.headers().clone();
        if status == StatusCode::NOT_MODIFIED {
            if let Some(mut entry) = cached_entry {
                debug!(url = %key, "http cache revalidated");
                entry.fetched_at = now;
                let body = entry.body.clone();
                self.store_entry(&key, entry);
                return Ok(body);
            }
            return Err(anyhow::anyhow!("received 304 without cache body"));
        }

        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            let snippet = body.trim().chars().take(200).collect::<String>();
            return Err(anyhow::anyhow!("http {}: {}", status, snippet));
        }

        let etag = headers
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let last_modified = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        self.store_entry(
            &key,
            CacheEntry {
                body: body.clone(),
                etag,
                last_modified,
                fetched_at: now,
            },
        );
        Ok(body)
    }

    /// Returns the cached body for `url` if it is still inside the freshness
    /// window at `now`.
    pub fn get_fresh(&self, url: &str, now: u64) -> Option<String> {
        self.entry(url)
            .filter(|e| is_fresh(e.fetched_at, now, self.ttl_secs))
            .map(|e| e.body)
    }

    pub fn insert(&self, url: &str, body: String, fetched_at: u64) {
        self.store_entry(
            url,
            CacheEntry {
                body,
                etag: None,
                last_modified: None,
                fetched_at,
            },
        );
    }

    fn entry(&self, key: &str) -> Option<CacheEntry> {
        let mut guard = self.file.lock().ok()?;
        let cache = guard.get_or_insert_with(|| self.load());
        cache.entries.get(key).cloned()
    }

    fn store_entry(&self, key: &str, entry: CacheEntry) {
        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        let cache = guard.get_or_insert_with(|| self.load());
        cache.version = CACHE_VERSION;
        cache.entries.insert(key.to_string(), entry);
        cache.unsaved += 1;
        if cache.unsaved >= SAVE_EVERY {
            self.save_logged(cache);
        }
    }

    /// Writes any buffered entries to disk. Also runs on drop.
    pub fn flush(&self) {
        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        if let Some(cache) = guard.as_mut() {
            if cache.unsaved > 0 {
                self.save_logged(cache);
            }
        }
    }

    fn save_logged(&self, cache: &mut HttpCacheFile) {
        match self.save(cache) {
            Ok(()) => cache.unsaved = 0,
            Err(err) => debug!("http cache not saved: {err:#}"),
        }
    }

    fn load(&self) -> HttpCacheFile {
        let Some(path) = self.path.as_ref() else {
            return HttpCacheFile::default();
        };
        let Ok(raw) = fs::read_to_string(path) else {
            return HttpCacheFile::default();
        };
        let mut cache = serde_json::from_str::<HttpCacheFile>(&raw).unwrap_or_default();
        if cache.version != CACHE_VERSION {
            return HttpCacheFile::default();
        }
        let dropped = cache.prune(now_secs(), MAX_ENTRY_AGE_SECS.max(self.ttl_secs));
        if dropped > 0 {
            debug!(dropped, "pruned expired http cache entries");
            cache.unsaved += dropped;
        }
        cache
    }

    fn save(&self, cache: &HttpCacheFile) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).ok();
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(cache).context("serialize http cache")?;
        fs::write(&tmp, json).context("write http cache")?;
        fs::rename(&tmp, path).context("swap http cache")?;
        Ok(())
    }
}

impl Drop for HttpCache {
    fn drop(&mut self) {
        self.flush();
    }
}

pub fn is_fresh(fetched_at: u64, now: u64, ttl_secs: u64) -> bool {
    now.saturating_sub(fetched_at) < ttl_secs
}

/// Secret query values (the odds API key) must not end up in the cache file.
fn cache_key(url: &str, query: &[(&str, &str)]) -> String {
    let mut key = url.to_string();
    let mut sep = if url.contains('?') { '&' } else { '?' };
    for (name, value) in query {
        if name.eq_ignore_ascii_case("apikey") {
            continue;
        }
        key.push(sep);
        key.push_str(name);
        key.push('=');
        key.push_str(value);
        sep = '&';
    }
    key
}

fn cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(CACHE_FILE))
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
