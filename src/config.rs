// src/config.rs
//
// Feed source configuration: an ordered list of { name, feed_url, enabled }.
// Order matters — deduplication is first-seen-wins in this order.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "NEWS_SOURCES_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub feed_url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<FeedSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load sources using env var + fallbacks:
/// 1) $NEWS_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) the built-in default feeds
pub fn load_sources_default() -> Result<Vec<FeedSource>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("NEWS_SOURCES_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(built_in_sources())
}

/// The default AI-news feed set.
pub fn built_in_sources() -> Vec<FeedSource> {
    vec![
        FeedSource {
            name: "TechCrunch".to_string(),
            feed_url: "https://techcrunch.com/tag/artificial-intelligence/feed/".to_string(),
            enabled: true,
        },
        FeedSource {
            name: "Wired".to_string(),
            feed_url: "https://www.wired.com/category/artificial-intelligence/feed/".to_string(),
            enabled: true,
        },
        FeedSource {
            name: "The Verge".to_string(),
            feed_url: "https://www.theverge.com/rss/index.xml".to_string(),
            enabled: true,
        },
    ]
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<FeedSource>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<FeedSource>> {
    #[derive(Deserialize)]
    struct TomlSources {
        sources: Vec<FeedSource>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn parse_json(s: &str) -> Result<Vec<FeedSource>> {
    let v: Vec<FeedSource> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Drop entries with blank fields; keep order, keep first on duplicate names.
fn clean_list(items: Vec<FeedSource>) -> Vec<FeedSource> {
    let mut seen_names = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|s| !s.name.trim().is_empty() && !s.feed_url.trim().is_empty())
        .filter(|s| seen_names.insert(s.name.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn toml_and_json_formats_parse_with_order_preserved() {
        let toml = r#"
            [[sources]]
            name = "TechCrunch"
            feed_url = "https://techcrunch.com/feed/"

            [[sources]]
            name = "Wired"
            feed_url = "https://wired.com/feed/"
            enabled = false
        "#;
        let out = parse_toml(toml).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "TechCrunch");
        assert!(out[0].enabled, "enabled defaults to true");
        assert!(!out[1].enabled);

        let json = r#"[
            {"name": "A", "feed_url": "https://a.example/feed"},
            {"name": "A", "feed_url": "https://dup.example/feed"},
            {"name": " ", "feed_url": "https://blank.example/feed"}
        ]"#;
        let out = parse_json(json).unwrap();
        assert_eq!(out.len(), 1, "duplicates and blanks are dropped");
        assert_eq!(out[0].feed_url, "https://a.example/feed");
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_PATH);

        // No config files in the temp CWD -> built-in defaults.
        let v = load_sources_default().unwrap();
        assert_eq!(v, built_in_sources());

        // Env var takes precedence.
        let p_json = tmp.path().join("sources.json");
        fs::write(
            &p_json,
            r#"[{"name": "X", "feed_url": "https://x.example/feed"}]"#,
        )
        .unwrap();
        env::set_var(ENV_PATH, p_json.display().to_string());
        let v2 = load_sources_default().unwrap();
        assert_eq!(v2.len(), 1);
        assert_eq!(v2[0].name, "X");
        env::remove_var(ENV_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
