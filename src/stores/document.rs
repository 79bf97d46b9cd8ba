use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A JSON object persisted as a single file.
///
/// Saves write a sibling temporary file and rename it over the target, so a
/// crash mid-write leaves the previous contents in place.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
}

impl JsonDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored object, or None if the file does not exist yet
    pub fn load(&self) -> Result<Option<Map<String, Value>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .context(format!("Failed to read document: {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(Some(Map::new()));
        }

        match serde_json::from_str::<Value>(&content)
            .context(format!("Failed to parse document: {}", self.path.display()))?
        {
            Value::Object(map) => Ok(Some(map)),
            other => bail!(
                "Document {} must hold a JSON object, found {}",
                self.path.display(),
                json_kind(&other)
            ),
        }
    }

    pub fn save(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }

        let tmp_path = self.tmp_path();
        let body = serde_json::to_vec_pretty(map).context("Failed to serialize document")?;

        let mut file = File::create(&tmp_path)
            .context(format!("Failed to create temporary file: {}", tmp_path.display()))?;
        file.write_all(&body).context("Failed to write document")?;
        file.sync_all().context("Failed to flush document")?;
        drop(file);

        fs::rename(&tmp_path, &self.path)
            .context(format!("Failed to replace document: {}", self.path.display()))?;

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let document = JsonDocument::new(temp_dir.path().join("missing.json"));

        assert!(document.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let document = JsonDocument::new(temp_dir.path().join("doc.json"));

        let mut map = Map::new();
        map.insert("max_seeds".to_string(), json!(5));
        map.insert("trackers".to_string(), json!(["a", "b"]));
        document.save(&map).unwrap();

        let loaded = document.load().unwrap().unwrap();
        assert_eq!(loaded, map);
        assert!(!temp_dir.path().join("doc.json.tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let document = JsonDocument::new(temp_dir.path().join("nested/state/doc.json"));

        document.save(&Map::new()).unwrap();
        assert!(document.path().exists());
    }

    #[test]
    fn test_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let document = JsonDocument::new(temp_dir.path().join("doc.json"));

        let mut map = Map::new();
        map.insert("a".to_string(), json!(true));
        document.save(&map).unwrap();

        map.remove("a");
        map.insert("b".to_string(), json!(false));
        document.save(&map).unwrap();

        let loaded = document.load().unwrap().unwrap();
        assert!(loaded.get("a").is_none());
        assert_eq!(loaded["b"], json!(false));
    }

    #[test]
    fn test_empty_file_is_empty_object() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        fs::write(&path, "  \n").unwrap();

        let loaded = JsonDocument::new(path).load().unwrap().unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_non_object_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = JsonDocument::new(path).load().unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        fs::write(&path, "{not json").unwrap();

        assert!(JsonDocument::new(path).load().is_err());
    }
}
