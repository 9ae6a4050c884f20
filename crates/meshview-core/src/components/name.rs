use std::path::Path;

use serde::{Deserialize, Serialize};

/// オブジェクトの表示名
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name {
    value: String,
}

impl Name {
    /// 新しいNameを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self { value: name.into() }
    }

    /// ファイルパスのステム部分から名前を作成（`obj_files/cube.obj` → `cube`）
    pub fn from_path(path: &Path) -> Self {
        path.file_stem()
            .map(|stem| Self::new(stem.to_string_lossy()))
            .unwrap_or_default()
    }

    /// 名前を文字列スライスとして取得
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::new("Object")
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let name = Name::new("teapot");
        assert_eq!(name.as_str(), "teapot");
    }

    #[test]
    fn test_from_path() {
        let name = Name::from_path(Path::new("obj_files/cube.obj"));
        assert_eq!(name.as_str(), "cube");
    }

    #[test]
    fn test_from_path_without_stem() {
        let name = Name::from_path(Path::new("/"));
        assert_eq!(name, Name::default());
    }

    #[test]
    fn test_display() {
        let name = Name::new("ico");
        assert_eq!(format!("{}", name), "ico");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Name::new("cube")).unwrap();
        assert_eq!(json, "\"cube\"");
    }
}
