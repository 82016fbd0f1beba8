use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// ホスティングサービス上のプロジェクト（リポジトリ）エンティティ
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    /// リモートが割り当てたID
    pub id: u64,

    /// ネームスペースを含むフルパス（例: `org/team/service`）
    #[serde(rename = "path_with_namespace")]
    pub namespace_path: String,

    /// 表示名
    #[serde(default)]
    pub name: String,

    /// ブラウザで開くURL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

impl Project {
    pub fn new(id: u64, namespace_path: impl Into<String>) -> Self {
        let namespace_path = namespace_path.into();
        let name = namespace_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            id,
            namespace_path,
            name,
            web_url: None,
        }
    }

    pub fn with_web_url(mut self, web_url: impl Into<String>) -> Self {
        self.web_url = Some(web_url.into());
        self
    }

    /// ローカルのクローン先: `root/<namespace path>`
    pub fn destination_in(&self, root: &Path) -> PathBuf {
        root.join(self.namespace_path.trim_matches('/'))
    }

    /// Git URL of the project on the host at `base_url`.
    pub fn clone_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}.git",
            base_url.trim_end_matches('/'),
            self.namespace_path.trim_matches('/')
        )
    }
}
