use serde::{Deserialize, Serialize};

/// プロジェクトとサブグループを束ねるグループエンティティ
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,

    /// 階層を含むフルパス（例: `org/team`）
    pub full_path: String,

    #[serde(default)]
    pub name: String,
}

impl Group {
    pub fn new(id: u64, full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let name = full_path.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            id,
            full_path,
            name,
        }
    }
}
