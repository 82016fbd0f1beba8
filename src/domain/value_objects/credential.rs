use std::fmt;
use std::sync::Arc;

use crate::common::{GctlError, GctlResult};

/// ホスティングサービス用のアクセストークン
///
/// クローンは同じ不変バッファを共有するため、各ワーカーが自分のハンドルを持てる。
/// `Debug` はトークンを出力せず、`Display` は実装しない。
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Arc<str>);

impl Credential {
    pub fn new(token: impl AsRef<str>) -> GctlResult<Self> {
        let token = token.as_ref().trim();
        if token.is_empty() {
            return Err(GctlError::validation_error(
                "gitlab_access_token",
                "access token must not be empty",
                None,
            ));
        }
        Ok(Self(Arc::from(token)))
    }

    /// 生のトークン（リクエストヘッダとgit認証情報の組み立て専用）
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_trims_token() {
        let credential = Credential::new("  glpat-abc123\n").unwrap();
        assert_eq!(credential.expose(), "glpat-abc123");
    }

    #[test]
    fn test_empty_credential_rejected() {
        assert!(Credential::new("").is_err());
        assert!(Credential::new("   ").is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::new("glpat-secret").unwrap();
        let debug = format!("{:?}", credential);
        assert_eq!(debug, "Credential(****)");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_clones_share_buffer() {
        let credential = Credential::new("glpat-abc").unwrap();
        let shared = credential.clone();
        assert!(std::ptr::eq(credential.expose(), shared.expose()));
    }
}
