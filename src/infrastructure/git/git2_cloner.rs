use async_trait::async_trait;
use git2::build::RepoBuilder;
use git2::{
    Cred, CredentialType, ErrorCode, FetchOptions, RemoteCallbacks, Repository,
    SubmoduleUpdateOptions,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::cloner::{CloneError, CloneRequest, RepositoryCloner, WorkingCopy};
use crate::domain::value_objects::Credential;

/// libgit2 implementation of [`RepositoryCloner`]
///
/// Authenticates over HTTPS with basic auth: the token is the password and
/// the username is any non-empty string.
pub struct Git2Cloner {
    username: String,
}

impl Default for Git2Cloner {
    fn default() -> Self {
        Self {
            username: Self::DEFAULT_USERNAME.to_string(),
        }
    }
}

impl Git2Cloner {
    /// Username sent alongside the token; the host ignores its value
    pub const DEFAULT_USERNAME: &'static str = "git";

    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryCloner for Git2Cloner {
    async fn clone_repository(
        &self,
        request: &CloneRequest,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<WorkingCopy, CloneError> {
        let request = request.clone();
        let credential = credential.clone();
        let cancel = cancel.clone();
        let username = self.username.clone();

        tokio::task::spawn_blocking(move || {
            clone_blocking(&request, &username, &credential, &cancel)
        })
        .await
        .map_err(|e| CloneError::TaskFailed(e.to_string()))?
    }
}

fn clone_blocking(
    request: &CloneRequest,
    username: &str,
    credential: &Credential,
    cancel: &CancellationToken,
) -> Result<WorkingCopy, CloneError> {
    if cancel.is_cancelled() {
        return Err(CloneError::Cancelled);
    }

    if let Some(parent) = request.destination.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CloneError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options(username, credential, cancel));

    let repo = builder
        .clone(&request.url, &request.destination)
        .map_err(|source| classify_clone_error(source, request, cancel))?;

    if request.recurse_submodules {
        update_submodules(&repo, username, credential, cancel)?;
    }

    let head = repo
        .head()
        .ok()
        .and_then(|head| head.target())
        .map(|oid| oid.to_string());

    debug!(path = %request.destination.display(), ?head, "Clone finished");
    Ok(WorkingCopy {
        path: request.destination.clone(),
        head,
    })
}

fn fetch_options<'a>(
    username: &'a str,
    credential: &'a Credential,
    cancel: &'a CancellationToken,
) -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();

    // libgit2 keeps asking while the remote rejects us; answer only once.
    let mut offered = false;
    callbacks.credentials(move |_url, _username_from_url, allowed_types| {
        if offered {
            return Err(git2::Error::from_str("credentials rejected by remote"));
        }
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            offered = true;
            Cred::userpass_plaintext(username, credential.expose())
        } else {
            Err(git2::Error::from_str("No supported authentication method"))
        }
    });

    // Returning false aborts the transfer.
    callbacks.transfer_progress(move |_progress| !cancel.is_cancelled());

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

fn classify_clone_error(
    source: git2::Error,
    request: &CloneRequest,
    cancel: &CancellationToken,
) -> CloneError {
    if cancel.is_cancelled() {
        return CloneError::Cancelled;
    }
    match source.code() {
        ErrorCode::Exists => CloneError::DestinationConflict {
            path: request.destination.clone(),
        },
        _ => CloneError::Git {
            url: request.url.clone(),
            source,
        },
    }
}

fn update_submodules(
    repo: &Repository,
    username: &str,
    credential: &Credential,
    cancel: &CancellationToken,
) -> Result<(), CloneError> {
    let submodule_error = |name: &str, source: git2::Error| {
        if cancel.is_cancelled() {
            CloneError::Cancelled
        } else {
            CloneError::Submodule {
                name: name.to_string(),
                source,
            }
        }
    };

    let submodules = repo
        .submodules()
        .map_err(|source| submodule_error("*", source))?;

    for mut submodule in submodules {
        let name = submodule.name().unwrap_or("<non-utf8>").to_string();
        debug!(submodule = %name, path = %submodule.path().display(), "Updating submodule");

        let mut options = SubmoduleUpdateOptions::new();
        options.fetch(fetch_options(username, credential, cancel));
        submodule
            .update(true, Some(&mut options))
            .map_err(|source| submodule_error(&name, source))?;

        let nested = submodule
            .open()
            .map_err(|source| submodule_error(&name, source))?;
        update_submodules(&nested, username, credential, cancel)?;
    }

    Ok(())
}
