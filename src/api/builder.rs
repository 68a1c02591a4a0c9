use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use home::home_dir;

use crate::{
    flock::FileLock,
    model::Scope,
    repository::{MavenLayoutResolver, RemoteRepository, DEFAULT_REMOTE_REPOSITORY},
    resolver::ResolutionContext,
    Artifetch,
};

#[derive(Default)]
pub struct ArtifetchBuilder {
    local_repository: Option<PathBuf>,
    remote_repositories: Vec<String>,
    offline: bool,
    no_memoize: bool,
    scopes: Option<Vec<Scope>>,
}

impl ArtifetchBuilder {
    /// Location of the local repository.
    ///
    /// Defaults to `$HOME/.artifetch/repository`.
    pub fn local_repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_repository = Some(path.into());
        self
    }

    /// Adds a remote repository: an http(s) url, a `file://` url or a directory.
    /// Remotes are consulted in the order they are added.
    ///
    /// Defaults to Maven Central when none is added.
    pub fn remote_repository(mut self, url: impl Into<String>) -> Self {
        self.remote_repositories.push(url.into());
        self
    }

    pub fn remote_repositories<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remote_repositories
            .extend(urls.into_iter().map(Into::into));
        self
    }

    /// Only use what is already in the local repository.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Remember repository lookups within each `fetch` call.
    ///
    /// Enabled by default.
    pub fn memoize(mut self, memoize: bool) -> Self {
        self.no_memoize = !memoize;
        self
    }

    /// Dependency scopes followed when expanding dependencies.
    ///
    /// Defaults to `compile` and `runtime`.
    pub fn scopes(mut self, scopes: impl Into<Vec<Scope>>) -> Self {
        self.scopes = Some(scopes.into());
        self
    }

    pub fn try_build(self) -> anyhow::Result<Artifetch> {
        let Self {
            local_repository,
            remote_repositories,
            offline,
            no_memoize,
            scopes,
        } = self;

        let local_repository = match local_repository {
            Some(path) => path,
            None => default_local_repository()?,
        };
        if local_repository.exists() {
            if !local_repository.is_dir() {
                bail!(
                    "Local repository {} is not a directory",
                    local_repository.display()
                );
            }
        } else {
            std::fs::create_dir_all(&local_repository).with_context(|| {
                format!(
                    "Could not create local repository {}",
                    local_repository.display()
                )
            })?;
        }

        let lock = FileLock::acquire(&local_repository)?;

        let remote_repositories = if remote_repositories.is_empty() {
            vec![DEFAULT_REMOTE_REPOSITORY.to_owned()]
        } else {
            remote_repositories
        };
        let remote_repositories = remote_repositories
            .iter()
            .map(|url| url.parse::<RemoteRepository>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut context = ResolutionContext::new(local_repository)
            .with_remote_repositories(remote_repositories)
            .with_offline(offline);
        if let Some(scopes) = scopes {
            context.scopes = scopes;
        }

        let resolver = MavenLayoutResolver::new(context)?;
        Ok(Artifetch::new(resolver, !no_memoize, lock))
    }
}

fn default_local_repository() -> anyhow::Result<PathBuf> {
    let mut local_repository = home_dir()
        .ok_or_else(|| anyhow!("Could not find home dir. Please define $HOME env variable."))?;
    local_repository.push(".artifetch/repository");
    Ok(local_repository)
}
