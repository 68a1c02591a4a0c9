use std::path::{Path, PathBuf};

use crate::{
    archive::DefaultArchiveExtractor,
    cli::command_handlers::{do_clear_cache, do_fetch},
    fetch::FetchRequest,
    flock::FileLock,
    materialize::ArtifactMaterializer,
    repository::MavenLayoutResolver,
    resolver::MemoizingResolver,
};

mod builder;

pub use builder::ArtifetchBuilder;

/// Holds the lock on the local repository until dropped.
pub struct Artifetch {
    resolver: MavenLayoutResolver,
    memoize: bool,
    materializer: ArtifactMaterializer<DefaultArchiveExtractor>,
    local_repository: PathBuf,
    offline: bool,
    _lock: FileLock,
}

impl Artifetch {
    pub fn builder() -> ArtifetchBuilder {
        ArtifetchBuilder::default()
    }

    fn new(resolver: MavenLayoutResolver, memoize: bool, lock: FileLock) -> Self {
        let local_repository = resolver.context().local_repository.clone();
        let offline = resolver.context().offline;
        Artifetch {
            resolver,
            memoize,
            materializer: ArtifactMaterializer::new(DefaultArchiveExtractor),
            local_repository,
            offline,
            _lock: lock,
        }
    }

    /// Resolves the requested artifact, and its dependencies up to the requested
    /// depth, then copies or unpacks them into the output directory
    ///
    /// Lookups are remembered for the duration of this call only.
    pub fn fetch(&self, request: &FetchRequest) -> anyhow::Result<()> {
        if self.memoize {
            do_fetch(
                &MemoizingResolver::new(&self.resolver),
                &self.materializer,
                request,
            )
        } else {
            do_fetch(&self.resolver, &self.materializer, request)
        }
    }

    /// Deletes everything stored in the local repository
    pub fn clear_cache(&self) -> anyhow::Result<()> {
        do_clear_cache(&self.local_repository)
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }
}
