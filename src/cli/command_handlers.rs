use std::path::Path;

use log::info;

use crate::{
    archive::ArchiveExtractor, fetch, fetch::FetchRequest, flock::LOCK_FILE_NAME,
    materialize::ArtifactMaterializer, resolver::RepositoryResolver,
};

/// Handler to fetch command
pub fn do_fetch<R, E>(
    resolver: &R,
    materializer: &ArtifactMaterializer<E>,
    request: &FetchRequest,
) -> anyhow::Result<()>
where
    R: RepositoryResolver + ?Sized,
    E: ArchiveExtractor,
{
    fetch::fetch(resolver, materializer, request)?;
    Ok(())
}

/// Handler to clear-cache command.
/// Keeps the lock file, which the running process holds.
pub fn do_clear_cache(local_repository: &Path) -> anyhow::Result<()> {
    if !local_repository.exists() {
        return Ok(());
    }
    info!(
        "Clearing artifetch local repository {}.",
        local_repository.display()
    );
    for entry in std::fs::read_dir(local_repository)? {
        let entry = entry?;
        if entry.file_name() == LOCK_FILE_NAME {
            continue;
        }
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(entry.path())?;
        } else {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
