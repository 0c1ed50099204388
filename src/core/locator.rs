//! Matching archive files to band wavelength and factor tokens

use crate::io::archive::file_name;
use crate::types::{BrdfError, BrdfResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do when several files carry the same token pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AmbiguityPolicy {
    /// Fail with [`BrdfError::AmbiguousArtifact`]
    #[default]
    Error,
    /// Take the first match in sorted order and warn
    FirstMatch,
}

/// Find the single candidate whose file name contains both tokens.
///
/// `candidates` is expected in sorted order (see
/// [`crate::io::ArchiveListing::scan`]) so that `FirstMatch` is
/// deterministic.
pub fn find_artifact<'a>(
    candidates: &'a [PathBuf],
    wavelength: &str,
    factor: &str,
    policy: AmbiguityPolicy,
) -> BrdfResult<&'a Path> {
    let matches: Vec<&PathBuf> = candidates
        .iter()
        .filter(|path| {
            file_name(path)
                .map(|name| name.contains(wavelength) && name.contains(factor))
                .unwrap_or(false)
        })
        .collect();

    match (matches.as_slice(), policy) {
        ([], _) => Err(BrdfError::ArtifactNotFound {
            wavelength: wavelength.to_string(),
            factor: factor.to_string(),
        }),
        ([single], _) => Ok(single.as_path()),
        ([first, ..], AmbiguityPolicy::FirstMatch) => {
            log::warn!(
                "{} BRDF files match {}, {}; using {}",
                matches.len(),
                wavelength,
                factor,
                first.display()
            );
            Ok(first.as_path())
        }
        (_, AmbiguityPolicy::Error) => Err(BrdfError::AmbiguousArtifact {
            wavelength: wavelength.to_string(),
            factor: factor.to_string(),
            candidates: matches.iter().map(|path| path.to_path_buf()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_finds_factor_among_same_band() {
        let files = listing(&["Band1_blue_iso.hdf", "Band1_blue_vol.hdf"]);
        let found = find_artifact(&files, "blue", "vol", AmbiguityPolicy::Error).unwrap();
        assert_eq!(found, Path::new("Band1_blue_vol.hdf"));
    }

    #[test]
    fn test_matches_file_name_not_directory() {
        let files = listing(&["/brdf/vol/Band1_0459_0479nm_iso.hdf"]);
        let result = find_artifact(&files, "0459_0479nm", "vol", AmbiguityPolicy::Error);
        assert!(matches!(result, Err(BrdfError::ArtifactNotFound { .. })));
    }

    #[test]
    fn test_missing_pair_is_reported() {
        let files = listing(&["Band1_blue_iso.hdf"]);
        match find_artifact(&files, "red", "geo", AmbiguityPolicy::Error) {
            Err(BrdfError::ArtifactNotFound { wavelength, factor }) => {
                assert_eq!(wavelength, "red");
                assert_eq!(factor, "geo");
            }
            other => panic!("expected ArtifactNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguity_policies() {
        let files = listing(&["a/Band1_blue_iso.hdf", "b/Band1_blue_iso.hdf.gz"]);

        match find_artifact(&files, "blue", "iso", AmbiguityPolicy::Error) {
            Err(BrdfError::AmbiguousArtifact { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected AmbiguousArtifact, got {:?}", other),
        }

        let first = find_artifact(&files, "blue", "iso", AmbiguityPolicy::FirstMatch).unwrap();
        assert_eq!(first, Path::new("a/Band1_blue_iso.hdf"));
    }
}
