//! Staged audio artifacts and their file names.

use std::fmt;

/// What an artifact holds, which fixes its file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Audio uploaded by the caller, staged as `.wav`.
    Upload,
    /// Synthesized speech, staged as `.mp3`.
    Speech,
}

impl ArtifactKind {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Upload => "wav",
            Self::Speech => "mp3",
        }
    }

    /// Map an extension back to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "wav" => Some(Self::Upload),
            "mp3" => Some(Self::Speech),
            _ => None,
        }
    }
}

/// File name of a staged artifact: `<stem>.<wav|mp3>`.
///
/// The stem only contains ASCII alphanumerics and `-`, so an id can never
/// escape the staging directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactId {
    name: String,
    kind: ArtifactKind,
}

impl ArtifactId {
    /// Fresh random id for `kind`.
    pub fn generate(kind: ArtifactKind) -> Self {
        Self {
            name: format!("{}.{}", uuid::Uuid::new_v4(), kind.extension()),
            kind,
        }
    }

    /// Parse a file name received from a caller or found on disk.
    pub fn parse(name: &str) -> Option<Self> {
        let (stem, ext) = name.rsplit_once('.')?;
        let kind = ArtifactKind::from_extension(ext)?;
        let valid_stem = !stem.is_empty()
            && stem.len() <= 64
            && stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        valid_stem.then(|| Self {
            name: name.to_string(),
            kind,
        })
    }

    /// The file name.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The artifact kind.
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
