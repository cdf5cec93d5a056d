use std::path::{Path, PathBuf};

/// One level as rows of symbols.
pub type LevelText = Vec<String>;

#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: std::io::Error },
    Json(String),
    EmptyPack,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Json(e) => write!(f, "invalid level pack: {e}"),
            Self::EmptyPack => write!(f, "level pack contains no levels"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Parse a JSON array of levels, each an array of row strings.
pub fn parse_pack(json: &str) -> Result<Vec<LevelText>, LoadError> {
    let pack: Vec<LevelText> =
        serde_json::from_str(json).map_err(|e| LoadError::Json(e.to_string()))?;
    if pack.is_empty() {
        return Err(LoadError::EmptyPack);
    }
    Ok(pack)
}

pub fn load_pack(path: &Path) -> Result<Vec<LevelText>, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let pack = parse_pack(&json)?;
    tracing::info!(levels = pack.len(), path = %path.display(), "loaded level pack");
    Ok(pack)
}

const BUILTIN_PACK: &[&[&str]] = &[
    &[
        "                ",
        "                ",
        "  @    o    o  o",
        "xxxxxxxxxxxxxxxx",
    ],
    &[
        "                      ",
        "                  o   ",
        "                 xxx  ",
        "  @     o    =        ",
        "xxxxxx!!!xxxxxxxxxxxxx",
        "     x!!!x            ",
    ],
    &[
        "        v          ",
        "                   ",
        "  @   o     o   o  ",
        "xxxxxxxxxxxxxxxxxxx",
        "!!!!!!!!!!!!!!!!!!!",
    ],
];

/// Levels shipped with the crate.
pub fn builtin_pack() -> Vec<LevelText> {
    BUILTIN_PACK
        .iter()
        .map(|rows| rows.iter().map(|row| row.to_string()).collect())
        .collect()
}
