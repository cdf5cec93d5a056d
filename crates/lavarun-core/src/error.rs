/// A caller handed the core an argument outside its declared shape.
///
/// Argument types are checked by the compiler; these variants cover the
/// remaining contracts that only hold at runtime (symbol tables read from
/// configuration, components read from untrusted data).
#[derive(Debug, Clone, PartialEq)]
pub enum ContractError {
    /// Symbol-table key that is not exactly one character.
    SymbolNotChar(String),
    /// Symbol-table value naming no spawnable actor variant.
    UnknownActorKind(String),
    /// Symbol-table value naming no obstacle tag.
    UnknownObstacle(String),
    NonFinite { x: f64, y: f64 },
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SymbolNotChar(s) => write!(f, "level symbol must be one character: {s:?}"),
            Self::UnknownActorKind(s) => write!(f, "unknown actor kind: {s:?}"),
            Self::UnknownObstacle(s) => write!(f, "unknown obstacle: {s:?}"),
            Self::NonFinite { x, y } => write!(f, "vector components must be finite: ({x}, {y})"),
        }
    }
}

impl std::error::Error for ContractError {}
