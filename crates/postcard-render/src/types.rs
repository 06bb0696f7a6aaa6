use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no record found for UPRN {0}")]
    RecordNotFound(Uprn),
    #[error("UPRN {uprn}: required field '{field}' is missing")]
    MissingField { uprn: Uprn, field: &'static str },
    #[error("UPRN {uprn}: unknown collection day '{day}'")]
    UnknownDay { uprn: Uprn, day: String },
    #[error("the different-collection-days calendar layout is not implemented")]
    UnimplementedLayout,
    #[error("UPRN '{0}' contains the filename delimiter")]
    BadIdentifier(Uprn),
    #[error("failed to parse font: {0}")]
    Font(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("record source error: {0}")]
    Source(String),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Unique Property Reference Number - the stable identifier every record,
/// card and sheet filename hangs off.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Uprn(pub String);

impl Uprn {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Uprn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Uprn {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which face of the postcard a sheet carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSide {
    Address,
    Calendar,
}

impl SheetSide {
    /// Tag appended to sheet filenames
    pub fn tag(self) -> &'static str {
        match self {
            SheetSide::Address => "addr",
            SheetSide::Calendar => "cal",
        }
    }
}

/// Rotation applied to a finished text mask. Only the two angles needed for
/// back-to-back print mirroring are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Half,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Half => 180,
        }
    }
}
