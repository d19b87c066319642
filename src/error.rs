use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitpulseError>;

#[derive(Error, Debug)]
pub enum GitpulseError {
    #[error("Not a git repository: {0}")]
    InvalidRepository(String),
    #[error("Malformed commit {id}: {reason}")]
    MalformedCommit { id: String, reason: String },
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Chart rendering error: {0}")]
    Render(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::reference::find::existing::Error> for GitpulseError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        GitpulseError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for GitpulseError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        GitpulseError::HeadPeel(Box::new(err))
    }
}

impl From<gix::object::find::existing::Error> for GitpulseError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        GitpulseError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for GitpulseError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        GitpulseError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for GitpulseError {
    fn from(err: gix::object::commit::Error) -> Self {
        GitpulseError::Commit(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for GitpulseError {
    fn from(err: gix::objs::decode::Error) -> Self {
        GitpulseError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for GitpulseError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        GitpulseError::DiffTreeToTree(Box::new(err))
    }
}
