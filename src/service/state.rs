use crate::error::{Error, ErrorKind};
use crate::scoring::PointsSnapshot;

/// What the presentation layer shows for the current session.
///
/// `Idle -> Loading -> {Success, Error}`; any new submission goes back to
/// `Loading`, dropping the previous result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loading {
        address: String,
    },
    Success {
        address: String,
        snapshot: PointsSnapshot,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl SessionState {
    pub fn from_error(err: &Error) -> Self {
        Self::Error {
            kind: err.kind(),
            message: err.user_message(),
        }
    }

    pub fn snapshot(&self) -> Option<&PointsSnapshot> {
        match self {
            Self::Success { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}
