use crate::message::Phase;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while serving or proposing an operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Peer could not be reached, or the call failed in flight.
    #[error("peer {peer} unreachable: {reason}")]
    Transport { peer: String, reason: String },

    /// Peer did not answer within the configured timeout.
    #[error("peer {peer} timed out")]
    Timeout { peer: String },

    /// Fewer than a strict majority acknowledged a phase.
    #[error("{phase} reached {acks} of {needed} required acknowledgements")]
    QuorumNotReached {
        phase: Phase,
        acks: usize,
        needed: usize,
    },

    /// Every attempt failed to reach both quorums.
    #[error("no quorum after {attempts} attempts")]
    RetryExhausted { attempts: usize },

    /// Delete of a key this node does not hold.
    #[error("key {key:?} not found")]
    NotFound { key: String },

    /// Encoded operation could not be decoded.
    #[error("malformed operation {operation:?}")]
    Malformed { operation: String },

    /// Key or value contains the wire delimiter, which the encoding cannot escape.
    #[error("{field:?} contains the ':' delimiter")]
    Delimiter { field: String },

    /// Proposal counter can no longer produce a larger number.
    #[error("proposal counter overflow")]
    ProposalOverflow,

    /// Peer answered with a response that does not match the request.
    #[error("unexpected response {response:?} from {peer}")]
    UnexpectedResponse { peer: String, response: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] bincode::Error),
}
