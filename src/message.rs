use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

const DELIMITER: char = ':';

/// Totally ordered identifier for one proposal attempt.
#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProposalNumber(pub u64);

impl fmt::Display for ProposalNumber {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "#{}", self.0)
    }
}

/// Write that a Paxos instance decides on.
///
/// Travels on the wire in its delimiter-joined form, `PUT:<key>:<value>`
/// or `DELETE:<key>`. The delimiter is not escaped, so the constructors
/// refuse keys and values that contain it.
#[derive(Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Put { key: String, value: String },
    Delete { key: String },
}

impl Operation {
    pub fn put<K: Into<String>, V: Into<String>>(key: K, value: V) -> Result<Self, Error> {
        let key = Self::field(key.into())?;
        let value = Self::field(value.into())?;
        Ok(Operation::Put { key, value })
    }

    pub fn delete<K: Into<String>>(key: K) -> Result<Self, Error> {
        let key = Self::field(key.into())?;
        Ok(Operation::Delete { key })
    }

    pub fn key(&self) -> &str {
        match self {
        | Operation::Put { key, .. } => key,
        | Operation::Delete { key } => key,
        }
    }

    /// Delimiter-joined wire form.
    pub fn encode(&self) -> String {
        match self {
        | Operation::Put { key, value } => format!("PUT{}{}{}{}", DELIMITER, key, DELIMITER, value),
        | Operation::Delete { key } => format!("DELETE{}{}", DELIMITER, key),
        }
    }

    fn field(field: String) -> Result<String, Error> {
        if field.contains(DELIMITER) {
            Err(Error::Delimiter { field })
        } else {
            Ok(field)
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.encode())
    }
}

impl FromStr for Operation {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::Malformed { operation: s.to_string() };
        let parts = s.split(DELIMITER).collect::<Vec<_>>();
        match parts.as_slice() {
        | ["PUT", key, value] => Ok(Operation::Put {
            key: key.to_string(),
            value: value.to_string(),
        }),
        | ["DELETE", key] => Ok(Operation::Delete {
            key: key.to_string(),
        }),
        | _ => Err(malformed()),
        }
    }
}

impl From<Operation> for String {
    fn from(operation: Operation) -> Self {
        operation.encode()
    }
}

impl TryFrom<String> for Operation {
    type Error = Error;
    fn try_from(encoded: String) -> Result<Self, Self::Error> {
        encoded.parse()
    }
}

/// The two acceptor phases that need a quorum.
#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Prepare,
    Accept,
}

impl fmt::Display for Phase {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
        | Phase::Prepare => write!(fmt, "prepare"),
        | Phase::Accept => write!(fmt, "accept"),
        }
    }
}

/// Calls a node answers, from clients and from peer proposers alike.
#[derive(Serialize, Deserialize)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Get { key: String },
    Put { key: String, value: String },
    Delete { key: String },
    Prepare { number: ProposalNumber, operation: Operation },
    Accept { number: ProposalNumber, operation: Operation },
    Learn { operation: Operation },
}

#[derive(Serialize, Deserialize)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Value(Option<String>),
    Written(bool),
    Deleted(bool),
    Promise(bool),
    Accepted(bool),
    Learned,
}

impl Response {
    /// Whether this response acknowledges the given phase.
    pub fn acknowledges(&self, phase: Phase) -> bool {
        match (phase, self) {
        | (Phase::Prepare, Response::Promise(ack)) => *ack,
        | (Phase::Accept, Response::Accepted(ack)) => *ack,
        | _ => false,
        }
    }
}
