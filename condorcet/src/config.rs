// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A ballot expressed with candidate names, most preferred first.
///
/// The same ballot may be cast several times: `count` is its multiplicity.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vote {
    pub candidates: Vec<String>,
    pub count: u64,
}

/// A registered candidate.
///
/// Ballots may refer to the candidate either by `name` or by `code`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub code: Option<String>,
}

// ******** Output data structures *********

/// One ordered pairwise contest, seen from `candidate`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseContest {
    pub candidate: String,
    pub opponent: String,
    /// Ballots ranking `candidate` above `opponent`.
    pub wins: u64,
    /// Ballots ranking `opponent` above `candidate`.
    pub losses: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    /// The Condorcet winner, if there is one.
    pub winner: Option<String>,
    pub num_voters: u64,
    /// Number of ballots (counted with their multiplicity) that were not tallied.
    pub rejected: u64,
    pub contests: Vec<PairwiseContest>,
}

/// Errors that prevent an election from being set up.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// An election needs at least 2 candidates.
    InvalidCandidateCount(usize),
    /// A candidate name or code is used by two different candidates.
    DuplicateCandidateName(String),
    /// The rejected ballots do not fit in a 64-bit counter.
    RejectedCountOverflow,
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::InvalidCandidateCount(n) => {
                write!(f, "expecting at least 2 candidates, got {}", n)
            }
            VotingErrors::DuplicateCandidateName(name) => {
                write!(f, "candidate {:?} is declared more than once", name)
            }
            VotingErrors::RejectedCountOverflow => {
                write!(f, "too many rejected ballots to count")
            }
        }
    }
}

/// The reason why a ballot was not accepted.
///
/// Ballots must be a total order over all the candidates: every candidate
/// appears exactly once.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BallotError {
    WrongLength { expected: usize, found: usize },
    /// The entry at this position is negative or not a candidate index.
    OutOfRange { position: usize },
    Duplicate { candidate: usize },
    UnknownCandidate(String),
    /// Adding this many ballots would overflow the voter count.
    CountOverflow { count: u64 },
}

impl Error for BallotError {}

impl Display for BallotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallotError::WrongLength { expected, found } => write!(
                f,
                "ballot ranks {} candidates, expected {}",
                found, expected
            ),
            BallotError::OutOfRange { position } => {
                write!(f, "choice #{} is not a valid candidate", position + 1)
            }
            BallotError::Duplicate { candidate } => {
                write!(f, "candidate {} is ranked more than once", candidate)
            }
            BallotError::UnknownCandidate(name) => write!(f, "unknown candidate {:?}", name),
            BallotError::CountOverflow { count } => {
                write!(f, "{} more ballots would overflow the tally", count)
            }
        }
    }
}
