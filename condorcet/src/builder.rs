use std::collections::HashMap;

use log::debug;

pub use crate::config::*;
use crate::{Election, ElectionResult};

/// A builder for adding votes with candidate names.
///
/// The builder maps the names (and the codes, if any) to the candidate
/// indices of an [`Election`], in the order in which the candidates are
/// declared.
///
/// ```
/// pub use condorcet::builder::Builder;
/// # use condorcet::VotingErrors;
///
/// let mut builder = Builder::new(&["Anna".to_string(), "Bob".to_string()])?;
///
/// assert!(builder.add_vote_simple(&["Bob".to_string(), "Anna".to_string()]));
/// // Clara is not a candidate.
/// assert!(!builder.add_vote_simple(&["Anna".to_string(), "Clara".to_string()]));
///
/// assert_eq!(builder.result().winner(), Some(1));
///
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _candidates: Vec<Candidate>,
    pub(crate) _index: HashMap<String, usize>,
    pub(crate) _election: Election,
}

impl Builder {
    pub fn new(cands: &[String]) -> Result<Builder, VotingErrors> {
        let candidates: Vec<Candidate> = cands
            .iter()
            .map(|name| Candidate {
                name: name.clone(),
                code: None,
            })
            .collect();
        Builder::with_candidates(&candidates)
    }

    pub fn with_candidates(cands: &[Candidate]) -> Result<Builder, VotingErrors> {
        let election = Election::new(cands.len())?;
        let mut index: HashMap<String, usize> = HashMap::new();
        for (idx, c) in cands.iter().enumerate() {
            for key in std::iter::once(&c.name).chain(c.code.iter()) {
                match index.insert(key.clone(), idx) {
                    Some(prev) if prev != idx => {
                        return Err(VotingErrors::DuplicateCandidateName(key.clone()));
                    }
                    _ => {}
                }
            }
        }
        Ok(Builder {
            _candidates: cands.to_vec(),
            _index: index,
            _election: election,
        })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self._candidates
    }

    pub fn candidate_name(&self, idx: usize) -> Option<&str> {
        self._candidates.get(idx).map(|c| c.name.as_str())
    }

    /// Translates a named ballot into candidate indices and checks it, without
    /// recording anything.
    pub fn check_vote(&self, candidates: &[String]) -> Result<Vec<usize>, BallotError> {
        let mut ranks: Vec<usize> = Vec::with_capacity(candidates.len());
        for name in candidates.iter() {
            let cid = self
                ._index
                .get(name)
                .ok_or_else(|| BallotError::UnknownCandidate(name.clone()))?;
            ranks.push(*cid);
        }
        self._election.check_ballot(ranks.as_slice())
    }

    /// Adds a vote to the builder.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_vote_simple(&mut self, candidates: &[String]) -> bool {
        self.add_vote(candidates, 1)
    }

    /// Adds a vote, with a potential weight attached to it.
    ///
    /// candidates: the names of all the candidates, most preferred first.
    /// Returns false if the ballot was rejected, in which case nothing is recorded.
    pub fn add_vote(&mut self, candidates: &[String], count: u64) -> bool {
        match self.check_vote(candidates) {
            Ok(ranks) => self._election.vote_with_count(ranks.as_slice(), count),
            Err(e) => {
                debug!("add_vote: rejected ballot {:?}: {}", candidates, e);
                false
            }
        }
    }

    pub fn election(&self) -> &Election {
        &self._election
    }

    /// A snapshot of the votes added so far.
    pub fn result(&self) -> ElectionResult {
        self._election.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn duplicate_candidate_names() {
        let res = Builder::new(&names(&["A", "B", "A"]));
        assert!(matches!(
            res,
            Err(VotingErrors::DuplicateCandidateName(ref name)) if name == "A"
        ));
    }

    #[test]
    fn single_candidate() {
        assert!(matches!(
            Builder::new(&names(&["A"])),
            Err(VotingErrors::InvalidCandidateCount(1))
        ));
    }

    #[test]
    fn check_vote_reasons() {
        let b = Builder::new(&names(&["A", "B", "C"])).unwrap();
        assert_eq!(b.check_vote(&names(&["C", "A", "B"])), Ok(vec![2, 0, 1]));
        assert_eq!(
            b.check_vote(&names(&["C", "D", "B"])),
            Err(BallotError::UnknownCandidate("D".to_string()))
        );
        assert_eq!(
            b.check_vote(&names(&["C", "C", "B"])),
            Err(BallotError::Duplicate { candidate: 2 })
        );
        assert_eq!(
            b.check_vote(&names(&["C", "A"])),
            Err(BallotError::WrongLength {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn votes_with_codes() {
        let cands = vec![
            Candidate {
                name: "Alice".to_string(),
                code: Some("A".to_string()),
            },
            Candidate {
                name: "Bob".to_string(),
                code: Some("Bob".to_string()),
            },
            Candidate {
                name: "Charlie".to_string(),
                code: None,
            },
        ];
        let mut b = Builder::with_candidates(&cands).unwrap();
        assert_eq!(b.check_vote(&names(&["Charlie", "A", "Bob"])), Ok(vec![2, 0, 1]));
        assert_eq!(
            b.check_vote(&names(&["Alice", "A", "Bob"])),
            Err(BallotError::Duplicate { candidate: 0 })
        );
        assert!(b.add_vote(&names(&["A", "Charlie", "Bob"]), 2));
        assert!(b.add_vote_simple(&names(&["Alice", "Bob", "Charlie"])));
        assert_eq!(b.result().winner(), Some(0));
        assert_eq!(b.candidate_name(0), Some("Alice"));
    }

    #[test]
    fn code_clashing_with_other_name() {
        let cands = vec![
            Candidate {
                name: "Alice".to_string(),
                code: None,
            },
            Candidate {
                name: "Bob".to_string(),
                code: Some("Alice".to_string()),
            },
        ];
        assert_eq!(
            Builder::with_candidates(&cands).err(),
            Some(VotingErrors::DuplicateCandidateName("Alice".to_string()))
        );
    }

    #[test]
    fn weighted_votes() {
        let mut b = Builder::new(&names(&["A", "B", "C"])).unwrap();
        assert!(b.add_vote(&names(&["B", "A", "C"]), 3));
        assert!(b.add_vote(&names(&["A", "C", "B"]), 2));
        assert!(!b.add_vote(&names(&["A", "E", "B"]), 7));
        assert_eq!(b.election().num_voters(), 5);
        assert_eq!(b.election().pairwise(1, 0), 3);
        assert_eq!(b.election().pairwise(0, 1), 2);
        assert_eq!(b.result().winner(), Some(1));
        assert_eq!(b.candidate_name(1), Some("B"));
        assert_eq!(b.candidate_name(3), None);
    }
}
