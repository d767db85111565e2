/*!
Pairwise tally of ranked ballots and Condorcet winner.

An [`Election`] accumulates full-preference ballots over a fixed set of
candidates, identified by their index `0..n`. For every ordered pair of
candidates `(i, j)` it counts the ballots ranking `i` above `j`. The
Condorcet winner is the candidate that beats every other candidate in these
pairwise contests by a strict majority. It may not exist.

```
use condorcet::Election;
# use condorcet::VotingErrors;

let mut election = Election::new(3)?;
assert!(election.vote(&[2, 0, 1]));
assert!(election.vote(&[2, 1, 0]));
// Not a total order over the 3 candidates: ignored.
assert!(!election.vote(&[1, 0]));

let result = election.result();
assert_eq!(result.winner(), Some(2));
assert_eq!(result.num_voters(), 2);
# Ok::<(), VotingErrors>(())
```

See the [`manual`] for the command line tool built on top of this library.
*/
pub mod builder;
mod config;
pub mod manual;

use log::{debug, info};

use crate::builder::Builder;
pub use crate::config::*;

// **** Private structures ****

type CandidateId = usize;

// Square matrix of the pairwise counts, stored in row major order.
// The cell (i, j) is the number of ballots that rank i above j.
// The diagonal is never written.
#[derive(Eq, PartialEq, Debug, Clone)]
struct PairwiseTally {
    num_candidates: usize,
    cells: Vec<u64>,
}

impl PairwiseTally {
    fn new(num_candidates: usize) -> PairwiseTally {
        PairwiseTally {
            num_candidates,
            cells: vec![0; num_candidates * num_candidates],
        }
    }

    // No check on the arguments: callers guarantee 0 <= i, j < n.
    fn index(&self, i: CandidateId, j: CandidateId) -> usize {
        self.num_candidates * i + j
    }

    fn get(&self, i: CandidateId, j: CandidateId) -> u64 {
        if i == j || i >= self.num_candidates || j >= self.num_candidates {
            0
        } else {
            self.cells[self.index(i, j)]
        }
    }

    /// Adds `count` copies of a ballot that is known to be a permutation of the candidates.
    fn add_ballot(&mut self, ranks: &[CandidateId], count: u64) {
        for (pos, &preferred) in ranks.iter().enumerate() {
            for &other in ranks[pos + 1..].iter() {
                let idx = self.index(preferred, other);
                self.cells[idx] += count;
            }
        }
    }

    fn beats(&self, i: CandidateId, j: CandidateId) -> bool {
        self.get(i, j) > self.get(j, i)
    }

    fn condorcet_winner(&self) -> Option<CandidateId> {
        // Sweep: keep the candidate that is not beaten by any later challenger.
        let mut w: CandidateId = 0;
        for i in 1..self.num_candidates {
            if self.beats(i, w) {
                w = i;
            }
        }
        debug!("condorcet_winner: candidate after sweep: {:?}", w);

        // The sweep alone does not prove anything: w must beat everyone, ties included.
        let challenger = (0..self.num_candidates).find(|&i| i != w && !self.beats(w, i));
        if let Some(i) = challenger {
            debug!(
                "condorcet_winner: {:?} does not beat {:?} ({} vs {}), no winner",
                w,
                i,
                self.get(w, i),
                self.get(i, w)
            );
            return None;
        }
        Some(w)
    }
}

/// An election following the Condorcet method.
///
/// The default value is an election with 2 candidates.
///
/// An election is a plain accumulator: sharing it between threads requires
/// external locking around both [`Election::vote`] and [`Election::result`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    num_candidates: usize,
    // Allocated with the first accepted ballot.
    tally: Option<PairwiseTally>,
    num_voters: u64,
}

impl Default for Election {
    fn default() -> Self {
        Election {
            num_candidates: 2,
            tally: None,
            num_voters: 0,
        }
    }
}

impl Election {
    /// Returns an election with `num_candidates` candidates, identified by an
    /// index such that `0 <= index < num_candidates`.
    ///
    /// There must be at least 2 candidates.
    pub fn new(num_candidates: usize) -> Result<Election, VotingErrors> {
        if num_candidates < 2 {
            return Err(VotingErrors::InvalidCandidateCount(num_candidates));
        }
        Ok(Election {
            num_candidates,
            ..Election::default()
        })
    }

    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    /// Checks that a ballot is a total order over all the candidates and
    /// returns the candidate indices, most preferred first.
    ///
    /// Nothing is recorded. The first problem found is reported.
    pub fn check_ballot<I>(&self, ballot: &[I]) -> Result<Vec<CandidateId>, BallotError>
    where
        I: Copy + TryInto<usize>,
    {
        let n = self.num_candidates;
        if ballot.len() != n {
            return Err(BallotError::WrongLength {
                expected: n,
                found: ballot.len(),
            });
        }
        let mut seen = vec![false; n];
        let mut ranks: Vec<CandidateId> = Vec::with_capacity(n);
        for (position, choice) in ballot.iter().enumerate() {
            let cid: CandidateId = match (*choice).try_into() {
                Ok(cid) if cid < n => cid,
                _ => return Err(BallotError::OutOfRange { position }),
            };
            if seen[cid] {
                return Err(BallotError::Duplicate { candidate: cid });
            }
            seen[cid] = true;
            ranks.push(cid);
        }
        Ok(ranks)
    }

    /// Registers a ballot. The first item is the preferred candidate, the
    /// second item the second choice, and so on.
    ///
    /// The ballot must be a total order over all the candidates. Otherwise it
    /// is ignored, nothing is recorded and false is returned.
    pub fn vote<I>(&mut self, ballot: &[I]) -> bool
    where
        I: Copy + TryInto<usize>,
    {
        self.vote_with_count(ballot, 1)
    }

    /// Registers `count` identical ballots at once.
    ///
    /// Equivalent to calling [`Election::vote`] `count` times. The ballot is
    /// rejected when the voter count would overflow.
    pub fn vote_with_count<I>(&mut self, ballot: &[I], count: u64) -> bool
    where
        I: Copy + TryInto<usize>,
    {
        let checked = self.check_ballot(ballot).and_then(|ranks| {
            self.num_voters
                .checked_add(count)
                .map(|total| (ranks, total))
                .ok_or(BallotError::CountOverflow { count })
        });
        let (ranks, total) = match checked {
            Ok(x) => x,
            Err(e) => {
                debug!("vote_with_count: rejected ballot: {}", e);
                return false;
            }
        };
        // Every cell is bounded by the voter count, so no cell can overflow.
        let n = self.num_candidates;
        self.tally
            .get_or_insert_with(|| PairwiseTally::new(n))
            .add_ballot(&ranks, count);
        self.num_voters = total;
        true
    }

    /// The number of ballots ranking candidate `i` above candidate `j`.
    ///
    /// Returns 0 when `i == j` or when one of them is not a candidate.
    pub fn pairwise(&self, i: CandidateId, j: CandidateId) -> u64 {
        self.tally.as_ref().map(|t| t.get(i, j)).unwrap_or(0)
    }

    /// The winner of the election so far, if any.
    ///
    /// An election with no vote has no winner.
    pub fn winner(&self) -> Option<CandidateId> {
        self.tally.as_ref().and_then(|t| t.condorcet_winner())
    }

    /// The number of accepted ballots.
    pub fn num_voters(&self) -> u64 {
        self.num_voters
    }

    /// Returns a snapshot of the election.
    ///
    /// The election can continue receiving votes without impacting the
    /// results that were already created.
    pub fn result(&self) -> ElectionResult {
        let tally = match &self.tally {
            Some(t) => t.clone(),
            None => PairwiseTally::new(self.num_candidates),
        };
        ElectionResult {
            tally,
            num_voters: self.num_voters,
        }
    }
}

/// An immutable snapshot of an [`Election`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionResult {
    tally: PairwiseTally,
    num_voters: u64,
}

impl ElectionResult {
    /// The winner of the election, if any.
    pub fn winner(&self) -> Option<CandidateId> {
        self.tally.condorcet_winner()
    }

    pub fn num_voters(&self) -> u64 {
        self.num_voters
    }

    pub fn num_candidates(&self) -> usize {
        self.tally.num_candidates
    }

    /// See [`Election::pairwise`].
    pub fn pairwise(&self, i: CandidateId, j: CandidateId) -> u64 {
        self.tally.get(i, j)
    }
}

/// Runs a Condorcet tally over named votes.
///
/// Arguments:
/// * `coll` the collection of votes to process
/// * `candidates` the registered candidates for this election, in order. Ballots
/// naming anyone else, or not ranking every candidate, are counted as rejected.
pub fn run_voting_stats(
    coll: &[Vote],
    candidates: &[Candidate],
) -> Result<VotingResult, VotingErrors> {
    info!(
        "Processing {:?} votes, candidates: {:?}",
        coll.len(),
        candidates
    );
    let mut builder = Builder::with_candidates(candidates)?;
    for (idx, c) in builder.candidates().iter().enumerate() {
        info!("Candidate: {}: {}", idx, c.name);
    }

    let mut rejected: u64 = 0;
    for v in coll.iter() {
        if !builder.add_vote(&v.candidates, v.count) {
            rejected = rejected
                .checked_add(v.count)
                .ok_or(VotingErrors::RejectedCountOverflow)?;
        }
    }

    let result = builder.result();
    info!(
        "Tallied {} voters, {} rejected ballots",
        result.num_voters(),
        rejected
    );

    let n = result.num_candidates();
    let mut contests: Vec<PairwiseContest> = Vec::new();
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            contests.push(PairwiseContest {
                candidate: builder.candidates()[i].name.clone(),
                opponent: builder.candidates()[j].name.clone(),
                wins: result.pairwise(i, j),
                losses: result.pairwise(j, i),
            });
        }
    }

    let winner = result
        .winner()
        .and_then(|cid| builder.candidate_name(cid))
        .map(|s| s.to_string());
    match &winner {
        Some(name) => info!("Winner: {}", name),
        None => info!("No Condorcet winner"),
    }

    Ok(VotingResult {
        winner,
        num_voters: result.num_voters(),
        rejected,
        contests,
    })
}
