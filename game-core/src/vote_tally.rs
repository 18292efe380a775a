use game_types::{PlayerId, SuspectVotes, Vote};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyResult {
    /// Per-suspect counts in order of each suspect's first vote.
    pub counts: Vec<SuspectVotes>,
    pub max_votes: u32,
    pub tallied_suspect: Option<PlayerId>,
    pub imposter_caught: bool,
}

pub struct VoteTally;

impl VoteTally {
    /// Count votes per suspect and pick the one the group caught.
    ///
    /// Counts are kept in first-vote order and only a strictly greater count
    /// takes the lead, so on a tie the suspect who was voted for first wins.
    pub fn tally(votes: &[Vote], imposter_id: PlayerId) -> TallyResult {
        let mut counts: Vec<SuspectVotes> = Vec::new();
        for vote in votes {
            match counts.iter_mut().find(|c| c.suspect_id == vote.suspect_id) {
                Some(entry) => entry.votes += 1,
                None => counts.push(SuspectVotes {
                    suspect_id: vote.suspect_id,
                    votes: 1,
                }),
            }
        }

        let mut max_votes = 0;
        let mut tallied_suspect = None;
        for entry in &counts {
            if entry.votes > max_votes {
                max_votes = entry.votes;
                tallied_suspect = Some(entry.suspect_id);
            }
        }

        TallyResult {
            counts,
            max_votes,
            tallied_suspect,
            imposter_caught: tallied_suspect == Some(imposter_id),
        }
    }
}
