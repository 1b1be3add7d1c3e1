use crate::analysis::error::MalformedJourney;
use crate::model::JourneyOption;
use serde::Serialize;

/// A decoded journey, or the reason it could not be decoded.
pub type JourneyCandidate = Result<JourneyOption, MalformedJourney>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankCriteria {
    /// Break duration ties by ascending change count.
    pub prefer_fewer_changes: bool,
}

/// A candidate that failed validation, with its position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedJourney {
    pub index: usize,
    #[serde(serialize_with = "serialize_display")]
    pub reason: MalformedJourney,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankOutcome {
    pub ranked: Vec<JourneyOption>,
    pub rejected: Vec<RejectedJourney>,
}

/// Checks that a journey has legs and that its declared duration matches
/// the sum of its legs.
pub fn validate(option: &JourneyOption) -> Result<(), MalformedJourney> {
    if option.legs().is_empty() {
        return Err(MalformedJourney::EmptyLegs);
    }

    let legs_total = option.leg_duration_sum();
    if option.total_duration_minutes() != legs_total {
        return Err(MalformedJourney::DurationMismatch {
            declared: option.total_duration_minutes(),
            legs_total,
        });
    }

    Ok(())
}

/// Validates and orders candidate journeys for presentation.
///
/// Options are sorted by total duration; with `prefer_fewer_changes` set,
/// equal durations are further ordered by change count. The sort is stable,
/// so fully tied options keep their input order. Invalid options are left
/// out of `ranked` and listed in `rejected` instead.
pub fn rank(options: Vec<JourneyOption>, criteria: RankCriteria) -> RankOutcome {
    rank_candidates(options.into_iter().map(Ok).collect(), criteria)
}

/// Like [`rank`], but candidates that already failed to decode are carried
/// into `rejected` at their input position.
pub fn rank_candidates(candidates: Vec<JourneyCandidate>, criteria: RankCriteria) -> RankOutcome {
    let mut outcome = RankOutcome::default();

    for (index, candidate) in candidates.into_iter().enumerate() {
        match candidate.and_then(|option| validate(&option).map(|()| option)) {
            Ok(option) => outcome.ranked.push(option),
            Err(reason) => outcome.rejected.push(RejectedJourney { index, reason }),
        }
    }

    outcome.ranked.sort_by_key(|option| {
        let changes = if criteria.prefer_fewer_changes {
            option.change_count()
        } else {
            0
        };
        (option.total_duration_minutes(), changes)
    });

    outcome
}

fn serialize_display<S: serde::Serializer>(
    value: &MalformedJourney,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
