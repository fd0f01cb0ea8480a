//! Dashboard aggregates derived from the history and session snapshot

use crate::domain::campaign::history::HistoryView;
use crate::domain::campaign::record::CallRecord;
use crate::domain::campaign::session::SessionSnapshot;
use crate::domain::campaign::target::CallTarget;
use crate::domain::campaign::value_object::CallStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Campaign statistics for the operator dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    /// Targets selected for dialing
    pub total: usize,
    /// Finalized attempts against the selected targets
    pub completed: usize,
    pub answered: usize,
    pub not_answered: usize,
    /// Not active and voice mail attempts, grouped as the dashboard shows them
    pub not_active: usize,
    pub voice_mail: usize,
    pub errors: usize,
    /// 1 while a session is dialing, else 0
    pub in_progress: usize,
}

impl CampaignStats {
    /// Compute statistics for `selected` from a history view and session snapshot
    pub fn compute(selected: &[CallTarget], history: &HistoryView, snapshot: &SessionSnapshot) -> Self {
        let case_ids: HashSet<&str> = selected.iter().map(|t| t.case_id()).collect();

        let mut stats = CampaignStats {
            total: selected.len(),
            in_progress: usize::from(snapshot.state.is_active()),
            ..Default::default()
        };

        for record in history.iter().filter(|r| case_ids.contains(r.case_id())) {
            match record.status() {
                CallStatus::InProgress => continue,
                CallStatus::Answered => stats.answered += 1,
                CallStatus::NotAnswered => stats.not_answered += 1,
                CallStatus::NotActive => stats.not_active += 1,
                CallStatus::VoiceMail => {
                    stats.voice_mail += 1;
                    stats.not_active += 1;
                }
                CallStatus::Error => stats.errors += 1,
            }
            stats.completed += 1;
        }

        stats
    }

    /// Completed attempts as a percentage of the selected targets
    pub fn completion_rate(&self) -> f64 {
        percentage(self.completed, self.total)
    }

    /// Answered attempts as a percentage of the completed ones
    pub fn answer_rate(&self) -> f64 {
        percentage(self.answered, self.completed)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

/// Most recently finished calls, newest first
pub fn recent_calls(history: &HistoryView, limit: usize) -> Vec<CallRecord> {
    let mut finished: Vec<CallRecord> = history
        .iter()
        .filter(|r| !r.is_in_progress())
        .cloned()
        .collect();
    finished.sort_by(|a, b| b.end_time().cmp(&a.end_time()));
    finished.truncate(limit);
    finished
}
