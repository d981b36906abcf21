use std::collections::{HashMap, HashSet};

use super::super::domain::{Ballot, StatusFilter};
use super::views::{
    EntryAssignmentsView, ProgressSummaryView, QueueItemView, ReviewerProgressEntry,
    ReviewerQueueView, ReviewerSlotView,
};
use crate::workflows::catalog::{Entry, EntryId, Reviewer, ReviewerId};

/// Round-wide ballot counts by status group.
pub fn progress(ballots: &[Ballot]) -> ProgressSummaryView {
    ProgressSummaryView {
        drafts: count(ballots, StatusFilter::Drafts),
        dones: count(ballots, StatusFilter::Dones),
        conflicts: count(ballots, StatusFilter::Conflicts),
    }
}

fn count(ballots: &[Ballot], filter: StatusFilter) -> usize {
    ballots
        .iter()
        .filter(|ballot| filter.matches(ballot.status))
        .count()
}

/// Groups one reviewer's ballots for the queue screen. Entries the catalog
/// no longer knows are skipped; each group is ordered by category,
/// subcategory, then entry id.
pub fn reviewer_queue(
    reviewer: ReviewerId,
    entries: &[Entry],
    ballots: &[Ballot],
) -> ReviewerQueueView {
    let by_id: HashMap<EntryId, &Entry> = entries.iter().map(|entry| (entry.id, entry)).collect();

    let mut grouped = ReviewerQueueView {
        drafts: Vec::new(),
        dones: Vec::new(),
        conflicts: Vec::new(),
    };

    for ballot in ballots.iter().filter(|b| b.reviewer_id == reviewer) {
        let Some(entry) = by_id.get(&ballot.entry_id) else {
            continue;
        };
        let item = QueueItemView {
            entry_id: entry.id,
            title: entry.title.clone(),
            category: entry.category.name.clone(),
            subcategory: entry.subcategory.clone(),
            status: ballot.status,
            status_label: ballot.status.label(),
            updated: ballot.updated,
        };

        if StatusFilter::Dones.matches(ballot.status) {
            grouped.dones.push(item);
        } else if StatusFilter::Conflicts.matches(ballot.status) {
            grouped.conflicts.push(item);
        } else {
            grouped.drafts.push(item);
        }
    }

    for group in [
        &mut grouped.drafts,
        &mut grouped.dones,
        &mut grouped.conflicts,
    ] {
        group.sort_by(|a, b| {
            (&a.category, &a.subcategory, a.entry_id).cmp(&(&b.category, &b.subcategory, b.entry_id))
        });
    }

    grouped
}

/// Progress counts for every member of the reviewer pool, ordered by name.
pub fn reviewer_progress(reviewers: &[Reviewer], ballots: &[Ballot]) -> Vec<ReviewerProgressEntry> {
    let mut pool: Vec<&Reviewer> = reviewers
        .iter()
        .filter(|reviewer| reviewer.assignable())
        .collect();
    pool.sort_by(|a, b| {
        (&a.first_name, &a.last_name, a.id).cmp(&(&b.first_name, &b.last_name, b.id))
    });

    pool.into_iter()
        .map(|reviewer| {
            let own: Vec<&Ballot> = ballots
                .iter()
                .filter(|ballot| ballot.reviewer_id == reviewer.id)
                .collect();
            ReviewerProgressEntry {
                reviewer_id: reviewer.id,
                name: reviewer.display_name(),
                drafts: own
                    .iter()
                    .filter(|b| StatusFilter::Drafts.matches(b.status))
                    .count(),
                dones: own
                    .iter()
                    .filter(|b| StatusFilter::Dones.matches(b.status))
                    .count(),
                conflicts: own
                    .iter()
                    .filter(|b| StatusFilter::Conflicts.matches(b.status))
                    .count(),
            }
        })
        .collect()
}

/// The staff assignment matrix: every entry (optionally narrowed to one
/// category) crossed with every assignable reviewer, flagging who holds a
/// live ballot.
pub fn assignment_matrix(
    entries: &[Entry],
    reviewers: &[Reviewer],
    ballots: &[Ballot],
    category: Option<&str>,
) -> Vec<EntryAssignmentsView> {
    let mut pool: Vec<&Reviewer> = reviewers
        .iter()
        .filter(|reviewer| reviewer.assignable())
        .collect();
    pool.sort_by(|a, b| {
        (&a.first_name, &a.last_name, a.id).cmp(&(&b.first_name, &b.last_name, b.id))
    });

    let live: HashSet<(EntryId, ReviewerId)> = ballots
        .iter()
        .filter(|ballot| ballot.is_live())
        .map(|ballot| (ballot.entry_id, ballot.reviewer_id))
        .collect();

    let mut rows: Vec<&Entry> = entries
        .iter()
        .filter(|entry| category.map_or(true, |name| entry.category.name == name))
        .collect();
    rows.sort_by(|a, b| (&a.category.name, a.id).cmp(&(&b.category.name, b.id)));

    rows.into_iter()
        .map(|entry| EntryAssignmentsView {
            entry_id: entry.id,
            title: entry.title.clone(),
            category: entry.category.name.clone(),
            subcategory: entry.subcategory.clone(),
            reviewers: pool
                .iter()
                .map(|reviewer| ReviewerSlotView {
                    reviewer_id: reviewer.id,
                    name: reviewer.display_name(),
                    assigned: live.contains(&(entry.id, reviewer.id)),
                })
                .collect(),
        })
        .collect()
}
