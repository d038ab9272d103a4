// shared/src/workflow.rs
//
// Ordered workflow states with start/end markers. The editor never patches a
// state in place: every operation returns a whole new list.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Name taken by the date column of a cumulative flow point.
pub const RESERVED_STATE_NAME: &str = "date";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_start_point: bool,
    #[serde(default)]
    pub is_end_point: bool,
}

impl WorkflowState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            is_start_point: false,
            is_end_point: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("workflow has no states")]
    Empty,
    #[error("workflow state names must not be blank")]
    BlankName,
    #[error("duplicate workflow state {0:?}")]
    DuplicateName(String),
    #[error("{0:?} is reserved and cannot name a workflow state")]
    ReservedName(String),
    #[error("workflow needs a start point")]
    MissingStart,
    #[error("workflow needs an end point")]
    MissingEnd,
    #[error("start point {start:?} comes after end point {end:?}")]
    StartAfterEnd { start: String, end: String },
}

/// Move the element at `from` to position `to`.
///
/// The item is removed at `from` first and then inserted at `to`, so `to`
/// indexes the list as it looks after the removal. Out-of-range indices give
/// back an unchanged copy.
pub fn move_item<T: Clone>(list: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = list.to_vec();
    if from >= out.len() || to >= out.len() || from == to {
        return out;
    }
    let item = out.remove(from);
    out.insert(to, item);
    out
}

pub fn add_state(list: &[WorkflowState], name: &str) -> Vec<WorkflowState> {
    let mut out = list.to_vec();
    out.push(WorkflowState::new(name.trim()));
    out
}

pub fn remove_state(list: &[WorkflowState], id: &str) -> Vec<WorkflowState> {
    list.iter().filter(|s| s.id != id).cloned().collect()
}

pub fn rename_state(list: &[WorkflowState], id: &str, name: &str) -> Vec<WorkflowState> {
    map_state(list, id, |s| s.name = name.to_string())
}

pub fn toggle_start(list: &[WorkflowState], id: &str) -> Vec<WorkflowState> {
    map_state(list, id, |s| s.is_start_point = !s.is_start_point)
}

pub fn toggle_end(list: &[WorkflowState], id: &str) -> Vec<WorkflowState> {
    map_state(list, id, |s| s.is_end_point = !s.is_end_point)
}

fn map_state(
    list: &[WorkflowState],
    id: &str,
    f: impl Fn(&mut WorkflowState),
) -> Vec<WorkflowState> {
    list.iter()
        .cloned()
        .map(|mut s| {
            if s.id == id {
                f(&mut s);
            }
            s
        })
        .collect()
}

pub fn validate_workflow(list: &[WorkflowState]) -> Result<(), WorkflowError> {
    if list.is_empty() {
        return Err(WorkflowError::Empty);
    }

    let mut seen = HashSet::new();
    for s in list {
        let name = s.name.trim();
        if name.is_empty() {
            return Err(WorkflowError::BlankName);
        }
        if name.eq_ignore_ascii_case(RESERVED_STATE_NAME) {
            return Err(WorkflowError::ReservedName(name.to_string()));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(WorkflowError::DuplicateName(name.to_string()));
        }
    }

    let wf = Workflow::new(list);
    let start = wf.start_index().ok_or(WorkflowError::MissingStart)?;
    let end = wf.end_index().ok_or(WorkflowError::MissingEnd)?;
    if start > end {
        return Err(WorkflowError::StartAfterEnd {
            start: list[start].name.clone(),
            end: list[end].name.clone(),
        });
    }
    Ok(())
}

/// Read-only view used when mapping tracker statuses onto the workflow.
#[derive(Debug, Clone, Copy)]
pub struct Workflow<'a> {
    states: &'a [WorkflowState],
}

impl<'a> Workflow<'a> {
    pub fn new(states: &'a [WorkflowState]) -> Self {
        Self { states }
    }

    pub fn states(&self) -> &'a [WorkflowState] {
        self.states
    }

    /// Position of a status by name, ignoring case and surrounding spaces.
    pub fn position(&self, status: &str) -> Option<usize> {
        let status = status.trim();
        self.states
            .iter()
            .position(|s| s.name.trim().eq_ignore_ascii_case(status))
    }

    pub fn start_index(&self) -> Option<usize> {
        self.states.iter().position(|s| s.is_start_point)
    }

    pub fn end_index(&self) -> Option<usize> {
        self.states.iter().position(|s| s.is_end_point)
    }

    pub fn is_done(&self, status: &str) -> bool {
        match (self.position(status), self.end_index()) {
            (Some(p), Some(end)) => p >= end,
            _ => false,
        }
    }

    /// In progress: at or after the start point and before the end point.
    pub fn is_in_progress(&self, status: &str) -> bool {
        match (self.position(status), self.start_index(), self.end_index()) {
            (Some(p), Some(start), Some(end)) => p >= start && p < end,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> Vec<WorkflowState> {
        names.iter().fold(Vec::new(), |acc, n| add_state(&acc, n))
    }

    fn names(list: &[WorkflowState]) -> Vec<&str> {
        list.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn move_forward_and_backward() {
        let list = vec!['a', 'b', 'c', 'd'];
        assert_eq!(move_item(&list, 0, 2), vec!['b', 'c', 'a', 'd']);
        assert_eq!(move_item(&list, 3, 1), vec!['a', 'd', 'b', 'c']);
        assert_eq!(move_item(&list, 1, 1), list);
    }

    #[test]
    fn move_out_of_range_is_unchanged() {
        let list = vec![1, 2, 3];
        assert_eq!(move_item(&list, 5, 0), list);
        assert_eq!(move_item(&list, 0, 3), list);
        assert!(move_item::<u8>(&[], 0, 0).is_empty());
    }

    #[test]
    fn add_generates_unique_ids() {
        let list = named(&["To Do", "Doing"]);
        assert_ne!(list[0].id, list[1].id);
        assert!(!list[0].is_start_point && !list[0].is_end_point);
    }

    #[test]
    fn toggles_only_touch_target() {
        let list = named(&["To Do", "Doing", "Done"]);
        let toggled = toggle_start(&list, &list[1].id);
        assert!(toggled[1].is_start_point);
        assert!(!toggled[0].is_start_point);
        // original untouched
        assert!(!list[1].is_start_point);
        let back = toggle_start(&toggled, &list[1].id);
        assert!(!back[1].is_start_point);
    }

    #[test]
    fn remove_and_rename() {
        let list = named(&["To Do", "Doing", "Done"]);
        let removed = remove_state(&list, &list[1].id);
        assert_eq!(names(&removed), vec!["To Do", "Done"]);
        let renamed = rename_state(&list, &list[0].id, "Backlog");
        assert_eq!(names(&renamed), vec!["Backlog", "Doing", "Done"]);
    }

    #[test]
    fn validation_rules() {
        assert_eq!(validate_workflow(&[]), Err(WorkflowError::Empty));

        let list = named(&["To Do", "Doing", "Done"]);
        assert_eq!(validate_workflow(&list), Err(WorkflowError::MissingStart));

        let list = toggle_start(&list, &list[1].id);
        assert_eq!(validate_workflow(&list), Err(WorkflowError::MissingEnd));

        let list = toggle_end(&list, &list[2].id);
        assert_eq!(validate_workflow(&list), Ok(()));

        let reordered = move_item(&list, 2, 0);
        assert!(matches!(
            validate_workflow(&reordered),
            Err(WorkflowError::StartAfterEnd { .. })
        ));

        let dup = named(&["Done", "done"]);
        assert_eq!(
            validate_workflow(&dup),
            Err(WorkflowError::DuplicateName("done".into()))
        );
    }

    #[test]
    fn date_is_not_a_state_name() {
        let list = named(&["To Do", " Date ", "Done"]);
        let list = toggle_start(&list, &list[0].id);
        let list = toggle_end(&list, &list[2].id);
        assert_eq!(
            validate_workflow(&list),
            Err(WorkflowError::ReservedName("Date".into()))
        );

        let renamed = rename_state(&list, &list[1].id, "Dated");
        assert_eq!(validate_workflow(&renamed), Ok(()));
    }

    #[test]
    fn workflow_positions_ignore_case() {
        let list = named(&["To Do", "In Progress", "Review", "Done"]);
        let list = toggle_start(&list, &list[1].id);
        let list = toggle_end(&list, &list[3].id);
        let wf = Workflow::new(&list);
        assert_eq!(wf.position("in progress"), Some(1));
        assert!(wf.is_in_progress("REVIEW"));
        assert!(!wf.is_in_progress("To Do"));
        assert!(wf.is_done("Done"));
        assert!(!wf.is_done("Unknown"));
    }
}
