use std::str::FromStr;

use resume_scout::domain::JobStatus;

#[test]
fn given_started_when_checking_transitions_then_any_status_is_allowed() {
    assert!(JobStatus::Started.can_transition_to(JobStatus::Started));
    assert!(JobStatus::Started.can_transition_to(JobStatus::Completed));
    assert!(JobStatus::Started.can_transition_to(JobStatus::Failed));
}

#[test]
fn given_terminal_status_when_checking_transitions_then_only_itself_is_allowed() {
    assert!(JobStatus::Completed.can_transition_to(JobStatus::Completed));
    assert!(!JobStatus::Completed.can_transition_to(JobStatus::Started));
    assert!(!JobStatus::Completed.can_transition_to(JobStatus::Failed));
    assert!(JobStatus::Failed.can_transition_to(JobStatus::Failed));
    assert!(!JobStatus::Failed.can_transition_to(JobStatus::Completed));
}

#[test]
fn given_status_when_serialized_then_uses_upper_case_wire_name() {
    assert_eq!(
        serde_json::to_string(&JobStatus::Completed).unwrap(),
        "\"COMPLETED\""
    );
    let parsed: JobStatus = serde_json::from_str("\"FAILED\"").unwrap();
    assert_eq!(parsed, JobStatus::Failed);
}

#[test]
fn given_unknown_status_when_parsing_then_returns_error() {
    assert!(JobStatus::from_str("IN_PROGRESS").is_err());
    assert_eq!(JobStatus::from_str("STARTED").unwrap(), JobStatus::Started);
}

#[test]
fn given_statuses_when_checking_terminal_then_started_is_not_terminal() {
    assert!(!JobStatus::Started.is_terminal());
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
}
