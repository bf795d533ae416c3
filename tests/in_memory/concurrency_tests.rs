//! Racing writers against shared machines, operators, and projects.

use super::helpers::{Floor, SlowRepository, at, slot, slow_checking_floor, slow_floor};
use rstest::rstest;
use shopfloor::scheduling::{
    domain::{ScheduledTask, SlotSpec, SlotStartFilter},
    ports::SchedulingRepository,
    services::{ErrorKind, ItemLink, PatchTaskRequest, ScheduleTaskRequest, SchedulingResult},
};
use tokio::task::JoinSet;

/// Runs every request through clones of one writer at the same time.
async fn race(
    floor: &Floor<SlowRepository>,
    requests: Vec<ScheduleTaskRequest>,
) -> Vec<SchedulingResult<ScheduledTask>> {
    let writer = floor.writer();
    let mut set = JoinSet::new();
    for request in requests {
        let racer = writer.clone();
        set.spawn(async move { racer.create_task(request).await });
    }
    let mut results = Vec::new();
    while let Some(joined) = set.join_next().await {
        results.push(joined.expect("writer task should not panic"));
    }
    results
}

fn booking(title: &str, spec: SlotSpec) -> ScheduleTaskRequest {
    ScheduleTaskRequest::new(title).with_slots([spec])
}

async fn stored_count(floor: &Floor<SlowRepository>) -> usize {
    floor
        .repository
        .list_tasks(SlotStartFilter::unbounded())
        .await
        .expect("listing should succeed")
        .len()
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_creates_on_one_machine_admit_exactly_one(slow_floor: Floor<SlowRepository>) {
    let requests = vec![
        booking("First", slot(at(10, 0), 60)).with_machines([slow_floor.mill]),
        booking("Second", slot(at(10, 30), 60)).with_machines([slow_floor.mill]),
    ];

    let results = race(&slow_floor, requests).await;

    let successes = results.iter().filter(|result| result.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|result| {
            result
                .as_ref()
                .is_err_and(|err| err.kind() == ErrorKind::Conflict)
        })
        .count();
    assert_eq!((successes, conflicts), (1, 1));
    assert_eq!(stored_count(&slow_floor).await, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_writers_on_one_operator_admit_exactly_one(slow_floor: Floor<SlowRepository>) {
    let requests = (0..8_u32)
        .map(|offset| {
            booking(&format!("Shift {offset}"), slot(at(8, offset), 120))
                .with_operators([slow_floor.alice])
        })
        .collect();

    let results = race(&slow_floor, requests).await;

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert_eq!(stored_count(&slow_floor).await, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disjoint_machines_do_not_block_each_other(slow_floor: Floor<SlowRepository>) {
    let requests = vec![
        booking("Milling", slot(at(10, 0), 60)).with_machines([slow_floor.mill]),
        booking("Turning", slot(at(10, 0), 60)).with_machines([slow_floor.lathe]),
    ];

    let results = race(&slow_floor, requests).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(stored_count(&slow_floor).await, 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_patches_into_one_window_admit_exactly_one(
    slow_floor: Floor<SlowRepository>,
) {
    let writer = slow_floor.writer();
    let mut ids = Vec::new();
    for (title, hour) in [("Early", 6), ("Late", 16)] {
        let created = writer
            .create_task(booking(title, slot(at(hour, 0), 60)).with_machines([slow_floor.mill]))
            .await
            .expect("task creation should succeed");
        ids.push(created.task().id());
    }

    let mut set = JoinSet::new();
    for id in ids {
        let racer = writer.clone();
        set.spawn(async move {
            racer
                .patch_task(id, PatchTaskRequest::new().with_slots([slot(at(11, 0), 60)]))
                .await
        });
    }
    let mut successes = 0;
    while let Some(joined) = set.join_next().await {
        if joined.expect("writer task should not panic").is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    let booked = slow_floor
        .repository
        .find_assignments_for(&[slow_floor.mill], &[], None)
        .await
        .expect("lookup should succeed");
    let at_eleven = booked
        .iter()
        .filter(|assignment| assignment.window.start() == at(11, 0))
        .count();
    assert_eq!(at_eleven, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_project_links_share_one_default_item(slow_floor: Floor<SlowRepository>) {
    let link = ItemLink::ProjectDefault(slow_floor.project);
    let requests = vec![
        ScheduleTaskRequest::new("Housing prep").with_item_link(link),
        ScheduleTaskRequest::new("Housing finish").with_item_link(link),
    ];

    let results = race(&slow_floor, requests).await;

    let item_ids: Vec<_> = results
        .into_iter()
        .map(|result| {
            result
                .expect("linked creation should succeed")
                .task()
                .item_id()
        })
        .collect();
    let [first, second] = item_ids.as_slice() else {
        panic!("expected two results, got {}", item_ids.len());
    };
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn writers_with_separate_lock_tables_are_kept_apart_at_commit(
    slow_checking_floor: Floor<SlowRepository>,
) {
    let floor = slow_checking_floor;
    let first = floor.writer();
    let second = floor.writer();
    let first_request = booking("First", slot(at(10, 0), 60)).with_machines([floor.mill]);
    let second_request = booking("Second", slot(at(10, 30), 60)).with_machines([floor.mill]);

    let (first_result, second_result) = tokio::join!(
        first.create_task(first_request),
        second.create_task(second_request),
    );

    let outcomes = [first_result, second_result];
    assert_eq!(outcomes.iter().filter(|result| result.is_ok()).count(), 1);
    let refused = outcomes
        .iter()
        .find_map(|result| result.as_ref().err())
        .expect("one writer must be refused");
    assert_eq!(refused.kind(), ErrorKind::Conflict);
    let report = refused.conflict().expect("conflict report expected");
    assert_eq!(report.resource().name(), "CNC Mill 2");
    assert_eq!(stored_count(&floor).await, 1);
}
