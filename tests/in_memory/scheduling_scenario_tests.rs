//! In-memory integration tests for booking, rebooking, and freeing resources.

use std::sync::Arc;

use super::helpers::{Floor, at, floor, slot};
use rstest::rstest;
use shopfloor::scheduling::{
    adapters::memory::InMemorySchedulingRepository,
    domain::{ResourceKind, TaskStatus},
    services::{
        ErrorKind, ItemLink, PatchTaskRequest, ScheduleQueryService, ScheduleTaskRequest,
    },
};

type MemoryFloor = Floor<InMemorySchedulingRepository>;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rebooking_a_task_frees_its_previous_window(floor: MemoryFloor) {
    let writer = floor.writer();
    let morning = writer
        .create_task(
            ScheduleTaskRequest::new("Morning run")
                .with_machines([floor.mill])
                .with_operators([floor.alice])
                .with_slots([slot(at(9, 0), 120)]),
        )
        .await
        .expect("task creation should succeed");

    writer
        .patch_task(
            morning.task().id(),
            PatchTaskRequest::new().with_slots([slot(at(13, 0), 120)]),
        )
        .await
        .expect("moving the task should succeed");
    let rush = writer
        .create_task(
            ScheduleTaskRequest::new("Rush order")
                .with_machines([floor.mill])
                .with_slots([slot(at(9, 30), 60)]),
        )
        .await;

    assert!(rush.is_ok());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_releases_its_operator(floor: MemoryFloor) {
    let writer = floor.writer();
    let blocker = writer
        .create_task(
            ScheduleTaskRequest::new("Inspection")
                .with_operators([floor.alice])
                .with_slots([slot(at(10, 0), 60)]),
        )
        .await
        .expect("task creation should succeed");
    let clash = ScheduleTaskRequest::new("Setup")
        .with_operators([floor.alice])
        .with_slots([slot(at(10, 15), 30)]);

    let refused = writer
        .create_task(clash.clone())
        .await
        .expect_err("operator is busy");
    writer
        .delete_task(blocker.task().id())
        .await
        .expect("delete should succeed");
    let accepted = writer.create_task(clash).await;

    assert_eq!(refused.kind(), ErrorKind::Conflict);
    assert_eq!(
        refused.conflict().map(|report| report.conflict_type()),
        Some(ResourceKind::Operator)
    );
    assert!(accepted.is_ok());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_changes_never_touch_the_schedule(floor: MemoryFloor) {
    let writer = floor.writer();
    let first = writer
        .create_task(
            ScheduleTaskRequest::new("Batch 1")
                .with_machines([floor.mill])
                .with_slots([slot(at(8, 0), 60)]),
        )
        .await
        .expect("task creation should succeed");

    let done = writer
        .patch_task(
            first.task().id(),
            PatchTaskRequest::new()
                .with_status(TaskStatus::Completed)
                .with_completed_quantity(1),
        )
        .await
        .expect("status patch should succeed");

    assert_eq!(done.task().status(), TaskStatus::Completed);
    assert_eq!(done.slots(), first.slots());
    assert_eq!(done.machines(), first.machines());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn day_plan_lists_only_tasks_starting_that_day(floor: MemoryFloor) {
    let writer = floor.writer();
    let linked = ItemLink::ProjectDefault(floor.project);
    for (title, start) in [
        ("Night shift", at(0, 0) - chrono::Duration::hours(2)),
        ("Day shift", at(8, 0)),
        ("Late shift", at(16, 0)),
    ] {
        writer
            .create_task(
                ScheduleTaskRequest::new(title)
                    .with_machines([floor.lathe])
                    .with_item_link(linked)
                    .with_slots([slot(start, 240)]),
            )
            .await
            .expect("task creation should succeed");
    }

    let plan = ScheduleQueryService::new(Arc::clone(&floor.repository))
        .list_scheduled_tasks(Some(at(0, 0)), Some(at(0, 0) + chrono::Duration::days(1)))
        .await
        .expect("listing should succeed");

    let titles: Vec<&str> = plan
        .iter()
        .map(|task| task.task().title().as_str())
        .collect();
    assert_eq!(titles, ["Day shift", "Late shift"]);
    assert!(
        plan.iter()
            .all(|task| task.project().map(|project| project.id()) == Some(floor.project))
    );
}
