//! Storage behaviour of the `PostgreSQL` scheduling repository.

use super::helpers::{BoxError, PgFloor, at, pg_floor, slot, test_runtime};
use mockable::DefaultClock;
use rstest::rstest;
use shopfloor::scheduling::{
    domain::{
        Item, MachineId, Quantities, ScheduledTask, SlotStartFilter, Task, TaskDraft, TaskStatus,
        TaskTitle, TimeSlot,
    },
    ports::{SchedulingRepository, SchedulingRepositoryError, TaskUnitOfWork, TaskWrite},
    services::{ItemLink, ScheduleQueryService, ScheduleTaskRequest},
};
use std::sync::Arc;

fn titles(tasks: &[ScheduledTask]) -> Vec<&str> {
    tasks.iter().map(|task| task.task().title().as_str()).collect()
}

#[rstest]
fn deleting_a_task_removes_its_slots_and_assignments(
    pg_floor: Result<Option<PgFloor>, BoxError>,
) -> Result<(), BoxError> {
    let Some(floor) = pg_floor? else {
        return Ok(());
    };
    let runtime = test_runtime()?;
    let writer = floor.writer();

    let created = runtime.block_on(
        writer.create_task(
            ScheduleTaskRequest::new("Housing batch")
                .with_item_link(ItemLink::ProjectDefault(floor.project))
                .with_machines([floor.mill, floor.lathe])
                .with_operators([floor.alice])
                .with_slots([slot(at(8, 0), 60), slot(at(13, 0), 90)]),
        ),
    )?;
    let task_id = created.task().id();
    assert_eq!(floor.rows_for_task("time_slots", task_id)?, 2);
    assert_eq!(floor.rows_for_task("task_machines", task_id)?, 2);

    runtime.block_on(writer.delete_task(task_id))?;

    assert_eq!(floor.rows_for_task("time_slots", task_id)?, 0);
    assert_eq!(floor.rows_for_task("task_machines", task_id)?, 0);
    assert_eq!(floor.rows_for_task("task_operators", task_id)?, 0);
    assert_eq!(floor.total_rows("machines")?, 2);
    assert_eq!(floor.total_rows("operators")?, 1);
    assert_eq!(floor.total_rows("items")?, 1, "the default item outlives its task");
    let missing = runtime.block_on(floor.repository.delete_task(task_id));
    assert!(matches!(
        missing,
        Err(SchedulingRepositoryError::TaskNotFound(id)) if id == task_id
    ));
    Ok(())
}

#[rstest]
fn failed_unit_rolls_back_every_row(
    pg_floor: Result<Option<PgFloor>, BoxError>,
) -> Result<(), BoxError> {
    let Some(floor) = pg_floor? else {
        return Ok(());
    };
    let runtime = test_runtime()?;
    let item = Item::new(floor.project, "Default item");
    let task = Task::new(
        TaskDraft {
            title: TaskTitle::new("Orphan")?,
            description: None,
            status: TaskStatus::default(),
            quantities: Quantities::new(1, 0)?,
            item_id: Some(item.id()),
        },
        &DefaultClock,
    );
    let task_id = task.id();
    let slots = vec![TimeSlot::from_spec(task_id, &slot(at(9, 0), 60))?];
    let unknown = MachineId::new();
    let unit = TaskUnitOfWork {
        new_item: Some(item),
        slots: Some(slots),
        machine_ids: Some(vec![floor.mill, unknown]),
        operator_ids: Some(Vec::new()),
        claim: None,
        task: TaskWrite::Insert(task),
    };

    let result = runtime.block_on(floor.repository.run_atomic(unit));

    assert!(matches!(
        result,
        Err(SchedulingRepositoryError::MissingReference { entity: "machine", id })
            if id == unknown.into_inner()
    ));
    assert!(runtime.block_on(floor.repository.find_task(task_id))?.is_none());
    assert_eq!(floor.total_rows("tasks")?, 0);
    assert_eq!(floor.total_rows("items")?, 0);
    assert_eq!(floor.total_rows("time_slots")?, 0);
    assert_eq!(floor.total_rows("task_machines")?, 0);
    Ok(())
}

#[rstest]
fn assignment_lookup_skips_the_excluded_task(
    pg_floor: Result<Option<PgFloor>, BoxError>,
) -> Result<(), BoxError> {
    let Some(floor) = pg_floor? else {
        return Ok(());
    };
    let runtime = test_runtime()?;
    let writer = floor.writer();
    let milling = runtime.block_on(
        writer.create_task(
            ScheduleTaskRequest::new("Milling")
                .with_machines([floor.mill])
                .with_operators([floor.alice])
                .with_slots([slot(at(11, 0), 60), slot(at(9, 0), 60)]),
        ),
    )?;
    let turning = runtime.block_on(
        writer.create_task(
            ScheduleTaskRequest::new("Turning")
                .with_operators([floor.alice])
                .with_slots([slot(at(14, 0), 30)]),
        ),
    )?;

    let everything = runtime.block_on(floor.repository.find_assignments_for(
        &[floor.mill],
        &[floor.alice],
        None,
    ))?;
    let without_milling = runtime.block_on(floor.repository.find_assignments_for(
        &[floor.mill],
        &[floor.alice],
        Some(milling.task().id()),
    ))?;

    let starts: Vec<_> = everything.iter().map(|held| held.window.start()).collect();
    assert_eq!(
        starts,
        [at(9, 0), at(9, 0), at(11, 0), at(11, 0), at(14, 0)],
        "one window per resource, ordered by start"
    );
    assert_eq!(without_milling.len(), 1);
    assert!(
        without_milling
            .iter()
            .all(|held| held.task_id == turning.task().id() && held.task_title == "Turning")
    );
    Ok(())
}

#[rstest]
fn listing_bounds_select_tasks_by_slot_start(
    pg_floor: Result<Option<PgFloor>, BoxError>,
) -> Result<(), BoxError> {
    let Some(floor) = pg_floor? else {
        return Ok(());
    };
    let runtime = test_runtime()?;
    let writer = floor.writer();
    for (title, start) in [
        ("Early", at(6, 0)),
        ("Edge", at(12, 0)),
        ("Late", at(18, 0)),
    ] {
        runtime.block_on(
            writer.create_task(
                ScheduleTaskRequest::new(title)
                    .with_machines([floor.lathe])
                    .with_slots([slot(start, 30)]),
            ),
        )?;
    }
    runtime.block_on(writer.create_task(ScheduleTaskRequest::new("Unscheduled")))?;
    let queries = ScheduleQueryService::new(Arc::clone(&floor.repository));

    let everything = runtime.block_on(floor.repository.list_tasks(SlotStartFilter::unbounded()))?;
    let morning =
        runtime.block_on(queries.list_scheduled_tasks(Some(at(6, 0)), Some(at(12, 0))))?;
    let closed = runtime.block_on(
        floor
            .repository
            .list_tasks(SlotStartFilter::closed(at(6, 0), at(12, 0))),
    )?;
    let from_noon = runtime.block_on(queries.list_scheduled_tasks(Some(at(12, 0)), None))?;

    assert_eq!(titles(&everything), ["Early", "Edge", "Late", "Unscheduled"]);
    assert_eq!(titles(&morning), ["Early"], "the upper bound is exclusive");
    assert_eq!(titles(&closed), ["Early", "Edge"], "closed bounds include both ends");
    assert_eq!(titles(&from_noon), ["Edge", "Late"]);
    let edge = closed.get(1).ok_or("missing Edge task")?;
    assert_eq!(edge.machines().len(), 1);
    assert_eq!(edge.slots().len(), 1);
    Ok(())
}
