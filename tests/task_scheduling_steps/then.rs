//! Then steps for task scheduling BDD scenarios.

use super::world::{SchedulingWorld, scenario_instant};
use rstest_bdd_macros::then;
use shopfloor::scheduling::domain::{ConflictReport, ResourceKind};

fn last_conflict(world: &SchedulingWorld) -> Result<&ConflictReport, eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing booking result"))?;
    match result {
        Err(err) => err
            .conflict()
            .ok_or_else(|| eyre::eyre!("expected a scheduling conflict, got {err:?}")),
        Ok(scheduled) => Err(eyre::eyre!(
            "expected a scheduling conflict, but {:?} was booked",
            scheduled.task().title().as_str()
        )),
    }
}

fn expect_conflict_on(
    world: &SchedulingWorld,
    kind: ResourceKind,
    name: &str,
) -> Result<(), eyre::Report> {
    let report = last_conflict(world)?;
    eyre::ensure!(
        report.conflict_type() == kind,
        "expected a {} conflict, got {}",
        kind.as_str(),
        report.conflict_type().as_str()
    );
    eyre::ensure!(
        report.resource().name() == name,
        "expected conflict on {name:?}, got {:?}",
        report.resource().name()
    );
    Ok(())
}

#[then("the booking is accepted")]
fn booking_is_accepted(world: &SchedulingWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(_)) => Ok(()),
        other => Err(eyre::eyre!("expected an accepted booking, got {other:?}")),
    }
}

#[then(r#"the booking is rejected with a machine conflict on "{name}""#)]
fn rejected_with_machine_conflict(
    world: &SchedulingWorld,
    name: String,
) -> Result<(), eyre::Report> {
    expect_conflict_on(world, ResourceKind::Machine, &name)
}

#[then(r#"the booking is rejected with an operator conflict on "{name}""#)]
fn rejected_with_operator_conflict(
    world: &SchedulingWorld,
    name: String,
) -> Result<(), eyre::Report> {
    expect_conflict_on(world, ResourceKind::Operator, &name)
}

#[then(r#"the conflict names task "{title}" from "{start}" to "{end}""#)]
fn conflict_names_task(
    world: &SchedulingWorld,
    title: String,
    start: String,
    end: String,
) -> Result<(), eyre::Report> {
    let report = last_conflict(world)?;
    eyre::ensure!(
        report.conflicting_task_title() == title,
        "expected conflicting task {title:?}, got {:?}",
        report.conflicting_task_title()
    );
    eyre::ensure!(
        report.conflicting_task_id() == world.task(&title)?,
        "conflicting task id does not match {title:?}"
    );
    let overlap = report.overlap();
    eyre::ensure!(
        overlap.start() == scenario_instant(&start)? && overlap.end() == scenario_instant(&end)?,
        "expected overlap {start}-{end}, got {}-{}",
        overlap.start().format("%H:%M"),
        overlap.end().format("%H:%M")
    );
    Ok(())
}
