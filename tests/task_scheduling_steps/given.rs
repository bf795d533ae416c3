//! Given steps for task scheduling BDD scenarios.

use super::world::{SchedulingWorld, run_async, scenario_instant};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use shopfloor::scheduling::{
    domain::{Machine, Operator, SlotSpec},
    services::ScheduleTaskRequest,
};

#[given(r#"a machine named "{name}""#)]
fn machine_named(world: &mut SchedulingWorld, name: String) -> Result<(), eyre::Report> {
    let machine = Machine::new(name.clone());
    world.machines.insert(name, machine.id());
    world
        .repository
        .insert_machine(machine)
        .wrap_err("seed machine")?;
    Ok(())
}

#[given(r#"an operator named "{name}""#)]
fn operator_named(world: &mut SchedulingWorld, name: String) -> Result<(), eyre::Report> {
    let operator = Operator::new(name.clone());
    world.operators.insert(name, operator.id());
    world
        .repository
        .insert_operator(operator)
        .wrap_err("seed operator")?;
    Ok(())
}

#[given(r#"task "{title}" is booked on machine "{machine}" at "{time}" for {minutes:u32} minutes"#)]
fn task_booked_on_machine(
    world: &mut SchedulingWorld,
    title: String,
    machine: String,
    time: String,
    minutes: u32,
) -> Result<(), eyre::Report> {
    let request = ScheduleTaskRequest::new(title)
        .with_machines([world.machine(&machine)?])
        .with_slots([SlotSpec::new(scenario_instant(&time)?, minutes)]);
    let created = run_async(world.writer.create_task(request))
        .wrap_err("book task on machine in scenario setup")?;
    world.record(Ok(created));
    Ok(())
}

#[given(r#"task "{title}" is booked with operator "{operator}" at "{time}" for {minutes:u32} minutes"#)]
fn task_booked_with_operator(
    world: &mut SchedulingWorld,
    title: String,
    operator: String,
    time: String,
    minutes: u32,
) -> Result<(), eyre::Report> {
    let request = ScheduleTaskRequest::new(title)
        .with_operators([world.operator(&operator)?])
        .with_slots([SlotSpec::new(scenario_instant(&time)?, minutes)]);
    let created = run_async(world.writer.create_task(request))
        .wrap_err("book task with operator in scenario setup")?;
    world.record(Ok(created));
    Ok(())
}
