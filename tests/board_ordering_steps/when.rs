//! When steps for board ordering BDD scenarios.

use super::world::{BoardOrderingWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use trellis::task::services::MoveTaskRequest;

#[when(r#"task "{title}" is moved to "{column}" at index {index}"#)]
fn move_task(
    world: &mut BoardOrderingWorld,
    title: String,
    column: String,
    index: usize,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    let status_id = world.column(&column)?.id();

    let outcome = run_async(
        world
            .service
            .move_task(MoveTaskRequest::new(task_id, status_id, index)),
    )
    .wrap_err_with(|| format!("move {title} to {column}"))?;
    world.tasks.insert(title, outcome.task);
    Ok(())
}

#[when(r#"column "{name}" is deleted"#)]
fn delete_column(world: &mut BoardOrderingWorld, name: String) -> Result<(), eyre::Report> {
    let status_id = world.column(&name)?.id();
    let result = run_async(world.service.delete_status(status_id));
    world.last_deletion = Some(result);
    Ok(())
}
