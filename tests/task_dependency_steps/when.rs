//! When steps for task dependency BDD scenarios.

use super::world::{DependencyWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use trellis::task::services::AddDependencyRequest;

#[when(r#"task "{dependent}" is made to depend on task "{prerequisite}""#)]
fn make_dependent(
    world: &mut DependencyWorld,
    dependent: String,
    prerequisite: String,
) -> Result<(), eyre::Report> {
    let request =
        AddDependencyRequest::new(world.task(&dependent)?.id(), world.task(&prerequisite)?.id());
    let result = run_async(world.dependencies.add_dependency(request));
    world.last_add_result = Some(result);
    Ok(())
}

#[when(r#"task "{title}" is completed"#)]
fn complete_task(world: &mut DependencyWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    let completed = run_async(world.board.complete_task(task_id))
        .wrap_err_with(|| format!("complete {title}"))?;
    world.tasks.insert(title, completed);
    Ok(())
}

#[when(r#"task "{title}" is deleted"#)]
fn delete_task(world: &mut DependencyWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    run_async(world.board.delete_task(task_id)).wrap_err_with(|| format!("delete {title}"))?;
    Ok(())
}
