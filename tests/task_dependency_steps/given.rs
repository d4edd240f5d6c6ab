//! Given steps for task dependency BDD scenarios.

use super::world::{DependencyWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use trellis::task::services::{AddDependencyRequest, CreateStatusRequest, CreateTaskRequest};

#[given(r#"a board with tasks "{titles}""#)]
fn board_with_tasks(world: &mut DependencyWorld, titles: String) -> Result<(), eyre::Report> {
    run_async(
        world
            .board
            .create_status(CreateStatusRequest::new(world.project_id, "To Do")),
    )
    .wrap_err("create default column")?;

    for title in titles.split(',').map(str::trim) {
        let task = run_async(
            world
                .board
                .create_task(CreateTaskRequest::new(world.project_id, title)),
        )
        .wrap_err_with(|| format!("create task {title}"))?;
        world.tasks.insert(title.to_owned(), task);
    }
    Ok(())
}

#[given(r#"task "{dependent}" depends on task "{prerequisite}""#)]
fn task_depends_on(
    world: &mut DependencyWorld,
    dependent: String,
    prerequisite: String,
) -> Result<(), eyre::Report> {
    let request =
        AddDependencyRequest::new(world.task(&dependent)?.id(), world.task(&prerequisite)?.id());
    run_async(world.dependencies.add_dependency(request))
        .wrap_err_with(|| format!("{dependent} depends on {prerequisite}"))?;
    Ok(())
}
