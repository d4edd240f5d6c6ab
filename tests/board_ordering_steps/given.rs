//! Given steps for board ordering BDD scenarios.

use super::world::{BoardOrderingWorld, run_async, titles};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use trellis::task::services::{CreateStatusRequest, CreateTaskRequest};

fn create_column(
    world: &mut BoardOrderingWorld,
    name: String,
    task_titles: &str,
    completed: bool,
) -> Result<(), eyre::Report> {
    let base = CreateStatusRequest::new(world.project_id, name.clone());
    let request = if completed { base.completed() } else { base };
    let status = run_async(world.service.create_status(request))
        .wrap_err_with(|| format!("create column {name}"))?;

    for title in titles(task_titles) {
        let task_request =
            CreateTaskRequest::new(world.project_id, title.clone()).in_status(status.id());
        let task = run_async(world.service.create_task(task_request))
            .wrap_err_with(|| format!("create task {title}"))?;
        world.tasks.insert(title, task);
    }
    world.columns.insert(name, status);
    Ok(())
}

#[given(r#"a column "{name}" holding "{task_titles}""#)]
fn column_holding(
    world: &mut BoardOrderingWorld,
    name: String,
    task_titles: String,
) -> Result<(), eyre::Report> {
    create_column(world, name, &task_titles, false)
}

#[given(r#"a completed column "{name}" holding "{task_titles}""#)]
fn completed_column_holding(
    world: &mut BoardOrderingWorld,
    name: String,
    task_titles: String,
) -> Result<(), eyre::Report> {
    create_column(world, name, &task_titles, true)
}
