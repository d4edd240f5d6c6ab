//! Handler status codes and error bodies.

use super::helpers::{BoardHarness, harness};
use eyre::WrapErr;
use rstest::rstest;
use trellis::{
    api::{AddDependencyBody, ReorderStatusesBody, UpdateTaskStatusBody},
    task::{
        domain::{DependencyId, SortKey, TaskId},
        ordering::StatusRank,
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependency_round_trip_through_the_handlers(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let tasks = harness.fill(&todo, &["A", "B"]).await?;
    let [a, b] = tasks.as_slice() else {
        eyre::bail!("expected two tasks");
    };

    let created = harness
        .api
        .add_dependency(
            b.id(),
            AddDependencyBody {
                depends_on_task_id: a.id(),
                dependency_type: None,
            },
        )
        .await
        .wrap_err("add dependency")?;
    eyre::ensure!(created.status == 201, "creation answers 201");
    eyre::ensure!(created.body.is_blocked, "B is blocked by A");

    let overview = harness
        .api
        .dependencies(b.id())
        .await
        .wrap_err("load dependencies")?;
    eyre::ensure!(
        overview.body.blocking_tasks.iter().any(|task| task.id() == a.id()),
        "A is listed as blocking"
    );

    let removed = harness
        .api
        .remove_dependency(b.id(), created.body.dependency.id())
        .await
        .wrap_err("remove dependency")?;
    eyre::ensure!(removed.status == 200, "removal answers 200");
    eyre::ensure!(!removed.body.is_blocked, "B is free again");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn circular_dependency_is_a_field_error(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let tasks = harness.fill(&todo, &["A", "B"]).await?;
    let [a, b] = tasks.as_slice() else {
        eyre::bail!("expected two tasks");
    };
    harness
        .api
        .add_dependency(
            a.id(),
            AddDependencyBody {
                depends_on_task_id: b.id(),
                dependency_type: None,
            },
        )
        .await
        .wrap_err("A depends on B")?;

    let Err(err) = harness
        .api
        .add_dependency(
            b.id(),
            AddDependencyBody {
                depends_on_task_id: a.id(),
                dependency_type: None,
            },
        )
        .await
    else {
        eyre::bail!("the reverse edge must be rejected");
    };

    eyre::ensure!(err.status() == 422, "expected 422, got {}", err.status());
    eyre::ensure!(err.code() == "CIRCULAR_DEPENDENCY", "unexpected code {}", err.code());
    eyre::ensure!(
        err.body().field.as_deref() == Some("depends_on_task_id"),
        "error is attached to depends_on_task_id"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_resources_are_not_found(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let tasks = harness.fill(&todo, &["A"]).await?;
    let a = tasks.first().ok_or_else(|| eyre::eyre!("missing task"))?;

    let missing_task = harness.api.dependencies(TaskId::new()).await;
    let missing_edge = harness
        .api
        .remove_dependency(a.id(), DependencyId::new())
        .await;

    eyre::ensure!(
        missing_task.as_ref().err().map(trellis::api::ApiError::status) == Some(404),
        "unknown task answers 404"
    );
    eyre::ensure!(
        missing_edge.as_ref().err().map(trellis::api::ApiError::status) == Some(404),
        "unknown dependency answers 404"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_patch_moves_the_task(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let done = harness.completed_column("Done").await?;
    let tasks = harness.fill(&todo, &["A"]).await?;
    let a = tasks.first().ok_or_else(|| eyre::eyre!("missing task"))?;

    let response = harness
        .api
        .update_task_status(
            a.id(),
            UpdateTaskStatusBody {
                task_status_id: done.id(),
                sort: 4,
            },
        )
        .await
        .wrap_err("patch status")?;

    eyre::ensure!(response.body.task.status_id() == done.id(), "task is in Done");
    eyre::ensure!(response.body.task.sort() == SortKey::new(0), "index is clamped");
    eyre::ensure!(response.body.task.is_completed(), "Done completes the task");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_handlers_map_protections_to_422(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let done = harness.completed_column("Done").await?;
    harness.fill(&done, &["Shipped"]).await?;

    let occupied = harness.api.delete_status(done.id()).await;
    let foreign = harness
        .api
        .reorder_statuses(
            harness.project_id,
            ReorderStatusesBody {
                statuses: vec![StatusRank::new(
                    BoardHarness::new().column("Elsewhere").await?.id(),
                    SortKey::new(0),
                )],
            },
        )
        .await;
    let accepted = harness
        .api
        .reorder_statuses(
            harness.project_id,
            ReorderStatusesBody {
                statuses: vec![
                    StatusRank::new(done.id(), SortKey::new(0)),
                    StatusRank::new(todo.id(), SortKey::new(1)),
                ],
            },
        )
        .await
        .wrap_err("reorder")?;

    eyre::ensure!(
        occupied.as_ref().err().map(trellis::api::ApiError::code) == Some("STATUS_NOT_EMPTY"),
        "occupied column is protected"
    );
    eyre::ensure!(
        foreign.as_ref().err().map(trellis::api::ApiError::code) == Some("INVALID_STATUS"),
        "foreign column is rejected"
    );
    eyre::ensure!(accepted.body.success, "reorder is acknowledged");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn oversized_column_rank_is_rejected_without_writes(
    harness: BoardHarness,
) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;

    let Err(err) = harness
        .api
        .reorder_statuses(
            harness.project_id,
            ReorderStatusesBody {
                statuses: vec![StatusRank::new(todo.id(), SortKey::new(3_000_000_000))],
            },
        )
        .await
    else {
        eyre::bail!("an out-of-range rank must be rejected");
    };

    eyre::ensure!(err.status() == 422, "expected 422, got {}", err.status());
    eyre::ensure!(err.code() == "SORT_KEY_OVERFLOW", "unexpected code {}", err.code());
    let doing = harness.column("Doing").await?;
    eyre::ensure!(doing.sort() == SortKey::new(1), "column ranks stay dense");
    Ok(())
}
