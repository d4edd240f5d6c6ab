//! Dependency edges against `PostgreSQL`, where the acyclicity check and the
//! insert share a transaction.

use super::helpers::{BoxError, PreparedBoard, prepared_board, report};
use eyre::WrapErr;
use rstest::rstest;
use trellis::task::{
    domain::{DependencyType, ProjectId, TaskDependency, TaskDomainError},
    ports::{BoardRepositoryError, DependencyRepository},
    services::{AddDependencyRequest, DependencyServiceError},
};

fn rejection<T>(result: &Result<T, DependencyServiceError>) -> Option<&TaskDomainError> {
    match result {
        Err(DependencyServiceError::Repository(BoardRepositoryError::Rejected(err))) => Some(err),
        _ => None,
    }
}

async fn edges(ctx: &PreparedBoard) -> eyre::Result<Vec<(String, String)>> {
    let mut pairs: Vec<(String, String)> = ctx
        .store
        .list_by_project(ctx.project_id)
        .await
        .wrap_err("list edges")?
        .iter()
        .map(|edge: &TaskDependency| {
            (
                edge.task_id().to_string(),
                edge.depends_on_task_id().to_string(),
            )
        })
        .collect();
    pairs.sort();
    Ok(pairs)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_dependency_is_stored_and_blocks(
    #[future] prepared_board: Result<PreparedBoard, BoxError>,
) -> eyre::Result<()> {
    let ctx = prepared_board.await.map_err(report)?;
    let todo = ctx.column("To Do").await?;
    let tasks = ctx.fill(&todo, &["X", "Y"]).await?;
    let [x, y] = tasks.as_slice() else {
        eyre::bail!("expected two tasks");
    };

    let added = ctx
        .dependencies
        .add_dependency(
            AddDependencyRequest::new(x.id(), y.id()).with_type(DependencyType::FinishToStart),
        )
        .await
        .wrap_err("X depends on Y")?;
    eyre::ensure!(added.is_blocked, "X is blocked by an open Y");
    eyre::ensure!(
        edges(&ctx).await? == vec![(x.id().to_string(), y.id().to_string())],
        "the edge should be persisted"
    );

    ctx.board.complete_task(y.id()).await.wrap_err("complete Y")?;
    let blocked = ctx
        .dependencies
        .is_blocked(x.id())
        .await
        .wrap_err("evaluate X")?;
    eyre::ensure!(!blocked, "X is unblocked once Y completes");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_cycle_is_rejected_and_edges_are_unchanged(
    #[future] prepared_board: Result<PreparedBoard, BoxError>,
) -> eyre::Result<()> {
    let ctx = prepared_board.await.map_err(report)?;
    let todo = ctx.column("To Do").await?;
    let tasks = ctx.fill(&todo, &["A", "B", "C"]).await?;
    let [a, b, c] = tasks.as_slice() else {
        eyre::bail!("expected three tasks");
    };
    for (task, prerequisite) in [(a, b), (b, c)] {
        ctx.dependencies
            .add_dependency(AddDependencyRequest::new(task.id(), prerequisite.id()))
            .await
            .wrap_err("build the chain A -> B -> C")?;
    }
    let before = edges(&ctx).await?;

    let result = ctx
        .dependencies
        .add_dependency(AddDependencyRequest::new(c.id(), a.id()))
        .await;

    eyre::ensure!(
        matches!(
            rejection(&result),
            Some(TaskDomainError::CircularDependency { .. })
        ),
        "expected a circular dependency, got {result:?}"
    );
    eyre::ensure!(edges(&ctx).await? == before, "edges must be unchanged");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_repeated_edge_is_a_duplicate(
    #[future] prepared_board: Result<PreparedBoard, BoxError>,
) -> eyre::Result<()> {
    let ctx = prepared_board.await.map_err(report)?;
    let todo = ctx.column("To Do").await?;
    let tasks = ctx.fill(&todo, &["A", "B"]).await?;
    let [a, b] = tasks.as_slice() else {
        eyre::bail!("expected two tasks");
    };
    ctx.dependencies
        .add_dependency(AddDependencyRequest::new(a.id(), b.id()))
        .await
        .wrap_err("A depends on B")?;

    let result = ctx
        .dependencies
        .add_dependency(AddDependencyRequest::new(a.id(), b.id()))
        .await;

    eyre::ensure!(
        matches!(
            rejection(&result),
            Some(TaskDomainError::DuplicateDependency { .. })
        ),
        "expected a duplicate dependency, got {result:?}"
    );
    eyre::ensure!(edges(&ctx).await?.len() == 1, "only one edge is stored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_edges_across_projects_are_rejected(
    #[future] prepared_board: Result<PreparedBoard, BoxError>,
) -> eyre::Result<()> {
    let ctx = prepared_board.await.map_err(report)?;
    let todo = ctx.column("To Do").await?;
    let elsewhere = ctx.column_in(ProjectId::new(), "Elsewhere", false).await?;
    let local = ctx.fill(&todo, &["Local"]).await?;
    let foreign = ctx.fill(&elsewhere, &["Foreign"]).await?;
    let (Some(task), Some(prerequisite)) = (local.first(), foreign.first()) else {
        eyre::bail!("expected one task per project");
    };

    let result = ctx
        .dependencies
        .add_dependency(AddDependencyRequest::new(task.id(), prerequisite.id()))
        .await;

    eyre::ensure!(
        matches!(
            rejection(&result),
            Some(TaskDomainError::CrossProjectDependency { .. })
        ),
        "expected a cross-project rejection, got {result:?}"
    );
    eyre::ensure!(edges(&ctx).await?.is_empty(), "no edge is stored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_deleting_a_task_drops_its_edges_from_the_graph(
    #[future] prepared_board: Result<PreparedBoard, BoxError>,
) -> eyre::Result<()> {
    let ctx = prepared_board.await.map_err(report)?;
    let todo = ctx.column("To Do").await?;
    let tasks = ctx.fill(&todo, &["A", "B"]).await?;
    let [a, b] = tasks.as_slice() else {
        eyre::bail!("expected two tasks");
    };
    ctx.dependencies
        .add_dependency(AddDependencyRequest::new(a.id(), b.id()))
        .await
        .wrap_err("A depends on B")?;

    ctx.board.delete_task(b.id()).await.wrap_err("delete B")?;

    eyre::ensure!(edges(&ctx).await?.is_empty(), "edges of deleted tasks are ignored");
    let blocked = ctx
        .dependencies
        .is_blocked(a.id())
        .await
        .wrap_err("evaluate A")?;
    eyre::ensure!(!blocked, "a deleted prerequisite no longer blocks");
    Ok(())
}
