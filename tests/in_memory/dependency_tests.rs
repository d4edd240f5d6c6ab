//! Dependency scenarios against the in-memory store.

use super::helpers::{BoardHarness, harness};
use eyre::WrapErr;
use rstest::rstest;
use trellis::task::{
    domain::{DependencyType, TaskDomainError, TaskId},
    ports::BoardRepositoryError,
    services::{AddDependencyRequest, DependencyServiceError},
};

fn is_circular(result: &Result<impl std::fmt::Debug, DependencyServiceError>) -> bool {
    matches!(
        result,
        Err(DependencyServiceError::Repository(BoardRepositoryError::Rejected(
            TaskDomainError::CircularDependency { .. }
        )))
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reverse_edge_is_circular(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let tasks = harness.fill(&todo, &["A", "B"]).await?;
    let [a, b] = tasks.as_slice() else {
        eyre::bail!("expected two tasks");
    };
    harness
        .dependencies
        .add_dependency(
            AddDependencyRequest::new(a.id(), b.id()).with_type(DependencyType::FinishToStart),
        )
        .await
        .wrap_err("A depends on B")?;

    let result = harness
        .dependencies
        .add_dependency(AddDependencyRequest::new(b.id(), a.id()))
        .await;

    eyre::ensure!(is_circular(&result), "expected a circular dependency, got {result:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_the_prerequisite_unblocks(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let tasks = harness.fill(&todo, &["X", "Y"]).await?;
    let [x, y] = tasks.as_slice() else {
        eyre::bail!("expected two tasks");
    };
    let added = harness
        .dependencies
        .add_dependency(AddDependencyRequest::new(x.id(), y.id()))
        .await
        .wrap_err("X depends on Y")?;
    eyre::ensure!(added.is_blocked, "X is blocked by an open Y");

    harness
        .board
        .complete_task(y.id())
        .await
        .wrap_err("complete Y")?;

    let blocked = harness
        .dependencies
        .is_blocked(x.id())
        .await
        .wrap_err("evaluate X")?;
    eyre::ensure!(!blocked, "X is unblocked once Y completes");
    Ok(())
}

/// Tries every ordered pair over a small board and checks that no accepted
/// edge ever lets a task reach itself.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accepted_edges_never_form_a_cycle(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let tasks = harness.fill(&todo, &["t0", "t1", "t2", "t3", "t4"]).await?;
    let ids: Vec<TaskId> = tasks.iter().map(|task| task.id()).collect();
    let mut accepted = 0_usize;
    let mut circular = 0_usize;

    for from in &ids {
        for to in ids.iter().rev() {
            if from == to {
                continue;
            }
            let result = harness
                .dependencies
                .add_dependency(AddDependencyRequest::new(*from, *to))
                .await;
            match &result {
                Ok(_) => accepted += 1,
                Err(_) if is_circular(&result) => circular += 1,
                Err(DependencyServiceError::Repository(BoardRepositoryError::Rejected(
                    TaskDomainError::DuplicateDependency { .. },
                ))) => {}
                Err(err) => eyre::bail!("unexpected rejection: {err}"),
            }
        }
    }

    eyre::ensure!(accepted > 0, "some edges must be accepted");
    eyre::ensure!(circular > 0, "some edges must close a cycle");
    for id in &ids {
        let chain = harness
            .dependencies
            .chain(*id)
            .await
            .wrap_err("walk chain")?;
        eyre::ensure!(
            chain.iter().all(|edge| edge.depends_on_task_id() != *id),
            "task {id} reaches itself"
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_drops_its_edges(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let tasks = harness.fill(&todo, &["A", "B", "C"]).await?;
    let [a, b, c] = tasks.as_slice() else {
        eyre::bail!("expected three tasks");
    };
    for (task, prerequisite) in [(b, a), (c, b)] {
        harness
            .dependencies
            .add_dependency(AddDependencyRequest::new(task.id(), prerequisite.id()))
            .await
            .wrap_err("add chain edge")?;
    }

    harness.board.delete_task(b.id()).await.wrap_err("delete B")?;

    let overview = harness
        .dependencies
        .overview(a.id())
        .await
        .wrap_err("overview of A")?;
    eyre::ensure!(overview.dependent_tasks.is_empty(), "B no longer depends on A");
    let chain = harness.dependencies.chain(c.id()).await.wrap_err("chain of C")?;
    eyre::ensure!(chain.is_empty(), "C lost its only edge");
    harness
        .dependencies
        .add_dependency(AddDependencyRequest::new(a.id(), c.id()))
        .await
        .wrap_err("A may now depend on C")?;
    Ok(())
}
