//! Column lifecycle scenarios against the in-memory store.

use super::helpers::{BoardHarness, harness};
use eyre::WrapErr;
use rstest::rstest;
use trellis::task::{
    domain::{SortKey, TaskDomainError, TaskStatus},
    ordering::StatusRank,
    ports::BoardRepositoryError,
    services::{MoveTaskRequest, TaskBoardError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn occupied_column_is_deletable_once_emptied(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let done = harness.completed_column("Done").await?;
    let tasks = harness.fill(&done, &["Shipped", "Released"]).await?;

    let rejected = harness.board.delete_status(done.id()).await;
    eyre::ensure!(
        matches!(
            rejected,
            Err(TaskBoardError::Repository(BoardRepositoryError::Rejected(
                TaskDomainError::StatusNotEmpty { task_count: 2, .. }
            )))
        ),
        "expected StatusNotEmpty, got {rejected:?}"
    );

    for task in &tasks {
        harness
            .board
            .move_task(MoveTaskRequest::new(task.id(), todo.id(), 0))
            .await
            .wrap_err("move task out of Done")?;
    }
    harness
        .board
        .delete_status(done.id())
        .await
        .wrap_err("delete the emptied column")?;

    let remaining = harness
        .board
        .list_statuses(harness.project_id)
        .await
        .wrap_err("list statuses")?;
    eyre::ensure!(
        remaining.iter().map(TaskStatus::id).eq([todo.id()]),
        "only To Do remains"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_column_survives_deletion_attempts(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let review = harness.column("Review").await?;

    let rejected = harness.board.delete_status(todo.id()).await;
    eyre::ensure!(
        matches!(
            rejected,
            Err(TaskBoardError::Repository(BoardRepositoryError::Rejected(
                TaskDomainError::DefaultStatusNotDeletable(_)
            )))
        ),
        "expected DefaultStatusNotDeletable, got {rejected:?}"
    );

    harness
        .board
        .set_default_status(review.id())
        .await
        .wrap_err("move the default")?;
    harness
        .board
        .delete_status(todo.id())
        .await
        .wrap_err("delete the former default")?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn applying_the_same_order_twice_is_idempotent(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let doing = harness.column("Doing").await?;
    let done = harness.completed_column("Done").await?;
    let ranks = [
        StatusRank::new(doing.id(), SortKey::new(0)),
        StatusRank::new(done.id(), SortKey::new(1)),
        StatusRank::new(todo.id(), SortKey::new(2)),
    ];

    let first = harness
        .board
        .reorder_statuses(harness.project_id, &ranks)
        .await
        .wrap_err("first reorder")?;
    let second = harness
        .board
        .reorder_statuses(harness.project_id, &ranks)
        .await
        .wrap_err("second reorder")?;
    let layout = harness
        .board
        .board(harness.project_id)
        .await
        .wrap_err("load board")?;

    eyre::ensure!(first == second, "reordering twice must not change anything");
    eyre::ensure!(
        layout.column_order() == vec![doing.id(), done.id(), todo.id()],
        "board follows the requested ranks"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn omitted_columns_keep_their_rank(harness: BoardHarness) -> eyre::Result<()> {
    let todo = harness.column("To Do").await?;
    let doing = harness.column("Doing").await?;
    let done = harness.column("Done").await?;

    let statuses = harness
        .board
        .reorder_statuses(
            harness.project_id,
            &[StatusRank::new(done.id(), SortKey::new(5))],
        )
        .await
        .wrap_err("partial reorder")?;

    let ranked: Vec<_> = statuses
        .iter()
        .map(|status| (status.id(), status.sort().value()))
        .collect();
    eyre::ensure!(
        ranked == vec![(todo.id(), 0), (doing.id(), 1), (done.id(), 5)],
        "unexpected ranks {ranked:?}"
    );
    Ok(())
}
