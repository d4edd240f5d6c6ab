//! Column ranks and deletion against `PostgreSQL`.

use super::helpers::{BoxError, PreparedBoard, prepared_board, report};
use eyre::WrapErr;
use rstest::rstest;
use trellis::task::{
    domain::{SortKey, TaskDomainError, TaskStatus},
    ordering::StatusRank,
    ports::BoardRepositoryError,
    services::{CreateStatusRequest, MoveTaskRequest, TaskBoardError},
};

fn rejection<T>(result: &Result<T, TaskBoardError>) -> Option<&TaskDomainError> {
    match result {
        Err(TaskBoardError::Repository(BoardRepositoryError::Rejected(err))) => Some(err),
        _ => None,
    }
}

async fn ranks(ctx: &PreparedBoard) -> eyre::Result<Vec<(String, u32)>> {
    let statuses = ctx
        .board
        .list_statuses(ctx.project_id)
        .await
        .wrap_err("list statuses")?;
    Ok(statuses
        .iter()
        .map(|status| (status.name().to_owned(), status.sort().value()))
        .collect())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_applying_the_same_order_twice_is_idempotent(
    #[future] prepared_board: Result<PreparedBoard, BoxError>,
) -> eyre::Result<()> {
    let ctx = prepared_board.await.map_err(report)?;
    let todo = ctx.column("To Do").await?;
    let doing = ctx.column("Doing").await?;
    let done = ctx.column("Done").await?;
    let order = [
        StatusRank::new(doing.id(), SortKey::new(0)),
        StatusRank::new(done.id(), SortKey::new(1)),
        StatusRank::new(todo.id(), SortKey::new(2)),
    ];

    let first = ctx
        .board
        .reorder_statuses(ctx.project_id, &order)
        .await
        .wrap_err("first reorder")?;
    let second = ctx
        .board
        .reorder_statuses(ctx.project_id, &order)
        .await
        .wrap_err("second reorder")?;

    eyre::ensure!(first == second, "reordering twice must not change anything");
    eyre::ensure!(
        first.iter().map(TaskStatus::id).eq([doing.id(), done.id(), todo.id()]),
        "statuses follow the requested ranks"
    );
    eyre::ensure!(
        ranks(&ctx).await? == vec![
            ("Doing".to_owned(), 0),
            ("Done".to_owned(), 1),
            ("To Do".to_owned(), 2),
        ],
        "stored ranks match the request"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_oversized_rank_is_rejected_without_writes(
    #[future] prepared_board: Result<PreparedBoard, BoxError>,
) -> eyre::Result<()> {
    let ctx = prepared_board.await.map_err(report)?;
    let todo = ctx.column("To Do").await?;
    let doing = ctx.column("Doing").await?;

    let result = ctx
        .board
        .reorder_statuses(
            ctx.project_id,
            &[
                StatusRank::new(todo.id(), SortKey::new(1)),
                StatusRank::new(doing.id(), SortKey::new(3_000_000_000)),
            ],
        )
        .await;

    eyre::ensure!(
        matches!(rejection(&result), Some(TaskDomainError::SortKeyOverflow(_))),
        "expected SortKeyOverflow, got {result:?}"
    );
    eyre::ensure!(
        ranks(&ctx).await? == vec![("To Do".to_owned(), 0), ("Doing".to_owned(), 1)],
        "ranks must be unchanged"
    );
    let done = ctx.column("Done").await?;
    eyre::ensure!(done.sort() == SortKey::new(2), "new columns still append");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_occupied_column_is_deletable_once_emptied(
    #[future] prepared_board: Result<PreparedBoard, BoxError>,
) -> eyre::Result<()> {
    let ctx = prepared_board.await.map_err(report)?;
    let todo = ctx.column("To Do").await?;
    let done = ctx.column_in(ctx.project_id, "Done", true).await?;
    let tasks = ctx.fill(&done, &["Shipped", "Released"]).await?;

    let rejected = ctx.board.delete_status(done.id()).await;
    eyre::ensure!(
        matches!(
            rejection(&rejected),
            Some(TaskDomainError::StatusNotEmpty { task_count: 2, .. })
        ),
        "expected StatusNotEmpty, got {rejected:?}"
    );

    for task in &tasks {
        ctx.board
            .move_task(MoveTaskRequest::new(task.id(), todo.id(), 0))
            .await
            .wrap_err("move task out of Done")?;
    }
    ctx.board
        .delete_status(done.id())
        .await
        .wrap_err("delete the emptied column")?;

    eyre::ensure!(
        ranks(&ctx).await? == vec![("To Do".to_owned(), 0)],
        "only To Do remains"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_repeated_column_name_maps_to_a_slug_conflict(
    #[future] prepared_board: Result<PreparedBoard, BoxError>,
) -> eyre::Result<()> {
    let ctx = prepared_board.await.map_err(report)?;
    ctx.column("In Review").await?;

    let result = ctx
        .board
        .create_status(CreateStatusRequest::new(ctx.project_id, "in review"))
        .await;

    eyre::ensure!(
        matches!(
            rejection(&result),
            Some(TaskDomainError::DuplicateStatusSlug { .. })
        ),
        "expected DuplicateStatusSlug, got {result:?}"
    );
    Ok(())
}
