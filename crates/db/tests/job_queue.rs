//! Integration tests for the job queue repository.

use std::collections::BTreeMap;
use std::time::Duration;

use groundwork_core::terraform::ExecResult;
use groundwork_core::Action;
use groundwork_db::models::job::NewJob;
use groundwork_db::models::status::JobStatus;
use groundwork_db::repositories::JobRepo;
use sqlx::PgPool;

fn new_job(configuration: &str, signature: &str, delay: Duration) -> NewJob {
    NewJob {
        configuration: configuration.to_string(),
        action: Action::Apply,
        variables: BTreeMap::new(),
        workspace: "default".to_string(),
        dedup_signature: signature.to_string(),
        delay,
    }
}

#[sqlx::test]
async fn submit_then_claim_then_complete(pool: PgPool) {
    let job = JobRepo::submit(&pool, &new_job("net", "sig-1", Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(job.status(), Some(JobStatus::Queued));
    assert_eq!(job.attempts, 0);

    let claimed = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, job.id);
    assert_eq!(claimed.status(), Some(JobStatus::Running));
    assert_eq!(claimed.attempts, 1);
    assert!(claimed.started_at.is_some());

    // The queue is now empty.
    assert!(JobRepo::claim_next(&pool).await.unwrap().is_none());

    let result = ExecResult {
        exit_code: 0,
        stdout: "Apply complete!".to_string(),
        stderr: String::new(),
    };
    JobRepo::complete(&pool, job.id, &result).await.unwrap();

    let done = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status(), Some(JobStatus::Succeeded));
    assert_eq!(done.result().unwrap(), result);
    assert!(done.completed_at.is_some());
}

#[sqlx::test]
async fn nonzero_exit_code_completes_as_failed(pool: PgPool) {
    let job = JobRepo::submit(&pool, &new_job("net", "sig-1", Duration::ZERO))
        .await
        .unwrap();
    JobRepo::claim_next(&pool).await.unwrap().unwrap();

    let result = ExecResult {
        exit_code: 1,
        stdout: String::new(),
        stderr: "Error: invalid resource".to_string(),
    };
    JobRepo::complete(&pool, job.id, &result).await.unwrap();

    let done = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status(), Some(JobStatus::Failed));
    assert_eq!(done.result().unwrap().stderr, "Error: invalid resource");
}

#[sqlx::test]
async fn delayed_jobs_are_not_claimable_until_due(pool: PgPool) {
    JobRepo::submit(&pool, &new_job("net", "sig-1", Duration::from_secs(3600)))
        .await
        .unwrap();

    assert!(JobRepo::claim_next(&pool).await.unwrap().is_none());
}

#[sqlx::test]
async fn retry_requeues_and_counts_attempts(pool: PgPool) {
    let job = JobRepo::submit(&pool, &new_job("net", "sig-1", Duration::ZERO))
        .await
        .unwrap();

    let first = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(first.attempts, 1);

    JobRepo::requeue_retry(&pool, job.id, Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(
        JobRepo::status_of(&pool, job.id).await.unwrap(),
        Some(JobStatus::Retrying)
    );

    let second = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(second.id, job.id);
    assert_eq!(second.attempts, 2);
}

#[sqlx::test]
async fn fail_records_the_error_message(pool: PgPool) {
    let job = JobRepo::submit(&pool, &new_job("net", "sig-1", Duration::ZERO))
        .await
        .unwrap();
    JobRepo::claim_next(&pool).await.unwrap();

    JobRepo::fail(&pool, job.id, "workspace selection failed")
        .await
        .unwrap();

    let failed = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(failed.status(), Some(JobStatus::Failed));
    assert_eq!(
        failed.error_message.as_deref(),
        Some("workspace selection failed")
    );
    // No execution triple was ever captured.
    assert!(failed.result().is_none());
}

#[sqlx::test]
async fn list_ids_filters_by_status(pool: PgPool) {
    let first = JobRepo::submit(&pool, &new_job("net", "sig-1", Duration::ZERO))
        .await
        .unwrap();
    let second = JobRepo::submit(&pool, &new_job("dns", "sig-2", Duration::ZERO))
        .await
        .unwrap();

    // Claims the oldest job, leaving the second one queued.
    let claimed = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, first.id);

    let pending = JobRepo::list_ids_by_status(&pool, &[JobStatus::Queued, JobStatus::Retrying])
        .await
        .unwrap();
    assert_eq!(pending, vec![second.id]);

    let started = JobRepo::list_ids_by_status(&pool, &[JobStatus::Running])
        .await
        .unwrap();
    assert_eq!(started, vec![first.id]);

    let all = JobRepo::list_all_ids(&pool).await.unwrap();
    assert_eq!(all, vec![first.id, second.id]);
}

#[sqlx::test]
async fn status_of_unknown_id_is_none(pool: PgPool) {
    let status = JobRepo::status_of(&pool, uuid::Uuid::new_v4()).await.unwrap();
    assert!(status.is_none());
}
