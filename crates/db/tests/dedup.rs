//! Integration tests for the single-flight dedup lock.

use std::time::Duration;

use groundwork_db::repositories::{DedupAcquire, DedupRepo};
use sqlx::PgPool;

const SIG: &str = "2f7a6d1c";

#[sqlx::test]
async fn second_acquire_is_held_with_positive_cooldown(pool: PgPool) {
    let first = DedupRepo::acquire(&pool, SIG, Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(first, DedupAcquire::Acquired);

    match DedupRepo::acquire(&pool, SIG, Duration::from_secs(60))
        .await
        .unwrap()
    {
        DedupAcquire::Held { remaining } => {
            assert!(remaining > Duration::ZERO);
            assert!(remaining <= Duration::from_secs(60));
        }
        DedupAcquire::Acquired => panic!("duplicate submission must be rejected"),
    }
}

#[sqlx::test]
async fn different_signatures_do_not_collide(pool: PgPool) {
    assert_eq!(
        DedupRepo::acquire(&pool, "sig-a", Duration::from_secs(60))
            .await
            .unwrap(),
        DedupAcquire::Acquired
    );
    assert_eq!(
        DedupRepo::acquire(&pool, "sig-b", Duration::from_secs(60))
            .await
            .unwrap(),
        DedupAcquire::Acquired
    );
}

#[sqlx::test]
async fn release_frees_the_signature(pool: PgPool) {
    DedupRepo::acquire(&pool, SIG, Duration::from_secs(60))
        .await
        .unwrap();
    DedupRepo::release(&pool, SIG).await.unwrap();

    assert_eq!(
        DedupRepo::acquire(&pool, SIG, Duration::from_secs(60))
            .await
            .unwrap(),
        DedupAcquire::Acquired
    );
}

#[sqlx::test]
async fn release_is_a_noop_for_unknown_signatures(pool: PgPool) {
    DedupRepo::release(&pool, "never-acquired").await.unwrap();
}

#[sqlx::test]
async fn expired_lock_is_taken_over(pool: PgPool) {
    DedupRepo::acquire(&pool, SIG, Duration::from_millis(50))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(
        DedupRepo::acquire(&pool, SIG, Duration::from_secs(60))
            .await
            .unwrap(),
        DedupAcquire::Acquired
    );
}
