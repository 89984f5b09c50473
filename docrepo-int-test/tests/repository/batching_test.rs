use docrepo::common::BATCH_SIZE;
use docrepo::errors::{ErrorKind, RepoResult};
use docrepo::repository::Repository;

use crate::repository::{generate_customer, generate_customers, Customer};
use docrepo_int_test::test_util::{cleanup, create_test_context};

#[tokio::test]
async fn test_insert_many_across_batch_boundaries() -> RepoResult<()> {
    let ctx = create_test_context()?;

    for (index, size) in [BATCH_SIZE - 1, BATCH_SIZE, BATCH_SIZE + 1, 2 * BATCH_SIZE + 500]
        .into_iter()
        .enumerate()
    {
        let repo = Repository::<Customer>::builder()
            .collection_name(&format!("customers_{}", index))
            .open(&ctx.db())?;

        assert!(repo.insert_many(generate_customers(size)).await?);
        assert_eq!(repo.count().await?, size as u64);
    }

    cleanup(ctx)
}

#[tokio::test]
async fn test_insert_many_accepts_lazy_input() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let lazy = (0..BATCH_SIZE + 10).map(|_| generate_customer());
    assert!(repo.insert_many(lazy).await?);
    assert_eq!(repo.count().await?, (BATCH_SIZE + 10) as u64);

    cleanup(ctx)
}

#[tokio::test]
async fn test_failure_inside_batch_does_not_block_its_siblings() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let existing = generate_customer();
    repo.insert(existing.clone()).await?;

    let mut customers = generate_customers(50);
    customers[10].customer_id = existing.customer_id.clone();
    let last = customers[49].clone();

    let err = repo.insert_many(customers).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::BulkWriteError);
    assert_eq!(err.cause().map(|c| c.kind()), Some(&ErrorKind::DuplicateKey));

    // the other 49 documents of the batch are written
    assert_eq!(repo.count().await?, 50);
    assert_eq!(repo.find(&last.customer_id).await?, Some(last));
    assert_eq!(repo.find(&existing.customer_id).await?, Some(existing));

    cleanup(ctx)
}

#[tokio::test]
async fn test_failed_batch_stops_later_batches() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let existing = generate_customer();
    repo.insert(existing.clone()).await?;

    let mut customers = generate_customers(BATCH_SIZE + 1);
    customers[0].customer_id = existing.customer_id.clone();
    let in_second_batch = customers[BATCH_SIZE].clone();

    let err = repo.insert_many(customers).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::BulkWriteError);
    assert!(err.is_store_error());

    assert_eq!(repo.count().await?, BATCH_SIZE as u64);
    assert_eq!(repo.find(&in_second_batch.customer_id).await?, None);

    cleanup(ctx)
}

#[tokio::test]
async fn test_earlier_batches_stay_written_after_failure() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let existing = generate_customer();
    repo.insert(existing.clone()).await?;

    let mut customers = generate_customers(BATCH_SIZE + 1);
    customers[BATCH_SIZE].customer_id = existing.customer_id.clone();
    let in_first_batch = customers[BATCH_SIZE - 1].clone();

    assert!(repo.insert_many(customers).await.is_err());
    assert_eq!(repo.count().await?, BATCH_SIZE as u64 + 1);
    assert_eq!(repo.find(&in_first_batch.customer_id).await?, Some(in_first_batch));

    cleanup(ctx)
}

#[tokio::test]
async fn test_upsert_many_across_batches() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let stored = generate_customers(1000);
    repo.insert_many(stored.clone()).await?;

    let mut batch: Vec<Customer> = stored
        .into_iter()
        .map(|mut customer| {
            customer.credit = -1;
            customer
        })
        .collect();
    let fresh = BATCH_SIZE + 500 - batch.len();
    batch.extend(generate_customers(fresh));

    assert!(repo.upsert_many(batch).await?);
    assert_eq!(repo.count().await?, (BATCH_SIZE + 500) as u64);
    assert_eq!(repo.count_where(Customer::CREDIT.eq(-1)).await?, 1000);

    cleanup(ctx)
}

#[tokio::test]
async fn test_upsert_many_without_new_entities_is_false() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let stored = generate_customers(30);
    repo.insert_many(stored.clone()).await?;

    let renamed: Vec<Customer> = stored
        .into_iter()
        .map(|mut customer| {
            customer.name = format!("{} Jr.", customer.name);
            customer
        })
        .collect();

    assert!(!repo.upsert_many(renamed.clone()).await?);
    assert_eq!(repo.count().await?, 30);
    assert_eq!(repo.find(&renamed[7].customer_id).await?, Some(renamed[7].clone()));

    cleanup(ctx)
}

#[tokio::test]
async fn test_update_many_is_not_split_into_batches() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let stored = generate_customers(BATCH_SIZE + 1);
    repo.insert_many(stored.clone()).await?;

    let updated: Vec<Customer> = stored
        .into_iter()
        .map(|mut customer| {
            customer.credit = 1_000_000;
            customer
        })
        .collect();

    assert!(repo.update_many(updated).await?);
    assert_eq!(
        repo.count_where(Customer::CREDIT.eq(1_000_000)).await?,
        (BATCH_SIZE + 1) as u64
    );

    cleanup(ctx)
}
