use docrepo::errors::RepoResult;
use docrepo::repository::Repository;

use crate::repository::{generate_customer, Customer, Tier};
use docrepo_int_test::test_util::{cleanup, create_test_context};

#[tokio::test]
async fn test_upsert_inserts_unknown_identity() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let customer = generate_customer();
    // nothing existed to modify
    assert!(!repo.upsert(&customer).await?);
    assert_eq!(repo.count().await?, 1);
    assert_eq!(repo.find(&customer.customer_id).await?, Some(customer));

    cleanup(ctx)
}

#[tokio::test]
async fn test_upsert_replaces_without_duplication() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let mut customer = generate_customer();
    customer.tier = Tier::Standard;
    repo.insert(customer.clone()).await?;

    customer.tier = Tier::Gold;
    customer.email = None;
    assert!(repo.upsert(&customer).await?);

    assert_eq!(repo.count().await?, 1);
    let stored = repo.find(&customer.customer_id).await?;
    assert_eq!(stored, Some(customer));

    cleanup(ctx)
}

#[tokio::test]
async fn test_upsert_identical_entity_reports_no_change() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let customer = generate_customer();
    repo.insert(customer.clone()).await?;

    assert!(!repo.upsert(&customer).await?);
    assert_eq!(repo.count().await?, 1);

    cleanup(ctx)
}

#[tokio::test]
async fn test_update_unknown_identity_is_false() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    repo.insert(generate_customer()).await?;
    let stranger = generate_customer();

    assert!(!repo.update(&stranger).await?);
    assert_eq!(repo.count().await?, 1);
    assert_eq!(repo.find(&stranger.customer_id).await?, None);

    cleanup(ctx)
}

#[tokio::test]
async fn test_update_replaces_whole_entity() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let original = generate_customer();
    repo.insert(original.clone()).await?;

    let replacement = Customer {
        customer_id: original.customer_id.clone(),
        ..generate_customer()
    };
    assert!(repo.update(&replacement).await?);
    assert_eq!(repo.find(&original.customer_id).await?, Some(replacement));

    cleanup(ctx)
}

#[tokio::test]
async fn test_update_many_reports_modifications() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let first = generate_customer();
    let second = generate_customer();
    repo.insert_many(vec![first.clone(), second.clone()]).await?;

    // unchanged entities and unknown identities modify nothing
    assert!(!repo.update_many(vec![first.clone(), generate_customer()]).await?);
    assert_eq!(repo.count().await?, 2);

    let mut changed = second.clone();
    changed.credit += 1;
    assert!(repo.update_many(vec![first, changed.clone()]).await?);
    assert_eq!(repo.find(&second.customer_id).await?, Some(changed));

    assert!(!repo.update_many(Vec::new()).await?);

    cleanup(ctx)
}
