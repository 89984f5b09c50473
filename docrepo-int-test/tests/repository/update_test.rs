use docrepo::common::FieldAssignment;
use docrepo::errors::{ErrorKind, RepoResult};
use docrepo::filter::{all, field};
use docrepo::repository::{Repository, UpdateBuilder};

use crate::repository::{customer_with_credit, generate_customers, Customer, Tier};
use docrepo_int_test::test_util::{cleanup, create_test_context};

#[tokio::test]
async fn test_update_field_on_every_entity() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;
    repo.insert_many(generate_customers(12)).await?;

    assert!(repo.update_field(Customer::CITY, Some("Reykjavik".to_string())).await?);

    let cities: Vec<Option<String>> = repo.get_all().await?.into_iter().map(|c| c.city).collect();
    assert_eq!(cities.len(), 12);
    assert!(cities.iter().all(|city| city.as_deref() == Some("Reykjavik")));

    cleanup(ctx)
}

#[tokio::test]
async fn test_update_field_where_touches_matches_only() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let poor = customer_with_credit(10);
    let mut rich = customer_with_credit(9_000);
    rich.tier = Tier::Standard;
    repo.insert_many(vec![poor.clone(), rich.clone()]).await?;

    assert!(
        repo.update_field_where(Customer::CREDIT.gt(5_000), Customer::TIER, Tier::Gold)
            .await?
    );
    assert_eq!(repo.find(&rich.customer_id).await?.map(|c| c.tier), Some(Tier::Gold));
    assert_eq!(repo.find(&poor.customer_id).await?, Some(poor));

    // nothing matches
    assert!(
        !repo.update_field_where(Customer::CREDIT.lt(0), Customer::TIER, Tier::Gold)
            .await?
    );

    cleanup(ctx)
}

#[tokio::test]
async fn test_update_fields_sets_several_fields() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let customer = customer_with_credit(100);
    repo.insert(customer.clone()).await?;

    let update = UpdateBuilder::new()
        .set(Customer::CREDIT, 250)
        .set(Customer::JOIN_YEAR, 1999)
        .set(Customer::EMAIL, None::<String>);
    assert!(
        repo.update_fields_where(Customer::CUSTOMER_ID.eq(customer.customer_id.clone()), update.assignments())
            .await?
    );

    let stored = repo.find(&customer.customer_id).await?.expect("customer should exist");
    assert_eq!(stored.credit, 250);
    assert_eq!(stored.join_year, 1999);
    assert_eq!(stored.email, None);
    assert_eq!(stored.name, customer.name);

    // the renamed field is written under its stored name
    assert_eq!(repo.count_where(field("joined").eq(1999)).await?, 1);

    cleanup(ctx)
}

#[tokio::test]
async fn test_later_assignment_wins() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;
    repo.insert_many(generate_customers(3)).await?;

    let assignments = vec![Customer::CREDIT.set(1), Customer::CREDIT.set(2)];
    assert!(repo.update_fields(assignments).await?);

    assert_eq!(repo.count_where(Customer::CREDIT.eq(2)).await?, 3);
    assert_eq!(repo.count_where(Customer::CREDIT.eq(1)).await?, 0);

    cleanup(ctx)
}

#[tokio::test]
async fn test_empty_assignment_list_is_rejected() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;
    let customers = generate_customers(4);
    repo.insert_many(customers.clone()).await?;

    let err = repo.update_fields(Vec::new()).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

    let err = repo.update_fields_where(all(), Vec::new()).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

    // nothing was touched
    let stored = repo.get_all().await?;
    for customer in &customers {
        assert!(stored.contains(customer));
    }

    cleanup(ctx)
}

#[tokio::test]
async fn test_untyped_assignment() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;
    repo.insert_many(generate_customers(2)).await?;

    let assignment: FieldAssignment<Customer> = FieldAssignment::new("tier", "Silver");
    assert!(repo.update_fields(vec![assignment]).await?);

    let tiers: Vec<Tier> = repo.get_all().await?.into_iter().map(|c| c.tier).collect();
    assert_eq!(tiers, vec![Tier::Silver, Tier::Silver]);

    cleanup(ctx)
}

#[tokio::test]
async fn test_update_changing_identity_fails() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;
    repo.insert_many(generate_customers(1)).await?;

    let err = repo
        .update_field(Customer::CUSTOMER_ID, "hijacked")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ImmutableField);
    assert!(err.is_store_error());
    assert_eq!(repo.find(&"hijacked".to_string()).await?, None);

    cleanup(ctx)
}
