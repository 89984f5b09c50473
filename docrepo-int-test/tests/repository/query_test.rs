use docrepo::errors::{ErrorKind, RepoResult};
use docrepo::filter::{and, document_predicate, field, not, or, predicate};
use docrepo::repository::Repository;

use crate::repository::{customer_with_credit, generate_customers, Customer, Tier};
use docrepo_int_test::test_util::{cleanup, create_test_context};

async fn seeded_repository(db: &docrepo::store::memory::InMemoryDatabase) -> RepoResult<Repository<Customer>> {
    let repo: Repository<Customer> = Repository::new(db)?;
    let customers: Vec<Customer> = (0..20).map(|credit| customer_with_credit(credit * 100)).collect();
    repo.insert_many(customers).await?;
    Ok(repo)
}

#[tokio::test]
async fn test_count_and_count_where() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo = seeded_repository(&ctx.db()).await?;

    assert_eq!(repo.count().await?, 20);
    assert_eq!(repo.count_where(Customer::CREDIT.gte(1_000)).await?, 10);
    assert_eq!(repo.count_where(Customer::CREDIT.gt(5_000)).await?, 0);

    cleanup(ctx)
}

#[tokio::test]
async fn test_get_with_filter() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo = seeded_repository(&ctx.db()).await?;

    let low = repo.get(Customer::CREDIT.lt(300)).await?;
    let credits: Vec<i64> = low.iter().map(|c| c.credit).collect();
    assert_eq!(credits, vec![0, 100, 200]);

    let picked = repo.get(Customer::CREDIT.in_values(vec![500, 700, 12_345])).await?;
    assert_eq!(picked.len(), 2);

    cleanup(ctx)
}

#[tokio::test]
async fn test_composite_filters() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo = seeded_repository(&ctx.db()).await?;

    let band = and(vec![Customer::CREDIT.gte(500), Customer::CREDIT.lte(900)]);
    assert_eq!(repo.count_where(band.clone()).await?, 5);
    assert_eq!(repo.count_where(not(band)).await?, 15);

    let edges = or(vec![Customer::CREDIT.eq(0), Customer::CREDIT.eq(1_900)]);
    assert_eq!(repo.count_where(edges).await?, 2);

    let chained = Customer::CREDIT.gt(100).and(Customer::CREDIT.lt(400));
    assert_eq!(repo.count_where(chained).await?, 2);

    cleanup(ctx)
}

#[tokio::test]
async fn test_typed_and_raw_predicates() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo = seeded_repository(&ctx.db()).await?;

    let even_hundreds = predicate(|c: &Customer| (c.credit / 100) % 2 == 0);
    assert_eq!(repo.count_where(even_hundreds).await?, 10);

    let raw = document_predicate(|d| d.get("credit").as_i64().is_some_and(|credit| credit >= 1_500));
    assert_eq!(repo.count_where(raw).await?, 5);

    cleanup(ctx)
}

#[tokio::test]
async fn test_get_all_sorted_by_several_keys() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let mut customers = generate_customers(3);
    customers[0].tier = Tier::Silver;
    customers[0].credit = 10;
    customers[1].tier = Tier::Gold;
    customers[1].credit = 10;
    customers[2].tier = Tier::Standard;
    customers[2].credit = 50;
    repo.insert_many(customers).await?;

    let sorted = repo
        .get_all_sorted(&[Customer::CREDIT.descending(), Customer::TIER.ascending()])
        .await?;
    let keys: Vec<(i64, Tier)> = sorted.iter().map(|c| (c.credit, c.tier)).collect();
    // tiers are stored as their names, so "Gold" sorts before "Silver"
    assert_eq!(keys, vec![(50, Tier::Standard), (10, Tier::Gold), (10, Tier::Silver)]);

    cleanup(ctx)
}

#[tokio::test]
async fn test_get_sorted_with_filter() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo = seeded_repository(&ctx.db()).await?;

    let sorted = repo
        .get_sorted(Customer::CREDIT.lt(400), &[Customer::CREDIT.descending()])
        .await?;
    let credits: Vec<i64> = sorted.iter().map(|c| c.credit).collect();
    assert_eq!(credits, vec![300, 200, 100, 0]);

    cleanup(ctx)
}

#[tokio::test]
async fn test_get_paged_reports_exact_count() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo = seeded_repository(&ctx.db()).await?;

    let page = repo
        .get_paged(Customer::CREDIT.gte(1_000), 2, 3, &[Customer::CREDIT.ascending()])
        .await?;
    assert_eq!(page.count, 10);
    let credits: Vec<i64> = page.items.iter().map(|c| c.credit).collect();
    assert_eq!(credits, vec![1_200, 1_300, 1_400]);

    // count is independent of skip and take
    let tail = repo
        .get_paged(Customer::CREDIT.gte(1_000), 9, 50, &[Customer::CREDIT.ascending()])
        .await?;
    assert_eq!(tail.count, 10);
    assert_eq!(tail.items.len(), 1);

    let beyond = repo.get_paged(Customer::CREDIT.gte(1_000), 40, 5, &[]).await?;
    assert_eq!(beyond.count, 10);
    assert!(beyond.items.is_empty());

    cleanup(ctx)
}

#[tokio::test]
async fn test_get_all_paged_reports_collection_size() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo = seeded_repository(&ctx.db()).await?;

    let page = repo.get_all_paged(5, 4, &[Customer::CREDIT.descending()]).await?;
    assert_eq!(page.count, 20);
    let credits: Vec<i64> = page.items.iter().map(|c| c.credit).collect();
    assert_eq!(credits, vec![1_400, 1_300, 1_200, 1_100]);

    // the count may exceed what a page past the end can hold
    let past_end = repo.get_all_paged(18, 10, &[]).await?;
    assert_eq!(past_end.count, 20);
    assert_eq!(past_end.items.len(), 2);

    cleanup(ctx)
}

#[tokio::test]
async fn test_take_zero_returns_everything_after_skip() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo = seeded_repository(&ctx.db()).await?;

    let page = repo.get_all_paged(0, 0, &[]).await?;
    assert_eq!(page.items.len(), 20);
    assert_eq!(page.count, 20);

    let page = repo
        .get_paged(Customer::CREDIT.gte(1000), 5, 0, &[Customer::CREDIT.ascending()])
        .await?;
    let credits: Vec<i64> = page.items.iter().map(|c| c.credit).collect();
    assert_eq!(credits, vec![1500, 1600, 1700, 1800, 1900]);
    assert_eq!(page.count, 10);

    cleanup(ctx)
}

#[tokio::test]
async fn test_filter_on_enum_field() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let mut customers = generate_customers(5);
    for (i, customer) in customers.iter_mut().enumerate() {
        customer.tier = if i < 2 { Tier::Gold } else { Tier::Standard };
    }
    repo.insert_many(customers).await?;

    assert_eq!(repo.count_where(Customer::TIER.eq(Tier::Gold)).await?, 2);
    assert_eq!(repo.count_where(Customer::TIER.ne(Tier::Gold)).await?, 3);
    assert_eq!(
        repo.count_where(Customer::TIER.in_values(vec![Tier::Gold, Tier::Silver])).await?,
        2
    );

    cleanup(ctx)
}

#[tokio::test]
async fn test_comparison_with_null_is_filter_error() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo = seeded_repository(&ctx.db()).await?;

    let err = repo.get(field("credit").gt(None::<i64>)).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::FilterError);

    cleanup(ctx)
}
