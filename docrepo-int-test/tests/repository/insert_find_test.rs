use docrepo::errors::RepoResult;
use docrepo::filter::field;
use docrepo::repository::Repository;

use crate::repository::{generate_customer, generate_customers, generate_order, Customer, Order, Ticket};
use docrepo_int_test::test_util::{cleanup, create_test_context};

#[tokio::test]
async fn test_insert_then_find_by_identity() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let customer = generate_customer();
    let returned = repo.insert(customer.clone()).await?;
    assert_eq!(returned, customer);

    let found = repo.find(&customer.customer_id).await?;
    assert_eq!(found, Some(customer));

    cleanup(ctx)
}

#[tokio::test]
async fn test_find_unknown_identity() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;
    repo.insert(generate_customer()).await?;

    assert_eq!(repo.find(&"missing".to_string()).await?, None);

    cleanup(ctx)
}

#[tokio::test]
async fn test_insert_many_then_get_all() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let customers = generate_customers(25);
    assert!(repo.insert_many(customers.clone()).await?);

    let stored = repo.get_all().await?;
    assert_eq!(stored.len(), 25);
    for customer in &customers {
        assert!(stored.contains(customer));
    }

    cleanup(ctx)
}

#[tokio::test]
async fn test_insert_many_empty_is_false() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    assert!(!repo.insert_many(Vec::new()).await?);
    assert_eq!(repo.count().await?, 0);

    cleanup(ctx)
}

#[tokio::test]
async fn test_any_and_first_or_default() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    assert!(!repo.any().await?);
    assert_eq!(repo.first_or_default().await?, None);

    let customer = generate_customer();
    repo.insert(customer.clone()).await?;

    assert!(repo.any().await?);
    assert_eq!(repo.first_or_default().await?, Some(customer.clone()));
    assert!(repo.any_where(Customer::CUSTOMER_ID.eq(customer.customer_id.clone())).await?);
    assert!(!repo.any_where(Customer::CUSTOMER_ID.eq("nobody")).await?);

    cleanup(ctx)
}

#[tokio::test]
async fn test_first_where_returns_first_in_insertion_order() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let mut first = generate_customer();
    first.city = Some("Lisbon".to_string());
    let mut second = generate_customer();
    second.city = Some("Lisbon".to_string());
    repo.insert_many(vec![first.clone(), second]).await?;

    let found = repo.first_where(Customer::CITY.eq(Some("Lisbon".to_string()))).await?;
    assert_eq!(found, Some(first));
    assert_eq!(repo.first_where(field("city").eq("Oslo")).await?, None);

    cleanup(ctx)
}

#[tokio::test]
async fn test_renamed_field_is_stored_under_new_name() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let mut customer = generate_customer();
    customer.join_year = 2011;
    repo.insert(customer.clone()).await?;

    assert_eq!(repo.count_where(field("joined").eq(2011)).await?, 1);
    assert_eq!(repo.count_where(field("join_year").eq(2011)).await?, 0);
    assert_eq!(repo.get(Customer::JOIN_YEAR.eq(2011)).await?, vec![customer]);

    cleanup(ctx)
}

#[tokio::test]
async fn test_ignored_field_is_not_stored() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Order> = Repository::new(&ctx.db())?;

    let mut order = generate_order(1, "c-1");
    order.cached_total = 99.5;
    repo.insert(order.clone()).await?;

    let stored = repo.find(&1).await?.expect("order should be stored");
    assert_eq!(stored.cached_total, 0.0);
    assert_eq!(stored.amount, order.amount);
    assert_eq!(repo.count_where(field("cached_total").eq(99.5)).await?, 0);

    cleanup(ctx)
}

#[tokio::test]
async fn test_generated_identity_is_not_written_back() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Ticket> = Repository::new(&ctx.db())?;

    let ticket = Ticket {
        ticket_id: None,
        subject: "printer on fire".to_string(),
    };
    let returned = repo.insert(ticket).await?;
    assert_eq!(returned.ticket_id, None);

    let stored = repo.get_all().await?;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ticket_id.is_some());
    assert_eq!(stored[0].subject, "printer on fire");

    cleanup(ctx)
}

#[tokio::test]
async fn test_entity_name_selects_collection() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let customers: Repository<Customer> = Repository::new(&ctx.db())?;
    let orders: Repository<Order> = Repository::new(&ctx.db())?;
    let archive = Repository::<Customer>::builder()
        .collection_name("customers_archive")
        .open(&ctx.db())?;

    assert_eq!(customers.collection_name(), "customers");
    assert_eq!(orders.collection_name(), "orders");
    assert_eq!(archive.collection_name(), "customers_archive");

    customers.insert(generate_customer()).await?;
    assert_eq!(customers.count().await?, 1);
    assert_eq!(archive.count().await?, 0);

    let mut names = ctx.db().collection_names();
    names.sort();
    assert_eq!(names, vec!["customers", "customers_archive", "orders"]);

    cleanup(ctx)
}
