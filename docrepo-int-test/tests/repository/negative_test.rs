use docrepo::common::{Convertible, Document, Value};
use docrepo::config::RepositoryConfig;
use docrepo::doc;
use docrepo::errors::{ErrorKind, RepoResult};
use docrepo::repository::{Entity, Repository};
use docrepo::store::{DocumentCollection, DocumentDatabase};

use crate::repository::{generate_customer, generate_order, Customer, Order, Ticket};
use docrepo_int_test::test_util::{cleanup, create_strict_test_context, create_test_context};

/// Hand-written entity that declares no identity field.
#[derive(Debug, Clone)]
struct Unkeyed {
    label: String,
}

impl Convertible for Unkeyed {
    type Output = Unkeyed;

    fn to_value(&self) -> RepoResult<Value> {
        let mut document = Document::new();
        document.put("label", self.label.clone())?;
        Ok(Value::Document(document))
    }

    fn from_value(value: &Value) -> RepoResult<Unkeyed> {
        Ok(Unkeyed {
            label: String::from_value(&value.as_document().map(|d| d.get("label")).unwrap_or(Value::Null))?,
        })
    }
}

impl Entity for Unkeyed {
    type Id = String;

    fn entity_name() -> &'static str {
        "unkeyed"
    }

    fn id_field() -> &'static str {
        ""
    }

    fn id(&self) -> &String {
        &self.label
    }
}

#[tokio::test]
async fn test_entity_without_identity_field_is_mapping_error() -> RepoResult<()> {
    let ctx = create_test_context()?;

    let err = Repository::<Unkeyed>::new(&ctx.db()).err().expect("repository must not open");
    assert_eq!(err.kind(), &ErrorKind::MappingError);

    cleanup(ctx)
}

#[tokio::test]
async fn test_closed_database_is_argument_error() -> RepoResult<()> {
    let ctx = create_test_context()?;
    ctx.db().close()?;

    let err = Repository::<Customer>::new(&ctx.db()).err().expect("repository must not open");
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

    cleanup(ctx)
}

#[tokio::test]
async fn test_store_errors_are_not_downgraded() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;
    let customer = generate_customer();
    repo.insert(customer.clone()).await?;

    ctx.db().close()?;

    let err = repo.delete_by_id(&customer.customer_id).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::StoreClosed);
    assert!(err.is_store_error());

    let err = repo.any().await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::StoreClosed);

    let err = repo.upsert(&customer).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::StoreClosed);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_insert_is_store_error() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let customer = generate_customer();
    repo.insert(customer.clone()).await?;

    let err = repo.insert(customer).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::DuplicateKey);
    assert_eq!(repo.count().await?, 1);

    cleanup(ctx)
}

#[tokio::test]
async fn test_missing_identity_value() -> RepoResult<()> {
    let ctx = create_strict_test_context()?;
    let repo: Repository<Ticket> = Repository::new(&ctx.db())?;

    let err = repo.find(&None).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

    let ticket = Ticket {
        ticket_id: None,
        subject: "no id".to_string(),
    };
    // the strict store refuses to generate one
    let err = repo.insert(ticket).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::BackendError);
    assert!(!repo.any().await?);

    cleanup(ctx)
}

#[tokio::test]
async fn test_collection_keyed_by_other_field() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let _customers: Repository<Customer> = Repository::new(&ctx.db())?;

    let result = Repository::<Order>::builder()
        .collection_name("customers")
        .open(&ctx.db());
    let err = result.err().expect("collection is keyed by customer_id");
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

    let orders: Repository<Order> = Repository::new(&ctx.db())?;
    orders.insert(generate_order(7, "c-7")).await?;
    assert_eq!(orders.count().await?, 1);

    cleanup(ctx)
}

#[tokio::test]
async fn test_unmappable_document_is_mapping_error() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repo: Repository<Customer> = Repository::new(&ctx.db())?;

    let raw = ctx.db().collection("customers", "customer_id")?;
    raw.insert_one(doc! { "customer_id" => "broken", "name" => 42 }).await?;

    let err = repo.get_all().await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    assert!(!err.is_store_error());

    // counting does not map documents
    assert_eq!(repo.count().await?, 1);

    cleanup(ctx)
}

#[test]
fn test_collection_name_is_set_once() {
    let config = RepositoryConfig::new();
    assert_eq!(config.collection_name(), None);

    let err = config.set_collection_name("").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

    config.set_collection_name("vip_customers").unwrap();
    let err = config.set_collection_name("other").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    assert_eq!(config.collection_name(), Some("vip_customers".to_string()));
}

#[tokio::test]
async fn test_config_overrides_entity_name() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let config = RepositoryConfig::new();
    config.set_collection_name("vip_customers")?;

    let repo = Repository::<Customer>::with_config(&ctx.db(), config)?;
    assert_eq!(repo.collection_name(), "vip_customers");
    assert_eq!(Customer::entity_name(), "customers");
    assert_eq!(Customer::id_field(), "customer_id");
    assert_eq!(Order::id_field(), "order_no");

    cleanup(ctx)
}
