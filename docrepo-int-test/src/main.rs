use docrepo::errors::RepoResult;
use docrepo::filter::{all, field};
use docrepo::repository::BlockingRepository;
use docrepo_derive::{Convertible, DocumentEntity};
use docrepo_int_test::test_util::{cleanup, create_test_context};

#[derive(Debug, Convertible, DocumentEntity)]
pub struct StressRecord {
    #[entity(id)]
    pub record_id: String,
    pub first_name: String,
    pub last_name: String,
    pub processed: bool,
    pub failed: bool,
}

fn main() -> RepoResult<()> {
    colog::init();
    println!("Starting bulk load...");
    let ctx = create_test_context()?;

    let count = 250_000;
    let repo: BlockingRepository<StressRecord> = BlockingRepository::open(&ctx.db())?;

    let records = (0..count).map(|i| StressRecord {
        record_id: uuid::Uuid::new_v4().to_string(),
        first_name: uuid::Uuid::new_v4().to_string(),
        last_name: uuid::Uuid::new_v4().to_string(),
        processed: false,
        failed: i % 10 == 0,
    });

    let start = std::time::Instant::now();
    repo.insert_many(records)?;
    println!("Inserted {} records in {:?}", repo.count()?, start.elapsed());

    let start = std::time::Instant::now();
    let page = repo.get_paged(field("failed").eq(false), 0, 100, &[StressRecord::LAST_NAME.ascending()])?;
    println!(
        "Read a page of {} out of {} healthy records in {:?}",
        page.items.len(),
        page.count,
        start.elapsed()
    );

    let start = std::time::Instant::now();
    repo.update_field_where(field("failed").eq(false), StressRecord::PROCESSED, true)?;
    println!("Updated healthy records in {:?}", start.elapsed());

    let start = std::time::Instant::now();
    let processed = repo.count_where(field("processed").eq(true))?;
    println!("Counted {} processed records in {:?}", processed, start.elapsed());

    let start = std::time::Instant::now();
    repo.delete_where(all())?;
    println!("Deleted all records in {:?}", start.elapsed());

    cleanup(ctx)
}
