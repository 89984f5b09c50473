use docrepo::errors::RepoResult;
use docrepo::store::memory::{InMemoryDatabase, InMemoryStoreConfig};
use docrepo::store::DocumentDatabase;
use std::backtrace::Backtrace;
use std::time::Instant;

/// Runs a blocking test between `before` and `after`, reporting errors and panics
/// with the elapsed time. `after` runs even when the test fails.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> RepoResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> RepoResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> RepoResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();
    let result = std::panic::catch_unwind(|| {
        let ctx = before().map_err(|e| format!("Before run failed: {:?}", e))?;
        match test(ctx.clone()) {
            Ok(()) => after(ctx).map_err(|e| format!("After run failed: {:?}", e)),
            Err(e) => {
                let _ = after(ctx);
                Err(format!("Test failed: {:?}", e))
            }
        }
    });

    let elapsed = start_time.elapsed();
    let failure = match result {
        Ok(Ok(())) => return,
        Ok(Err(message)) => message,
        Err(panic_err) => {
            if let Some(s) = panic_err.downcast_ref::<&str>() {
                format!("Panic: {}", s)
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                format!("Panic: {}", s)
            } else {
                "Panic: unknown payload".to_string()
            }
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", elapsed);
    eprintln!("{}", failure);
    let backtrace = Backtrace::capture().to_string();
    if !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");
    panic!("{}", failure);
}

/// A fresh in-memory database shared by the repositories of one test.
#[derive(Clone)]
pub struct TestContext {
    db: InMemoryDatabase,
}

impl TestContext {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }

    pub fn db(&self) -> InMemoryDatabase {
        self.db.clone()
    }
}

pub fn create_test_context() -> RepoResult<TestContext> {
    Ok(TestContext::new(InMemoryDatabase::new()))
}

/// Context whose store rejects documents without an identity instead of generating one.
pub fn create_strict_test_context() -> RepoResult<TestContext> {
    let config = InMemoryStoreConfig::new();
    config.set_generate_ids(false);
    Ok(TestContext::new(InMemoryDatabase::with_config(config)))
}

pub fn cleanup(ctx: TestContext) -> RepoResult<()> {
    let db = ctx.db();
    if db.is_open() {
        for name in db.collection_names() {
            db.drop_collection(&name)?;
        }
        db.close()?;
    }
    Ok(())
}
