use crate::app_env;
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, PgPool};
use std::{env, future::Future};
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

/// Provisions a throwaway database for a test, applies the migrations, and
/// runs the test against a pool connected to it.
///
/// Expects the TEST_DB_URL environment variable to be populated with a base
/// postgres connection string (no database name in the path).
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let base_url = env::var(app_env::test::TEST_DB_URL).expect(
            "You must provide the TEST_DB_URL environment variable as the base postgres connection string",
        );

        let db_name = {
            let mut rng = thread_rng();
            format!("test_db_{}", rng.gen_range(10_000..99_999))
        };

        let mut admin_cxn = PgConnection::connect(&base_url)
            .await
            .expect("could not create initial connection to provision the test database");
        sqlx::query(format!("CREATE DATABASE {db_name}").as_str())
            .execute(&mut admin_cxn)
            .await
            .expect("failed to create the test database");

        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(format!("{base_url}/{db_name}").as_str())
            .await
            .expect("failed to connect to the test database");
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("failed to migrate the test database");

        test_fn(pool).await;
    });
}
