use sqlx::PgConnection;

/// A handle to an active database connection. Driven adapters borrow the
/// underlying connection out of the handle for the duration of a query.
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Abstraction over the clients used to reach external systems, so domain
/// logic can ask for a database connection without knowing whether it comes
/// from a pool or a test double.
pub trait ExternalConnectivity: Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}
