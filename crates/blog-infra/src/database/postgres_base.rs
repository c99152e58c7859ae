use std::marker::PhantomData;

use sea_orm::{DbConn, DbErr, EntityTrait};

use blog_core::error::RepoError;

/// PostgreSQL repository over one SeaORM entity.
///
/// The store traits are implemented per entity in `postgres_repo`; this type
/// only carries the connection and the error mapping they share.
pub struct PostgresRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

/// Map a read failure.
pub(crate) fn query_err(e: DbErr) -> RepoError {
    match e {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => RepoError::Connection(e.to_string()),
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        other => RepoError::Query(other.to_string()),
    }
}

/// Map a write failure, recognising unique-key violations.
pub(crate) fn write_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        query_err(e)
    }
}
