//! Garment storage.
//!
//! A [`Store`] hands out one [`Connection`] per request; the connection runs
//! the request's single query and is then released. Every query is described
//! by a [`Filter`], so backends only need to know how to evaluate one.
//!
//! Two backends ship with the crate:
//!
//! - [`MongoStore`]: the `prendas` collection in MongoDB.
//! - [`MemoryStore`]: a process-local collection, for tests and demos.

mod memory;
mod mongo;

use std::future::Future;

use thiserror::Error;

use crate::garment::Garment;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be established.
    #[error("database unreachable: {0}")]
    Unavailable(String),

    /// A query was sent and failed.
    #[error("query failed: {0}")]
    Query(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Which garments a query targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Exact code.
    Code(i64),
    /// Name contains the text, ignoring case.
    NameContains(String),
    /// Category contains the text, ignoring case.
    CategoryContains(String),
    /// Price greater than or equal to the bound.
    MinPrice(f64),
}

impl Filter {
    /// Evaluates the filter against one garment.
    pub fn matches(&self, garment: &Garment) -> bool {
        match self {
            Filter::All => true,
            Filter::Code(code) => garment.code == *code,
            Filter::NameContains(text) => contains_ignore_case(&garment.name, text),
            Filter::CategoryContains(text) => contains_ignore_case(&garment.category, text),
            Filter::MinPrice(bound) => garment.price >= *bound,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Source of per-request connections.
pub trait Store: Send + Sync + 'static {
    type Conn: Connection;

    /// Opens (or checks out) a connection. Fails with
    /// [`StoreError::Unavailable`] when the database cannot be reached.
    fn acquire(&self) -> impl Future<Output = Result<Self::Conn, StoreError>> + Send;
}

/// One request's view of the collection.
pub trait Connection: Send + Sync + 'static {
    /// All garments matching `filter`, in storage order.
    fn find(&self, filter: &Filter) -> impl Future<Output = Result<Vec<Garment>, StoreError>> + Send;

    /// The first garment matching `filter`.
    fn find_one(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<Option<Garment>, StoreError>> + Send;

    /// Inserts without checking for an existing code.
    fn insert(&self, garment: &Garment) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Sets the price of the first garment with `code`. Returns how many
    /// garments matched (0 or 1).
    fn set_price(
        &self,
        code: i64,
        price: f64,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Deletes the first garment with `code`. Returns how many were deleted.
    fn delete(&self, code: i64) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Gives the connection back. Consuming `self` makes a second release
    /// impossible; dropping without releasing is still safe.
    fn release(self) -> impl Future<Output = ()> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camisa() -> Garment {
        Garment::new(1, "Camisa Azul", "Camisas", 20.0)
    }

    #[test]
    fn name_and_category_match_substrings_ignoring_case() {
        let g = camisa();
        assert!(Filter::NameContains("azul".into()).matches(&g));
        assert!(Filter::NameContains("MISA A".into()).matches(&g));
        assert!(!Filter::NameContains("roja".into()).matches(&g));
        assert!(Filter::CategoryContains("camis".into()).matches(&g));
        assert!(!Filter::CategoryContains("pantalones".into()).matches(&g));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let g = Garment::new(2, "Camiseta (talla M)", "Camisetas", 9.0);
        assert!(Filter::NameContains("(talla".into()).matches(&g));
        assert!(!Filter::NameContains(".*".into()).matches(&g));
    }

    #[test]
    fn min_price_is_inclusive() {
        let g = camisa();
        assert!(Filter::MinPrice(10.0).matches(&g));
        assert!(Filter::MinPrice(20.0).matches(&g));
        assert!(!Filter::MinPrice(25.0).matches(&g));
    }

    #[test]
    fn code_is_exact() {
        assert!(Filter::Code(1).matches(&camisa()));
        assert!(!Filter::Code(11).matches(&camisa()));
        assert!(Filter::All.matches(&camisa()));
    }
}
