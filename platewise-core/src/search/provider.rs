//! Place-search trait and query type.

use geo::Coord;
use serde::Serialize;

use crate::{Cuisine, Restaurant};

use super::error::PlaceSearchError;

/// Parameters of one nearby search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    /// Cuisine keyword.
    pub cuisine: Cuisine,
    /// Search centre; `x = longitude`, `y = latitude`.
    pub origin: Coord<f64>,
    /// Search radius in metres.
    pub radius_m: u32,
}

/// Fetch restaurant candidates near a location.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use platewise_core::{PlaceId, PlaceSearch, PlaceSearchError, Restaurant, SearchQuery};
///
/// struct SingleResult;
///
/// impl PlaceSearch for SingleResult {
///     fn search(&self, query: &SearchQuery) -> Result<Vec<Restaurant>, PlaceSearchError> {
///         let id = PlaceId::new("abc").map_err(|e| PlaceSearchError::Parse {
///             url: String::new(),
///             message: e.to_string(),
///         })?;
///         Ok(vec![Restaurant::new(id, query.cuisine.to_string(), query.origin)])
///     }
/// }
///
/// let query = SearchQuery {
///     cuisine: "pizza".parse().expect("cuisine"),
///     origin: Coord { x: 13.4, y: 52.5 },
///     radius_m: 1_000,
/// };
/// let found = SingleResult.search(&query)?;
/// assert_eq!(found[0].name, "pizza");
/// # Ok::<(), PlaceSearchError>(())
/// ```
pub trait PlaceSearch {
    /// Return every candidate matching `query`, in the order the service
    /// returned them.
    ///
    /// An empty vector is a valid answer. Partial results are never returned:
    /// a failure on any page or detail lookup yields an error.
    fn search(&self, query: &SearchQuery) -> Result<Vec<Restaurant>, PlaceSearchError>;
}

impl<T: PlaceSearch + ?Sized> PlaceSearch for &T {
    fn search(&self, query: &SearchQuery) -> Result<Vec<Restaurant>, PlaceSearchError> {
        (**self).search(query)
    }
}

impl<T: PlaceSearch + ?Sized> PlaceSearch for Box<T> {
    fn search(&self, query: &SearchQuery) -> Result<Vec<Restaurant>, PlaceSearchError> {
        (**self).search(query)
    }
}
