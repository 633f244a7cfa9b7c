//! Route pool.

use super::Route;
use crate::error::MasterError;
use std::collections::{BTreeMap, BTreeSet};

/// The growing pool of candidate routes.
///
/// Routes are keyed by id and iterated in ascending id order, which is also
/// the order in which the master problem creates variables. The pool only
/// grows: there is no removal.
///
/// # Examples
///
/// ```
/// use u_colgen::entities::{Route, RouteStore};
///
/// let mut store = RouteStore::new();
/// store.add(Route::new(0, 10.0, vec![1, 2]).unwrap()).unwrap();
/// store.add(Route::new(1, 12.0, vec![1, 2, 3]).unwrap()).unwrap();
///
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.in_routes(1).collect::<Vec<_>>(), vec![0, 1]);
/// assert_eq!(store.in_routes(3).collect::<Vec<_>>(), vec![1]);
/// assert_eq!(store.next_id(), 2);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteStore {
    routes: BTreeMap<usize, Route>,
    /// customer number -> ids of routes visiting it
    covering: BTreeMap<usize, BTreeSet<usize>>,
}

impl RouteStore {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route. Fails if the id is already taken.
    pub fn add(&mut self, route: Route) -> Result<(), MasterError> {
        if self.routes.contains_key(&route.id()) {
            return Err(MasterError::DuplicateRoute(route.id()));
        }
        for &customer in route.stops() {
            self.covering.entry(customer).or_default().insert(route.id());
        }
        self.routes.insert(route.id(), route);
        Ok(())
    }

    /// Registers several routes, stopping at the first failure.
    pub fn extend(&mut self, routes: impl IntoIterator<Item = Route>) -> Result<(), MasterError> {
        routes.into_iter().try_for_each(|route| self.add(route))
    }

    /// Looks up a route by id.
    pub fn get(&self, id: usize) -> Option<&Route> {
        self.routes.get(&id)
    }

    /// Iterates routes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// Ids of the routes visiting a customer, ascending.
    pub fn in_routes(&self, cust_no: usize) -> impl Iterator<Item = usize> + '_ {
        self.covering.get(&cust_no).into_iter().flatten().copied()
    }

    /// Smallest id greater than every registered id.
    pub fn next_id(&self) -> usize {
        self.routes.keys().next_back().map_or(0, |&id| id + 1)
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the pool holds no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
