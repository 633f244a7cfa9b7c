//! Candidate route type.

use crate::error::MasterError;

/// A candidate route (column) produced by the pricing subproblem.
///
/// A route is an ordered sequence of customer numbers; the depot is implicit
/// at both ends and is never listed. Cost and stops are fixed at creation.
///
/// # Examples
///
/// ```
/// use u_colgen::entities::Route;
///
/// let route = Route::new(0, 12.0, vec![1, 2, 3]).unwrap();
/// assert_eq!(route.stops(), &[1, 2, 3]);
/// assert!(route.visits(2));
///
/// // A customer may appear only once.
/// assert!(Route::new(1, 5.0, vec![1, 1]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    id: usize,
    cost: f64,
    stops: Vec<usize>,
}

impl Route {
    /// Creates a route.
    ///
    /// Fails if the cost is negative or non-finite, or if a customer is
    /// listed more than once.
    pub fn new(id: usize, cost: f64, stops: Vec<usize>) -> Result<Self, MasterError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(MasterError::InvalidCost { route: id, cost });
        }
        for (i, &customer) in stops.iter().enumerate() {
            if stops[..i].contains(&customer) {
                return Err(MasterError::DuplicateStop { route: id, customer });
            }
        }
        Ok(Self { id, cost, stops })
    }

    /// Route id, stable across iterations.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Route cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Customer numbers in visit order.
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Returns `true` if the route visits the given customer.
    pub fn visits(&self, cust_no: usize) -> bool {
        self.stops.contains(&cust_no)
    }

    /// Number of customers visited.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the route visits nobody.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_new() {
        let r = Route::new(7, 10.0, vec![3, 1]).expect("valid");
        assert_eq!(r.id(), 7);
        assert_eq!(r.cost(), 10.0);
        assert_eq!(r.stops(), &[3, 1]);
        assert_eq!(r.len(), 2);
        assert!(r.visits(1));
        assert!(!r.visits(2));
    }

    #[test]
    fn test_route_empty() {
        let r = Route::new(0, 0.0, vec![]).expect("valid");
        assert!(r.is_empty());
    }

    #[test]
    fn test_route_invalid_cost() {
        assert!(matches!(
            Route::new(1, -1.0, vec![1]),
            Err(MasterError::InvalidCost { route: 1, .. })
        ));
        assert!(Route::new(1, f64::NAN, vec![1]).is_err());
        assert!(Route::new(1, f64::INFINITY, vec![1]).is_err());
    }

    #[test]
    fn test_route_duplicate_stop() {
        assert!(matches!(
            Route::new(2, 1.0, vec![1, 2, 1]),
            Err(MasterError::DuplicateStop { route: 2, customer: 1 })
        ));
    }
}
