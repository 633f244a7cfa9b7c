//! Problem instance: customers and fleet size.

use super::Customer;
use crate::error::MasterError;
use std::collections::BTreeMap;

/// Fleet description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicles {
    /// Upper bound on the number of routes in a solution.
    pub number: usize,
}

/// A routing instance as seen by the master problem.
///
/// Only the customers' dual values and constraint bindings change after
/// construction.
///
/// # Examples
///
/// ```
/// use u_colgen::entities::{Customer, Problem, Vehicles};
///
/// let problem = Problem::new(
///     vec![Customer::depot(0), Customer::new(1), Customer::new(2)],
///     Vehicles { number: 2 },
/// ).unwrap();
/// assert_eq!(problem.total_customers(), 2);
/// assert_eq!(problem.vehicles().number, 2);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Problem {
    customers: BTreeMap<usize, Customer>,
    vehicles: Vehicles,
    total_customers: usize,
}

impl Problem {
    /// Creates a problem. Fails on duplicate customer numbers.
    pub fn new(customers: Vec<Customer>, vehicles: Vehicles) -> Result<Self, MasterError> {
        let mut map = BTreeMap::new();
        for customer in customers {
            let no = customer.cust_no();
            if map.insert(no, customer).is_some() {
                return Err(MasterError::DuplicateCustomer(no));
            }
        }
        let total_customers = map.values().filter(|c| !c.is_depot()).count();
        Ok(Self {
            customers: map,
            vehicles,
            total_customers,
        })
    }

    /// Looks up a customer by number.
    pub fn customer(&self, cust_no: usize) -> Option<&Customer> {
        self.customers.get(&cust_no)
    }

    pub(crate) fn customer_mut(&mut self, cust_no: usize) -> Option<&mut Customer> {
        self.customers.get_mut(&cust_no)
    }

    /// All customers (depots included), ascending by number.
    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values()
    }

    pub(crate) fn customers_mut(&mut self) -> impl Iterator<Item = &mut Customer> {
        self.customers.values_mut()
    }

    /// Fleet description.
    pub fn vehicles(&self) -> Vehicles {
        self.vehicles
    }

    /// Number of non-depot customers.
    pub fn total_customers(&self) -> usize {
        self.total_customers
    }

    /// Current duals of all non-depot customers, keyed by customer number.
    pub fn duals(&self) -> BTreeMap<usize, f64> {
        self.customers
            .values()
            .filter(|c| !c.is_depot())
            .map(|c| (c.cust_no(), c.dual()))
            .collect()
    }
}
