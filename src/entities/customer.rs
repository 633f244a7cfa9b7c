//! Customer type.

/// A customer (or depot) in the set-covering master problem.
///
/// Each non-depot customer owns one coverage constraint in the model. The
/// constraint name is recorded here when the constraint is created, and the
/// constraint's dual price is copied into [`dual`](Customer::dual) after
/// every relaxed solve or stabilization pass.
///
/// # Examples
///
/// ```
/// use u_colgen::entities::Customer;
///
/// let depot = Customer::depot(0);
/// assert!(depot.is_depot());
///
/// let c = Customer::new(1);
/// assert_eq!(c.cust_no(), 1);
/// assert_eq!(c.dual(), 0.0);
/// assert!(c.constraint_name().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Customer {
    cust_no: usize,
    is_depot: bool,
    dual: f64,
    constraint_name: Option<String>,
}

impl Customer {
    /// Creates a customer that must be covered.
    pub fn new(cust_no: usize) -> Self {
        Self {
            cust_no,
            is_depot: false,
            dual: 0.0,
            constraint_name: None,
        }
    }

    /// Creates a depot. Depots impose no coverage requirement.
    pub fn depot(cust_no: usize) -> Self {
        Self {
            is_depot: true,
            ..Self::new(cust_no)
        }
    }

    /// Customer number.
    pub fn cust_no(&self) -> usize {
        self.cust_no
    }

    /// Returns `true` for the depot.
    pub fn is_depot(&self) -> bool {
        self.is_depot
    }

    /// Current dual value of this customer's coverage constraint.
    pub fn dual(&self) -> f64 {
        self.dual
    }

    /// Overwrites the dual value.
    pub fn set_dual(&mut self, dual: f64) {
        self.dual = dual;
    }

    /// Name of the coverage constraint bound to this customer, once built.
    pub fn constraint_name(&self) -> Option<&str> {
        self.constraint_name.as_deref()
    }

    pub(crate) fn bind_constraint(&mut self, name: String) {
        self.constraint_name = Some(name);
    }

    pub(crate) fn unbind_constraint(&mut self) {
        self.constraint_name = None;
    }
}
