//! Problem configuration fixtures.
//!
//! # Example
//!
//! ```
//! use treeopt_test::problems::mixed_problem;
//!
//! let problem = mixed_problem();
//! assert_eq!(problem.features().len(), 2);
//! assert_eq!(problem.objectives().len(), 1);
//! ```

use treeopt_core::ProblemConfig;

/// `x` real in `[0, 10]`, `c` categorical over `a, b, c`; objective `cost`.
pub fn mixed_problem() -> ProblemConfig {
    let mut problem = ProblemConfig::new();
    problem.add_real("x", 0.0, 10.0).expect("valid feature");
    problem
        .add_categorical("c", ["a", "b", "c"])
        .expect("valid feature");
    problem.add_objective("cost").expect("valid objective");
    problem
}

/// [`mixed_problem`] with a second objective `risk`.
pub fn two_objective_problem() -> ProblemConfig {
    let mut problem = mixed_problem();
    problem.add_objective("risk").expect("valid objective");
    problem
}
