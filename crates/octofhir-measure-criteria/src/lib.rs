//! Population criteria for measure groups
//!
//! A measure group assigns CQL expressions to the nine measure population
//! codes. `initial-population` and `measure-observation` may hold several
//! entries, every other code holds at most one. Entries can point at another
//! entry of the same group (a numerator drawing from one of several initial
//! populations, an observation naming the population it aggregates).
//!
//! Scoring codes constrain which populations a group must and must not
//! define; see [`validate_constraints`].

pub mod codes;
pub mod constraints;
pub mod criteria;
pub mod group;

pub use codes::{CompositeScoring, ImprovementNotation, PopulationCode, ScoringCode};
pub use constraints::{ensure_constraints, validate_constraints};
pub use criteria::{
    build_simple_criteria, find_entry_by_expression, CriteriaInput, GroupCriteria,
    PopulationCriteria, PopulationEntry, UniqueId,
};
pub use group::{GroupInfo, BOOLEAN_BASIS};
