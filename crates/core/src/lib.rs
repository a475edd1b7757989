pub mod mathexpr;
pub mod models;
pub mod router;
pub mod smalltalk;

pub use mathexpr::{extract, has_symbolic_residue, parse_equation, Equation, MathPath};
pub use models::*;
pub use router::{normalize, route, MatchPolicy, RouteDecision, RouteRule, RULES};
pub use smalltalk::{fallback_reply, help_text};
