use std::sync::Arc;

/// Type alias for a callable right-hand side of a differential equation.
///
/// This represents a function that:
/// - Takes the state variable's current value
/// - Takes the current time
/// - Takes a slice of parameter values in a documented order
/// - Returns the derivative (drift) or noise amplitude (diffusion)
/// - Is both Send and Sync for thread safety
pub type RhsFn = Arc<dyn Fn(f64, f64, &[f64]) -> f64 + Send + Sync>;

/// Type alias for a one-step update function returned by the dispatcher.
///
/// This represents a function that:
/// - Takes the pre-step state value, the current time and the parameters
/// - Advances the state by one step of fixed size `dt`
/// - Returns the post-step state value
/// - Retains no state across calls
pub type StepFn = Arc<dyn Fn(f64, f64, &[f64]) -> f64 + Send + Sync>;
