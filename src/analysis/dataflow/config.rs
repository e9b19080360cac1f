//! Configuration for the dataflow engine and the passes consuming its results.

/// Number of times the solver walks every loop body (and step) per run.
///
/// This is a bounded approximation, not a fixed-point iteration. A definition needs one
/// traversal to reach the end of the body and a second to cross the back-edge, so loop-carried
/// dependencies that span a single back-edge hop are found. Dependencies that only appear after
/// more traversals may be missed.
pub const LOOP_SOLVE_PASSES: usize = 2;

/// Configuration for the dataflow engine.
///
/// Controls result verification, event recording, parallelism in the
/// [`PassScheduler`](crate::compiler::PassScheduler) and which consumer passes run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Check after building chains that every use/definition link has its inverse (default: true).
    pub verify_chains: bool,

    /// Record stage and pass activity in the event log (default: true).
    pub record_events: bool,

    /// Analyze independent procedures on the rayon thread pool (default: true).
    pub parallel: bool,

    /// Enable loop feedback-variable detection.
    pub enable_feedback_detection: bool,

    /// Enable constant-use discovery.
    pub enable_constant_uses: bool,

    /// Enable dead-definition reporting.
    pub enable_dead_definitions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verify_chains: true,
            record_events: true,
            parallel: true,
            enable_feedback_detection: true,
            enable_constant_uses: true,
            enable_dead_definitions: true,
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that only computes dataflow annotations.
    ///
    /// No consumer pass runs, events are not recorded and chains are not re-verified.
    ///
    /// # Returns
    ///
    /// A new `EngineConfig` suited for tight loops over many small procedures.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            verify_chains: false,
            record_events: false,
            enable_feedback_detection: false,
            enable_constant_uses: false,
            enable_dead_definitions: false,
            ..Self::default()
        }
    }

    /// Sets whether procedures are analyzed in parallel.
    ///
    /// # Arguments
    ///
    /// * `parallel` - `true` to use the rayon thread pool.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets whether events are recorded.
    #[must_use]
    pub fn with_events(mut self, record: bool) -> Self {
        self.record_events = record;
        self
    }

    /// Sets whether chains are verified after they are built.
    #[must_use]
    pub fn with_chain_verification(mut self, verify: bool) -> Self {
        self.verify_chains = verify;
        self
    }

    /// Selects the consumer passes.
    ///
    /// # Arguments
    ///
    /// * `feedback` - Enable loop feedback-variable detection.
    /// * `constants` - Enable constant-use discovery.
    /// * `dead_definitions` - Enable dead-definition reporting.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn with_passes(mut self, feedback: bool, constants: bool, dead_definitions: bool) -> Self {
        self.enable_feedback_detection = feedback;
        self.enable_constant_uses = constants;
        self.enable_dead_definitions = dead_definitions;
        self
    }

    /// Returns `true` if at least one consumer pass is enabled.
    #[must_use]
    pub fn any_pass_enabled(&self) -> bool {
        self.enable_feedback_detection || self.enable_constant_uses || self.enable_dead_definitions
    }
}
