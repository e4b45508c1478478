/// Initial capacity of the parser's state and value stacks.
pub const INITIAL_STACK_DEPTH: usize = 200;
/// Default ceiling past which parsing gives up.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 10_000;
/// Default limit on syntax tree nesting. The analysis passes recurse once
/// per level and must fit on a 2 MiB thread stack.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 512;

/// Switches for one compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Print the syntax tree after parsing
    pub trace_parse: bool,
    /// Print the symbol table after analysis
    pub trace_analyze: bool,
    /// List the expected tokens in syntax error messages
    pub verbose_errors: bool,
    pub max_stack_depth: usize,
    /// Deepest syntax tree the parser will build
    pub max_nesting_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            trace_parse: false,
            trace_analyze: false,
            verbose_errors: false,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}
