//! Gremlin AST: the step chain the builder emits.

/// A traversal: `g.` followed by steps, or an anonymous chain such as
/// `inV().has('id', 'x')` nested inside `where(...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    /// True when the chain starts from the `g` source.
    pub anchored: bool,
    pub steps: Vec<Step>,
}

/// One `name(args...)` step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub name: String,
    pub args: Vec<Arg>,
    pub position: usize,
}

/// A step argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    String(String),
    Integer(i64),
    Float(f64),
    Traversal(Traversal),
}

impl Step {
    /// The argument at `index` if it is a string literal.
    pub fn str_arg(&self, index: usize) -> Option<&str> {
        match self.args.get(index) {
            Some(Arg::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The argument at `index` if it is a nested traversal.
    pub fn traversal_arg(&self, index: usize) -> Option<&Traversal> {
        match self.args.get(index) {
            Some(Arg::Traversal(t)) => Some(t),
            _ => None,
        }
    }

    /// All arguments as string literals, or `None` if any is not one.
    pub fn str_args(&self) -> Option<Vec<&str>> {
        self.args
            .iter()
            .map(|a| match a {
                Arg::String(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}
