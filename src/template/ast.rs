use serde_json::Value;

/// Expression tree for one embedded expression string.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The input root: `$`, or a bare `.`
    RootRef,

    /// Safe navigation: `a.b`
    FieldAccess(Box<Expr>, Box<Expr>),

    /// Array marked for element-wise access by the enclosing `FieldAccess`: `a[].b`
    ArrayMap(Box<Expr>),

    /// Recursive key search: `a*.b`
    RecursiveSearch(Box<Expr>, Box<Expr>),

    /// Fallback: `a | b`
    Or(Box<Expr>, Box<Expr>),

    /// `a & b`
    And(Box<Expr>, Box<Expr>),

    /// Strict equality: `a = b`
    Equals(Box<Expr>, Box<Expr>),

    /// `a + b`
    Add(Box<Expr>, Box<Expr>),

    /// `!a` or `a !`
    Not(Box<Expr>),

    /// `a?`
    ToBool(Box<Expr>),

    /// `a !sort` or `a !sortBy key`
    Sort(Box<Expr>, Option<Box<Expr>>),

    /// `a !filter predicate`
    Filter(Box<Expr>, Box<Expr>),

    /// `a !map f`
    Map(Box<Expr>, Box<Expr>),

    /// `a #`
    SetDedup(Box<Expr>),

    /// `a !json`
    JsonReparse(Box<Expr>),

    Literal(Value),

    /// `$name`, bound by a foreach
    VarRef(String),

    /// `@`, the current element inside a sort key, filter or map argument
    ElementRef,
}

impl Expr {
    /// True if `@` occurs somewhere it is not bound by a sort/filter/map argument.
    pub fn has_free_element_ref(&self) -> bool {
        match self {
            Expr::ElementRef => true,
            Expr::RootRef | Expr::Literal(_) | Expr::VarRef(_) => false,
            Expr::Sort(base, _) | Expr::Filter(base, _) | Expr::Map(base, _) => {
                base.has_free_element_ref()
            }
            Expr::ArrayMap(a)
            | Expr::Not(a)
            | Expr::ToBool(a)
            | Expr::SetDedup(a)
            | Expr::JsonReparse(a) => a.has_free_element_ref(),
            Expr::FieldAccess(a, b)
            | Expr::RecursiveSearch(a, b)
            | Expr::Or(a, b)
            | Expr::And(a, b)
            | Expr::Equals(a, b)
            | Expr::Add(a, b) => a.has_free_element_ref() || b.has_free_element_ref(),
        }
    }
}

/// Key of an object template entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Literal(String),
    Dynamic(Expr),
}

/// Output-construction plan compiled from a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Boolean, number or null copied to the output
    Literal(Value),

    Expr(Expr),

    /// Object template; entries are written in declaration order
    ObjectBuild(Vec<(Key, Plan)>),

    /// `["literal", ...items]`
    ArrayLiteral(Vec<Plan>),

    /// `["foreach", source, "$var", body]`
    ForEach {
        source: Box<Plan>,
        var: String,
        body: Box<Plan>,
    },
}
