use std::sync::OnceLock;

use super::ast::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// `.` between two operands
    Field,
    /// `.` or `$.` where an operand is expected
    RootField,
    /// `[].`
    ArrayMap,
    /// `*.`
    Search,
    /// `?`
    ToBool,
    /// `#`
    Dedup,
    /// `!`
    Not,
    /// `+`
    Add,
    /// `=`
    Equals,
    /// `!sort`
    Sort,
    /// `!sortBy`
    SortBy,
    /// `!filter`
    Filter,
    /// `!map`
    Map,
    /// `!json`
    Json,
    /// `&`
    And,
    /// `|`
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Infix,
    Prefix,
    Postfix,
    /// Usable before or after its operand (`!`).
    Either,
}

#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub kind: OpKind,
    pub spelling: &'static str,
    /// Lower binds tighter.
    pub precedence: u8,
    pub arity: usize,
    pub fixity: Fixity,
    /// Whether an operand must follow when used in its declared position.
    pub expects_operand: bool,
}

const fn op(
    kind: OpKind,
    spelling: &'static str,
    precedence: u8,
    arity: usize,
    fixity: Fixity,
) -> OpInfo {
    let expects_operand = matches!(fixity, Fixity::Infix | Fixity::Prefix);
    OpInfo {
        kind,
        spelling,
        precedence,
        arity,
        fixity,
        expects_operand,
    }
}

const FIELD: OpInfo = op(OpKind::Field, ".", 1, 2, Fixity::Infix);
const ROOT_FIELD: OpInfo = op(OpKind::RootField, "$.", 1, 1, Fixity::Prefix);
const ARRAY_MAP: OpInfo = op(OpKind::ArrayMap, "[].", 1, 2, Fixity::Infix);
const SEARCH: OpInfo = op(OpKind::Search, "*.", 1, 2, Fixity::Infix);
const TO_BOOL: OpInfo = op(OpKind::ToBool, "?", 1, 1, Fixity::Postfix);
const DEDUP: OpInfo = op(OpKind::Dedup, "#", 1, 1, Fixity::Postfix);
const NOT: OpInfo = op(OpKind::Not, "!", 2, 1, Fixity::Either);
const ADD: OpInfo = op(OpKind::Add, "+", 4, 2, Fixity::Infix);
const EQUALS: OpInfo = op(OpKind::Equals, "=", 5, 2, Fixity::Infix);
const SORT: OpInfo = op(OpKind::Sort, "!sort", 6, 1, Fixity::Postfix);
const SORT_BY: OpInfo = op(OpKind::SortBy, "!sortBy", 6, 2, Fixity::Infix);
const FILTER: OpInfo = op(OpKind::Filter, "!filter", 6, 2, Fixity::Infix);
const MAP: OpInfo = op(OpKind::Map, "!map", 6, 2, Fixity::Infix);
const JSON: OpInfo = op(OpKind::Json, "!json", 6, 1, Fixity::Postfix);
const AND: OpInfo = op(OpKind::And, "&", 7, 2, Fixity::Infix);
const OR: OpInfo = op(OpKind::Or, "|", 8, 2, Fixity::Infix);

pub const OPERATORS: &[OpInfo] = &[
    FIELD, ROOT_FIELD, ARRAY_MAP, SEARCH, TO_BOOL, DEDUP, NOT, ADD, EQUALS, SORT, SORT_BY,
    FILTER, MAP, JSON, AND, OR,
];

impl OpKind {
    pub fn info(self) -> &'static OpInfo {
        match self {
            OpKind::Field => &FIELD,
            OpKind::RootField => &ROOT_FIELD,
            OpKind::ArrayMap => &ARRAY_MAP,
            OpKind::Search => &SEARCH,
            OpKind::ToBool => &TO_BOOL,
            OpKind::Dedup => &DEDUP,
            OpKind::Not => &NOT,
            OpKind::Add => &ADD,
            OpKind::Equals => &EQUALS,
            OpKind::Sort => &SORT,
            OpKind::SortBy => &SORT_BY,
            OpKind::Filter => &FILTER,
            OpKind::Map => &MAP,
            OpKind::Json => &JSON,
            OpKind::And => &AND,
            OpKind::Or => &OR,
        }
    }
}

/// Operator table ordered for matching: longer spellings first, so `!sortBy`
/// is tried before `!sort` and `!`, and `[].` / `*.` / `$.` before `.`.
pub fn by_spelling_length() -> &'static [OpInfo] {
    static SORTED: OnceLock<Vec<OpInfo>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut ops = OPERATORS.to_vec();
        ops.sort_by(|a, b| b.spelling.len().cmp(&a.spelling.len()));
        ops
    })
}

/// Fold popped operands (in source order) into an expression node.
///
/// Returns `None` unless exactly `arity` operands are supplied.
pub fn build(kind: OpKind, operands: Vec<Expr>) -> Option<Expr> {
    let operands = match <[Expr; 1]>::try_from(operands) {
        Ok([a]) => return unary(kind, Box::new(a)),
        Err(operands) => operands,
    };
    let [a, b] = <[Expr; 2]>::try_from(operands).ok()?;
    binary(kind, Box::new(a), Box::new(b))
}

fn unary(kind: OpKind, a: Box<Expr>) -> Option<Expr> {
    let expr = match kind {
        OpKind::RootField => Expr::FieldAccess(Box::new(Expr::RootRef), a),
        OpKind::ToBool => Expr::ToBool(a),
        OpKind::Dedup => Expr::SetDedup(a),
        OpKind::Not => Expr::Not(a),
        OpKind::Sort => Expr::Sort(a, None),
        OpKind::Json => Expr::JsonReparse(a),
        _ => return None,
    };
    Some(expr)
}

fn binary(kind: OpKind, a: Box<Expr>, b: Box<Expr>) -> Option<Expr> {
    let expr = match kind {
        OpKind::Field => Expr::FieldAccess(a, b),
        OpKind::ArrayMap => Expr::FieldAccess(Box::new(Expr::ArrayMap(a)), b),
        OpKind::Search => Expr::RecursiveSearch(a, b),
        OpKind::Add => Expr::Add(a, b),
        OpKind::Equals => Expr::Equals(a, b),
        OpKind::SortBy => Expr::Sort(a, Some(b)),
        OpKind::Filter => Expr::Filter(a, b),
        OpKind::Map => Expr::Map(a, b),
        OpKind::And => Expr::And(a, b),
        OpKind::Or => Expr::Or(a, b),
        _ => return None,
    };
    Some(expr)
}
