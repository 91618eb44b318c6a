//! Pattern-match conditions shared by the search repositories.

use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Condition, Expr, ExprTrait, SimpleExpr, extension::postgres::PgBinOper};

/// Case-insensitive regex match (`col ~* pattern`) against one column.
///
/// The pattern is bound as a query parameter; callers are responsible for
/// escaping any user input folded into it.
pub(crate) fn regex_match<C: ColumnTrait>(col: C, pattern: &str) -> SimpleExpr {
    Expr::col(col).binary(PgBinOper::RegexCaseInsensitive, Expr::value(pattern))
}

/// `OR` of [`regex_match`] over several columns of one table.
pub(crate) fn any_column_matches<C: ColumnTrait>(cols: &[C], pattern: &str) -> Condition {
    let mut cond = Condition::any();
    for col in cols {
        cond = cond.add(regex_match(*col, pattern));
    }
    cond
}
