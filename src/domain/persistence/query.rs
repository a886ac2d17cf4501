use super::entity::Column;
use super::value::FieldValue;
use crate::domain::errors::{DomainError, DomainResult};
use std::cmp::Ordering;

/// Column reference once a typed predicate has crossed into the store port.
pub type ColumnName = &'static str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    EqIgnoreCase,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Filter expression over an entity's columns.
///
/// Values are carried as data and bound as parameters by every store; no
/// provider ever splices them into statement text.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<C> {
    Compare {
        column: C,
        op: CompareOp,
        value: FieldValue,
    },
    IsNull(C),
    IsNotNull(C),
    /// Case-insensitive substring match on a text column.
    ContainsText { column: C, needle: String },
    /// Membership test on a list-valued column.
    HasMember { column: C, value: FieldValue },
    And(Vec<Predicate<C>>),
    Or(Vec<Predicate<C>>),
    Not(Box<Predicate<C>>),
}

impl<C: Column> Predicate<C> {
    fn compare(column: C, op: CompareOp, value: impl Into<FieldValue>) -> Self {
        Self::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: C, value: impl Into<FieldValue>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    pub fn eq_ignore_case(column: C, value: impl Into<FieldValue>) -> Self {
        Self::compare(column, CompareOp::EqIgnoreCase, value)
    }

    pub fn ne(column: C, value: impl Into<FieldValue>) -> Self {
        Self::compare(column, CompareOp::Ne, value)
    }

    pub fn lt(column: C, value: impl Into<FieldValue>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    pub fn le(column: C, value: impl Into<FieldValue>) -> Self {
        Self::compare(column, CompareOp::Le, value)
    }

    pub fn gt(column: C, value: impl Into<FieldValue>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    pub fn ge(column: C, value: impl Into<FieldValue>) -> Self {
        Self::compare(column, CompareOp::Ge, value)
    }

    pub const fn is_null(column: C) -> Self {
        Self::IsNull(column)
    }

    pub const fn is_not_null(column: C) -> Self {
        Self::IsNotNull(column)
    }

    pub fn contains_text(column: C, needle: impl Into<String>) -> Self {
        Self::ContainsText {
            column,
            needle: needle.into(),
        }
    }

    pub fn has_member(column: C, value: impl Into<FieldValue>) -> Self {
        Self::HasMember {
            column,
            value: value.into(),
        }
    }

    /// Drop the column type so the predicate can travel through the
    /// object-safe store port.
    pub fn erase(self) -> Predicate<ColumnName> {
        match self {
            Self::Compare { column, op, value } => Predicate::Compare {
                column: column.name(),
                op,
                value,
            },
            Self::IsNull(column) => Predicate::IsNull(column.name()),
            Self::IsNotNull(column) => Predicate::IsNotNull(column.name()),
            Self::ContainsText { column, needle } => Predicate::ContainsText {
                column: column.name(),
                needle,
            },
            Self::HasMember { column, value } => Predicate::HasMember {
                column: column.name(),
                value,
            },
            Self::And(parts) => Predicate::And(parts.into_iter().map(Self::erase).collect()),
            Self::Or(parts) => Predicate::Or(parts.into_iter().map(Self::erase).collect()),
            Self::Not(inner) => Predicate::Not(Box::new(inner.erase())),
        }
    }
}

impl<C> Predicate<C> {
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate the predicate against a row. `lookup` resolves a column to
    /// its current value; unknown columns never match.
    pub fn matches<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&C) -> Option<FieldValue>,
    {
        match self {
            Self::Compare { column, op, value } => lookup(column)
                .is_some_and(|current| compare_values(&current, *op, value)),
            Self::IsNull(column) => lookup(column).is_none_or(|v| v.is_null()),
            Self::IsNotNull(column) => lookup(column).is_some_and(|v| !v.is_null()),
            Self::ContainsText { column, needle } => lookup(column).is_some_and(|current| {
                current
                    .as_text()
                    .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase()))
            }),
            Self::HasMember { column, value } => {
                lookup(column).is_some_and(|current| match (&current, value) {
                    (FieldValue::UuidList(items), FieldValue::Uuid(id)) => items.contains(id),
                    _ => false,
                })
            }
            Self::And(parts) => parts.iter().all(|p| p.matches(lookup)),
            Self::Or(parts) => parts.iter().any(|p| p.matches(lookup)),
            Self::Not(inner) => !inner.matches(lookup),
        }
    }
}

fn compare_values(current: &FieldValue, op: CompareOp, expected: &FieldValue) -> bool {
    if current.is_null() || expected.is_null() {
        return false;
    }
    if op == CompareOp::EqIgnoreCase {
        return current.eq_ignore_case(expected);
    }
    let Some(ordering) = current.compare(expected) else {
        return false;
    };
    match op {
        CompareOp::Eq | CompareOp::EqIgnoreCase => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder<C> {
    pub column: C,
    pub ascending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

/// Store-level read request for one entity kind.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Option<Predicate<ColumnName>>,
    pub order: Option<SortOrder<ColumnName>>,
    pub window: Option<Window>,
}

impl Query {
    pub fn filtered(filter: Option<Predicate<ColumnName>>) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// One page of a gateway listing. Pages are 1-based.
#[derive(Debug, Clone)]
pub struct PageRequest<C> {
    pub page: u32,
    pub page_size: u32,
    pub filter: Option<Predicate<C>>,
    pub order_by: Option<C>,
    pub ascending: bool,
}

impl<C: Column> PageRequest<C> {
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            filter: None,
            order_by: None,
            ascending: true,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Predicate<C>) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub const fn order_by(mut self, column: C, ascending: bool) -> Self {
        self.order_by = Some(column);
        self.ascending = ascending;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.page < 1 {
            return Err(DomainError::validation("page number must be at least 1"));
        }
        if self.page_size < 1 {
            return Err(DomainError::validation("page size must be at least 1"));
        }
        Ok(())
    }

    pub fn into_query(self) -> DomainResult<Query> {
        self.validate()?;
        let offset = u64::from(self.page - 1) * u64::from(self.page_size);
        Ok(Query {
            filter: self.filter.map(Predicate::erase),
            order: self.order_by.map(|column| SortOrder {
                column: column.name(),
                ascending: self.ascending,
            }),
            window: Some(Window {
                offset,
                limit: u64::from(self.page_size),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Col {
        Name,
        Rank,
        Tags,
    }

    impl Column for Col {
        const ALL: &'static [Self] = &[Self::Name, Self::Rank, Self::Tags];

        fn name(self) -> &'static str {
            match self {
                Self::Name => "name",
                Self::Rank => "rank",
                Self::Tags => "tags",
            }
        }
    }

    fn row(col: &Col) -> Option<FieldValue> {
        match col {
            Col::Name => Some(FieldValue::from("Rust Notes")),
            Col::Rank => Some(FieldValue::Int(3)),
            Col::Tags => Some(FieldValue::UuidList(vec![uuid::Uuid::nil()])),
        }
    }

    #[test]
    fn compound_predicates_evaluate() {
        let p = Predicate::contains_text(Col::Name, "rust")
            .and(Predicate::ge(Col::Rank, 3_i64))
            .and(Predicate::has_member(Col::Tags, uuid::Uuid::nil()));
        assert!(p.matches(&row));

        let miss = Predicate::gt(Col::Rank, 3_i64).or(Predicate::eq(Col::Name, "other"));
        assert!(!miss.matches(&row));
        assert!(miss.negate().matches(&row));
    }

    #[test]
    fn erase_keeps_structure() {
        let p = Predicate::eq_ignore_case(Col::Name, "RUST NOTES").erase();
        assert!(p.matches(&|name: &ColumnName| Col::from_name(name).and_then(|c| row(&c))));
    }

    #[test]
    fn page_request_rejects_zero_and_computes_offset() {
        assert!(PageRequest::<Col>::new(0, 10).validate().is_err());
        assert!(PageRequest::<Col>::new(1, 0).validate().is_err());

        let query = PageRequest::<Col>::new(3, 10)
            .order_by(Col::Rank, false)
            .into_query()
            .unwrap();
        assert_eq!(
            query.window,
            Some(Window {
                offset: 20,
                limit: 10
            })
        );
        assert_eq!(query.order.map(|o| (o.column, o.ascending)), Some(("rank", false)));
    }
}
