use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection, SqlResult};
use super::ID_FIELD;

/// A compiled query over one collection: conditions, ordering and an
/// optional row cap. Renders to SQL for the Postgres store and evaluates
/// in place for the in-memory store.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: FilterData) -> Result<Self, FilterError> {
        let mut filter = Self::new();
        filter.assign(data)?;
        Ok(filter)
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        if let Some(limit) = data.limit { self.set_limit(limit)?; }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        self.conditions.extend(FilterWhere::parse(&conditions)?);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn set_limit(&mut self, limit: i64) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    /// Equality on one field.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo { column: field.to_string(), operator: FilterOp::Eq, data: value.into() });
        self
    }

    /// Strictly-greater-than on one numeric field.
    pub fn gt(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo { column: field.to_string(), operator: FilterOp::Gt, data: value.into() });
        self
    }

    pub fn by_id(id: uuid::Uuid) -> Self {
        Self::new().eq(ID_FIELD, id.to_string())
    }

    pub fn sort_desc(mut self, field: &str) -> Self {
        self.order_data.push(FilterOrderInfo { column: field.to_string(), sort: SortDirection::Desc });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.max(0));
        self
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn to_sql(&self, table_name: &str) -> Result<SqlResult, FilterError> {
        validate_table_name(table_name)?;
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();

        let query = [
            "SELECT \"id\", \"data\"".to_string(),
            format!("FROM \"{}\"", table_name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    /// WHERE predicate only, with placeholders numbered after
    /// `starting_param_index` existing parameters.
    pub fn to_where_sql(&self, starting_param_index: usize) -> Result<SqlResult, FilterError> {
        let (query, params) = FilterWhere::generate(&self.conditions, starting_param_index)?;
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self, table_name: &str) -> Result<SqlResult, FilterError> {
        validate_table_name(table_name)?;
        let where_result = self.to_where_sql(0)?;
        Ok(SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", table_name, where_result.query),
            params: where_result.params,
        })
    }

    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        FilterWhere::matches(&self.conditions, doc)
    }

    /// Filter, order and cap an iterator of documents in memory.
    pub fn apply<'a, I>(&self, docs: I) -> Vec<Map<String, Value>>
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let mut out: Vec<Map<String, Value>> = docs.into_iter().filter(|d| self.matches(d)).cloned().collect();
        if !self.order_data.is_empty() {
            out.sort_by(|a, b| FilterOrder::compare(&self.order_data, a, b));
        }
        if let Some(limit) = self.limit {
            out.truncate(limit as usize);
        }
        out
    }
}

fn validate_table_name(name: &str) -> Result<(), FilterError> {
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
    }
    Ok(())
}
