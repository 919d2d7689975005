use std::cmp::Ordering;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo, SqlParam};
use super::ID_FIELD;

pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Parse a Mongo-style `where` document into flat conditions.
    ///
    /// `{ "email": "a@x.com" }` is an implicit `$eq`; `{ "enrolled": { "$gt": 0 } }`
    /// names the operator explicitly. `$and` takes an array of sub-documents.
    pub fn parse(where_data: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let mut conditions = vec![];
        Self::parse_into(where_data, &mut conditions)?;
        Ok(conditions)
    }

    fn parse_into(where_data: &Value, out: &mut Vec<FilterWhereInfo>) -> Result<(), FilterError> {
        match where_data {
            Value::Null => Ok(()),
            Value::Object(obj) => {
                for (key, value) in obj {
                    if key == "$and" {
                        let parts = value
                            .as_array()
                            .ok_or_else(|| FilterError::InvalidOperatorData("$and requires array".to_string()))?;
                        for part in parts {
                            Self::parse_into(part, out)?;
                        }
                    } else if key.starts_with('$') {
                        return Err(FilterError::UnsupportedOperator(key.clone()));
                    } else {
                        Self::parse_field_condition(key, value, out)?;
                    }
                }
                Ok(())
            }
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn parse_field_condition(field: &str, value: &Value, out: &mut Vec<FilterWhereInfo>) -> Result<(), FilterError> {
        validate_field_name(field)?;

        let is_operator_object = matches!(value, Value::Object(obj) if !obj.is_empty() && obj.keys().all(|k| k.starts_with('$')));
        if let (true, Value::Object(obj)) = (is_operator_object, value) {
            for (op_key, op_val) in obj {
                let operator = Self::map_operator(op_key)?;
                let condition = FilterWhereInfo { column: field.to_string(), operator, data: op_val.clone() };
                Self::validate_condition(&condition)?;
                out.push(condition);
            }
        } else {
            let condition = FilterWhereInfo { column: field.to_string(), operator: FilterOp::Eq, data: value.clone() };
            Self::validate_condition(&condition)?;
            out.push(condition);
        }
        Ok(())
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$in" => FilterOp::In,
            "$exists" => FilterOp::Exists,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn validate_condition(condition: &FilterWhereInfo) -> Result<(), FilterError> {
        let data = &condition.data;
        match condition.operator {
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                if condition.column == ID_FIELD {
                    return Err(FilterError::InvalidOperatorData("range operators are not supported on _id".to_string()));
                }
                if !(data.is_number() || data.is_string()) {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "range operator on '{}' requires a number or string",
                        condition.column
                    )));
                }
            }
            FilterOp::In => {
                let values = data
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData("$in requires array".to_string()))?;
                if condition.column == ID_FIELD {
                    for v in values {
                        parse_id(v)?;
                    }
                }
            }
            FilterOp::Exists => {
                if !data.is_boolean() {
                    return Err(FilterError::InvalidOperatorData("$exists requires boolean".to_string()));
                }
            }
            FilterOp::Eq | FilterOp::Ne => {
                if condition.column == ID_FIELD {
                    parse_id(data)?;
                }
            }
        }
        Ok(())
    }

    /// Compile conditions to a parameterised SQL predicate over the
    /// `"id"` key column and the `"data"` JSONB column.
    pub fn generate(conditions: &[FilterWhereInfo], starting_param_index: usize) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let mut sql_conditions = vec![];
        for condition in conditions {
            sql_conditions.push(filter_where.build_sql_condition(condition)?);
        }
        let where_clause = if sql_conditions.is_empty() { "TRUE".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, filter_where.param_values))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        if condition.column == ID_FIELD {
            return self.build_id_condition(condition);
        }

        let field = &condition.column;
        let json_path = format!("\"data\"->'{}'", field);
        match condition.operator {
            FilterOp::Eq => Ok(format!("{} = {}", json_path, self.param(SqlParam::Json(condition.data.clone())))),
            FilterOp::Ne => {
                let p = self.param(SqlParam::Json(condition.data.clone()));
                Ok(format!("({path} IS NULL OR {path} <> {p})", path = json_path, p = p))
            }
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                let op = match condition.operator {
                    FilterOp::Gt => ">",
                    FilterOp::Gte => ">=",
                    FilterOp::Lt => "<",
                    _ => "<=",
                };
                match &condition.data {
                    Value::Number(n) => {
                        let value = n
                            .as_f64()
                            .ok_or_else(|| FilterError::InvalidOperatorData(format!("number out of range: {}", n)))?;
                        let p = self.param(SqlParam::Float(value));
                        Ok(format!(
                            "(CASE WHEN jsonb_typeof({path}) = 'number' THEN (\"data\"->>'{field}')::float8 END) {op} {p}",
                            path = json_path, field = field, op = op, p = p
                        ))
                    }
                    Value::String(s) => {
                        let p = self.param(SqlParam::Text(s.clone()));
                        Ok(format!(
                            "(CASE WHEN jsonb_typeof({path}) = 'string' THEN \"data\"->>'{field}' END) {op} {p}",
                            path = json_path, field = field, op = op, p = p
                        ))
                    }
                    other => Err(FilterError::InvalidOperatorData(format!("cannot range-compare {}", other))),
                }
            }
            FilterOp::In => {
                let values = condition.data.as_array().cloned().unwrap_or_default();
                if values.is_empty() {
                    return Ok("FALSE".to_string());
                }
                Ok(format!("{} = ANY({})", json_path, self.param(SqlParam::JsonArray(values))))
            }
            FilterOp::Exists => {
                let p = self.param(SqlParam::Text(field.clone()));
                if condition.data.as_bool().unwrap_or(true) {
                    Ok(format!("\"data\" ? {}", p))
                } else {
                    Ok(format!("NOT (\"data\" ? {})", p))
                }
            }
        }
    }

    fn build_id_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        match condition.operator {
            FilterOp::Eq => Ok(format!("\"id\" = {}", self.param(SqlParam::Uuid(parse_id(&condition.data)?)))),
            FilterOp::Ne => Ok(format!("\"id\" <> {}", self.param(SqlParam::Uuid(parse_id(&condition.data)?)))),
            FilterOp::In => {
                let ids = condition
                    .data
                    .as_array()
                    .map(|values| values.iter().map(parse_id).collect::<Result<Vec<_>, _>>())
                    .transpose()?
                    .unwrap_or_default();
                if ids.is_empty() {
                    return Ok("FALSE".to_string());
                }
                Ok(format!("\"id\" = ANY({})", self.param(SqlParam::UuidArray(ids))))
            }
            FilterOp::Exists => Ok(if condition.data.as_bool().unwrap_or(true) { "TRUE" } else { "FALSE" }.to_string()),
            _ => Err(FilterError::InvalidOperatorData("range operators are not supported on _id".to_string())),
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// Evaluate conditions directly against a document.
    pub fn matches(conditions: &[FilterWhereInfo], doc: &Map<String, Value>) -> bool {
        conditions.iter().all(|c| Self::matches_condition(c, doc))
    }

    fn matches_condition(condition: &FilterWhereInfo, doc: &Map<String, Value>) -> bool {
        let field = doc.get(&condition.column);
        match condition.operator {
            FilterOp::Eq => field.is_some_and(|v| json_eq(v, &condition.data)),
            FilterOp::Ne => !field.is_some_and(|v| json_eq(v, &condition.data)),
            FilterOp::Gt => field.and_then(|v| json_cmp(v, &condition.data)) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(field.and_then(|v| json_cmp(v, &condition.data)), Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Lt => field.and_then(|v| json_cmp(v, &condition.data)) == Some(Ordering::Less),
            FilterOp::Lte => matches!(field.and_then(|v| json_cmp(v, &condition.data)), Some(Ordering::Less | Ordering::Equal)),
            FilterOp::In => match (field, condition.data.as_array()) {
                (Some(v), Some(candidates)) => candidates.iter().any(|c| json_eq(v, c)),
                _ => false,
            },
            FilterOp::Exists => field.is_some() == condition.data.as_bool().unwrap_or(true),
        }
    }
}

fn validate_field_name(field: &str) -> Result<(), FilterError> {
    let mut chars = field.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidField(field.to_string()));
    }
    Ok(())
}

fn parse_id(value: &Value) -> Result<Uuid, FilterError> {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| FilterError::InvalidOperatorData(format!("invalid _id: {}", value)))
}

/// JSON equality with numbers compared by value, so `1` matches `1.0`.
pub(crate) fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering between two scalars of the same JSON type; `None` otherwise.
pub(crate) fn json_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn implicit_equality_compiles_to_jsonb_comparison() {
        let conditions = FilterWhere::parse(&json!({ "email": "a@x.com" })).unwrap();
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert_eq!(sql, "\"data\"->'email' = $1");
        assert_eq!(params, vec![SqlParam::Json(json!("a@x.com"))]);
    }

    #[test]
    fn numeric_range_uses_float_cast() {
        let conditions = FilterWhere::parse(&json!({ "enrolled": { "$gt": 0 } })).unwrap();
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert!(sql.contains("jsonb_typeof(\"data\"->'enrolled') = 'number'"));
        assert!(sql.ends_with("> $1"));
        assert_eq!(params, vec![SqlParam::Float(0.0)]);
    }

    #[test]
    fn id_field_targets_key_column() {
        let id = Uuid::new_v4();
        let conditions = FilterWhere::parse(&json!({ "_id": id.to_string() })).unwrap();
        let (sql, params) = FilterWhere::generate(&conditions, 2).unwrap();
        assert_eq!(sql, "\"id\" = $3");
        assert_eq!(params, vec![SqlParam::Uuid(id)]);
    }

    #[test]
    fn malformed_id_is_rejected_at_parse() {
        let err = FilterWhere::parse(&json!({ "_id": "not-a-uuid" })).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorData(_)));
    }

    #[test]
    fn empty_where_matches_everything() {
        let (sql, params) = FilterWhere::generate(&[], 0).unwrap();
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
        assert!(FilterWhere::matches(&[], &doc(json!({ "a": 1 }))));
    }

    #[test]
    fn unknown_operator_and_bad_field_are_errors() {
        assert!(matches!(
            FilterWhere::parse(&json!({ "a": { "$regex": "x" } })),
            Err(FilterError::UnsupportedOperator(_))
        ));
        assert!(matches!(
            FilterWhere::parse(&json!({ "a'; drop": 1 })),
            Err(FilterError::InvalidField(_))
        ));
        assert!(matches!(FilterWhere::parse(&json!([1, 2])), Err(FilterError::InvalidWhereClause(_))));
    }

    #[test]
    fn and_flattens_nested_documents() {
        let conditions = FilterWhere::parse(&json!({
            "$and": [{ "status": "pending" }, { "enrolled": { "$gte": 1 } }]
        }))
        .unwrap();
        assert_eq!(conditions.len(), 2);
        let (sql, _) = FilterWhere::generate(&conditions, 0).unwrap();
        assert!(sql.contains(" AND "));
    }

    #[test]
    fn in_memory_matching_follows_operators() {
        let d = doc(json!({ "email": "a@x.com", "enrolled": 3, "status": "pending" }));

        let eq = FilterWhere::parse(&json!({ "email": "a@x.com" })).unwrap();
        assert!(FilterWhere::matches(&eq, &d));

        let gt = FilterWhere::parse(&json!({ "enrolled": { "$gt": 3 } })).unwrap();
        assert!(!FilterWhere::matches(&gt, &d));
        let gte = FilterWhere::parse(&json!({ "enrolled": { "$gte": 3.0 } })).unwrap();
        assert!(FilterWhere::matches(&gte, &d));

        let missing = FilterWhere::parse(&json!({ "students_enrolled": { "$gt": 0 } })).unwrap();
        assert!(!FilterWhere::matches(&missing, &d));

        let ne = FilterWhere::parse(&json!({ "role": { "$ne": "admin" } })).unwrap();
        assert!(FilterWhere::matches(&ne, &d));

        let within = FilterWhere::parse(&json!({ "status": { "$in": ["approved", "pending"] } })).unwrap();
        assert!(FilterWhere::matches(&within, &d));

        let exists = FilterWhere::parse(&json!({ "role": { "$exists": false } })).unwrap();
        assert!(FilterWhere::matches(&exists, &d));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(json_eq(&json!(1), &json!(1.0)));
        assert_eq!(json_cmp(&json!("b"), &json!("a")), Some(Ordering::Greater));
        assert_eq!(json_cmp(&json!("1"), &json!(1)), None);
    }
}
