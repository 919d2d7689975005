use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};
use super::ID_FIELD;

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let infos = match order {
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                // ["enrolled desc", "title asc"]
                let mut out = Vec::new();
                for v in arr {
                    if let Value::String(s) = v {
                        out.extend(Self::parse_order_string(s));
                    }
                }
                out
            }
            Value::Object(obj) => {
                // { "enrolled": "desc" } or { "enrolled": -1 }
                obj.iter()
                    .map(|(k, v)| {
                        let sort = match v {
                            Value::Number(n) if n.as_i64() == Some(-1) => SortDirection::Desc,
                            Value::String(s) if s.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                            _ => SortDirection::Asc,
                        };
                        FilterOrderInfo { column: k.clone(), sort }
                    })
                    .collect()
            }
            _ => vec![],
        };

        for info in &infos {
            let valid = info.column.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && info.column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(FilterError::InvalidField(info.column.clone()));
            }
        }
        Ok(infos)
    }

    fn parse_order_string(s: &str) -> Vec<FilterOrderInfo> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        out
    }

    /// JSONB values order numerically for numbers; missing fields sort last in
    /// both directions. Insertion time breaks ties.
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return "ORDER BY \"created_at\" ASC".to_string();
        }
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| {
                if i.column == ID_FIELD {
                    format!("\"id\" {}", i.sort.to_sql())
                } else {
                    format!("\"data\"->'{}' {} NULLS LAST", i.column, i.sort.to_sql())
                }
            })
            .collect();
        parts.push("\"created_at\" ASC".to_string());
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Comparator for in-memory sorting with the same semantics as `generate`.
    /// Use with a stable sort so insertion order breaks ties.
    pub fn compare(infos: &[FilterOrderInfo], a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
        for info in infos {
            let ord = match (a.get(&info.column), b.get(&info.column)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => {
                    let ord = compare_values(x, y);
                    match info.sort {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                }
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Total order over JSON values mirroring JSONB: null < string < number <
/// boolean < array < object, then by value within a type.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::String(_) => 1,
            Value::Number(_) => 2,
            Value::Bool(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&y.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_all_order_shapes() {
        let from_str = FilterOrder::validate_and_parse(&json!("enrolled desc, title")).unwrap();
        assert_eq!(from_str.len(), 2);
        assert_eq!(from_str[0].sort, SortDirection::Desc);
        assert_eq!(from_str[1].sort, SortDirection::Asc);

        let from_obj = FilterOrder::validate_and_parse(&json!({ "students_enrolled": -1 })).unwrap();
        assert_eq!(from_obj[0].column, "students_enrolled");
        assert_eq!(from_obj[0].sort, SortDirection::Desc);

        assert!(FilterOrder::validate_and_parse(&json!("bad-name desc")).is_err());
    }

    #[test]
    fn generates_jsonb_order_with_tiebreak() {
        let infos = FilterOrder::validate_and_parse(&json!({ "enrolled": "desc" })).unwrap();
        assert_eq!(
            FilterOrder::generate(&infos),
            "ORDER BY \"data\"->'enrolled' DESC NULLS LAST, \"created_at\" ASC"
        );
        assert_eq!(FilterOrder::generate(&[]), "ORDER BY \"created_at\" ASC");
    }

    #[test]
    fn compare_sorts_descending_with_missing_last() {
        let infos = FilterOrder::validate_and_parse(&json!({ "enrolled": "desc" })).unwrap();
        let mut docs: Vec<Map<String, Value>> = [json!({ "enrolled": 2 }), json!({}), json!({ "enrolled": 10 })]
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        docs.sort_by(|a, b| FilterOrder::compare(&infos, a, b));
        assert_eq!(docs[0]["enrolled"], json!(10));
        assert_eq!(docs[1]["enrolled"], json!(2));
        assert!(docs[2].get("enrolled").is_none());
    }
}
