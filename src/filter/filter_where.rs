use serde_json::Value;

use super::types::{FilterOp, FilterWhereInfo, Predicate};

/// Renders a [`Predicate`] as a parameterised SQL boolean expression
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(predicate: &Predicate, starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(predicate)
    }

    fn build(&mut self, predicate: &Predicate) -> (String, Vec<Value>) {
        let owner = self.param(Value::String(predicate.owner().to_string()));
        let mut sql_conditions = vec![format!("\"user_id\" = {}::uuid", owner)];
        for condition in predicate.conditions() {
            sql_conditions.push(self.build_sql_condition(condition));
        }
        (sql_conditions.join(" AND "), std::mem::take(&mut self.param_values))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let quoted_column = format!("\"{}\"", condition.column.column());
        match condition.operator {
            FilterOp::In => {
                if let Value::Array(values) = &condition.data {
                    if values.is_empty() { return "1=0".to_string(); }
                    let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                    format!("{} IN ({})", quoted_column, params.join(", "))
                } else {
                    format!("{} = {}", quoted_column, self.param(condition.data.clone()))
                }
            }
            op => format!("{} {} {}", quoted_column, op.to_sql(), self.param(condition.data.clone())),
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
