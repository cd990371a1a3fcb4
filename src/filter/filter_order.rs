use super::types::SortSpec;

pub struct FilterOrder;

impl FilterOrder {
    /// `ORDER BY` clause with an id tie-breaker for stable paging
    pub fn generate(sort: &SortSpec) -> String {
        format!(
            "ORDER BY \"{}\" {}, \"id\" ASC",
            sort.field.column(),
            sort.direction.to_sql()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::SortDirection;
    use crate::types::ProductField;

    #[test]
    fn default_sort_is_newest_first() {
        assert_eq!(
            FilterOrder::generate(&SortSpec::default()),
            "ORDER BY \"created_at\" DESC, \"id\" ASC"
        );
    }

    #[test]
    fn renders_column_names_not_api_names() {
        let sort = SortSpec { field: ProductField::StockVisible, direction: SortDirection::Asc };
        assert_eq!(FilterOrder::generate(&sort), "ORDER BY \"stock_visible\" ASC, \"id\" ASC");
    }
}
