use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One dependent file and what it needs first
#[derive(Tabled)]
pub struct DependencyRow {
    #[tabled(rename = "File")]
    pub unit: String,
    #[tabled(rename = "Depends on")]
    pub dependencies: String,
}

/// One unresolved constant and who referenced it
#[derive(Tabled)]
pub struct ExternalRow {
    #[tabled(rename = "Constant")]
    pub name: String,
    #[tabled(rename = "Referenced by")]
    pub units: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: impl ToString) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        render(&self.rows)
    }
}

/// Render rows as a rounded table; empty input renders nothing
pub fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_table() {
        let mut builder = TableBuilder::new();
        builder.add_row("Files", 3);
        builder.add_row("Edges", 2);

        let table = builder.build();
        assert!(table.contains("Metric"));
        assert!(table.contains("Files"));
        assert!(table.contains('3'));
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        assert!(TableBuilder::new().build().is_empty());
        assert!(render::<DependencyRow>(&[]).is_empty());
    }

    #[test]
    fn test_dependency_rows() {
        let rows = vec![DependencyRow {
            unit: "app.rb".to_string(),
            dependencies: "base.rb, store.rb".to_string(),
        }];
        let table = render(&rows);
        assert!(table.contains("Depends on"));
        assert!(table.contains("base.rb, store.rb"));
    }
}
