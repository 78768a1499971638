use crate::config::Dialect;

/// Storage type of a column, mapped to concrete SQL per dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
    /// Structured value stored as JSON text
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub primary_key: bool,
    pub nullable: bool,
    pub unique: bool,
    pub references: Option<ForeignKey>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
            primary_key: false,
            nullable: true,
            unique: false,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// Table definition a persisted model maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Other tables this one holds foreign keys into
    pub fn dependencies(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns
            .iter()
            .filter_map(|c| c.references.as_ref())
            .map(|fk| fk.table.as_str())
            .filter(move |table| *table != self.name)
    }

    /// Columns holding a foreign key back into this same table
    pub fn self_references(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(move |c| {
            c.references
                .as_ref()
                .is_some_and(|fk| fk.table == self.name)
        })
    }

    pub fn create_sql(&self, dialect: Dialect) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let mut definition = format!(
                    "{} {}",
                    dialect.quote(&column.name),
                    dialect.column_type(column.kind)
                );
                if !column.nullable {
                    definition.push_str(" NOT NULL");
                }
                if column.unique && !column.primary_key {
                    definition.push_str(" UNIQUE");
                }
                definition
            })
            .collect();

        let primary_key: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| dialect.quote(&c.name))
            .collect();
        if !primary_key.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", primary_key.join(", ")));
        }

        for column in &self.columns {
            if let Some(fk) = &column.references {
                parts.push(format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    dialect.quote(&column.name),
                    dialect.quote(&fk.table),
                    dialect.quote(&fk.column)
                ));
            }
        }

        format!(
            "CREATE TABLE {} ({})",
            dialect.quote(&self.name),
            parts.join(", ")
        )
    }

    pub fn drop_sql(&self, dialect: Dialect) -> String {
        format!("DROP TABLE IF EXISTS {}", dialect.quote(&self.name))
    }
}
