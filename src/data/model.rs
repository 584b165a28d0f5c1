use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Cell – a single value of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Using `HashSet` / `BTreeMap` downstream so `Cell` must be `Eq + Hash + Ord`.
#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date-time kept as text for simplicity.
    DateTime(String),
    Null,
}

// -- Manual Eq/Ord so floats can live in sets and duplicate rows can be hashed --

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        use Cell::*;
        fn discriminant(v: &Cell) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                DateTime(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) | (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Text(s) | Cell::DateTime(s) => s.hash(state),
            Cell::Integer(i) => i.hash(state),
            Cell::Float(f) => f.to_bits().hash(state),
            Cell::Bool(b) => b.hash(state),
            Cell::Null => {}
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(true) => write!(f, "True"),
            Cell::Bool(false) => write!(f, "False"),
            Cell::DateTime(d) => write!(f, "{d}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

impl Cell {
    /// Try to interpret the value as an `f64` for plotting and statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
    DateTime,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Columns summarised by count / unique / top / freq.
    pub fn is_categorical(self) -> bool {
        matches!(self, ColumnKind::Text | ColumnKind::Bool)
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "text",
            ColumnKind::DateTime => "datetime",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One named column of the table.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn non_null_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_null()).count()
    }

    pub fn null_count(&self) -> usize {
        self.len() - self.non_null_count()
    }

    /// Non-missing values of a numeric column, in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.cells.iter().filter_map(Cell::as_f64).collect()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete parsed upload
// ---------------------------------------------------------------------------

/// Rows × named columns. Every column holds exactly `n_rows` cells.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns of equal length.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let n_rows = columns.first().map_or(0, Column::len);
        debug_assert!(columns.iter().all(|c| c.len() == n_rows));
        Self { columns, n_rows }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind.is_numeric())
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind.is_categorical())
    }

    /// First `n` rows of every column.
    pub fn head(&self, n: usize) -> Table {
        let take = n.min(self.n_rows);
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.kind, c.cells[..take].to_vec()))
            .collect();
        Table {
            columns,
            n_rows: take,
        }
    }

    /// Sub-table with the named columns, in the given order. Unknown names are skipped.
    pub fn select(&self, names: &[String]) -> Table {
        let columns = names
            .iter()
            .filter_map(|n| self.column(n).cloned())
            .collect();
        Table {
            columns,
            n_rows: self.n_rows,
        }
    }

    /// Total count of missing cells across the table.
    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Count of rows that exactly repeat an earlier row.
    pub fn duplicate_count(&self) -> usize {
        let mut seen: HashSet<Vec<&Cell>> = HashSet::with_capacity(self.n_rows);
        (0..self.n_rows)
            .filter(|&row| {
                let key: Vec<&Cell> = self.columns.iter().map(|c| &c.cells[row]).collect();
                !seen.insert(key)
            })
            .count()
    }

    /// Rewrite boolean columns as text (`"True"` / `"False"`) so they are
    /// summarised as categorical. Missing cells stay missing.
    pub fn normalize_bool_columns(&mut self) {
        for col in self.columns.iter_mut().filter(|c| c.kind == ColumnKind::Bool) {
            for cell in &mut col.cells {
                if let Cell::Bool(_) = cell {
                    *cell = Cell::Text(cell.to_string());
                }
            }
            col.kind = ColumnKind::Text;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::new(
                "id",
                ColumnKind::Integer,
                vec![Cell::Integer(1), Cell::Integer(2), Cell::Integer(1), Cell::Integer(3)],
            ),
            Column::new(
                "amount",
                ColumnKind::Float,
                vec![Cell::Float(1.5), Cell::Null, Cell::Float(1.5), Cell::Null],
            ),
            Column::new(
                "flag",
                ColumnKind::Bool,
                vec![Cell::Bool(true), Cell::Bool(false), Cell::Bool(true), Cell::Null],
            ),
        ])
    }

    #[test]
    fn test_shape_and_missing() {
        let t = sample();
        assert_eq!(t.n_rows(), 4);
        assert_eq!(t.n_cols(), 3);
        assert_eq!(t.missing_count(), 3);
    }

    #[test]
    fn test_duplicate_rows_count_later_repeats_only() {
        let t = sample();
        // Row 2 repeats row 0.
        assert_eq!(t.duplicate_count(), 1);
    }

    #[test]
    fn test_missing_cells_compare_equal_for_duplicates() {
        let t = Table::from_columns(vec![Column::new(
            "a",
            ColumnKind::Float,
            vec![Cell::Null, Cell::Null, Cell::Null],
        )]);
        assert_eq!(t.duplicate_count(), 2);
    }

    #[test]
    fn test_head_and_select() {
        let t = sample();
        let head = t.head(2);
        assert_eq!(head.n_rows(), 2);
        assert_eq!(head.n_cols(), 3);
        assert_eq!(t.head(10).n_rows(), 4);

        let sel = t.select(&["flag".to_string(), "id".to_string(), "nope".to_string()]);
        assert_eq!(sel.column_names(), vec!["flag", "id"]);
        assert_eq!(sel.n_rows(), 4);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Float(1.5).to_string(), "1.5");
        assert_eq!(Cell::Float(2.0).to_string(), "2");
        assert_eq!(Cell::Float(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Cell::Integer(-3).to_string(), "-3");
        assert_eq!(Cell::Bool(true).to_string(), "True");
        assert_eq!(Cell::Null.to_string(), "<null>");
    }

    #[test]
    fn test_normalize_bool_columns() {
        let mut t = sample();
        t.normalize_bool_columns();
        let flag = t.column("flag").unwrap();
        assert_eq!(flag.kind, ColumnKind::Text);
        assert_eq!(flag.cells[0], Cell::Text("True".into()));
        assert_eq!(flag.cells[1], Cell::Text("False".into()));
        assert!(flag.cells[3].is_null());
    }
}
