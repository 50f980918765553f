//! Results table processing
//!
//! `TableView` is the stateful service behind every results table: it holds
//! the raw row set plus the current search / filter / sort / page selections
//! and produces the visible page on demand. The pipeline runs in a fixed
//! order so results are deterministic:
//!
//! 1. Free-text search across every field (case-insensitive substring)
//! 2. Single-field filter (case-insensitive substring)
//! 3. Sort (numeric when both cells are numbers, lower-cased string otherwise)
//! 4. Pagination
//!
//! CSV export covers the filtered+sorted set, not the visible page. Fields
//! containing commas, quotes, or newlines are quoted per RFC 4180.

use crate::error::Result;
use crate::types::{Row, TableColumn};
use serde_json::Value;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Fixed filename for the CSV export artifact
pub const EXPORT_FILENAME: &str = "querymuse-data-export.csv";

/// Maximum page buttons shown in the pagination footer
pub const PAGE_WINDOW: usize = 5;

/// Sort direction for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The currently visible slice of a processed table
#[derive(Debug, Clone)]
pub struct ProcessedTable {
    /// Columns in display order
    pub columns: Vec<TableColumn>,
    /// Rows of the current page
    pub rows: Vec<Row>,
    /// Current page, 1-based and clamped to `[1, page_count]`
    pub page: usize,
    /// Total pages: `ceil(filtered_count / page_size)`
    pub page_count: usize,
    /// Row count after search and filter
    pub filtered_count: usize,
    /// Row count before any processing
    pub total_count: usize,
}

impl ProcessedTable {
    /// Summary line for the table footer
    pub fn summary(&self) -> String {
        let mut s = format!(
            "Showing {} of {} results",
            self.rows.len(),
            self.filtered_count
        );
        if self.filtered_count != self.total_count {
            s.push_str(&format!(" (filtered from {})", self.total_count));
        }
        s
    }
}

/// Output of a processing pass
#[derive(Debug, Clone)]
pub enum TableOutput {
    /// The input row set was empty; nothing to process
    NoData,
    /// The visible page plus counts
    Page(ProcessedTable),
}

/// Stateful view over a row set
#[derive(Debug, Clone)]
pub struct TableView {
    rows: Vec<Row>,
    columns: Vec<TableColumn>,
    page_size: usize,
    searchable: bool,
    search_query: String,
    filter_field: Option<String>,
    filter_value: String,
    sort_field: Option<String>,
    sort_direction: SortDirection,
    current_page: usize,
}

impl TableView {
    /// Create a view with columns auto-derived from the first row's keys.
    pub fn new(rows: Vec<Row>, page_size: usize, searchable: bool) -> Self {
        let columns = rows
            .first()
            .map(|row| row.keys().map(|key| TableColumn::from_key(key)).collect())
            .unwrap_or_default();
        Self::with_columns(rows, columns, page_size, searchable)
    }

    /// Create a view with an explicit column set.
    pub fn with_columns(
        rows: Vec<Row>,
        columns: Vec<TableColumn>,
        page_size: usize,
        searchable: bool,
    ) -> Self {
        Self {
            rows,
            columns,
            page_size: page_size.max(1),
            searchable,
            search_query: String::new(),
            filter_field: None,
            filter_value: String::new(),
            sort_field: None,
            sort_direction: SortDirection::default(),
            current_page: 1,
        }
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// Set the free-text search query. Resets to the first page.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.current_page = 1;
    }

    /// Select a filter field and value. Resets to the first page.
    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.filter_field = Some(field.into());
        self.filter_value = value.into();
        self.current_page = 1;
    }

    /// Drop the single-field filter.
    pub fn clear_filter(&mut self) {
        self.filter_field = None;
        self.filter_value.clear();
        self.current_page = 1;
    }

    /// Sort by `field`: first selection sorts ascending, selecting the same
    /// field again flips the direction. Non-sortable columns are ignored.
    pub fn toggle_sort(&mut self, field: &str) {
        let sortable = self
            .columns
            .iter()
            .any(|col| col.key == field && col.sortable);
        if !sortable {
            return;
        }

        if self.sort_field.as_deref() == Some(field) {
            self.sort_direction = self.sort_direction.flip();
        } else {
            self.sort_field = Some(field.to_string());
            self.sort_direction = SortDirection::Ascending;
        }
    }

    /// Jump to a specific page (clamped during processing).
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn next_page(&mut self) {
        self.current_page += 1;
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    /// Run the search → filter → sort → paginate pipeline.
    pub fn process(&mut self) -> TableOutput {
        if self.rows.is_empty() {
            return TableOutput::NoData;
        }

        let filtered = self.filtered_sorted();
        let filtered_count = filtered.len();
        let page_count = filtered_count.div_ceil(self.page_size);

        // Clamp the page into range; an empty filtered set pins it to 1.
        self.current_page = self.current_page.clamp(1, page_count.max(1));

        let start = (self.current_page - 1) * self.page_size;
        let rows = filtered
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect();

        TableOutput::Page(ProcessedTable {
            columns: self.columns.clone(),
            rows,
            page: self.current_page,
            page_count,
            filtered_count,
            total_count: self.rows.len(),
        })
    }

    /// Serialize the filtered+sorted row set (not the visible page) as CSV.
    pub fn export_csv(&self) -> String {
        let mut csv = self
            .columns
            .iter()
            .map(|col| csv_field(&col.header))
            .collect::<Vec<_>>()
            .join(",");
        csv.push('\n');

        for row in self.filtered_sorted() {
            let line = self
                .columns
                .iter()
                .map(|col| csv_field(&cell_string(&row, &col.key)))
                .collect::<Vec<_>>()
                .join(",");
            csv.push_str(&line);
            csv.push('\n');
        }

        csv
    }

    /// Write the CSV export to `dir` under the fixed artifact filename.
    pub fn export_to_file(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(EXPORT_FILENAME);
        std::fs::write(&path, self.export_csv())?;
        tracing::info!(path = %path.display(), "Exported table to CSV");
        Ok(path)
    }

    /// Search, filter, and sort without pagination.
    fn filtered_sorted(&self) -> Vec<Row> {
        let mut filtered: Vec<Row> = self.rows.clone();

        // Free-text search over every field
        if self.searchable && !self.search_query.is_empty() {
            let needle = self.search_query.to_lowercase();
            filtered.retain(|row| {
                row.values()
                    .any(|value| value_string(value).to_lowercase().contains(&needle))
            });
        }

        // Single-field filter
        if let Some(field) = &self.filter_field {
            if !self.filter_value.is_empty() {
                let needle = self.filter_value.to_lowercase();
                filtered.retain(|row| cell_string(row, field).to_lowercase().contains(&needle));
            }
        }

        // Sort
        if let Some(field) = &self.sort_field {
            let direction = self.sort_direction;
            filtered.sort_by(|a, b| {
                let ordering = compare_cells(a.get(field.as_str()), b.get(field.as_str()));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        filtered
    }
}

/// Page numbers for the pagination footer: up to [`PAGE_WINDOW`] pages
/// centered on the current one, pinned to the ends of the range.
pub fn page_window(current: usize, page_count: usize) -> Vec<usize> {
    if page_count == 0 {
        return Vec::new();
    }
    let visible = PAGE_WINDOW.min(page_count);
    let first = current
        .saturating_sub(2)
        .clamp(1, page_count - visible + 1);
    (first..first + visible).collect()
}

/// Compare two cells: numbers numerically, everything else as lower-cased strings.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    if let (Some(Value::Number(a)), Some(Value::Number(b))) = (a, b) {
        let a = a.as_f64().unwrap_or(f64::NAN);
        let b = b.as_f64().unwrap_or(f64::NAN);
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }

    let a = a.map(value_string).unwrap_or_default().to_lowercase();
    let b = b.map(value_string).unwrap_or_default().to_lowercase();
    a.cmp(&b)
}

/// String form of a row cell; missing cells render as empty.
fn cell_string(row: &Row, key: &str) -> String {
    row.get(key).map(value_string).unwrap_or_default()
}

/// String form of a JSON value without quoting strings.
fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(region: &str, sales: i64, growth_rate: &str) -> Row {
        let mut row = Row::new();
        row.insert("region".to_string(), json!(region));
        row.insert("sales".to_string(), json!(sales));
        row.insert("growthRate".to_string(), json!(growth_rate));
        row
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row("North America", 2_300_000, "+15%"),
            row("Europe", 1_800_000, "+8%"),
            row("Asia Pacific", 1_200_000, "+22%"),
            row("South America", 600_000, "+4%"),
            row("Africa", 450_000, "+11%"),
        ]
    }

    fn page(view: &mut TableView) -> ProcessedTable {
        match view.process() {
            TableOutput::Page(page) => page,
            TableOutput::NoData => panic!("expected data"),
        }
    }

    #[test]
    fn test_empty_rows_short_circuit() {
        let mut view = TableView::new(Vec::new(), 10, true);
        assert!(matches!(view.process(), TableOutput::NoData));
        assert!(view.columns().is_empty());
    }

    #[test]
    fn test_auto_derived_columns() {
        let view = TableView::new(sample_rows(), 10, true);
        let headers: Vec<_> = view.columns().iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["Region", "Sales", "Growth Rate"]);
        assert!(view.columns().iter().all(|c| c.sortable && c.filterable));
    }

    #[test]
    fn test_search_filters_any_field() {
        let mut view = TableView::new(sample_rows(), 10, true);
        view.set_search("america");
        let america = page(&mut view);
        assert_eq!(america.filtered_count, 2);

        // Search matches non-string fields through their string form
        view.set_search("2300000");
        let numeric = page(&mut view);
        assert_eq!(numeric.filtered_count, 1);
    }

    #[test]
    fn test_search_disabled_is_noop() {
        let mut view = TableView::new(sample_rows(), 10, false);
        view.set_search("america");
        assert_eq!(page(&mut view).filtered_count, 5);
    }

    #[test]
    fn test_field_filter() {
        let mut view = TableView::new(sample_rows(), 10, true);
        view.set_filter("region", "euro");
        let europe = page(&mut view);
        assert_eq!(europe.filtered_count, 1);
        assert_eq!(europe.rows[0].get("region").unwrap(), &json!("Europe"));

        view.clear_filter();
        assert_eq!(page(&mut view).filtered_count, 5);
    }

    #[test]
    fn test_stage_counts_monotonic() {
        let mut view = TableView::new(sample_rows(), 10, true);
        let total = page(&mut view).filtered_count;

        view.set_search("a");
        let searched = page(&mut view).filtered_count;
        assert!(searched <= total);

        view.set_filter("region", "america");
        let filtered = page(&mut view).filtered_count;
        assert!(filtered <= searched);

        // Sort never changes the count
        view.toggle_sort("sales");
        assert_eq!(page(&mut view).filtered_count, filtered);
    }

    #[test]
    fn test_numeric_sort() {
        let mut view = TableView::new(sample_rows(), 10, true);
        view.toggle_sort("sales");
        let page = page(&mut view);
        let sales: Vec<i64> = page
            .rows
            .iter()
            .map(|r| r.get("sales").unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(sales, vec![450_000, 600_000, 1_200_000, 1_800_000, 2_300_000]);
    }

    #[test]
    fn test_string_sort_case_insensitive() {
        let mut rows = sample_rows();
        rows[0].insert("region".to_string(), json!("north america"));
        let mut view = TableView::new(rows, 10, true);
        view.toggle_sort("region");
        let page = page(&mut view);
        let regions: Vec<&str> = page
            .rows
            .iter()
            .map(|r| r.get("region").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(
            regions,
            vec!["Africa", "Asia Pacific", "Europe", "north america", "South America"]
        );
    }

    #[test]
    fn test_sort_toggle_reverses_distinct_keys() {
        let mut view = TableView::new(sample_rows(), 10, true);
        view.toggle_sort("sales");
        let ascending: Vec<_> = page(&mut view)
            .rows
            .iter()
            .map(|r| r.get("sales").unwrap().as_i64().unwrap())
            .collect();

        view.toggle_sort("sales");
        let descending: Vec<_> = page(&mut view)
            .rows
            .iter()
            .map(|r| r.get("sales").unwrap().as_i64().unwrap())
            .collect();

        let mut reversed = ascending.clone();
        reversed.reverse();
        assert_eq!(descending, reversed);
    }

    #[test]
    fn test_sort_idempotent() {
        let mut view = TableView::new(sample_rows(), 10, true);
        view.toggle_sort("region");
        let once = page(&mut view).rows;
        let twice = page(&mut view).rows;
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn test_pagination_invariants() {
        for page_size in 1..=6 {
            let mut view = TableView::new(sample_rows(), page_size, true);
            view.toggle_sort("region");

            let first = page(&mut view);
            assert_eq!(first.page_count, 5_usize.div_ceil(page_size));

            // Concatenating every page reconstructs the full set exactly once
            let mut seen = Vec::new();
            for p in 1..=first.page_count {
                view.set_page(p);
                let current = page(&mut view);
                assert_eq!(current.page, p);
                seen.extend(current.rows);
            }
            assert_eq!(seen.len(), 5);
        }
    }

    #[test]
    fn test_page_clamped_to_range() {
        let mut view = TableView::new(sample_rows(), 2, true);
        view.set_page(99);
        assert_eq!(page(&mut view).page, 3);

        view.prev_page();
        view.prev_page();
        view.prev_page();
        view.prev_page();
        assert_eq!(page(&mut view).page, 1);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut view = TableView::new(sample_rows(), 2, true);
        view.set_page(3);
        assert_eq!(page(&mut view).page, 3);
        view.set_search("a");
        assert_eq!(page(&mut view).page, 1);
    }

    #[test]
    fn test_summary_line() {
        let mut view = TableView::new(sample_rows(), 10, true);
        view.set_search("america");
        let processed = page(&mut view);
        assert_eq!(
            processed.summary(),
            "Showing 2 of 2 results (filtered from 5)"
        );
    }

    #[test]
    fn test_csv_export_covers_filtered_sorted_set() {
        let mut view = TableView::new(sample_rows(), 2, true);
        view.toggle_sort("sales");

        let csv = view.export_csv();
        let lines: Vec<&str> = csv.lines().collect();
        // Header plus all 5 rows, not just the 2-row visible page
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Region,Sales,Growth Rate");
        assert!(lines[1].starts_with("Africa,450000"));
        assert!(lines[5].starts_with("North America,2300000"));
    }

    #[test]
    fn test_csv_quotes_embedded_delimiters() {
        let mut row = Row::new();
        row.insert("region".to_string(), json!("EMEA, incl. \"UK\""));
        row.insert("sales".to_string(), json!(10));
        let view = TableView::new(vec![row], 10, true);

        let csv = view.export_csv();
        assert!(csv.contains("\"EMEA, incl. \"\"UK\"\"\",10"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let view = TableView::new(sample_rows(), 10, true);
        let path = view.export_to_file(dir.path()).unwrap();
        assert!(path.ends_with(EXPORT_FILENAME));
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, view.export_csv());
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(6, 10), vec![4, 5, 6, 7, 8]);
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
        assert!(page_window(1, 0).is_empty());
    }
}
