use crate::config::toml_config::ExtractConfig;
use crate::domain::model::{NormalizedTable, RawDocument};
use crate::utils::error::{Result, TollError};
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| TollError::InvalidConfigValueError {
        field: "extract.table_id".to_string(),
        value: css.to_string(),
        reason: format!("{:?}", e),
    })
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Projects the transaction table onto the allow-listed columns, keeping the page's column order.
pub fn extract(raw: &RawDocument, config: &ExtractConfig) -> Result<NormalizedTable> {
    let document = Html::parse_document(raw.as_str());
    let table_css = format!("table#{}", config.table_id);
    let table_selector = selector(&table_css)?;

    let mut tables = document.select(&table_selector);
    let table = tables.next().ok_or_else(|| TollError::TableNotFound {
        selector: table_css.clone(),
    })?;
    if tables.next().is_some() {
        return Err(TollError::DataShape {
            message: format!("more than one table matches {}", table_css),
        });
    }

    let th = selector("th")?;
    let (column_indices, header): (Vec<usize>, Vec<String>) = table
        .select(&th)
        .enumerate()
        .filter_map(|(idx, cell)| {
            let label = cell.text().collect::<String>().trim().to_string();
            config
                .allowed_headers
                .iter()
                .any(|allowed| *allowed == label)
                .then_some((idx, label))
        })
        .unzip();
    tracing::debug!("Recognized columns: {:?} at {:?}", header, column_indices);

    let required = column_indices.iter().max().map_or(0, |max| max + 1);
    let body_rows = selector("tbody tr")?;
    let td = selector("td")?;

    let mut rows = Vec::new();
    for tr in table.select(&body_rows) {
        let cells: Vec<ElementRef> = tr.select(&td).collect();
        if cells.is_empty() {
            // header row placed in tbody by the parser
            continue;
        }
        if cells.len() < required {
            return Err(TollError::MalformedRow {
                row: rows.len() + 1,
                found: cells.len(),
                required,
            });
        }
        rows.push(
            column_indices
                .iter()
                .map(|&idx| cell_text(&cells[idx]))
                .collect(),
        );
    }

    tracing::info!(
        "Extracted {} transactions with {} columns",
        rows.len(),
        header.len()
    );
    NormalizedTable::new(header, rows)
}
