//! Product-level aggregations over the canonical sales table.
//!
//! All reducers are pure: they take the canonical table by reference and
//! return a fresh result frame. Only rows flagged `cuenta_ventas` count as
//! normal sales; quantity sums are signed, so returns net out.

use crate::error::Result;
use polars::prelude::*;

fn ranked_net_sales(lf: LazyFrame, n: usize) -> Result<DataFrame> {
    let out = lf
        .group_by([col("codigo_del_articulo"), col("descripcion_del_producto")])
        .agg([col("cantidad_vendida").sum()])
        .sort(
            ["cantidad_vendida"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .limit(n as IdxSize)
        .with_row_index("ranking", Some(1))
        .collect()?;
    Ok(out)
}

/// Top `n` products by net units sold, with a 1-based `ranking` column.
pub fn top_selling_products(df: &DataFrame, n: usize) -> Result<DataFrame> {
    ranked_net_sales(df.clone().lazy().filter(col("cuenta_ventas")), n)
}

/// Same ranking, restricted to the básicos line (article codes starting
/// with `B`).
pub fn top_selling_basicos(df: &DataFrame, n: usize) -> Result<DataFrame> {
    let lf = df
        .clone()
        .lazy()
        .filter(col("cuenta_ventas"))
        .filter(col("codigo_del_articulo").str().starts_with(lit("B")));
    ranked_net_sales(lf, n)
}
