//! Client-level aggregations: share of sales, per-client purchases, returns.

use crate::error::Result;
use polars::prelude::*;

/// Net units per client plus each client's percentage of total net sales,
/// sorted descending. Returns stay in the sum, so a heavy returner's share
/// shrinks accordingly.
pub fn client_share_of_sales(df: &DataFrame) -> Result<DataFrame> {
    let out = df
        .clone()
        .lazy()
        .filter(col("cuenta_ventas"))
        .group_by([col("cliente")])
        .agg([col("cantidad_vendida").sum()])
        .with_column(
            (col("cantidad_vendida") / col("cantidad_vendida").sum() * lit(100.0))
                .alias("porcentaje"),
        )
        .sort(
            ["cantidad_vendida"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .collect()?;
    Ok(out)
}

/// Products bought by one client, matched case-insensitively on the exact
/// client value, top `n` by net units.
pub fn products_bought_by_client(df: &DataFrame, client: &str, n: usize) -> Result<DataFrame> {
    let needle = client.trim().to_lowercase();
    let out = df
        .clone()
        .lazy()
        .filter(col("cuenta_ventas"))
        .filter(
            col("cliente")
                .str()
                .to_lowercase()
                .eq(lit(needle)),
        )
        .group_by([col("codigo_del_articulo"), col("descripcion_del_producto")])
        .agg([col("cantidad_vendida").sum()])
        .sort(
            ["cantidad_vendida"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .limit(n as IdxSize)
        .collect()?;
    Ok(out)
}

/// Per-client return profile: count of return rows, returned units (sign
/// inverted to read positive), and the share those units represent of the
/// client's gross sold units. Sorted by returned units with a ranking.
pub fn client_returns(df: &DataFrame) -> Result<DataFrame> {
    let base = df.clone().lazy().filter(col("cuenta_ventas"));

    let returned = base
        .clone()
        .filter(col("cantidad_vendida").lt(lit(0.0)))
        .group_by([col("cliente")])
        .agg([
            len().alias("devoluciones"),
            (col("cantidad_vendida").sum() * lit(-1.0)).alias("unidades_devueltas"),
        ]);

    let sold = base
        .filter(col("cantidad_vendida").gt(lit(0.0)))
        .group_by([col("cliente")])
        .agg([col("cantidad_vendida").sum().alias("unidades_vendidas")]);

    let out = returned
        .join(
            sold,
            [col("cliente")],
            [col("cliente")],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(
            (col("unidades_devueltas") / col("unidades_vendidas") * lit(100.0))
                .alias("porcentaje_devuelto"),
        )
        .sort(
            ["unidades_devueltas"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .with_row_index("ranking", Some(1))
        .collect()?;
    Ok(out)
}
