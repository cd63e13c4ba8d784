//! Typology, gender and special-category aggregations.

use crate::error::Result;
use polars::prelude::*;

fn net_by(df: &DataFrame, key: &str) -> Result<LazyFrame> {
    Ok(df
        .clone()
        .lazy()
        .filter(col("cuenta_ventas"))
        .group_by([col(key)])
        .agg([col("cantidad_vendida").sum()])
        .sort(
            ["cantidad_vendida"],
            SortMultipleOptions::default().with_order_descending(true),
        ))
}

/// Net units per typology for normal sales, top `n` (callers usually ask
/// for five).
pub fn top_selling_typologies(df: &DataFrame, n: usize) -> Result<DataFrame> {
    Ok(net_by(df, "tipologia")?.limit(n as IdxSize).collect()?)
}

/// Net units per gender bucket for normal sales.
pub fn sales_by_gender(df: &DataFrame) -> Result<DataFrame> {
    Ok(net_by(df, "genero")?.collect()?)
}

/// One special category's slice of the table.
#[derive(Debug, Clone)]
pub struct CategoryBucket {
    /// Row count in the category.
    pub cantidad: usize,
    /// Net signed units in the category.
    pub unidades: f64,
    /// The matching rows, untouched.
    pub detalle: DataFrame,
}

/// All non-sale rows, bucketed by category. Together with the normal-sale
/// aggregates this partitions the table: every row lands in exactly one
/// place.
#[derive(Debug, Clone)]
pub struct SpecialCategoriesSummary {
    pub cierres: CategoryBucket,
    pub ch: CategoryBucket,
    pub sorteos: CategoryBucket,
    pub perfuminas: CategoryBucket,
    pub otros_codigos: CategoryBucket,
}

impl SpecialCategoriesSummary {
    /// Signed unit total across every special bucket.
    pub fn total_unidades(&self) -> f64 {
        self.cierres.unidades
            + self.ch.unidades
            + self.sorteos.unidades
            + self.perfuminas.unidades
            + self.otros_codigos.unidades
    }
}

fn bucket(df: &DataFrame, category: &str) -> Result<CategoryBucket> {
    let detalle = df
        .clone()
        .lazy()
        .filter(col("cuenta_ventas").eq(lit(false)))
        .filter(col("categoria_especial").eq(lit(category)))
        .collect()?;

    let unidades = detalle
        .column("cantidad_vendida")?
        .f64()?
        .sum()
        .unwrap_or(0.0);

    Ok(CategoryBucket {
        cantidad: detalle.height(),
        unidades,
        detalle,
    })
}

/// Summarize the `cuenta_ventas == false` rows into their five fixed
/// categories.
pub fn special_categories_summary(df: &DataFrame) -> Result<SpecialCategoriesSummary> {
    Ok(SpecialCategoriesSummary {
        cierres: bucket(df, "cierre")?,
        ch: bucket(df, "ch")?,
        sorteos: bucket(df, "sorteo")?,
        perfuminas: bucket(df, "perfuminas")?,
        otros_codigos: bucket(df, "otros_codigos")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::products::top_selling_products;

    fn sample() -> DataFrame {
        df!(
            "cliente" => &["1", "1", "2", "2", "3", "3", "4"],
            "codigo_del_articulo" => &["B145", "1234567", "CIERRE", "CH2091", "9310", "B9", "SORTEO"],
            "descripcion_del_producto" => &["remera", "pantalon", "cierre", "chaleco", "perfumina", "otro", "sorteo"],
            "cantidad_vendida" => &[6.0, -2.0, 4.0, 2.0, 3.0, 1.0, -1.0],
            "tipologia" => &["remera, polera", "remera, polera", "cierre", "ch", "perfuminas", "otros_codigos", "sorteo"],
            "genero" => &["femenino", "niños", "desconocido", "desconocido", "desconocido", "desconocido", "desconocido"],
            "categoria_especial" => &["ventas_normales", "ventas_normales", "cierre", "ch", "perfuminas", "otros_codigos", "sorteo"],
            "cuenta_ventas" => &[true, true, false, false, false, false, false],
        )
        .unwrap()
    }

    #[test]
    fn test_top_typologies_limit_and_order() {
        let df = df!(
            "tipologia" => &["remera, polera", "mallas", "remera, polera", "camisas"],
            "cantidad_vendida" => &[3.0, 8.0, 2.0, 1.0],
            "cuenta_ventas" => &[true, true, true, true],
        )
        .unwrap();

        let top = top_selling_typologies(&df, 2).unwrap();
        assert_eq!(top.height(), 2);
        let names = top.column("tipologia").unwrap().str().unwrap();
        assert_eq!(names.get(0), Some("mallas"));
        assert_eq!(names.get(1), Some("remera, polera"));
    }

    #[test]
    fn test_sales_by_gender_nets_and_excludes_specials() {
        let genders = sales_by_gender(&sample()).unwrap();
        assert_eq!(genders.height(), 2);

        let qty_by_gender: Vec<(Option<&str>, Option<f64>)> = genders
            .column("genero")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .zip(genders.column("cantidad_vendida").unwrap().f64().unwrap())
            .collect();
        assert!(qty_by_gender.contains(&(Some("femenino"), Some(6.0))));
        assert!(qty_by_gender.contains(&(Some("niños"), Some(-2.0))));
    }

    #[test]
    fn test_special_summary_buckets() {
        let summary = special_categories_summary(&sample()).unwrap();

        assert_eq!(summary.cierres.cantidad, 1);
        assert_eq!(summary.cierres.unidades, 4.0);
        assert_eq!(summary.ch.cantidad, 1);
        assert_eq!(summary.sorteos.unidades, -1.0);
        assert_eq!(summary.perfuminas.unidades, 3.0);
        assert_eq!(summary.otros_codigos.cantidad, 1);

        let codes = summary.cierres.detalle.column("codigo_del_articulo").unwrap();
        assert_eq!(codes.str().unwrap().get(0), Some("CIERRE"));
    }

    #[test]
    fn test_normal_and_special_totals_partition_the_table() {
        let df = sample();

        let normal_total: f64 = top_selling_products(&df, 100)
            .unwrap()
            .column("cantidad_vendida")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .sum();

        let special_total = special_categories_summary(&df).unwrap().total_unidades();

        let signed_total = df
            .column("cantidad_vendida")
            .unwrap()
            .f64()
            .unwrap()
            .sum()
            .unwrap();

        assert!((normal_total + special_total - signed_total).abs() < 1e-9);
    }
}
