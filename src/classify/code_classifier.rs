//! Article-code classification.
//!
//! Decodes a raw product code into typology, gender, special category and a
//! counts-as-sale flag. The decision logic is an ordered list of rules
//! evaluated first-match-wins, so the priority between special codes, letter
//! prefixes and numeric shapes is explicit and each rule is testable on its
//! own. The whole thing is total: every input string classifies, garbage
//! degrades to `desconocido`.

use crate::error::Result;
use polars::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typology {
    Accesorios,
    PantalonBabuchaCalza,
    CapriPescador,
    ShortPolleraVestido,
    RemeraPolera,
    MusculosaRemeraSm,
    BuzoChalecoSinCierre,
    CamperaChalecoConCierre,
    Camisas,
    Mallas,
    Cierre,
    Ch,
    Sorteo,
    Perfuminas,
    OtrosCodigos,
    Desconocido,
}

impl Typology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Typology::Accesorios => "accesorios",
            Typology::PantalonBabuchaCalza => "pantalon babucha calza",
            Typology::CapriPescador => "capri, pescador",
            Typology::ShortPolleraVestido => "short pollera vestido",
            Typology::RemeraPolera => "remera, polera",
            Typology::MusculosaRemeraSm => "musculosa, remera s/m",
            Typology::BuzoChalecoSinCierre => "buzo, chaleco s/cierre",
            Typology::CamperaChalecoConCierre => "campera, chaleco c/cierre",
            Typology::Camisas => "camisas",
            Typology::Mallas => "mallas",
            Typology::Cierre => "cierre",
            Typology::Ch => "ch",
            Typology::Sorteo => "sorteo",
            Typology::Perfuminas => "perfuminas",
            Typology::OtrosCodigos => "otros_codigos",
            Typology::Desconocido => "desconocido",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Accesorio,
    Femenino,
    Masculino,
    Ninos,
    Desconocido,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Accesorio => "accesorio",
            Gender::Femenino => "femenino",
            Gender::Masculino => "masculino",
            Gender::Ninos => "niños",
            Gender::Desconocido => "desconocido",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCategory {
    VentasNormales,
    Cierre,
    Ch,
    Sorteo,
    Perfuminas,
    OtrosCodigos,
}

impl SpecialCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialCategory::VentasNormales => "ventas_normales",
            SpecialCategory::Cierre => "cierre",
            SpecialCategory::Ch => "ch",
            SpecialCategory::Sorteo => "sorteo",
            SpecialCategory::Perfuminas => "perfuminas",
            SpecialCategory::OtrosCodigos => "otros_codigos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub typology: Typology,
    pub gender: Gender,
    pub special_category: SpecialCategory,
    pub counts_as_sale: bool,
}

impl Classification {
    /// The degenerate classification for empty or unrecognizable codes.
    pub const UNKNOWN: Classification = Classification {
        typology: Typology::Desconocido,
        gender: Gender::Desconocido,
        special_category: SpecialCategory::VentasNormales,
        counts_as_sale: true,
    };

    const fn normal(typology: Typology, gender: Gender) -> Self {
        Classification {
            typology,
            gender,
            special_category: SpecialCategory::VentasNormales,
            counts_as_sale: true,
        }
    }

    const fn special(typology: Typology, category: SpecialCategory) -> Self {
        Classification {
            typology,
            gender: Gender::Desconocido,
            special_category: category,
            counts_as_sale: false,
        }
    }
}

/// Typology digit table. Unknown digit decodes to `desconocido`, never fails.
fn typology_for(digit: char) -> Typology {
    match digit {
        '0' => Typology::Accesorios,
        '1' => Typology::PantalonBabuchaCalza,
        '2' => Typology::CapriPescador,
        '3' => Typology::ShortPolleraVestido,
        '4' => Typology::RemeraPolera,
        '5' => Typology::MusculosaRemeraSm,
        '6' => Typology::BuzoChalecoSinCierre,
        '7' => Typology::CamperaChalecoConCierre,
        '8' => Typology::Camisas,
        '9' => Typology::Mallas,
        _ => Typology::Desconocido,
    }
}

/// Gender digit table.
fn gender_for(digit: char) -> Gender {
    match digit {
        '0' => Gender::Accesorio,
        '1' => Gender::Femenino,
        '2' => Gender::Masculino,
        '3' => Gender::Ninos,
        _ => Gender::Desconocido,
    }
}

fn char_at(code: &str, index: usize) -> Option<char> {
    code.chars().nth(index)
}

// --- ordered rules, first match wins ---

/// Exact-match special codes, checked before any shape-based rule.
fn rule_exact_special(code: &str) -> Option<Classification> {
    match code {
        "CIERRE" => Some(Classification::special(Typology::Cierre, SpecialCategory::Cierre)),
        "SORTEO" => Some(Classification::special(Typology::Sorteo, SpecialCategory::Sorteo)),
        "9310" | "9309" => Some(Classification::special(
            Typology::Perfuminas,
            SpecialCategory::Perfuminas,
        )),
        // Explicit override before the general numeric rules.
        "710091" => Some(Classification::normal(Typology::Accesorios, Gender::Desconocido)),
        _ => None,
    }
}

/// `CH...` codes are cheques.
fn rule_ch_prefix(code: &str) -> Option<Classification> {
    if code.starts_with("CH") {
        Some(Classification::special(Typology::Ch, SpecialCategory::Ch))
    } else {
        None
    }
}

/// `B` codes (básicos): char 1 is the gender digit, char 2 the typology digit.
fn rule_basicos(code: &str) -> Option<Classification> {
    if code.starts_with('B') && code.chars().count() >= 3 {
        let gender = char_at(code, 1).map_or(Gender::Desconocido, gender_for);
        let typology = char_at(code, 2).map_or(Typology::Desconocido, typology_for);
        Some(Classification::normal(typology, gender))
    } else {
        None
    }
}

/// Any other leading letter is an unclassified alphabetic code.
fn rule_other_letter(code: &str) -> Option<Classification> {
    if code.chars().next().is_some_and(|c| c.is_alphabetic()) {
        Some(Classification::special(
            Typology::OtrosCodigos,
            SpecialCategory::OtrosCodigos,
        ))
    } else {
        None
    }
}

/// Seven-digit codes carry a gender digit at index 2 and typology at index 3.
fn rule_numeric_len7(code: &str) -> Option<Classification> {
    if code.chars().next().is_some_and(|c| c.is_ascii_digit()) && code.chars().count() == 7 {
        let gender = char_at(code, 2).map_or(Gender::Desconocido, gender_for);
        let typology = char_at(code, 3).map_or(Typology::Desconocido, typology_for);
        Some(Classification::normal(typology, gender))
    } else {
        None
    }
}

/// Other numeric codes of length >= 4 only encode the typology at index 3.
fn rule_numeric_long(code: &str) -> Option<Classification> {
    if code.chars().next().is_some_and(|c| c.is_ascii_digit()) && code.chars().count() >= 4 {
        let typology = char_at(code, 3).map_or(Typology::Desconocido, typology_for);
        Some(Classification::normal(typology, Gender::Desconocido))
    } else {
        None
    }
}

/// Numeric codes too short to carry positional information.
fn rule_numeric_short(code: &str) -> Option<Classification> {
    if code.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        Some(Classification::UNKNOWN)
    } else {
        None
    }
}

type Rule = fn(&str) -> Option<Classification>;

const RULES: &[Rule] = &[
    rule_exact_special,
    rule_ch_prefix,
    rule_basicos,
    rule_other_letter,
    rule_numeric_len7,
    rule_numeric_long,
    rule_numeric_short,
];

/// Classify one raw article code. Total and deterministic: the code is
/// trimmed and uppercased, then run through the rule list; anything no rule
/// claims (empty strings, leading punctuation) is `UNKNOWN`.
pub fn classify(raw: &str) -> Classification {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        return Classification::UNKNOWN;
    }

    for rule in RULES {
        if let Some(classification) = rule(&code) {
            return classification;
        }
    }

    Classification::UNKNOWN
}

/// Derive the `tipologia`, `genero`, `categoria_especial` and `cuenta_ventas`
/// columns from `codigo_del_articulo`. Row-independent: the classification of
/// a code never depends on any other field.
pub fn apply_classification(df: &mut DataFrame) -> Result<()> {
    let codes = df.column("codigo_del_articulo")?.str()?.clone();

    let mut typologies = Vec::with_capacity(codes.len());
    let mut genders = Vec::with_capacity(codes.len());
    let mut categories = Vec::with_capacity(codes.len());
    let mut counts = Vec::with_capacity(codes.len());

    for code in codes.into_iter() {
        let c = classify(code.unwrap_or(""));
        typologies.push(c.typology.as_str());
        genders.push(c.gender.as_str());
        categories.push(c.special_category.as_str());
        counts.push(c.counts_as_sale);
    }

    df.with_column(Series::new("tipologia".into(), typologies))?;
    df.with_column(Series::new("genero".into(), genders))?;
    df.with_column(Series::new("categoria_especial".into(), categories))?;
    df.with_column(Series::new("cuenta_ventas".into(), counts))?;

    Ok(())
}
