//! Header alias table: maps whatever column names a source sheet uses onto
//! the canonical food fields.
//!
//! Aliases are tried in order and the first non-blank cell wins. Units named in
//! a header (g, mg, kcal) are only matched, never converted.

use crate::foods::repo_types::FoodFields;
use crate::import::numeric;
use crate::import::sheet::{CellValue, RawRow};

pub const FOOD_CODE: &[&str] = &["식품코드", "food_code", "food_cd"];
pub const GROUP_NAME: &[&str] = &["식품군", "group", "group_name"];
pub const FOOD_NAME: &[&str] = &["식품명", "식품이름", "품목명", "food_name"];
pub const RESEARCH_YEAR: &[&str] = &["연도", "조사년도", "research_year"];
pub const MAKER_NAME: &[&str] = &["지역 / 제조사", "지역/제조사", "제조사", "maker_name"];
pub const REFERENCE_NAME: &[&str] = &["성분표출처", "자료출처", "reference_name", "ref_name"];
pub const SERVING_SIZE: &[&str] = &["1회제공량", "1회 제공량", "serving_size"];

pub const CALORIE: &[&str] = &["열량", "에너지(kcal)", "kcal", "calorie"];
pub const CARBOHYDRATE: &[&str] = &["탄수화물(g)", "탄수화물", "탄수", "carbohydrate"];
pub const PROTEIN: &[&str] = &["단백질(g)", "단백질", "protein"];
pub const FAT: &[&str] = &["지방(g)", "지방", "fat"];
pub const SUGARS: &[&str] = &["총당류(g)", "당류", "sugars"];
pub const SODIUM: &[&str] = &["나트륨(㎎)", "나트륨(mg)", "나트륨", "sodium"];
pub const CHOLESTEROL: &[&str] = &["콜레스테롤(㎎)", "콜레스테롤(mg)", "콜레스테롤", "cholesterol"];
pub const SATURATED_FATTY_ACIDS: &[&str] = &["포화지방산(g)", "포화지방", "saturated_fatty_acids"];
pub const TRANS_FAT: &[&str] = &["트랜스지방(g)", "트랜스지방", "trans", "trans_fat"];

/// First alias whose cell is present and not blank.
pub fn pick<'a>(row: &'a RawRow, aliases: &[&str]) -> Option<&'a CellValue> {
    aliases
        .iter()
        .filter_map(|alias| row.get(alias))
        .find(|cell| !cell.is_blank())
}

fn text(row: &RawRow, aliases: &[&str]) -> Option<String> {
    pick(row, aliases).and_then(CellValue::as_text)
}

fn number(row: &RawRow, aliases: &[&str]) -> Option<f64> {
    pick(row, aliases).and_then(numeric::normalize)
}

pub fn map_row(row: &RawRow) -> FoodFields {
    FoodFields {
        food_code: text(row, FOOD_CODE),
        food_name: text(row, FOOD_NAME),
        group_name: text(row, GROUP_NAME),
        research_year: text(row, RESEARCH_YEAR),
        maker_name: text(row, MAKER_NAME),
        reference_name: text(row, REFERENCE_NAME),
        serving_size: text(row, SERVING_SIZE),

        calorie: number(row, CALORIE),
        carbohydrate: number(row, CARBOHYDRATE),
        protein: number(row, PROTEIN),
        fat: number(row, FAT),
        sugars: number(row, SUGARS),
        sodium: number(row, SODIUM),
        cholesterol: number(row, CHOLESTEROL),
        saturated_fatty_acids: number(row, SATURATED_FATTY_ACIDS),
        trans_fat: number(row, TRANS_FAT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_headers_map_directly() {
        let row = RawRow::new(2)
            .with("food_code", "D101")
            .with("food_name", "Bulgogi")
            .with("research_year", 2024.0)
            .with("calorie", 250.0)
            .with("sodium", "1,020");

        let fields = map_row(&row);
        assert_eq!(fields.food_code.as_deref(), Some("D101"));
        assert_eq!(fields.food_name.as_deref(), Some("Bulgogi"));
        assert_eq!(fields.research_year.as_deref(), Some("2024"));
        assert_eq!(fields.calorie, Some(250.0));
        assert_eq!(fields.sodium, Some(1020.0));
    }

    #[test]
    fn secondary_alias_surfaces_under_canonical_key() {
        let row = RawRow::new(2)
            .with("품목명", "비빔밥")
            .with("지역/제조사", "전주")
            .with("탄수", "85.1")
            .with("trans", "0.1");

        let fields = map_row(&row);
        assert_eq!(fields.food_name.as_deref(), Some("비빔밥"));
        assert_eq!(fields.maker_name.as_deref(), Some("전주"));
        assert_eq!(fields.carbohydrate, Some(85.1));
        assert_eq!(fields.trans_fat, Some(0.1));
    }

    #[test]
    fn higher_priority_alias_wins() {
        let row = RawRow::new(2)
            .with("식품명", "primary")
            .with("food_name", "fallback")
            .with("열량", 100.0)
            .with("kcal", 999.0);

        let fields = map_row(&row);
        assert_eq!(fields.food_name.as_deref(), Some("primary"));
        assert_eq!(fields.calorie, Some(100.0));
    }

    #[test]
    fn blank_alias_falls_through_to_next() {
        let row = RawRow::new(2)
            .with("식품명", "  ")
            .with("식품이름", "두번째")
            .with("나트륨(㎎)", CellValue::Empty)
            .with("나트륨", "12");

        let fields = map_row(&row);
        assert_eq!(fields.food_name.as_deref(), Some("두번째"));
        assert_eq!(fields.sodium, Some(12.0));
    }

    #[test]
    fn sentinel_in_winning_alias_yields_none() {
        let row = RawRow::new(2)
            .with("식품명", "x")
            .with("콜레스테롤(㎎)", "—")
            .with("콜레스테롤", "5");

        assert_eq!(map_row(&row).cholesterol, None);
    }

    #[test]
    fn units_are_not_converted() {
        let row = RawRow::new(2).with("식품명", "x").with("나트륨(mg)", "500");
        assert_eq!(map_row(&row).sodium, Some(500.0));
    }

    #[test]
    fn unknown_columns_give_empty_fields() {
        let row = RawRow::new(2).with("colour", "red").with("weight", 3.0);
        let fields = map_row(&row);
        assert_eq!(fields, FoodFields::default());
        assert!(!fields.has_identity());
    }
}
