use std::path::PathBuf;

use food_nutrient_api::{
    foods::{
        memory::MemoryFoodStore,
        query::{FoodFilter, PageRequest},
        repo::FoodStore,
    },
    import::{
        pipeline::ingest,
        sheet::{read_sheet, CellValue, SheetFormat},
    },
};

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/datasets")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

#[test]
fn only_the_first_sheet_is_read_with_sheet_row_numbers() {
    let bytes = fixture("two_sheets.xlsx");
    let format = SheetFormat::detect(Some("two_sheets.xlsx"), None);
    assert_eq!(format, SheetFormat::Workbook);

    let rows = read_sheet(&bytes, format).unwrap();
    let numbers: Vec<usize> = rows.iter().map(|r| r.row).collect();
    // row 3 is blank in the sheet
    assert_eq!(numbers, vec![2, 4, 5]);

    assert_eq!(rows[0].get("식품코드"), Some(&CellValue::Number(101.0)));
    assert_eq!(rows[0].get("열량"), Some(&CellValue::from("1,234.5")));
    assert!(rows
        .iter()
        .all(|r| r.get("식품명") != Some(&CellValue::from("second sheet row"))));
}

#[tokio::test]
async fn workbook_rows_ingest_into_canonical_records() {
    let rows = read_sheet(&fixture("two_sheets.xlsx"), SheetFormat::Workbook).unwrap();
    let store = MemoryFoodStore::new();

    let report = ingest(&store, &rows).await;
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 1);
    assert!(report.failures.is_empty());

    let by_year = FoodFilter {
        research_year: Some("2024".into()),
        ..Default::default()
    };
    let (total, items) = store.search(&by_year, PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].fields.food_name.as_deref(), Some("김치"));
    assert_eq!(items[0].fields.food_code.as_deref(), Some("101"));
    assert_eq!(items[0].fields.calorie, Some(1234.5));

    let by_code = FoodFilter {
        food_code: Some("D-7".into()),
        ..Default::default()
    };
    let (total, items) = store.search(&by_code, PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].fields.research_year.as_deref(), Some("2023"));
    assert_eq!(items[0].fields.calorie, None);
}
