use crate::error::{AppError, FieldError};
use crate::foods::repo_types::FoodRecord;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 500;

/// Search criteria, combined with AND. `None` means "don't care".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoodFilter {
    pub food_name: Option<String>,
    pub maker_name: Option<String>,
    pub research_year: Option<String>,
    pub food_code: Option<String>,
}

impl FoodFilter {
    /// Drops blank criteria so `?food_name=` behaves like no criterion at all.
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }
        Self {
            food_name: keep(self.food_name),
            maker_name: keep(self.maker_name),
            research_year: keep(self.research_year),
            food_code: keep(self.food_code),
        }
    }

    pub fn matches(&self, record: &FoodRecord) -> bool {
        let f = &record.fields;
        contains_folded(f.food_name.as_deref(), self.food_name.as_deref())
            && contains_folded(f.maker_name.as_deref(), self.maker_name.as_deref())
            && equals(f.research_year.as_deref(), self.research_year.as_deref())
            && equals(f.food_code.as_deref(), self.food_code.as_deref())
    }
}

/// Case-insensitive substring test. A missing needle matches everything,
/// a missing haystack matches nothing else.
pub fn contains_folded(haystack: Option<&str>, needle: Option<&str>) -> bool {
    match (haystack, needle) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(h), Some(n)) => h.to_lowercase().contains(&n.to_lowercase()),
    }
}

fn equals(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(w) => value == Some(w),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Parses raw query-string values; all problems are reported together.
    pub fn parse(page: Option<&str>, per_page: Option<&str>) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        let page = parse_bounded("page", page, DEFAULT_PAGE, 1, i64::MAX, &mut errors);
        let per_page = parse_bounded(
            "per_page",
            per_page,
            DEFAULT_PER_PAGE,
            1,
            MAX_PER_PAGE,
            &mut errors,
        );

        if errors.is_empty() {
            Ok(Self { page, per_page })
        } else {
            Err(AppError::Validation(errors))
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

fn parse_bounded(
    name: &str,
    raw: Option<&str>,
    default: i64,
    min: i64,
    max: i64,
    errors: &mut Vec<FieldError>,
) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };
    match raw.parse::<i64>() {
        Ok(v) if (min..=max).contains(&v) => v,
        Ok(_) if max == i64::MAX => {
            errors.push(FieldError::new(name, format!("{name} must be >= {min}")));
            default
        }
        Ok(_) => {
            errors.push(FieldError::new(
                name,
                format!("{name} must be between {min} and {max}"),
            ));
            default
        }
        Err(_) => {
            errors.push(FieldError::new(name, format!("{name} must be an integer")));
            default
        }
    }
}
