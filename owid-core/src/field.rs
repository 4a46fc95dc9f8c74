//! Column catalog for the OWID dataset.
//!
//! The source schema is not under our control, so nothing here is required
//! to be present except [`LOCATION`] and [`DATE`]. The constants name the
//! columns the dashboard reads directly.

pub const LOCATION: &str = "location";
pub const DATE: &str = "date";
pub const ISO_CODE: &str = "iso_code";
pub const CONTINENT: &str = "continent";

pub const TOTAL_CASES: &str = "total_cases";
pub const NEW_CASES: &str = "new_cases";
pub const NEW_CASES_SMOOTHED: &str = "new_cases_smoothed";
pub const TOTAL_DEATHS: &str = "total_deaths";
pub const NEW_DEATHS: &str = "new_deaths";
pub const STRINGENCY_INDEX: &str = "stringency_index";
pub const POPULATION: &str = "population";
pub const PEOPLE_FULLY_VACCINATED: &str = "people_fully_vaccinated";
pub const TOTAL_BOOSTERS: &str = "total_boosters";

/// Text columns. Everything else in the header is parsed as a number.
pub const CATEGORICAL: [&str; 5] = [ISO_CODE, CONTINENT, LOCATION, DATE, "tests_units"];

/// Running-total columns that are not caught by the "total" substring rule.
///
/// `stringency_index` is a 0-100 policy score, not a count, but it is
/// forward-filled the same way as the real totals.
pub const EXTRA_CUMULATIVE: [&str; 2] = [STRINGENCY_INDEX, PEOPLE_FULLY_VACCINATED];

/// Whether a column is forward-filled as a running total.
pub fn is_cumulative(name: &str) -> bool {
    name.contains("total") || EXTRA_CUMULATIVE.contains(&name)
}

/// Fields offered for the lethality correlation view.
pub const FACTORS: [&str; 42] = [
    NEW_CASES,
    NEW_CASES_SMOOTHED,
    NEW_DEATHS,
    "new_deaths_smoothed",
    "total_cases_per_million",
    "new_cases_per_million",
    "total_deaths_per_million",
    "new_deaths_per_million",
    "reproduction_rate",
    "icu_patients",
    "icu_patients_per_million",
    "hosp_patients",
    "hosp_patients_per_million",
    "weekly_icu_admissions",
    "weekly_hosp_admissions",
    "total_tests",
    "new_tests",
    "total_tests_per_thousand",
    "positive_rate",
    "tests_per_case",
    "total_vaccinations",
    "people_vaccinated",
    PEOPLE_FULLY_VACCINATED,
    TOTAL_BOOSTERS,
    "total_vaccinations_per_hundred",
    "people_vaccinated_per_hundred",
    "people_fully_vaccinated_per_hundred",
    "total_boosters_per_hundred",
    STRINGENCY_INDEX,
    "population_density",
    "median_age",
    "aged_65_older",
    "aged_70_older",
    "gdp_per_capita",
    "extreme_poverty",
    "cardiovasc_death_rate",
    "diabetes_prevalence",
    "female_smokers",
    "male_smokers",
    "hospital_beds_per_thousand",
    "life_expectancy",
    "human_development_index",
];

/// Aggregate locations dropped from the country-level map.
pub const MACRO_REGIONS: [&str; 13] = [
    "World",
    "Africa",
    "Asia",
    "Europe",
    "European Union",
    "North America",
    "South America",
    "Oceania",
    "International",
    "High income",
    "Upper middle income",
    "Lower middle income",
    "Low income",
];

/// Iso codes OWID gives its own aggregates. Territories such as Kosovo
/// (`OWID_KOS`) share the prefix but are countries.
pub const AGGREGATE_ISO_CODES: [&str; 13] = [
    "OWID_WRL", "OWID_EUR", "OWID_ASI", "OWID_AFR", "OWID_NAM", "OWID_SAM", "OWID_OCE",
    "OWID_EUN", "OWID_INT", "OWID_HIC", "OWID_UMC", "OWID_LMC", "OWID_LIC",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_are_cumulative() {
        assert!(is_cumulative(TOTAL_CASES));
        assert!(is_cumulative("total_deaths_per_million"));
        assert!(is_cumulative(TOTAL_BOOSTERS));
    }

    #[test]
    fn test_extra_cumulative_fields() {
        assert!(is_cumulative(STRINGENCY_INDEX));
        assert!(is_cumulative(PEOPLE_FULLY_VACCINATED));
    }

    #[test]
    fn test_daily_fields_are_not_cumulative() {
        assert!(!is_cumulative(NEW_CASES));
        assert!(!is_cumulative(NEW_DEATHS));
        assert!(!is_cumulative(POPULATION));
        assert!(!is_cumulative("people_vaccinated"));
    }

    #[test]
    fn test_factor_list_has_no_duplicates() {
        let mut names = FACTORS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FACTORS.len());
    }
}
